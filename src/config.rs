use crate::error::Result;
use crate::models::{normalize_column_name, ResolvedColumns};
use crate::utils::constants::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Application configuration, layered from an optional file and
/// `STATION_HEATMAP_*` environment variables (`__` separates sections).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    #[validate(nested)]
    pub source: SourceConfig,

    #[validate(nested)]
    pub columns: ColumnMapping,

    #[validate(nested)]
    pub map: MapSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SourceConfig {
    #[validate(length(min = 1))]
    pub url: String,

    #[validate(length(min = 1))]
    pub user_agent: String,

    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,

    pub cache_ttl_secs: u64,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SHEET_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Which sheet columns hold the station fields.
///
/// `metric` is a list of accepted spellings; the first one present in the
/// sheet is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ColumnMapping {
    #[validate(length(min = 1))]
    pub label: String,

    #[validate(length(min = 1))]
    pub latitude: String,

    #[validate(length(min = 1))]
    pub longitude: String,

    #[validate(length(min = 1), custom(function = "validate_aliases"))]
    pub metric: Vec<String>,
}

fn validate_aliases(aliases: &[String]) -> std::result::Result<(), ValidationError> {
    if aliases.iter().any(|a| a.trim().is_empty()) {
        return Err(ValidationError::new("empty_metric_alias"));
    }
    Ok(())
}

impl ColumnMapping {
    /// Pick concrete column names for a header list.
    ///
    /// When no metric alias is present the first alias is kept, so the
    /// missing-column check reports it.
    pub fn resolve(&self, headers: &[String]) -> ResolvedColumns {
        let aliases: Vec<String> = self.metric.iter().map(|m| normalize_column_name(m)).collect();

        let metric = aliases
            .iter()
            .find(|alias| headers.contains(alias))
            .or_else(|| aliases.first())
            .cloned()
            .unwrap_or_else(|| DEFAULT_METRIC_COLUMN.to_string());

        ResolvedColumns {
            label: normalize_column_name(&self.label),
            latitude: normalize_column_name(&self.latitude),
            longitude: normalize_column_name(&self.longitude),
            metric,
        }
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL_COLUMN.to_string(),
            latitude: DEFAULT_LATITUDE_COLUMN.to_string(),
            longitude: DEFAULT_LONGITUDE_COLUMN.to_string(),
            metric: vec![DEFAULT_METRIC_COLUMN.to_string()],
        }
    }
}

/// Settings handed through to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MapSettings {
    #[validate(range(min = 10, max = 80))]
    pub heat_radius: u32,

    #[validate(range(min = 10, max = 80))]
    pub heat_blur: u32,

    #[validate(range(min = 1, max = 22))]
    pub max_zoom: u32,

    #[validate(range(min = 10, max = 18))]
    pub initial_zoom: u32,

    pub show_markers: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            heat_radius: DEFAULT_HEAT_RADIUS,
            heat_blur: DEFAULT_HEAT_BLUR,
            max_zoom: DEFAULT_HEAT_MAX_ZOOM,
            initial_zoom: DEFAULT_ZOOM,
            show_markers: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from `path` (if given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("columns.metric"),
            )
            .build()?;

        let app_config: AppConfig = settings.try_deserialize()?;
        app_config.validate()?;

        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    // every load() reads the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.columns.label, "posto");
        assert_eq!(config.map.heat_radius, 35);
        assert_eq!(config.source.cache_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_heat_radius_out_of_range() {
        let mut config = AppConfig::default();
        config.map.heat_radius = 5;
        assert!(config.validate().is_err());

        config.map.heat_radius = 80;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_metric_aliases_rejected() {
        let mut config = AppConfig::default();
        config.columns.metric = vec![];
        assert!(config.validate().is_err());

        config.columns.metric = vec!["registros".into(), "  ".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_picks_first_present_alias() {
        let mapping = ColumnMapping {
            metric: vec!["Registros".into(), "qtd".into()],
            ..ColumnMapping::default()
        };
        let headers: Vec<String> = ["posto", "lat", "long", "qtd"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let resolved = mapping.resolve(&headers);
        assert_eq!(resolved.metric, "qtd");
        assert_eq!(resolved.longitude, "long");
    }

    #[test]
    fn test_resolve_without_alias_keeps_first() {
        let mapping = ColumnMapping {
            metric: vec!["registros".into(), "qtd".into()],
            ..ColumnMapping::default()
        };
        let resolved = mapping.resolve(&["posto".to_string()]);
        assert_eq!(resolved.metric, "registros");
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let _guard = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(
            file,
            "[source]\nurl = \"http://localhost/sheet.csv\"\n\n[columns]\nmetric = [\"regs\"]\n\n[map]\nheat_blur = 40\n"
        )?;

        let config = AppConfig::load(Some(file.path()))?;
        assert_eq!(config.source.url, "http://localhost/sheet.csv");
        assert_eq!(config.columns.metric, vec!["regs"]);
        assert_eq!(config.columns.latitude, "lat");
        assert_eq!(config.map.heat_blur, 40);
        assert_eq!(config.map.heat_radius, 35);

        Ok(())
    }

    #[test]
    fn test_load_rejects_invalid_file() -> Result<()> {
        let _guard = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "[map]\ninitial_zoom = 25\n")?;

        assert!(AppConfig::load(Some(file.path())).is_err());
        Ok(())
    }

    #[test]
    fn test_load_env_overrides() {
        let _guard = env_lock();
        std::env::set_var("STATION_HEATMAP_COLUMNS__METRIC", "registros,qtd");
        std::env::set_var("STATION_HEATMAP_MAP__HEAT_RADIUS", "50");
        std::env::set_var("STATION_HEATMAP_SOURCE__URL", "http://x/y.csv");
        let loaded = AppConfig::load(None);

        std::env::set_var("STATION_HEATMAP_MAP__HEAT_RADIUS", "5");
        let out_of_range = AppConfig::load(None);

        for key in [
            "STATION_HEATMAP_COLUMNS__METRIC",
            "STATION_HEATMAP_MAP__HEAT_RADIUS",
            "STATION_HEATMAP_SOURCE__URL",
        ] {
            std::env::remove_var(key);
        }

        let config = loaded.unwrap();
        assert_eq!(config.columns.metric, vec!["registros", "qtd"]);
        assert_eq!(config.map.heat_radius, 50);
        assert_eq!(config.source.url, "http://x/y.csv");
        assert_eq!(config.columns.label, "posto");
        assert_eq!(config.map.heat_blur, 25);

        assert!(matches!(out_of_range, Err(ProcessingError::Validation(_))));
    }
}
