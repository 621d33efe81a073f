use crate::config::MapSettings;
use crate::error::Result;
use crate::models::{Centroid, HeatPoint, MapViews, MarkerEntry};
use crate::processors::MetricRange;
use crate::utils::filename::is_stdout;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Renderer input for one filtering pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDocument {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub fetched_at: Option<DateTime<Utc>>,
    pub range: MetricRange,
    pub total_records: usize,
    pub filtered_records: usize,
    pub settings: MapSettings,
    pub centroid: Centroid,
    pub heat_points: Vec<HeatPoint>,
    pub markers: Vec<MarkerEntry>,
}

impl MapDocument {
    pub fn new(
        source: &str,
        range: MetricRange,
        total_records: usize,
        views: MapViews,
        settings: MapSettings,
    ) -> Self {
        let markers = if settings.show_markers {
            views.markers
        } else {
            Vec::new()
        };

        Self {
            generated_at: Utc::now(),
            source: source.to_string(),
            fetched_at: None,
            range,
            total_records,
            filtered_records: views.heat_points.len(),
            settings,
            centroid: views.centroid,
            heat_points: views.heat_points,
            markers,
        }
    }

    pub fn with_fetched_at(mut self, fetched_at: Option<DateTime<Utc>>) -> Self {
        self.fetched_at = fetched_at;
        self
    }
}

pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Write the document to `path`, or to stdout when `path` is `-`
    pub fn write_document(&self, document: &MapDocument, path: &Path) -> Result<()> {
        if is_stdout(path) {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            self.write_to(document, &mut handle)?;
            writeln!(handle)?;
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(document, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, document: &MapDocument, writer: &mut W) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(writer, document)?;
        } else {
            serde_json::to_writer(writer, document)?;
        }
        Ok(())
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}
