use serde::{Deserialize, Serialize};

use crate::models::RawRow;
use crate::utils::constants::DISPLAY_PRECISION;
use crate::utils::coordinates::{is_valid_pair, normalize_coordinate};
use crate::utils::metric::coerce_metric;

/// Concrete (normalized) column names a row set is read with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedColumns {
    pub label: String,
    pub latitude: String,
    pub longitude: String,
    pub metric: String,
}

impl ResolvedColumns {
    pub fn required(&self) -> Vec<String> {
        vec![
            self.label.clone(),
            self.latitude.clone(),
            self.longitude.clone(),
            self.metric.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub metric: f64,
}

impl StationRecord {
    pub fn new(label: String, latitude: f64, longitude: f64, metric: f64) -> Self {
        Self {
            label,
            latitude,
            longitude,
            metric,
        }
    }

    /// Build a record from a raw row. Returns `None` when either coordinate
    /// can't be normalized; the metric always resolves (unreadable -> 0).
    pub fn from_raw(row: &RawRow, columns: &ResolvedColumns) -> Option<Self> {
        let latitude = normalize_coordinate(row.get(&columns.latitude).unwrap_or_default());
        let longitude = normalize_coordinate(row.get(&columns.longitude).unwrap_or_default());

        if !is_valid_pair(latitude, longitude) {
            return None;
        }

        let label = row.get(&columns.label).unwrap_or_default().trim().to_string();
        let metric = coerce_metric(row.get(&columns.metric).unwrap_or_default());

        Some(Self::new(label, latitude, longitude, metric))
    }

    /// `lat,lon` rounded for display; the stored values are untouched.
    pub fn display_coordinates(&self) -> String {
        format!(
            "{:.prec$},{:.prec$}",
            self.latitude,
            self.longitude,
            prec = DISPLAY_PRECISION
        )
    }

    pub fn is_within(&self, min: f64, max: f64) -> bool {
        min <= self.metric && self.metric <= max
    }
}
