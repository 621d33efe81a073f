use serde::{Deserialize, Serialize};

use crate::models::StationRecord;

/// Weighted point for density rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lon: f64,
    pub weight: f64,
}

impl From<&StationRecord> for HeatPoint {
    fn from(record: &StationRecord) -> Self {
        Self {
            lat: record.latitude,
            lon: record.longitude,
            weight: record.metric,
        }
    }
}

/// Clickable marker descriptor for one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerEntry {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    pub metric: f64,
    pub display_text: String,
    pub tooltip: String,
}

impl From<&StationRecord> for MarkerEntry {
    fn from(record: &StationRecord) -> Self {
        Self {
            lat: record.latitude,
            lon: record.longitude,
            label: record.label.clone(),
            metric: record.metric,
            display_text: format!(
                "Station: {}\nCount: {}\nCoords: {}",
                record.label,
                record.metric,
                record.display_coordinates()
            ),
            tooltip: format!("{} ({})", record.label, record.metric),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
}

impl Centroid {
    /// Arithmetic mean of the record coordinates, `None` for an empty slice.
    pub fn mean(records: &[StationRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }

        let n = records.len() as f64;
        let (lat_sum, lon_sum) = records
            .iter()
            .fold((0.0, 0.0), |(lat, lon), r| (lat + r.latitude, lon + r.longitude));

        Some(Self {
            lat: lat_sum / n,
            lon: lon_sum / n,
        })
    }
}

/// Everything a renderer needs for one filtering pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapViews {
    pub heat_points: Vec<HeatPoint>,
    pub markers: Vec<MarkerEntry>,
    pub centroid: Centroid,
}
