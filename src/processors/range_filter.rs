use crate::error::{ProcessingError, Result};
use crate::models::StationRecord;
use serde::{Deserialize, Serialize};

/// Inclusive metric bounds selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

impl MetricRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ProcessingError::Config(format!(
                "Metric range bounds must be finite, got [{}, {}]",
                min, max
            )));
        }

        if min > max {
            return Err(ProcessingError::Config(format!(
                "Metric range minimum {} is greater than maximum {}",
                min, max
            )));
        }

        Ok(Self { min, max })
    }

    /// Observed min/max over a record set, the default slider position.
    pub fn observed(records: &[StationRecord]) -> Option<Self> {
        let mut iter = records.iter().map(|r| r.metric);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), m| (lo.min(m), hi.max(m)));
        Some(Self { min, max })
    }

    /// Replace either bound with a caller override, keeping the other.
    pub fn with_overrides(self, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        Self::new(min.unwrap_or(self.min), max.unwrap_or(self.max))
    }

    pub fn contains(&self, metric: f64) -> bool {
        self.min <= metric && metric <= self.max
    }
}

/// Keep records whose metric lies in `[min, max]`, preserving order.
pub fn filter_by_range(records: &[StationRecord], min: f64, max: f64) -> Vec<StationRecord> {
    records
        .iter()
        .filter(|r| r.is_within(min, max))
        .cloned()
        .collect()
}
