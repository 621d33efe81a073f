use crate::models::ResolvedColumns;

/// What happened to the rows of one ingested sheet.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub total_rows: usize,
    pub valid_records: usize,
    pub defaulted_metrics: usize,
    pub dropped_rows: Vec<DroppedRow>,
    pub columns_found: Vec<String>,
    pub columns_used: ResolvedColumns,
}

/// A row removed because a coordinate didn't normalize.
#[derive(Debug, Clone)]
pub struct DroppedRow {
    /// 1-based data row, header excluded
    pub row_number: usize,
    pub label: String,
    pub raw_latitude: String,
    pub raw_longitude: String,
}

impl IngestReport {
    pub fn new(columns_found: Vec<String>, columns_used: ResolvedColumns) -> Self {
        Self {
            total_rows: 0,
            valid_records: 0,
            defaulted_metrics: 0,
            dropped_rows: Vec::new(),
            columns_found,
            columns_used,
        }
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped_rows.len()
    }

    fn percentage(&self, count: usize) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            100.0 * count as f64 / self.total_rows as f64
        }
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Sheet Ingest Report ===\n");
        summary.push_str(&format!("Columns Found: {}\n", self.columns_found.join(", ")));
        summary.push_str(&format!(
            "Columns Used: label={}, lat={}, lon={}, metric={}\n",
            self.columns_used.label,
            self.columns_used.latitude,
            self.columns_used.longitude,
            self.columns_used.metric
        ));
        summary.push_str(&format!("Total Rows: {}\n", self.total_rows));
        summary.push_str(&format!(
            "Valid Records: {} ({:.1}%)\n",
            self.valid_records,
            self.percentage(self.valid_records)
        ));
        summary.push_str(&format!(
            "Dropped (unparseable coordinates): {} ({:.1}%)\n",
            self.dropped_count(),
            self.percentage(self.dropped_count())
        ));
        summary.push_str(&format!(
            "Metrics Defaulted to 0: {}\n",
            self.defaulted_metrics
        ));

        if !self.dropped_rows.is_empty() {
            summary.push_str("\nFirst 10 Dropped Rows:\n");
            for (i, dropped) in self.dropped_rows.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. Row {} '{}': lat='{}', lon='{}'\n",
                    i + 1,
                    dropped.row_number,
                    dropped.label,
                    dropped.raw_latitude,
                    dropped.raw_longitude
                ));
            }
        }

        summary
    }
}
