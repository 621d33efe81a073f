use crate::config::ColumnMapping;
use crate::error::{ProcessingError, Result};
use crate::models::{MapViews, RowSet, StationRecord};
use crate::processors::aggregation::build_views;
use crate::processors::ingest_report::{DroppedRow, IngestReport};
use crate::processors::range_filter::{filter_by_range, MetricRange};
use crate::readers::sheet_reader::check_columns;
use crate::utils::metric::is_defaulted;
use tracing::{debug, info, warn};

/// Sheet-to-records pipeline, parameterized by the column mapping.
pub struct StationPipeline {
    columns: ColumnMapping,
}

impl StationPipeline {
    pub fn new(columns: ColumnMapping) -> Self {
        Self { columns }
    }

    /// Resolve and require the columns, then normalize every row into a
    /// [`StationRecord`], dropping rows without parseable coordinates.
    pub fn prepare(&self, rows: &RowSet) -> Result<PreparedDataset> {
        let resolved = self.columns.resolve(&rows.headers);
        check_columns(rows, &resolved.required())?;

        let mut report = IngestReport::new(rows.headers.clone(), resolved.clone());
        report.total_rows = rows.len();

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.rows.iter().enumerate() {
            match StationRecord::from_raw(row, &resolved) {
                Some(record) => {
                    if is_defaulted(row.get(&resolved.metric).unwrap_or_default()) {
                        report.defaulted_metrics += 1;
                    }
                    records.push(record);
                }
                None => report.dropped_rows.push(DroppedRow {
                    row_number: index + 1,
                    label: row.get(&resolved.label).unwrap_or_default().trim().to_string(),
                    raw_latitude: row.get(&resolved.latitude).unwrap_or_default().to_string(),
                    raw_longitude: row.get(&resolved.longitude).unwrap_or_default().to_string(),
                }),
            }
        }
        report.valid_records = records.len();

        if report.dropped_count() > 0 {
            warn!(
                dropped = report.dropped_count(),
                total = report.total_rows,
                "Dropped rows with unparseable coordinates"
            );
        }
        info!(
            records = records.len(),
            defaulted_metrics = report.defaulted_metrics,
            metric_column = %resolved.metric,
            "Station records prepared"
        );

        Ok(PreparedDataset { records, report })
    }
}

impl Default for StationPipeline {
    fn default() -> Self {
        Self::new(ColumnMapping::default())
    }
}

/// Normalized records of one ingestion, ready for any number of filter passes.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub records: Vec<StationRecord>,
    pub report: IngestReport,
}

impl PreparedDataset {
    /// Default filter bounds: the observed metric min/max.
    pub fn observed_range(&self) -> Option<MetricRange> {
        MetricRange::observed(&self.records)
    }

    pub fn filter(&self, range: MetricRange) -> Vec<StationRecord> {
        filter_by_range(&self.records, range.min, range.max)
    }

    /// Filter with `range` (or the observed range) and build the views.
    pub fn render(&self, range: Option<MetricRange>) -> Result<(MetricRange, MapViews)> {
        let range = match range {
            Some(range) => range,
            None => self.observed_range().ok_or(ProcessingError::EmptyDataset)?,
        };

        let filtered = self.filter(range);
        debug!(
            min = range.min,
            max = range.max,
            kept = filtered.len(),
            total = self.records.len(),
            "Range filter applied"
        );

        let views = build_views(&filtered, &self.records)?;
        Ok((range, views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readers::SheetReader;
    use pretty_assertions::assert_eq;

    fn rows(text: &str) -> RowSet {
        SheetReader::new().ingest(text).unwrap()
    }

    #[test]
    fn test_prepare_counts_dropped_and_defaulted() {
        let sheet = rows(
            "Posto,Lat,Long,Registros\n\
             A,\"-13,010079\",\"-38,5\",10\n\
             B,-13.020.500,-38.6,abc\n\
             C,,-38.7,4\n\
             D,nan,nan,1\n",
        );

        let dataset = StationPipeline::default().prepare(&sheet).unwrap();

        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.report.total_rows, 4);
        assert_eq!(dataset.report.valid_records, 2);
        assert_eq!(dataset.report.defaulted_metrics, 1);
        assert_eq!(dataset.report.dropped_count(), 2);
        assert_eq!(dataset.report.dropped_rows[0].row_number, 3);
        assert_eq!(dataset.report.dropped_rows[0].label, "C");
    }

    #[test]
    fn test_prepare_missing_column() {
        let sheet = rows("posto,lat,registros\nA,1,2\n");
        let err = StationPipeline::default().prepare(&sheet).unwrap_err();

        match err {
            ProcessingError::MissingColumns { missing, found } => {
                assert_eq!(missing, vec!["long"]);
                assert_eq!(found, vec!["posto", "lat", "registros"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prepare_with_metric_alias() {
        let mapping = ColumnMapping {
            metric: vec!["registros".into(), "quantidade".into()],
            ..ColumnMapping::default()
        };
        let sheet = rows("posto,lat,long,quantidade\nA,1.5,2.5,7\n");

        let dataset = StationPipeline::new(mapping).prepare(&sheet).unwrap();
        assert_eq!(dataset.records[0].metric, 7.0);
        assert_eq!(dataset.report.columns_used.metric, "quantidade");
    }

    #[test]
    fn test_render_defaults_to_observed_range() {
        let sheet = rows("posto,lat,long,registros\nA,1,1,2\nB,3,3,8\n");
        let dataset = StationPipeline::default().prepare(&sheet).unwrap();

        let (range, views) = dataset.render(None).unwrap();
        assert_eq!(range, MetricRange { min: 2.0, max: 8.0 });
        assert_eq!(views.heat_points.len(), 2);
        assert_eq!(views.centroid.lat, 2.0);
    }

    #[test]
    fn test_render_empty_filter_uses_fallback_centroid() {
        let sheet = rows("posto,lat,long,registros\nA,1,1,2\nB,3,3,8\n");
        let dataset = StationPipeline::default().prepare(&sheet).unwrap();

        let range = MetricRange::new(100.0, 200.0).unwrap();
        let (_, views) = dataset.render(Some(range)).unwrap();
        assert!(views.markers.is_empty());
        assert_eq!(views.centroid.lon, 2.0);
    }

    #[test]
    fn test_render_without_records() {
        let sheet = rows("posto,lat,long,registros\nA,,,2\n");
        let dataset = StationPipeline::default().prepare(&sheet).unwrap();

        assert!(matches!(
            dataset.render(None),
            Err(ProcessingError::EmptyDataset)
        ));
    }
}
