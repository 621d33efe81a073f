pub mod aggregation;
pub mod ingest_report;
pub mod pipeline;
pub mod range_filter;

pub use aggregation::build_views;
pub use ingest_report::{DroppedRow, IngestReport};
pub use pipeline::{PreparedDataset, StationPipeline};
pub use range_filter::{filter_by_range, MetricRange};
