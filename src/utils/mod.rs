pub mod constants;
pub mod coordinates;
pub mod filename;
pub mod metric;
pub mod progress;

pub use constants::*;
pub use coordinates::normalize_coordinate;
pub use filename::generate_default_output_filename;
pub use metric::{coerce_metric, coerce_metric_value};
pub use progress::ProgressReporter;
