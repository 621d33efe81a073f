pub mod row;
pub mod station;
pub mod views;

pub use row::{normalize_column_name, RawRow, RowSet};
pub use station::{ResolvedColumns, StationRecord};
pub use views::{Centroid, HeatPoint, MapViews, MarkerEntry};
