pub mod cache;
pub mod source;

pub use cache::{CacheEntry, SheetCache};
pub use source::{FileSheetSource, HttpSheetSource, SheetSource};
