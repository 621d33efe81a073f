pub mod sheet_reader;

pub use sheet_reader::{check_columns, require_columns, SheetReader};
