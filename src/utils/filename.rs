use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default output filename with format: station-heatmap-{YYMMDD}.{extension}
pub fn generate_default_output_filename(extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year

    let filename = format!(
        "station-heatmap-{:02}{:02}{:02}.{}",
        year,
        now.month(),
        now.day(),
        extension
    );
    PathBuf::from("output").join(filename)
}

/// `-` means standard output
pub fn is_stdout(path: &std::path::Path) -> bool {
    path.as_os_str() == "-"
}
