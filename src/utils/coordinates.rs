/// Convert a raw spreadsheet coordinate into signed decimal degrees.
///
/// Tolerates decimal commas, thousands-style grouping misapplied to a
/// coordinate (`-13.010.079`) and stray punctuation. Anything that still
/// fails to parse yields `NaN` instead of an error, so callers can drop the
/// row afterwards.
///
/// # Examples
/// ```
/// use station_heatmap::utils::normalize_coordinate;
///
/// assert!((normalize_coordinate("-13,010079") - -13.010079).abs() < 1e-12);
/// assert!((normalize_coordinate("-13.010.079") - -13.010079).abs() < 1e-12);
/// assert!(normalize_coordinate("nan").is_nan());
/// ```
pub fn normalize_coordinate(raw: &str) -> f64 {
    let trimmed = raw.trim();

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return f64::NAN;
    }

    let mut text = trimmed.replace(',', ".");

    if text.matches('.').count() > 1 {
        text = collapse_extra_periods(&text);
    }

    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    cleaned.parse::<f64>().unwrap_or(f64::NAN)
}

/// Keep the first period as the decimal point and glue every later segment
/// onto the fraction: `-13.010.079` becomes `-13.010079`.
fn collapse_extra_periods(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };

    let mut segments = unsigned.split('.');
    let integer = segments.next().unwrap_or_default();
    let fraction: String = segments.collect();

    format!("{}{}.{}", sign, integer, fraction)
}

/// True when both components of a coordinate pair survived normalization.
pub fn is_valid_pair(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite() && longitude.is_finite()
}
