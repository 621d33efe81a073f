use crate::utils::constants::DEFAULT_METRIC;

/// Coerce a raw count cell into a number.
///
/// Unlike coordinates, an unreadable metric means "no activity" rather than an
/// invalid row, so failures fall back to [`DEFAULT_METRIC`]. Decimal commas
/// (`"3,5"`) are not accepted and also fall back. Negative values are kept as-is.
pub fn coerce_metric(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .map(coerce_metric_value)
        .unwrap_or(DEFAULT_METRIC)
}

/// Coerce an already numeric metric, replacing NaN and infinities.
pub fn coerce_metric_value(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        DEFAULT_METRIC
    }
}

/// True when the raw cell would fall back to the default.
pub fn is_defaulted(raw: &str) -> bool {
    !matches!(raw.trim().parse::<f64>(), Ok(v) if v.is_finite())
}
