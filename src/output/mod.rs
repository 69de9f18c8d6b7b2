pub mod csv;
pub mod json;
pub mod table;

/// Rendered in place of any statistic that has no value.
pub const NOT_AVAILABLE: &str = "N/A";

pub fn format_stat(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn format_difference(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:+.precision$}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
