use serde_json::Value;

use crate::responses::RawResponse;

/// Key under which object-encoded answers store their rating.
pub const OBJECT_VALUE_KEY: &str = "main";

/// Numeric values usable for statistics, in input order.
///
/// Records that carry no measurable value are dropped, never reported.
pub fn extract_numeric_values(responses: &[RawResponse]) -> Vec<f64> {
    responses.iter().filter_map(numeric_value).collect()
}

pub fn numeric_value(response: &RawResponse) -> Option<f64> {
    let value = match response {
        RawResponse::Number(value) => *value,
        RawResponse::Object(map) => map
            .as_ref()
            .and_then(|m| m.get(OBJECT_VALUE_KEY))
            .and_then(coerce_number),
        RawResponse::Text(_)
        | RawResponse::Boolean(_)
        | RawResponse::Array(_)
        | RawResponse::Unrecognized(_) => None,
    };
    value.filter(|v| v.is_finite())
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}
