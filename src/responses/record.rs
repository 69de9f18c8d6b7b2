use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::responses::RawResponse;

/// Row shape of a stored answer as the persistence layer returns it.
///
/// Value fields are read loosely: a row whose payload does not match its
/// tag decodes to an empty variant instead of failing the whole batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredResponse {
    #[serde(default)]
    pub response_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_response: Option<Value>,
}

impl From<StoredResponse> for RawResponse {
    fn from(row: StoredResponse) -> Self {
        let tag = row.response_type.unwrap_or_default();
        match tag.trim().to_ascii_lowercase().as_str() {
            "number" => RawResponse::Number(row.number_response.as_ref().and_then(number_field)),
            "text" => RawResponse::Text(row.text_response.and_then(text_field)),
            "boolean" => RawResponse::Boolean(row.boolean_response.as_ref().and_then(bool_field)),
            "array" => RawResponse::Array(match row.array_response {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            }),
            "object" => RawResponse::Object(row.object_response.and_then(object_field)),
            _ => RawResponse::Unrecognized(tag),
        }
    }
}

impl From<RawResponse> for StoredResponse {
    fn from(response: RawResponse) -> Self {
        let mut row = StoredResponse {
            response_type: Some(response.tag().to_string()),
            ..StoredResponse::default()
        };
        match response {
            RawResponse::Number(v) => {
                row.number_response = v.and_then(Number::from_f64).map(Value::Number);
            }
            RawResponse::Text(v) => row.text_response = v.map(Value::String),
            RawResponse::Boolean(v) => row.boolean_response = v.map(Value::Bool),
            RawResponse::Array(items) => row.array_response = Some(Value::Array(items)),
            RawResponse::Object(map) => row.object_response = map.map(Value::Object),
            RawResponse::Unrecognized(_) => {}
        }
        row
    }
}

/// Identifiers come back as UUID strings or integer keys depending on the table.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric identifier, found {other}"
        ))),
    }
}

fn number_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn text_field(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn bool_field(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse::<bool>().ok(),
        _ => None,
    }
}

// jsonb columns occasionally arrive double-encoded as a string.
fn object_field(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::String(s) => serde_json::from_str::<Map<String, Value>>(&s).ok(),
        _ => None,
    }
}
