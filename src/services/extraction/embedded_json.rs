use serde_json::{Map, Value};

use crate::core::metrics;

/// Parses a text column expected to hold a JSON object.
///
/// Never fails: a missing or blank column is an empty map, and malformed or
/// non-object JSON is logged, counted, and also becomes an empty map so the
/// row keeps going with defaulted fields.
pub(crate) fn parse_object(
    field: &'static str,
    row_id: i64,
    raw: Option<&str>,
) -> Map<String, Value> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Map::new();
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(
                field,
                row_id,
                kind = json_kind(&other),
                "Embedded JSON is not an object; using empty mapping"
            );
            metrics::record_parse_failure(field);
            Map::new()
        }
        Err(err) => {
            tracing::warn!(
                field,
                row_id,
                error = %err,
                "Failed to parse embedded JSON; using empty mapping"
            );
            metrics::record_parse_failure(field);
            Map::new()
        }
    }
}

/// Highest positional key (`"1"`, `"2"`, ...) in a parsed `retroContents`
/// mapping; non-numeric keys are ignored and an empty mapping counts as zero.
pub(crate) fn question_count(retro: &Map<String, Value>) -> usize {
    retro
        .keys()
        .filter(|key| !key.is_empty() && key.bytes().all(|byte| byte.is_ascii_digit()))
        .filter_map(|key| key.parse::<usize>().ok())
        .max()
        .unwrap_or(0)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
