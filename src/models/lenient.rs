//! Tolerant readers for backend JSON.
//!
//! The backend is loose about types: ids come back as numbers or strings,
//! prices sometimes as numeric strings. The `serde` helpers here never fail on
//! a type mismatch; they yield `None` (or the default) so a single odd field
//! cannot sink a whole record. The `first_*` helpers pick the first usable
//! value from a list of candidate keys, skipping JS-falsy values (missing,
//! `null`, `""`, `0`).

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn value_as_text_list(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(map) => ["url", "imageUrl", "path"]
                    .iter()
                    .find_map(|key| map.get(*key).and_then(Value::as_str))
                    .map(str::to_string),
                other => value_as_text(other),
            })
            .collect(),
    )
}

/// Optional float from a number or numeric string.
pub fn opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_f64(&value))
}

/// Optional integer from a number or numeric string.
pub fn opt_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_i64(&value))
}

/// Integer defaulting to zero.
pub fn opt_integer_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    opt_integer(deserializer).map(|n| n.unwrap_or(0))
}

/// Optional string; numbers and booleans are stringified.
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_text(&value))
}

/// String defaulting to empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_text(deserializer).map(Option::unwrap_or_default)
}

/// Optional list of strings. Objects inside the list contribute their `url`.
pub fn opt_text_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_text_list(&value))
}

/// Boolean, accepting `"true"`/`"false"` strings; anything else is `false`.
pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// First non-empty string under any of `keys`.
pub fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(value_as_text)
        .find(|s| !s.is_empty())
}

/// First non-zero number under any of `keys`.
pub fn first_number(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(value_as_f64)
        .find(|n| *n != 0.0)
}

/// First non-zero integer under any of `keys`.
pub fn first_integer(value: &Value, keys: &[&str]) -> Option<i64> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(value_as_i64)
        .find(|n| *n != 0)
}

/// First array of strings under any of `keys`.
pub fn first_text_list(value: &Value, keys: &[&str]) -> Option<Vec<String>> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(value_as_text_list)
}

/// Whether `value` carries a truthy entry under `key`.
pub fn is_truthy(value: &Value, key: &str) -> bool {
    match value.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "opt_number")]
        price: Option<f64>,
        #[serde(default, deserialize_with = "opt_integer")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "text")]
        name: String,
        #[serde(default, deserialize_with = "opt_text_list")]
        images: Option<Vec<String>>,
    }

    #[test]
    fn test_numbers_accept_numeric_strings() {
        let sample: Sample =
            serde_json::from_value(json!({"price": "1250.5", "id": "42"})).unwrap();
        assert_eq!(sample.price, Some(1250.5));
        assert_eq!(sample.id, Some(42));
    }

    #[test]
    fn test_mismatched_types_degrade_to_none() {
        let sample: Sample = serde_json::from_value(json!({
            "price": {"amount": 3},
            "id": [1],
            "name": null,
            "images": "not-a-list"
        }))
        .unwrap();
        assert_eq!(sample.price, None);
        assert_eq!(sample.id, None);
        assert_eq!(sample.name, "");
        assert_eq!(sample.images, None);
    }

    #[test]
    fn test_image_objects_contribute_urls() {
        let sample: Sample = serde_json::from_value(json!({
            "images": ["a.jpg", {"imageUrl": "b.jpg"}, {"other": 1}]
        }))
        .unwrap();
        assert_eq!(
            sample.images,
            Some(vec!["a.jpg".to_string(), "b.jpg".to_string()])
        );
    }

    #[test]
    fn test_first_helpers_skip_falsy_values() {
        let value = json!({"title": "", "name": "Villa", "area": 0, "squareFeet": 120});
        assert_eq!(first_text(&value, &["title", "name"]).as_deref(), Some("Villa"));
        assert_eq!(first_number(&value, &["area", "squareFeet"]), Some(120.0));
        assert_eq!(first_integer(&value, &["missing"]), None);
        assert!(is_truthy(&value, "name"));
        assert!(!is_truthy(&value, "title"));
    }
}
