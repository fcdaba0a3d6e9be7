//! Canonical id handling. Ids arrive as JSON numbers, strings, or sheet cells
//! like `"12.0"`; everything is normalized to a trimmed string before comparison.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n.is_finite() && !trimmed.is_empty() => {
            format!("{}", n as i64)
        }
        _ => trimmed.to_string(),
    }
}

pub fn ids_match(a: &str, b: &str) -> bool {
    normalize_id(a) == normalize_id(b)
}

pub fn parse_student_id(raw: &str) -> Option<i64> {
    let normalized = normalize_id(raw);
    normalized.parse::<i64>().ok().filter(|id| *id > 0)
}

pub fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(normalize_id(&n.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(normalize_id(s)),
        _ => None,
    }
}

/// Deserializes a required id that may be sent as either a number or a string.
pub fn de_loose_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_id(&value).ok_or_else(|| serde::de::Error::custom("expected an id"))
}

pub fn de_loose_id_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_id))
}

pub fn de_loose_id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<Value>::deserialize(deserializer)?;
    values
        .iter()
        .map(|v| value_to_id(v).ok_or_else(|| serde::de::Error::custom("expected an id")))
        .collect()
}

/// For optional id updates: `null` or `""` clears, an id sets. Pair with
/// `#[serde(default)]` so an absent field stays `None`.
pub fn de_id_change<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Some(value_to_id(&value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_compare_across_representations() {
        assert!(ids_match("12", "12.0"));
        assert!(ids_match(" 7 ", "7"));
        assert!(!ids_match("7", "17"));
        assert!(ids_match("red", "red"));
    }

    #[test]
    fn student_ids_must_be_positive_integers() {
        assert_eq!(parse_student_id("42"), Some(42));
        assert_eq!(parse_student_id("42.0"), Some(42));
        assert_eq!(parse_student_id("abc"), None);
        assert_eq!(parse_student_id("0"), None);
        assert_eq!(parse_student_id("4.5"), None);
    }

    #[test]
    fn json_ids_accept_numbers_and_strings() {
        assert_eq!(value_to_id(&serde_json::json!(3)).as_deref(), Some("3"));
        assert_eq!(value_to_id(&serde_json::json!("3")).as_deref(), Some("3"));
        assert_eq!(value_to_id(&serde_json::json!(null)), None);
        assert_eq!(value_to_id(&serde_json::json!("")), None);
    }
}
