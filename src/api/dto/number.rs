//! Lenient numeric fields.
//!
//! Form-backed clients send numbers as text (`"0.02"`), JSON clients send
//! them as numbers. Both are accepted; blank text counts as "no value".

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn parse<E: serde::de::Error>(raw: Option<NumberOrText>) -> Result<Option<f64>, E> {
    match raw {
        None => Ok(None),
        Some(NumberOrText::Number(v)) => Ok(Some(v)),
        Some(NumberOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| E::custom(format!("invalid number: {s:?}"))),
    }
}

/// `null`, absent or blank -> `None`; number or numeric text -> `Some`.
///
/// Pair with `#[serde(default)]`.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    parse(Option::<NumberOrText>::deserialize(deserializer)?)
}

/// Absent -> `None` (via `#[serde(default)]`), `null` or blank -> `Some(None)`,
/// value -> `Some(Some(v))`.
pub fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    parse(Option::<NumberOrText>::deserialize(deserializer)?).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Create {
        #[serde(default, deserialize_with = "optional")]
        value: Option<f64>,
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        value: Option<Option<f64>>,
    }

    #[test]
    fn test_optional_accepts_numbers_and_text() {
        let n: Create = serde_json::from_str(r#"{"value": 0.02}"#).unwrap();
        let t: Create = serde_json::from_str(r#"{"value": " 0.02 "}"#).unwrap();

        assert_eq!(n.value, Some(0.02));
        assert_eq!(t.value, Some(0.02));
    }

    #[test]
    fn test_optional_empty_values() {
        let absent: Create = serde_json::from_str("{}").unwrap();
        let null: Create = serde_json::from_str(r#"{"value": null}"#).unwrap();
        let blank: Create = serde_json::from_str(r#"{"value": ""}"#).unwrap();

        assert_eq!(absent.value, None);
        assert_eq!(null.value, None);
        assert_eq!(blank.value, None);
    }

    #[test]
    fn test_optional_rejects_garbage() {
        assert!(serde_json::from_str::<Create>(r#"{"value": "two"}"#).is_err());
    }

    #[test]
    fn test_double_option_tells_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"value": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"value": "0.5"}"#).unwrap();

        assert_eq!(absent.value, None);
        assert_eq!(null.value, Some(None));
        assert_eq!(set.value, Some(Some(0.5)));
    }
}
