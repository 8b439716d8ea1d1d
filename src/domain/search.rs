//! Case-insensitive substring search over in-memory records.
//!
//! Records are inspected through their `serde` representation, so any
//! serializable type can be searched by field name without a bespoke trait.

use serde::Serialize;
use serde_json::{Number, Value};

/// Keeps the records that contain `query`, preserving their order.
///
/// - An empty query returns `items` untouched.
/// - The query is not trimmed; whitespace must match too.
/// - With `keys`, only those fields are inspected, and only when they hold a
///   string or a number. Other field types never match. Integral floats are
///   compared without a trailing `.0`, so `50.0` matches `"50"` but not `".0"`.
/// - Without `keys`, the whole record is rendered as JSON and searched. Floats
///   keep their serde rendering there (`50.0`).
///
/// ```
/// use perfume_formulary::domain::search::search;
/// use serde::Serialize;
///
/// #[derive(Serialize, Debug, PartialEq)]
/// struct Item { name: &'static str }
///
/// let items = vec![Item { name: "Bergamot" }, Item { name: "Rose" }];
/// assert_eq!(search(items, "rose", &["name"]), vec![Item { name: "Rose" }]);
/// ```
pub fn search<T: Serialize>(items: Vec<T>, query: &str, keys: &[&str]) -> Vec<T> {
    if query.is_empty() {
        return items;
    }
    let needle = query.to_lowercase();

    items
        .into_iter()
        .filter(|item| matches(item, &needle, keys))
        .collect()
}

fn matches<T: Serialize>(item: &T, needle: &str, keys: &[&str]) -> bool {
    if keys.is_empty() {
        return serde_json::to_string(item)
            .map(|json| json.to_lowercase().contains(needle))
            .unwrap_or(false);
    }

    let Ok(Value::Object(fields)) = serde_json::to_value(item) else {
        return false;
    };

    keys.iter().any(|key| match fields.get(*key) {
        Some(Value::String(s)) => s.to_lowercase().contains(needle),
        Some(Value::Number(n)) => number_text(n).contains(needle),
        _ => false,
    })
}

/// Text form of a number as a browser would print it: `50`, `0.25`, `-3`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

/// Splits a comma-separated field list (`"name,casNumber"`) into keys.
pub fn parse_keys(raw: Option<&str>) -> Vec<&str> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
