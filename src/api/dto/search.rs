//! Search query parameters shared by the list endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::search::{parse_keys, search};

/// `?q=<text>&fields=name,casNumber`.
///
/// - Without `fields`, only `name` is searched.
/// - With an empty `fields=`, the whole record is searched.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub fields: Option<String>,
}

impl SearchParams {
    /// Filters serialized list items, keeping their order.
    ///
    /// The query is used verbatim. Surrounding whitespace is part of the
    /// search text, and only an empty `q` returns every item.
    pub fn apply<T: Serialize>(&self, items: Vec<T>) -> Vec<T> {
        let query = self.q.as_deref().unwrap_or_default();
        let keys = match self.fields.as_deref() {
            None => vec!["name"],
            Some(raw) => parse_keys(Some(raw)),
        };

        search(items, query, &keys)
    }
}
