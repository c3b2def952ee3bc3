//! Composite identifiers for per-culture index documents.
//!
//! Every content item is indexed once per culture. The index document key
//! combines the integer content id and the culture code, joined by a
//! vertical-tab control character that never occurs in culture codes:
//!
//! ```text
//! index_id(42, "en-us") == "42\u{000B}en-us"
//! ```
//!
//! [`decompose`] is applied to keys handed back by the index engine, which
//! are not trusted to match the expected shape. It never panics; malformed
//! keys decode to an empty [`CompositeIdModel`].

use serde::Serialize;

/// Separator between the content id and the culture.
pub const SEPARATOR: char = '\u{000B}';

/// The decomposed parts of a composite index id.
///
/// Either both fields are set or neither is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompositeIdModel {
    pub id: Option<i32>,
    pub culture: Option<String>,
}

impl CompositeIdModel {
    /// True when the key could not be decoded.
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.culture.is_none()
    }
}

/// Encode a content id and culture into an index document id.
pub fn index_id(id: i32, culture: &str) -> String {
    format!("{id}{SEPARATOR}{culture}")
}

/// Decode an index document id produced by [`index_id`].
pub fn decompose(index_id: &str) -> CompositeIdModel {
    let parts: Vec<&str> = index_id.split(SEPARATOR).collect();
    if parts.len() != 2 {
        return CompositeIdModel::default();
    }

    match parts[0].parse::<i32>() {
        Ok(id) => CompositeIdModel {
            id: Some(id),
            culture: Some(parts[1].to_string()),
        },
        Err(_) => CompositeIdModel::default(),
    }
}
