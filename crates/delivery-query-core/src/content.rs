//! Read-only content item model handed to index handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A published content item as seen by the indexing pipeline.
///
/// Names are keyed by culture. Invariant content stores its single name
/// under the empty culture `""`; culture-variant content stores one name
/// per culture code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i32,
    pub key: Uuid,
    pub content_type: String,
    #[serde(default)]
    pub parent_key: Option<Uuid>,
    /// Ancestor ids from the root down, ending with this item's own id.
    #[serde(default)]
    pub path: Vec<i32>,
    /// Ancestor keys from the root down (excluding this item).
    #[serde(default)]
    pub ancestor_keys: Vec<Uuid>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub sort_order: i32,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl ContentItem {
    /// True when the item carries at least one culture-specific name.
    pub fn varies_by_culture(&self) -> bool {
        self.names.keys().any(|c| !c.is_empty())
    }

    /// The variant cultures of this item. Empty for invariant content.
    pub fn cultures(&self) -> Vec<&str> {
        self.names
            .keys()
            .filter(|c| !c.is_empty())
            .map(|c| c.as_str())
            .collect()
    }

    /// Name for a culture, falling back to the invariant name.
    pub fn name(&self, culture: Option<&str>) -> Option<&str> {
        culture
            .and_then(|c| self.names.get(c))
            .or_else(|| self.names.get(""))
            .map(|s| s.as_str())
    }

    /// Comma-separated id path (`"1050,1063,1071"`).
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
