//! Built-in `fetch` selectors.
//!
//! | Fragment | Field | Values |
//! |----------|-------|--------|
//! | `ancestors:{key}` | `itemId` | keys of the ancestors of `{key}` |
//! | `children:{key}` | `parentId` | `{key}` |
//! | `descendants:{key}` | `ancestorIds` | `{key}` |

use delivery_query_core::content::ContentItem;
use delivery_query_core::fields::{FieldType, FieldValue, IndexField, IndexFieldValue};
use delivery_query_core::index::ContentIndexHandler;
use delivery_query_core::query::handlers::{QueryHandler, SelectorHandler};
use delivery_query_core::query::SelectorOption;
use std::sync::Arc;
use uuid::Uuid;

use crate::content::ContentTree;
use crate::fragment::{normalize_key, strip_prefix_ignore_case};
use crate::index_handlers::{ANCESTOR_IDS, ITEM_ID, PARENT_ID};

const ANCESTORS: &str = "ancestors:";
const CHILDREN: &str = "children:";
const DESCENDANTS: &str = "descendants:";

/// `ancestors:{key}`: every ancestor of the given item.
///
/// Ancestors are looked up in the [`ContentTree`] at query time and
/// matched against the indexed content key.
pub struct AncestorsSelector {
    tree: Arc<ContentTree>,
}

impl AncestorsSelector {
    pub fn new(tree: Arc<ContentTree>) -> Self {
        Self { tree }
    }
}

impl QueryHandler for AncestorsSelector {
    fn can_handle(&self, query: &str) -> bool {
        strip_prefix_ignore_case(query, ANCESTORS).is_some()
    }
}

impl SelectorHandler for AncestorsSelector {
    fn build_selector_option(&self, selector: &str) -> SelectorOption {
        let raw = strip_prefix_ignore_case(selector, ANCESTORS).unwrap_or_default();
        let values = Uuid::parse_str(raw.trim())
            .map(|key| {
                self.tree
                    .ancestor_keys(&key)
                    .iter()
                    .map(|k| k.to_string())
                    .collect()
            })
            .unwrap_or_default();

        SelectorOption {
            field_name: ITEM_ID.to_string(),
            values,
        }
    }
}

/// `children:{key}`: direct children of the given item.
pub struct ChildrenSelector;

impl QueryHandler for ChildrenSelector {
    fn can_handle(&self, query: &str) -> bool {
        strip_prefix_ignore_case(query, CHILDREN).is_some()
    }
}

impl SelectorHandler for ChildrenSelector {
    fn build_selector_option(&self, selector: &str) -> SelectorOption {
        let raw = strip_prefix_ignore_case(selector, CHILDREN).unwrap_or_default();
        SelectorOption {
            field_name: PARENT_ID.to_string(),
            values: vec![normalize_key(raw)],
        }
    }
}

impl ContentIndexHandler for ChildrenSelector {
    fn name(&self) -> &str {
        PARENT_ID
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(PARENT_ID, FieldType::StringRaw, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        content
            .parent_key
            .map(|parent| vec![IndexFieldValue::single(PARENT_ID, parent.to_string())])
            .unwrap_or_default()
    }
}

/// `descendants:{key}`: every item below the given one.
pub struct DescendantsSelector;

impl QueryHandler for DescendantsSelector {
    fn can_handle(&self, query: &str) -> bool {
        strip_prefix_ignore_case(query, DESCENDANTS).is_some()
    }
}

impl SelectorHandler for DescendantsSelector {
    fn build_selector_option(&self, selector: &str) -> SelectorOption {
        let raw = strip_prefix_ignore_case(selector, DESCENDANTS).unwrap_or_default();
        SelectorOption {
            field_name: ANCESTOR_IDS.to_string(),
            values: vec![normalize_key(raw)],
        }
    }
}

impl ContentIndexHandler for DescendantsSelector {
    fn name(&self) -> &str {
        ANCESTOR_IDS
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(ANCESTOR_IDS, FieldType::StringRaw, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        if content.ancestor_keys.is_empty() {
            return Vec::new();
        }
        let keys = content
            .ancestor_keys
            .iter()
            .map(|k| FieldValue::from(k.to_string()))
            .collect();
        vec![IndexFieldValue::new(ANCESTOR_IDS, keys)]
    }
}
