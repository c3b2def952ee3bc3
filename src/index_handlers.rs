//! Index field names and the content key index handler.
//!
//! Most built-in fields are contributed by the query handler that reads
//! them (see [`crate::selectors`], [`crate::filters`], [`crate::sorts`]);
//! the content key has no query handler of its own.

use delivery_query_core::content::ContentItem;
use delivery_query_core::fields::{FieldType, IndexField, IndexFieldValue};
use delivery_query_core::index::ContentIndexHandler;

pub const ITEM_ID: &str = "itemId";
pub const PARENT_ID: &str = "parentId";
pub const ANCESTOR_IDS: &str = "ancestorIds";
pub const CONTENT_TYPE: &str = "contentType";
pub const NAME: &str = "name";
pub const SORT_NAME: &str = "sortName";
pub const CREATE_DATE: &str = "createDate";
pub const UPDATE_DATE: &str = "updateDate";
pub const LEVEL: &str = "level";
pub const SORT_ORDER: &str = "sortOrder";
pub const PATH: &str = "path";

/// Indexes the content key, used by the `ancestors:` selector.
pub struct ItemIdIndexHandler;

impl ContentIndexHandler for ItemIdIndexHandler {
    fn name(&self) -> &str {
        ITEM_ID
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(ITEM_ID, FieldType::StringRaw, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        vec![IndexFieldValue::single(ITEM_ID, content.key.to_string())]
    }
}
