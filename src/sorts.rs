//! Built-in `sort` handlers: `{field}:{asc|desc}`.
//!
//! The direction is case-insensitive; anything other than `desc` sorts
//! ascending.

use delivery_query_core::content::ContentItem;
use delivery_query_core::fields::{FieldType, IndexField, IndexFieldValue};
use delivery_query_core::index::ContentIndexHandler;
use delivery_query_core::query::handlers::{QueryHandler, SortHandler};
use delivery_query_core::query::{Direction, SortOption};

use crate::fragment::strip_prefix_ignore_case;
use crate::index_handlers::{CREATE_DATE, LEVEL, PATH, SORT_NAME, SORT_ORDER, UPDATE_DATE};

fn claims(query: &str, prefix: &str) -> bool {
    strip_prefix_ignore_case(query, prefix)
        .and_then(|rest| rest.strip_prefix(':'))
        .is_some()
}

fn sort_option(sort: &str, prefix: &str, field: &str, field_type: FieldType) -> SortOption {
    let direction = strip_prefix_ignore_case(sort, prefix)
        .and_then(|rest| rest.strip_prefix(':'))
        .filter(|d| d.trim().eq_ignore_ascii_case("desc"))
        .map(|_| Direction::Descending)
        .unwrap_or(Direction::Ascending);

    SortOption {
        field_name: field.to_string(),
        direction,
        field_type,
    }
}

/// `name:{dir}`, sorting on the culture-specific sortable name.
pub struct NameSort;

impl QueryHandler for NameSort {
    fn can_handle(&self, query: &str) -> bool {
        claims(query, "name")
    }
}

impl SortHandler for NameSort {
    fn build_sort_option(&self, sort: &str) -> SortOption {
        sort_option(sort, "name", SORT_NAME, FieldType::StringSortable)
    }
}

impl ContentIndexHandler for NameSort {
    fn name(&self) -> &str {
        SORT_NAME
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(SORT_NAME, FieldType::StringSortable, true)]
    }

    fn field_values(&self, content: &ContentItem, culture: Option<&str>) -> Vec<IndexFieldValue> {
        content
            .name(culture)
            .map(|n| vec![IndexFieldValue::single(SORT_NAME, n.to_lowercase())])
            .unwrap_or_default()
    }
}

/// `createDate:{dir}`. The field is indexed by the create date filter.
pub struct CreateDateSort;

impl QueryHandler for CreateDateSort {
    fn can_handle(&self, query: &str) -> bool {
        claims(query, CREATE_DATE)
    }
}

impl SortHandler for CreateDateSort {
    fn build_sort_option(&self, sort: &str) -> SortOption {
        sort_option(sort, CREATE_DATE, CREATE_DATE, FieldType::Date)
    }
}

/// `updateDate:{dir}`. The field is indexed by the update date filter.
pub struct UpdateDateSort;

impl QueryHandler for UpdateDateSort {
    fn can_handle(&self, query: &str) -> bool {
        claims(query, UPDATE_DATE)
    }
}

impl SortHandler for UpdateDateSort {
    fn build_sort_option(&self, sort: &str) -> SortOption {
        sort_option(sort, UPDATE_DATE, UPDATE_DATE, FieldType::Date)
    }
}

/// `level:{dir}`: depth in the content tree, roots at 1.
pub struct LevelSort;

impl QueryHandler for LevelSort {
    fn can_handle(&self, query: &str) -> bool {
        claims(query, LEVEL)
    }
}

impl SortHandler for LevelSort {
    fn build_sort_option(&self, sort: &str) -> SortOption {
        sort_option(sort, LEVEL, LEVEL, FieldType::Number)
    }
}

impl ContentIndexHandler for LevelSort {
    fn name(&self) -> &str {
        LEVEL
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(LEVEL, FieldType::Number, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        vec![IndexFieldValue::single(LEVEL, i64::from(content.level))]
    }
}

/// `sortOrder:{dir}`: position among siblings.
pub struct SortOrderSort;

impl QueryHandler for SortOrderSort {
    fn can_handle(&self, query: &str) -> bool {
        claims(query, SORT_ORDER)
    }
}

impl SortHandler for SortOrderSort {
    fn build_sort_option(&self, sort: &str) -> SortOption {
        sort_option(sort, SORT_ORDER, SORT_ORDER, FieldType::Number)
    }
}

impl ContentIndexHandler for SortOrderSort {
    fn name(&self) -> &str {
        SORT_ORDER
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(SORT_ORDER, FieldType::Number, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        vec![IndexFieldValue::single(SORT_ORDER, i64::from(content.sort_order))]
    }
}

/// `path:{dir}`: tree order by id path.
pub struct PathSort;

impl QueryHandler for PathSort {
    fn can_handle(&self, query: &str) -> bool {
        claims(query, PATH)
    }
}

impl SortHandler for PathSort {
    fn build_sort_option(&self, sort: &str) -> SortOption {
        sort_option(sort, PATH, PATH, FieldType::StringSortable)
    }
}

impl ContentIndexHandler for PathSort {
    fn name(&self) -> &str {
        PATH
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(PATH, FieldType::StringSortable, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        vec![IndexFieldValue::single(PATH, content.path_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_handlers::tests::item;

    #[test]
    fn test_direction_parsing() {
        assert_eq!(NameSort.build_sort_option("name:desc").direction, Direction::Descending);
        assert_eq!(NameSort.build_sort_option("name:DESC").direction, Direction::Descending);
        assert_eq!(NameSort.build_sort_option("name:asc").direction, Direction::Ascending);
        assert_eq!(NameSort.build_sort_option("name:sideways").direction, Direction::Ascending);
        assert_eq!(NameSort.build_sort_option("name:").direction, Direction::Ascending);
    }

    #[test]
    fn test_claims_require_colon() {
        assert!(NameSort.can_handle("Name:asc"));
        assert!(!NameSort.can_handle("name"));
        assert!(!NameSort.can_handle("names:asc"));
        assert!(LevelSort.can_handle("level:desc"));
        assert!(!SortOrderSort.can_handle("sort:asc"));
    }

    #[test]
    fn test_field_types() {
        let option = NameSort.build_sort_option("name:asc");
        assert_eq!(option.field_name, SORT_NAME);
        assert_eq!(option.field_type, FieldType::StringSortable);

        assert_eq!(CreateDateSort.build_sort_option("createDate:asc").field_type, FieldType::Date);
        assert_eq!(UpdateDateSort.build_sort_option("updateDate:asc").field_name, UPDATE_DATE);
        assert_eq!(LevelSort.build_sort_option("level:asc").field_type, FieldType::Number);
        assert_eq!(SortOrderSort.build_sort_option("sortOrder:asc").field_type, FieldType::Number);
        assert_eq!(PathSort.build_sort_option("path:asc").field_name, PATH);
    }

    #[test]
    fn test_index_values() {
        let content = item();
        assert_eq!(
            NameSort.field_values(&content, Some("en-us"))[0].values[0].as_text(),
            "news"
        );
        assert_eq!(LevelSort.field_values(&content, None)[0].values[0].as_number(), Some(3.0));
        assert_eq!(SortOrderSort.field_values(&content, None)[0].values[0].as_number(), Some(4.0));
        assert_eq!(PathSort.field_values(&content, None)[0].values[0].as_text(), "1050,1063,1071");
    }
}
