//! Built-in `filter` handlers.
//!
//! - `contentType:{alias}[,{alias}…]` / `contentType:!{alias}`
//! - `name:{text}` / `name:!{text}` (substring, case-insensitive)
//! - `createDate{op}{date}` / `updateDate{op}{date}` with `op` one of
//!   `:`, `<`, `<=`, `>`, `>=`

use chrono::{DateTime, Utc};
use delivery_query_core::content::ContentItem;
use delivery_query_core::fields::{parse_date, FieldType, IndexField, IndexFieldValue};
use delivery_query_core::index::ContentIndexHandler;
use delivery_query_core::query::handlers::{FilterHandler, QueryHandler};
use delivery_query_core::query::{FilterOperation, FilterOption};

use crate::fragment::{format_date, strip_prefix_ignore_case};
use crate::index_handlers::{CONTENT_TYPE, CREATE_DATE, NAME, UPDATE_DATE};

/// Split a leading `!` off a filter value.
fn negation(value: &str) -> (bool, &str) {
    match value.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, value),
    }
}

/// `contentType:{alias}[,{alias}…]`, negated with a leading `!`.
///
/// Fragments without any alias are not claimed.
pub struct ContentTypeFilter;

const CONTENT_TYPE_PREFIX: &str = "contentType:";

/// Negation flag and non-empty aliases of a `contentType` fragment.
fn content_type_aliases(fragment: &str) -> (bool, Vec<String>) {
    let raw = strip_prefix_ignore_case(fragment, CONTENT_TYPE_PREFIX).unwrap_or_default();
    let (negated, aliases) = negation(raw.trim());
    let aliases = aliases
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    (negated, aliases)
}

impl QueryHandler for ContentTypeFilter {
    fn can_handle(&self, query: &str) -> bool {
        !content_type_aliases(query).1.is_empty()
    }
}

impl FilterHandler for ContentTypeFilter {
    fn build_filter_option(&self, filter: &str) -> FilterOption {
        let (negated, values) = content_type_aliases(filter);

        FilterOption {
            field_name: CONTENT_TYPE.to_string(),
            values,
            operator: if negated {
                FilterOperation::IsNot
            } else {
                FilterOperation::Is
            },
        }
    }
}

impl ContentIndexHandler for ContentTypeFilter {
    fn name(&self) -> &str {
        CONTENT_TYPE
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(CONTENT_TYPE, FieldType::StringRaw, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        vec![IndexFieldValue::single(CONTENT_TYPE, content.content_type.as_str())]
    }
}

/// `name:{text}`: names containing `text`; `name:!{text}` excludes them.
pub struct NameFilter;

const NAME_PREFIX: &str = "name:";

impl QueryHandler for NameFilter {
    fn can_handle(&self, query: &str) -> bool {
        strip_prefix_ignore_case(query, NAME_PREFIX).is_some()
    }
}

impl FilterHandler for NameFilter {
    fn build_filter_option(&self, filter: &str) -> FilterOption {
        let raw = strip_prefix_ignore_case(filter, NAME_PREFIX).unwrap_or_default();
        let (negated, text) = negation(raw);

        FilterOption {
            field_name: NAME.to_string(),
            values: vec![text.to_string()],
            operator: if negated {
                FilterOperation::DoesNotContain
            } else {
                FilterOperation::Contains
            },
        }
    }
}

impl ContentIndexHandler for NameFilter {
    fn name(&self) -> &str {
        NAME
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(NAME, FieldType::StringAnalyzed, true)]
    }

    fn field_values(&self, content: &ContentItem, culture: Option<&str>) -> Vec<IndexFieldValue> {
        content
            .name(culture)
            .map(|n| vec![IndexFieldValue::single(NAME, n)])
            .unwrap_or_default()
    }
}

/// Date comparison operators, longest first so `<=` wins over `<`.
const DATE_OPERATORS: [(&str, FilterOperation); 5] = [
    ("<=", FilterOperation::LessThanOrEqual),
    (">=", FilterOperation::GreaterThanOrEqual),
    ("<", FilterOperation::LessThan),
    (">", FilterOperation::GreaterThan),
    (":", FilterOperation::Is),
];

/// Parse `{prefix}{op}{date}`. `None` when the operator or date is invalid.
fn parse_date_filter(fragment: &str, prefix: &str, field: &str) -> Option<FilterOption> {
    let rest = strip_prefix_ignore_case(fragment, prefix)?;
    let (operator, value) = DATE_OPERATORS
        .iter()
        .find_map(|(op, operation)| rest.strip_prefix(op).map(|v| (*operation, v)))?;
    let date = parse_date(value)?;

    Some(FilterOption {
        field_name: field.to_string(),
        values: vec![format_date(&date)],
        operator,
    })
}

fn date_field(field: &str, date: DateTime<Utc>) -> Vec<IndexFieldValue> {
    vec![IndexFieldValue::single(field, date)]
}

/// `createDate{op}{date}`.
pub struct CreateDateFilter;

impl QueryHandler for CreateDateFilter {
    fn can_handle(&self, query: &str) -> bool {
        parse_date_filter(query, CREATE_DATE, CREATE_DATE).is_some()
    }
}

impl FilterHandler for CreateDateFilter {
    fn build_filter_option(&self, filter: &str) -> FilterOption {
        parse_date_filter(filter, CREATE_DATE, CREATE_DATE).unwrap_or_else(|| FilterOption {
            field_name: CREATE_DATE.to_string(),
            values: Vec::new(),
            operator: FilterOperation::Is,
        })
    }
}

impl ContentIndexHandler for CreateDateFilter {
    fn name(&self) -> &str {
        CREATE_DATE
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(CREATE_DATE, FieldType::Date, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        date_field(CREATE_DATE, content.create_date)
    }
}

/// `updateDate{op}{date}`.
pub struct UpdateDateFilter;

impl QueryHandler for UpdateDateFilter {
    fn can_handle(&self, query: &str) -> bool {
        parse_date_filter(query, UPDATE_DATE, UPDATE_DATE).is_some()
    }
}

impl FilterHandler for UpdateDateFilter {
    fn build_filter_option(&self, filter: &str) -> FilterOption {
        parse_date_filter(filter, UPDATE_DATE, UPDATE_DATE).unwrap_or_else(|| FilterOption {
            field_name: UPDATE_DATE.to_string(),
            values: Vec::new(),
            operator: FilterOperation::Is,
        })
    }
}

impl ContentIndexHandler for UpdateDateFilter {
    fn name(&self) -> &str {
        UPDATE_DATE
    }

    fn fields(&self) -> Vec<IndexField> {
        vec![IndexField::new(UPDATE_DATE, FieldType::Date, false)]
    }

    fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
        date_field(UPDATE_DATE, content.update_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_handlers::tests::item;
    use crate::delivery::builtin_filters;

    #[test]
    fn test_content_type_list() {
        let option = ContentTypeFilter.build_filter_option("contentType:article, blog,,");
        assert_eq!(option.field_name, CONTENT_TYPE);
        assert_eq!(option.operator, FilterOperation::Is);
        assert_eq!(option.values, vec!["article", "blog"]);
    }

    #[test]
    fn test_content_type_negated() {
        assert!(ContentTypeFilter.can_handle("contenttype:!home"));
        let option = ContentTypeFilter.build_filter_option("contentType:!home");
        assert_eq!(option.operator, FilterOperation::IsNot);
        assert_eq!(option.values, vec!["home"]);
    }

    #[test]
    fn test_content_type_without_aliases_not_claimed() {
        assert!(!ContentTypeFilter.can_handle("contentType:"));
        assert!(!ContentTypeFilter.can_handle("contentType:!"));
        assert!(!ContentTypeFilter.can_handle("contentType: , ,"));
        assert!(!ContentTypeFilter.can_handle("type:article"));
        assert!(builtin_filters().build_options(&["contentType:!"]).is_empty());
    }

    #[test]
    fn test_name_filter() {
        let option = NameFilter.build_filter_option("name:Hello World");
        assert_eq!(option.operator, FilterOperation::Contains);
        assert_eq!(option.values, vec!["Hello World"]);

        let option = NameFilter.build_filter_option("name:!draft");
        assert_eq!(option.operator, FilterOperation::DoesNotContain);
        assert_eq!(option.values, vec!["draft"]);

        assert!(!NameFilter.can_handle("names:x"));
    }

    #[test]
    fn test_date_operators() {
        let cases = [
            ("createDate:2024-01-01", FilterOperation::Is),
            ("createDate<2024-01-01", FilterOperation::LessThan),
            ("createDate<=2024-01-01", FilterOperation::LessThanOrEqual),
            ("createDate>2024-01-01", FilterOperation::GreaterThan),
            ("createDate>=2024-01-01", FilterOperation::GreaterThanOrEqual),
        ];
        for (fragment, operator) in cases {
            assert!(CreateDateFilter.can_handle(fragment), "{}", fragment);
            let option = CreateDateFilter.build_filter_option(fragment);
            assert_eq!(option.operator, operator, "{}", fragment);
            assert_eq!(option.values, vec!["2024-01-01T00:00:00Z"]);
        }
    }

    #[test]
    fn test_date_normalized_to_utc() {
        let option = UpdateDateFilter.build_filter_option("updateDate>2024-06-01T14:00:00+02:00");
        assert_eq!(option.field_name, UPDATE_DATE);
        assert_eq!(option.values, vec!["2024-06-01T12:00:00Z"]);
    }

    #[test]
    fn test_unparsable_date_not_claimed() {
        assert!(!CreateDateFilter.can_handle("createDate>yesterday"));
        assert!(!CreateDateFilter.can_handle("createDate=2024-01-01"));
        assert!(!UpdateDateFilter.can_handle("createDate:2024-01-01"));
    }

    #[test]
    fn test_name_index_varies_by_culture() {
        let content = item();
        let english = NameFilter.field_values(&content, Some("en-us"));
        assert_eq!(english[0].values[0].as_text(), "News");
        let danish = NameFilter.field_values(&content, Some("da-dk"));
        assert_eq!(danish[0].values[0].as_text(), "Nyheder");
        assert!(NameFilter.fields()[0].varies_by_culture);
    }
}
