//! In-memory content index for testing, demos and small sites.
//!
//! Implements both [`IndexWriter`] and [`ContentQueryProvider`]. Documents
//! live in a `BTreeMap` keyed by composite id behind `std::sync::RwLock`;
//! queries are a linear scan followed by a stable multi-key sort.
//!
//! # Matching rules
//!
//! - Invariant documents match every culture; variant documents match when
//!   their culture equals the requested one (case-insensitive).
//! - A selector matches when any document value equals any selector value.
//! - A positive filter's values combine according to [`MultiValueMode`].
//!   Negated operators match when none of their values match, in either
//!   mode.
//! - `StringAnalyzed`/`StringSortable` compare case-insensitively,
//!   `StringRaw` compares exactly, `Number`/`Date` compare by value.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::RwLock;
use uuid::Uuid;

use crate::composite_id::decompose;
use crate::fields::{parse_date, FieldType, FieldValue, IndexField, IndexFieldValue};
use crate::paging::PagedModel;
use crate::provider::{ContentQuery, ContentQueryProvider, QueryProviderError};
use crate::query::{Direction, FilterOperation, FilterOption, SelectorOption, SortOption};

use super::indexer::{IndexDocument, IndexWriter};

/// System field present on every document, used by the all-content selector.
pub const INDEX_TYPE_FIELD: &str = "__indexType";
const INDEX_TYPE_CONTENT: &str = "content";

/// How the values of a single filter option combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiValueMode {
    /// The option matches when any value matches (OR).
    #[default]
    Any,
    /// The option matches only when every value matches (AND).
    /// Negated operators still exclude any listed value.
    All,
}

/// A filter value converted to the field's type.
#[derive(Debug, Clone)]
enum Operand {
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

struct CompiledFilter {
    field_name: String,
    field_type: FieldType,
    operator: FilterOperation,
    operands: Vec<Operand>,
}

/// In-memory content index.
pub struct InMemoryContentIndex {
    schema: RwLock<Option<Vec<IndexField>>>,
    documents: RwLock<BTreeMap<String, IndexDocument>>,
    multi_value: MultiValueMode,
}

impl InMemoryContentIndex {
    pub fn new() -> Self {
        Self::with_mode(MultiValueMode::default())
    }

    pub fn with_mode(multi_value: MultiValueMode) -> Self {
        Self {
            schema: RwLock::new(None),
            documents: RwLock::new(BTreeMap::new()),
            multi_value,
        }
    }

    /// The current schema, or `None` before [`IndexWriter::create_schema`].
    pub fn schema(&self) -> Option<Vec<IndexField>> {
        self.schema.read().ok().and_then(|s| s.clone())
    }

    /// Number of stored documents.
    pub fn document_count(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    /// A stored document by composite id.
    pub fn document(&self, id: &str) -> Option<IndexDocument> {
        self.documents.read().ok().and_then(|d| d.get(id).cloned())
    }
}

impl Default for InMemoryContentIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error() -> anyhow::Error {
    anyhow!("content index lock poisoned")
}

fn find_field<'a>(schema: &'a [IndexField], name: &str) -> Option<&'a IndexField> {
    schema.iter().find(|f| f.field_name == name)
}

fn case_insensitive(field_type: FieldType) -> bool {
    matches!(field_type, FieldType::StringAnalyzed | FieldType::StringSortable)
}

fn normalize_text(field_type: FieldType, s: &str) -> String {
    if case_insensitive(field_type) {
        s.to_lowercase()
    } else {
        s.to_string()
    }
}

fn compile_filter(schema: &[IndexField], filter: &FilterOption) -> Result<CompiledFilter, QueryProviderError> {
    let invalid = |reason: String| QueryProviderError::InvalidFilter {
        field: filter.field_name.clone(),
        reason,
    };

    let field = find_field(schema, &filter.field_name).ok_or_else(|| invalid("field is not indexed".to_string()))?;

    if filter.operator.is_range() && !field.field_type.supports_range() {
        return Err(invalid(format!(
            "{:?} is not supported on {} fields",
            filter.operator, field.field_type
        )));
    }

    let operands = filter
        .values
        .iter()
        .map(|v| match field.field_type {
            FieldType::Number => v
                .trim()
                .parse::<f64>()
                .map(Operand::Number)
                .map_err(|_| invalid(format!("'{}' is not a number", v))),
            FieldType::Date => parse_date(v)
                .map(Operand::Date)
                .ok_or_else(|| invalid(format!("'{}' is not a date", v))),
            t => Ok(Operand::Text(normalize_text(t, v))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompiledFilter {
        field_name: filter.field_name.clone(),
        field_type: field.field_type,
        operator: filter.operator,
        operands,
    })
}

fn compare_value(field_type: FieldType, value: &FieldValue, operand: &Operand) -> Option<Ordering> {
    match operand {
        Operand::Number(n) => value.as_number().and_then(|v| v.partial_cmp(n)),
        Operand::Date(d) => value.as_date().map(|v| v.cmp(d)),
        Operand::Text(t) => Some(normalize_text(field_type, &value.as_text()).cmp(t)),
    }
}

fn contains_value(field_type: FieldType, value: &FieldValue, operand: &Operand) -> bool {
    let needle = match operand {
        Operand::Text(t) => t.clone(),
        Operand::Number(n) => n.to_string(),
        Operand::Date(d) => d.to_rfc3339(),
    };
    normalize_text(field_type, &value.as_text()).contains(&needle)
}

impl CompiledFilter {
    /// Positive predicate for one operand against a document.
    fn matches_operand(&self, doc: &IndexDocument, operand: &Operand) -> bool {
        let mut values = doc.values(&self.field_name);
        match self.operator {
            FilterOperation::Is | FilterOperation::IsNot => {
                values.any(|v| compare_value(self.field_type, v, operand) == Some(Ordering::Equal))
            }
            FilterOperation::Contains | FilterOperation::DoesNotContain => {
                values.any(|v| contains_value(self.field_type, v, operand))
            }
            FilterOperation::LessThan => {
                values.any(|v| compare_value(self.field_type, v, operand) == Some(Ordering::Less))
            }
            FilterOperation::LessThanOrEqual => values.any(|v| {
                matches!(
                    compare_value(self.field_type, v, operand),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }),
            FilterOperation::GreaterThan => {
                values.any(|v| compare_value(self.field_type, v, operand) == Some(Ordering::Greater))
            }
            FilterOperation::GreaterThanOrEqual => values.any(|v| {
                matches!(
                    compare_value(self.field_type, v, operand),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }),
        }
    }

    fn matches(&self, doc: &IndexDocument, mode: MultiValueMode) -> bool {
        let negated = self.operator.is_negated();
        // Negations exclude every listed value in either mode.
        let positive = match mode {
            MultiValueMode::All if !negated => self.operands.iter().all(|o| self.matches_operand(doc, o)),
            _ => self.operands.iter().any(|o| self.matches_operand(doc, o)),
        };
        positive != negated
    }
}

fn culture_matches(doc: &IndexDocument, requested: Option<&str>) -> bool {
    match (&doc.culture, requested) {
        (None, _) => true,
        (Some(c), Some(r)) => c.eq_ignore_ascii_case(r),
        (Some(_), None) => false,
    }
}

fn selector_matches(doc: &IndexDocument, selector: &SelectorOption) -> bool {
    doc.values(&selector.field_name)
        .any(|v| selector.values.iter().any(|s| *s == v.as_text()))
}

fn compare_for_sort(a: &IndexDocument, b: &IndexDocument, sort: &SortOption) -> Ordering {
    let av = a.values(&sort.field_name).next();
    let bv = b.values(&sort.field_name).next();

    // Documents without a value go last in either direction.
    let (av, bv) = match (av, bv) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let ordering = match sort.field_type {
        FieldType::Number => av
            .as_number()
            .partial_cmp(&bv.as_number())
            .unwrap_or(Ordering::Equal),
        FieldType::Date => av.as_date().cmp(&bv.as_date()),
        FieldType::StringSortable | FieldType::StringAnalyzed => {
            av.as_text().to_lowercase().cmp(&bv.as_text().to_lowercase())
        }
        FieldType::StringRaw => av.as_text().cmp(&bv.as_text()),
    };

    match sort.direction {
        Direction::Ascending => ordering,
        Direction::Descending => ordering.reverse(),
    }
}

#[async_trait]
impl ContentQueryProvider for InMemoryContentIndex {
    async fn execute_query(&self, query: &ContentQuery) -> Result<PagedModel<Uuid>, QueryProviderError> {
        let schema = self
            .schema
            .read()
            .map_err(|_| lock_error())?
            .clone()
            .ok_or(QueryProviderError::IndexNotFound)?;

        if query.selector.field_name != INDEX_TYPE_FIELD && find_field(&schema, &query.selector.field_name).is_none() {
            return Err(QueryProviderError::InvalidSelector {
                field: query.selector.field_name.clone(),
                reason: "field is not indexed".to_string(),
            });
        }

        let filters = query
            .filters
            .iter()
            .map(|f| compile_filter(&schema, f))
            .collect::<Result<Vec<_>, _>>()?;

        for sort in &query.sorts {
            if find_field(&schema, &sort.field_name).is_none() {
                return Err(QueryProviderError::InvalidSort {
                    field: sort.field_name.clone(),
                    reason: "field is not indexed".to_string(),
                });
            }
        }

        let documents = self.documents.read().map_err(|_| lock_error())?;
        let culture = query.culture.as_deref();

        let mut matched: Vec<&IndexDocument> = documents
            .values()
            .filter(|d| culture_matches(d, culture))
            .filter(|d| selector_matches(d, &query.selector))
            .filter(|d| filters.iter().all(|f| f.matches(d, self.multi_value)))
            .collect();

        matched.sort_by(|a, b| a.content_id.cmp(&b.content_id).then_with(|| a.culture.cmp(&b.culture)));
        if !query.sorts.is_empty() {
            matched.sort_by(|a, b| {
                query
                    .sorts
                    .iter()
                    .map(|s| compare_for_sort(a, b, s))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let mut seen = HashSet::new();
        let keys: Vec<Uuid> = matched
            .into_iter()
            .map(|d| d.content_key)
            .filter(|k| seen.insert(*k))
            .collect();

        Ok(PagedModel::from_ordered(keys, query.skip, query.take))
    }

    fn all_content_selector_option(&self) -> SelectorOption {
        SelectorOption {
            field_name: INDEX_TYPE_FIELD.to_string(),
            values: vec![INDEX_TYPE_CONTENT.to_string()],
        }
    }
}

#[async_trait]
impl IndexWriter for InMemoryContentIndex {
    async fn create_schema(&self, fields: &[IndexField]) -> anyhow::Result<()> {
        *self.schema.write().map_err(|_| lock_error())? = Some(fields.to_vec());
        self.documents.write().map_err(|_| lock_error())?.clear();
        Ok(())
    }

    async fn write_documents(&self, documents: Vec<IndexDocument>) -> anyhow::Result<()> {
        let mut stored = self.documents.write().map_err(|_| lock_error())?;
        for mut doc in documents {
            if doc.values(INDEX_TYPE_FIELD).next().is_none() {
                doc.fields
                    .push(IndexFieldValue::single(INDEX_TYPE_FIELD, INDEX_TYPE_CONTENT));
            }
            stored.insert(doc.id.clone(), doc);
        }
        Ok(())
    }

    async fn remove_content(&self, content_id: i32) -> anyhow::Result<()> {
        let mut stored = self.documents.write().map_err(|_| lock_error())?;
        stored.retain(|id, _| decompose(id).id != Some(content_id));
        Ok(())
    }
}
