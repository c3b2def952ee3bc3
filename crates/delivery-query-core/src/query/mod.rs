//! Structured query options and the handlers that build them.
//!
//! Query-string fragments (`fetch=children:…`, `filter=contentType:…`,
//! `sort=name:asc`) are parsed by pluggable handlers into the option types
//! defined here. See [`handlers`] for the handler protocols and registries.

pub mod handlers;

use serde::{Deserialize, Serialize};

use crate::fields::FieldType;

/// Selects the candidate subset of content (e.g. "children of X").
///
/// Exactly one selector is active per query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorOption {
    pub field_name: String,
    pub values: Vec<String>,
}

/// Comparison applied by a [`FilterOption`].
///
/// The range operators only apply to `Number` and `Date` fields; the
/// query provider rejects them for other field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperation {
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl FilterOperation {
    /// True for `LessThan`..`GreaterThanOrEqual`.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            FilterOperation::LessThan
                | FilterOperation::LessThanOrEqual
                | FilterOperation::GreaterThan
                | FilterOperation::GreaterThanOrEqual
        )
    }

    /// True for the negated operators `IsNot` and `DoesNotContain`.
    pub fn is_negated(&self) -> bool {
        matches!(self, FilterOperation::IsNot | FilterOperation::DoesNotContain)
    }
}

/// One filter clause. Filter options combine with logical AND.
///
/// Values keep caller order and are never deduplicated; how several values
/// within one option combine is up to the query provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub field_name: String,
    pub values: Vec<String>,
    pub operator: FilterOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One sort clause. Several sort options form a multi-key ordering
/// applied in the order supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    pub field_name: String,
    pub direction: Direction,
    pub field_type: FieldType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_classes() {
        assert!(FilterOperation::LessThan.is_range());
        assert!(FilterOperation::GreaterThanOrEqual.is_range());
        assert!(!FilterOperation::Is.is_range());
        assert!(FilterOperation::IsNot.is_negated());
        assert!(FilterOperation::DoesNotContain.is_negated());
        assert!(!FilterOperation::Contains.is_negated());
    }
}
