//! External collaborators consumed by the query service.
//!
//! The [`ContentQueryProvider`] is the index engine integration that
//! actually executes a structured query; the [`RequestCultureAccessor`]
//! supplies the culture the current request targets. Both are implemented
//! outside the query pipeline (see [`crate::index::memory`] for a reference
//! provider).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::paging::PagedModel;
use crate::query::{FilterOption, SelectorOption, SortOption};

/// Bundles all inputs for a single provider query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentQuery {
    pub selector: SelectorOption,
    pub filters: Vec<FilterOption>,
    pub sorts: Vec<SortOption>,
    /// Culture to scope the query to; `None` targets invariant content only.
    pub culture: Option<String>,
    pub skip: usize,
    pub take: usize,
}

/// Failure reported by a [`ContentQueryProvider`].
///
/// All variants but [`Backend`](QueryProviderError::Backend) are expected,
/// validatable rejections of the query itself.
#[derive(Debug, Error)]
pub enum QueryProviderError {
    #[error("content index has not been built")]
    IndexNotFound,
    #[error("invalid selector on '{field}': {reason}")]
    InvalidSelector { field: String, reason: String },
    #[error("invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },
    #[error("invalid sort on '{field}': {reason}")]
    InvalidSort { field: String, reason: String },
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Index engine integration that executes structured content queries.
#[async_trait]
pub trait ContentQueryProvider: Send + Sync {
    /// Execute the query, returning one page of content keys.
    ///
    /// `skip` and `take` arrive exactly as the caller supplied them. When
    /// `query.sorts` is empty the provider applies its own default order.
    async fn execute_query(&self, query: &ContentQuery) -> Result<PagedModel<Uuid>, QueryProviderError>;

    /// The selector used when a query names none (or an unknown one).
    fn all_content_selector_option(&self) -> SelectorOption;
}

/// Supplies the culture requested by the current caller.
pub trait RequestCultureAccessor: Send + Sync {
    fn requested_culture(&self) -> Option<String>;
}

/// A [`RequestCultureAccessor`] that always returns the same culture.
#[derive(Debug, Clone, Default)]
pub struct FixedCulture(pub Option<String>);

impl FixedCulture {
    pub fn new(culture: Option<&str>) -> Self {
        Self(culture.map(|c| c.to_string()))
    }
}

impl RequestCultureAccessor for FixedCulture {
    fn requested_culture(&self) -> Option<String> {
        self.0.clone()
    }
}
