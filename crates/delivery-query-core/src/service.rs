//! Content query orchestration.
//!
//! [`ContentQueryService`] turns raw `fetch`/`filter`/`sort` fragments plus
//! pagination into a [`ContentQuery`] and delegates it to the configured
//! [`ContentQueryProvider`]:
//!
//! 1. Resolve the selector from `fetch`; when absent or unclaimed, use the
//!    provider's all-content selector.
//! 2. Resolve filters in caller order, dropping unclaimed fragments.
//! 3. Resolve sorts in caller order, dropping unclaimed fragments.
//! 4. Read the request culture.
//! 5. Delegate to the provider with `skip`/`take` unchanged.
//! 6. Translate provider rejections into a typed failure status.
//!
//! Backend (infrastructure) errors from the provider propagate unmodified.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::paging::PagedModel;
use crate::provider::{
    ContentQuery, ContentQueryProvider, FixedCulture, QueryProviderError, RequestCultureAccessor,
};
use crate::query::handlers::{FilterRegistry, SelectorRegistry, SortRegistry};
use crate::query::SelectorOption;

/// Why a content query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiContentQueryOperationStatus {
    IndexNotFound,
    InvalidSelectorOption,
    InvalidFilterOption,
    InvalidSortOption,
}

impl ApiContentQueryOperationStatus {
    /// Machine-readable code, as used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ApiContentQueryOperationStatus::IndexNotFound => "index_not_found",
            ApiContentQueryOperationStatus::InvalidSelectorOption => "invalid_selector_option",
            ApiContentQueryOperationStatus::InvalidFilterOption => "invalid_filter_option",
            ApiContentQueryOperationStatus::InvalidSortOption => "invalid_sort_option",
        }
    }
}

impl fmt::Display for ApiContentQueryOperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned by [`ContentQueryService::execute_query`].
#[derive(Debug, Error)]
pub enum ContentQueryError {
    /// The query was rejected; the caller can act on `status`.
    #[error("content query failed ({status}): {reason}")]
    Failed {
        status: ApiContentQueryOperationStatus,
        reason: String,
    },
    /// The provider failed for reasons unrelated to the query itself.
    #[error(transparent)]
    Backend(anyhow::Error),
}

impl ContentQueryError {
    /// The failure status, or `None` for backend errors.
    pub fn status(&self) -> Option<ApiContentQueryOperationStatus> {
        match self {
            ContentQueryError::Failed { status, .. } => Some(*status),
            ContentQueryError::Backend(_) => None,
        }
    }
}

impl From<QueryProviderError> for ContentQueryError {
    fn from(err: QueryProviderError) -> Self {
        let reason = err.to_string();
        let status = match err {
            QueryProviderError::Backend(e) => return ContentQueryError::Backend(e),
            QueryProviderError::IndexNotFound => ApiContentQueryOperationStatus::IndexNotFound,
            QueryProviderError::InvalidSelector { .. } => {
                ApiContentQueryOperationStatus::InvalidSelectorOption
            }
            QueryProviderError::InvalidFilter { .. } => {
                ApiContentQueryOperationStatus::InvalidFilterOption
            }
            QueryProviderError::InvalidSort { .. } => ApiContentQueryOperationStatus::InvalidSortOption,
        };
        ContentQueryError::Failed { status, reason }
    }
}

/// Executes delivery content queries.
///
/// Cheap to clone: registries, provider and culture accessor are shared.
#[derive(Clone)]
pub struct ContentQueryService {
    selectors: Arc<SelectorRegistry>,
    filters: Arc<FilterRegistry>,
    sorts: Arc<SortRegistry>,
    provider: Arc<dyn ContentQueryProvider>,
    culture: Arc<dyn RequestCultureAccessor>,
}

impl ContentQueryService {
    pub fn new(
        selectors: Arc<SelectorRegistry>,
        filters: Arc<FilterRegistry>,
        sorts: Arc<SortRegistry>,
        provider: Arc<dyn ContentQueryProvider>,
        culture: Arc<dyn RequestCultureAccessor>,
    ) -> Self {
        Self {
            selectors,
            filters,
            sorts,
            provider,
            culture,
        }
    }

    /// A copy of this service reading the culture from `culture`.
    pub fn with_culture_accessor(mut self, culture: Arc<dyn RequestCultureAccessor>) -> Self {
        self.culture = culture;
        self
    }

    /// Shorthand for [`with_culture_accessor`](Self::with_culture_accessor)
    /// with a [`FixedCulture`].
    pub fn with_culture(self, culture: Option<&str>) -> Self {
        self.with_culture_accessor(Arc::new(FixedCulture::new(culture)))
    }

    /// Resolve the selector for `fetch`, falling back to all content.
    pub fn selector_option(&self, fetch: Option<&str>) -> SelectorOption {
        fetch
            .and_then(|f| self.selectors.build_option(f))
            .unwrap_or_else(|| self.provider.all_content_selector_option())
    }

    /// Build the structured query without executing it.
    pub fn build_query<S: AsRef<str>>(
        &self,
        fetch: Option<&str>,
        filters: &[S],
        sorts: &[S],
        skip: usize,
        take: usize,
    ) -> ContentQuery {
        ContentQuery {
            selector: self.selector_option(fetch),
            filters: self.filters.build_options(filters),
            sorts: self.sorts.build_options(sorts),
            culture: self.culture.requested_culture(),
            skip,
            take,
        }
    }

    /// Execute a content query and return one page of content keys.
    pub async fn execute_query<S: AsRef<str>>(
        &self,
        fetch: Option<&str>,
        filters: &[S],
        sorts: &[S],
        skip: usize,
        take: usize,
    ) -> Result<PagedModel<Uuid>, ContentQueryError> {
        let query = self.build_query(fetch, filters, sorts, skip, take);
        tracing::debug!(
            "Executing content query: selector={} filters={} sorts={} culture={:?} skip={} take={}",
            query.selector.field_name,
            query.filters.len(),
            query.sorts.len(),
            query.culture,
            skip,
            take
        );

        self.provider.execute_query(&query).await.map_err(|e| {
            let err = ContentQueryError::from(e);
            if let ContentQueryError::Failed { status, reason } = &err {
                tracing::debug!("Content query rejected ({}): {}", status, reason);
            }
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;
    use crate::query::handlers::tests::{PrefixFilter, PrefixSelector, PrefixSort};
    use crate::query::{Direction, FilterOperation, FilterOption, SortOption};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider recording every query and answering with a canned result.
    struct RecordingProvider {
        calls: Mutex<Vec<ContentQuery>>,
        reject: Option<fn() -> QueryProviderError>,
    }

    impl RecordingProvider {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reject: None,
            }
        }

        fn rejecting(reject: fn() -> QueryProviderError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reject: Some(reject),
            }
        }

        fn last_call(&self) -> ContentQuery {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ContentQueryProvider for RecordingProvider {
        async fn execute_query(&self, query: &ContentQuery) -> Result<PagedModel<Uuid>, QueryProviderError> {
            self.calls.lock().unwrap().push(query.clone());
            match self.reject {
                Some(reject) => Err(reject()),
                None => Ok(PagedModel::new(1, vec![Uuid::nil()])),
            }
        }

        fn all_content_selector_option(&self) -> SelectorOption {
            SelectorOption {
                field_name: "__all".to_string(),
                values: vec!["content".to_string()],
            }
        }
    }

    fn service(provider: Arc<RecordingProvider>) -> ContentQueryService {
        let mut selectors = SelectorRegistry::new();
        selectors.register(Box::new(PrefixSelector { prefix: "children", field: "parentId" }));
        let mut filters = FilterRegistry::new();
        filters.register(Box::new(PrefixFilter { prefix: "contentType", field: "contentType" }));
        filters.register(Box::new(PrefixFilter { prefix: "a", field: "a" }));
        filters.register(Box::new(PrefixFilter { prefix: "b", field: "b" }));
        filters.register(Box::new(PrefixFilter { prefix: "c", field: "c" }));
        let mut sorts = SortRegistry::new();
        sorts.register(Box::new(PrefixSort { prefix: "name" }));

        ContentQueryService::new(
            Arc::new(selectors),
            Arc::new(filters),
            Arc::new(sorts),
            provider,
            Arc::new(FixedCulture::new(Some("en-us"))),
        )
    }

    #[tokio::test]
    async fn test_basic_filter_query() {
        let provider = Arc::new(RecordingProvider::new());
        let svc = service(provider.clone());

        let page = svc
            .execute_query(None, &["contentType:article"], &["name:asc"], 0, 10)
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let call = provider.last_call();
        assert_eq!(
            call.filters,
            vec![FilterOption {
                field_name: "contentType".to_string(),
                values: vec!["article".to_string()],
                operator: FilterOperation::Is,
            }]
        );
        assert_eq!(
            call.sorts,
            vec![SortOption {
                field_name: "name".to_string(),
                direction: Direction::Ascending,
                field_type: FieldType::StringSortable,
            }]
        );
        assert_eq!(call.skip, 0);
        assert_eq!(call.take, 10);
        assert_eq!(call.culture.as_deref(), Some("en-us"));
    }

    #[tokio::test]
    async fn test_default_selector_when_fetch_missing() {
        let provider = Arc::new(RecordingProvider::new());
        let svc = service(provider.clone());
        let none: [&str; 0] = [];

        svc.execute_query(None, &none, &none, 0, 10).await.unwrap();
        assert_eq!(provider.last_call().selector, provider.all_content_selector_option());
    }

    #[tokio::test]
    async fn test_default_selector_when_fetch_unclaimed() {
        let provider = Arc::new(RecordingProvider::new());
        let svc = service(provider.clone());
        let none: [&str; 0] = [];

        svc.execute_query(Some("siblings:x"), &none, &none, 0, 10).await.unwrap();
        assert_eq!(provider.last_call().selector, provider.all_content_selector_option());
    }

    #[tokio::test]
    async fn test_fetch_selector_resolved() {
        let provider = Arc::new(RecordingProvider::new());
        let svc = service(provider.clone());
        let none: [&str; 0] = [];

        svc.execute_query(Some("children:abc"), &none, &none, 0, 10).await.unwrap();
        let selector = provider.last_call().selector;
        assert_eq!(selector.field_name, "parentId");
        assert_eq!(selector.values, vec!["abc"]);
    }

    #[tokio::test]
    async fn test_pagination_passthrough() {
        let provider = Arc::new(RecordingProvider::new());
        let svc = service(provider.clone());
        let none: [&str; 0] = [];

        svc.execute_query(None, &none, &none, 20, 5).await.unwrap();
        let call = provider.last_call();
        assert_eq!((call.skip, call.take), (20, 5));

        svc.execute_query(None, &none, &none, 0, 100_000).await.unwrap();
        assert_eq!(provider.last_call().take, 100_000);
    }

    #[tokio::test]
    async fn test_unknown_fragments_do_not_fail() {
        let provider = Arc::new(RecordingProvider::new());
        let svc = service(provider.clone());

        let result = svc
            .execute_query(None, &["nope:1", "b:2"], &["color:asc"], 0, 10)
            .await;
        assert!(result.is_ok());
        let call = provider.last_call();
        assert_eq!(call.filters.len(), 1);
        assert_eq!(call.filters[0].field_name, "b");
        assert!(call.sorts.is_empty());
    }

    #[tokio::test]
    async fn test_filter_order_preserved() {
        let provider = Arc::new(RecordingProvider::new());
        let svc = service(provider.clone());
        let none: [&str; 0] = [];

        svc.execute_query(None, &["a:1", "b:2", "c:3"], &none, 0, 10).await.unwrap();
        let fields: Vec<String> = provider
            .last_call()
            .filters
            .into_iter()
            .map(|f| f.field_name)
            .collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_rejection_translated_to_status() {
        let provider = Arc::new(RecordingProvider::rejecting(|| QueryProviderError::InvalidFilter {
            field: "name".to_string(),
            reason: "range operator on text field".to_string(),
        }));
        let svc = service(provider);
        let none: [&str; 0] = [];

        let err = svc.execute_query(None, &none, &none, 0, 10).await.unwrap_err();
        assert_eq!(err.status(), Some(ApiContentQueryOperationStatus::InvalidFilterOption));
    }

    #[tokio::test]
    async fn test_index_not_found_status() {
        let provider = Arc::new(RecordingProvider::rejecting(|| QueryProviderError::IndexNotFound));
        let svc = service(provider);
        let none: [&str; 0] = [];

        let err = svc.execute_query(None, &none, &none, 0, 10).await.unwrap_err();
        assert_eq!(err.status(), Some(ApiContentQueryOperationStatus::IndexNotFound));
        assert_eq!(err.status().unwrap().code(), "index_not_found");
    }

    #[tokio::test]
    async fn test_backend_error_propagates_unmodified() {
        let provider = Arc::new(RecordingProvider::rejecting(|| {
            QueryProviderError::Backend(anyhow::anyhow!("index engine unreachable"))
        }));
        let svc = service(provider);
        let none: [&str; 0] = [];

        let err = svc.execute_query(None, &none, &none, 0, 10).await.unwrap_err();
        assert!(err.status().is_none());
        assert_eq!(err.to_string(), "index engine unreachable");
    }

    #[tokio::test]
    async fn test_culture_override() {
        let provider = Arc::new(RecordingProvider::new());
        let svc = service(provider.clone()).with_culture(Some("da-dk"));
        let none: [&str; 0] = [];

        svc.execute_query(None, &none, &none, 0, 10).await.unwrap();
        assert_eq!(provider.last_call().culture.as_deref(), Some("da-dk"));
    }
}
