//! Built-in handler registries and application wiring.
//!
//! [`Delivery`] loads content, builds the in-memory index and exposes a
//! [`ContentQueryService`] over it. It is shared by the `dq query` command
//! and the HTTP server.

use anyhow::Result;
use delivery_query_core::content::ContentItem;
use delivery_query_core::fields::IndexField;
use delivery_query_core::index::indexer::ContentIndexer;
use delivery_query_core::index::memory::InMemoryContentIndex;
use delivery_query_core::index::ContentIndexHandlerRegistry;
use delivery_query_core::paging::PagedModel;
use delivery_query_core::provider::FixedCulture;
use delivery_query_core::query::handlers::{FilterRegistry, SelectorRegistry, SortRegistry};
use delivery_query_core::service::{ContentQueryError, ContentQueryService};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::content::{load_content, ContentTree};
use crate::filters::{ContentTypeFilter, CreateDateFilter, NameFilter, UpdateDateFilter};
use crate::index_handlers::ItemIdIndexHandler;
use crate::selectors::{AncestorsSelector, ChildrenSelector, DescendantsSelector};
use crate::sorts::{CreateDateSort, LevelSort, NameSort, PathSort, SortOrderSort, UpdateDateSort};

/// Index handlers for every built-in field.
pub fn builtin_index_handlers() -> ContentIndexHandlerRegistry {
    let mut registry = ContentIndexHandlerRegistry::new();
    registry.register(Box::new(ItemIdIndexHandler));
    registry.register(Box::new(ChildrenSelector));
    registry.register(Box::new(DescendantsSelector));
    registry.register(Box::new(ContentTypeFilter));
    registry.register(Box::new(NameFilter));
    registry.register(Box::new(NameSort));
    registry.register(Box::new(CreateDateFilter));
    registry.register(Box::new(UpdateDateFilter));
    registry.register(Box::new(LevelSort));
    registry.register(Box::new(SortOrderSort));
    registry.register(Box::new(PathSort));
    registry
}

pub fn builtin_selectors(tree: Arc<ContentTree>) -> SelectorRegistry {
    let mut registry = SelectorRegistry::new();
    registry.register(Box::new(AncestorsSelector::new(tree)));
    registry.register(Box::new(ChildrenSelector));
    registry.register(Box::new(DescendantsSelector));
    registry
}

pub fn builtin_filters() -> FilterRegistry {
    let mut registry = FilterRegistry::new();
    registry.register(Box::new(ContentTypeFilter));
    registry.register(Box::new(NameFilter));
    registry.register(Box::new(CreateDateFilter));
    registry.register(Box::new(UpdateDateFilter));
    registry
}

pub fn builtin_sorts() -> SortRegistry {
    let mut registry = SortRegistry::new();
    registry.register(Box::new(NameSort));
    registry.register(Box::new(CreateDateSort));
    registry.register(Box::new(UpdateDateSort));
    registry.register(Box::new(LevelSort));
    registry.register(Box::new(SortOrderSort));
    registry.register(Box::new(PathSort));
    registry
}

/// A content query as received from the CLI or HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct DeliveryRequest {
    pub fetch: Option<String>,
    pub filters: Vec<String>,
    pub sorts: Vec<String>,
    pub skip: usize,
    /// Page size; `None` uses `delivery.default_page_size`.
    pub take: Option<usize>,
    /// Requested culture; `None` uses `delivery.default_culture`.
    pub culture: Option<String>,
}

/// Indexed content plus the query service over it.
pub struct Delivery {
    config: Arc<Config>,
    index: Arc<InMemoryContentIndex>,
    indexer: ContentIndexer,
    service: ContentQueryService,
    documents: usize,
}

impl Delivery {
    /// Load content from `[content].path` and build the index.
    pub async fn load(config: &Config) -> Result<Self> {
        let (items, tree) = load_content(&config.content.path)?;
        Self::from_content(config, &items, tree).await
    }

    /// Build the index over already loaded content.
    pub async fn from_content(config: &Config, items: &[ContentItem], tree: ContentTree) -> Result<Self> {
        let config = Arc::new(config.clone());
        let index = Arc::new(InMemoryContentIndex::with_mode(config.delivery.filter_values));
        let indexer = ContentIndexer::new(Arc::new(builtin_index_handlers()));

        let documents = indexer
            .index(index.as_ref(), items, config.index.strict_fields)
            .await?;

        let service = ContentQueryService::new(
            Arc::new(builtin_selectors(Arc::new(tree))),
            Arc::new(builtin_filters()),
            Arc::new(builtin_sorts()),
            index.clone(),
            Arc::new(FixedCulture(config.delivery.default_culture.clone())),
        );

        Ok(Self {
            config,
            index,
            indexer,
            service,
            documents,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &Arc<InMemoryContentIndex> {
        &self.index
    }

    pub fn indexer(&self) -> &ContentIndexer {
        &self.indexer
    }

    /// Number of index documents written at startup.
    pub fn document_count(&self) -> usize {
        self.documents
    }

    /// The index schema currently in effect.
    pub fn schema(&self) -> Vec<IndexField> {
        self.index.schema().unwrap_or_default()
    }

    /// The query service for `culture`, or for the configured default.
    pub fn service(&self, culture: Option<&str>) -> ContentQueryService {
        match culture {
            Some(c) => self.service.clone().with_culture(Some(c)),
            None => self.service.clone(),
        }
    }

    /// Run a query with page-size defaults and bounds applied.
    pub async fn execute(&self, request: &DeliveryRequest) -> Result<PagedModel<Uuid>, ContentQueryError> {
        let take = self.config.page_size(request.take);
        self.service(request.culture.as_deref())
            .execute_query(
                request.fetch.as_deref(),
                &request.filters,
                &request.sorts,
                request.skip,
                take,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_schema_has_no_collisions() {
        let fields = builtin_index_handlers().try_fields().unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.field_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "itemId",
                "parentId",
                "ancestorIds",
                "contentType",
                "name",
                "sortName",
                "createDate",
                "updateDate",
                "level",
                "sortOrder",
                "path"
            ]
        );
    }

    #[test]
    fn test_builtin_registries() {
        assert_eq!(builtin_selectors(Arc::new(ContentTree::default())).len(), 3);
        assert_eq!(builtin_filters().len(), 4);
        assert_eq!(builtin_sorts().len(), 6);
    }

    #[test]
    fn test_every_sort_field_is_indexed() {
        let fields = builtin_index_handlers().fields();
        let sorts = builtin_sorts();
        for fragment in ["name:asc", "createDate:asc", "updateDate:asc", "level:asc", "sortOrder:asc", "path:asc"] {
            let option = &sorts.build_options(&[fragment])[0];
            let field = fields
                .iter()
                .find(|f| f.field_name == option.field_name)
                .unwrap_or_else(|| panic!("{} is not indexed", option.field_name));
            assert_eq!(field.field_type, option.field_type);
        }
    }
}
