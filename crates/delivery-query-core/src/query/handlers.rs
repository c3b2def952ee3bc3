//! Selector, filter and sort handler protocols and their registries.
//!
//! Each handler performs a cheap claim check ([`QueryHandler::can_handle`],
//! usually a prefix match) and, once it has claimed a fragment, parses it
//! into a structured option. Registries resolve a fragment to the **first**
//! registered handler that claims it. Fragments no handler claims are
//! dropped: unknown query syntax never fails a query.
//!
//! # Example
//!
//! ```rust
//! use delivery_query_core::query::handlers::{FilterHandler, FilterRegistry, QueryHandler};
//! use delivery_query_core::query::{FilterOperation, FilterOption};
//!
//! struct AuthorFilter;
//!
//! impl QueryHandler for AuthorFilter {
//!     fn can_handle(&self, query: &str) -> bool {
//!         query.starts_with("author:")
//!     }
//! }
//!
//! impl FilterHandler for AuthorFilter {
//!     fn build_filter_option(&self, filter: &str) -> FilterOption {
//!         FilterOption {
//!             field_name: "author".to_string(),
//!             values: vec![filter["author:".len()..].to_string()],
//!             operator: FilterOperation::Is,
//!         }
//!     }
//! }
//!
//! let mut filters = FilterRegistry::new();
//! filters.register(Box::new(AuthorFilter));
//! let options = filters.build_options(&["author:jane", "unknown:1"]);
//! assert_eq!(options.len(), 1);
//! ```

use super::{FilterOption, SelectorOption, SortOption};

/// Claim check shared by every query handler kind.
pub trait QueryHandler: Send + Sync {
    /// Whether this handler recognizes the raw query fragment.
    fn can_handle(&self, query: &str) -> bool;
}

/// Builds the [`SelectorOption`] for a claimed `fetch` fragment.
pub trait SelectorHandler: QueryHandler {
    fn build_selector_option(&self, selector: &str) -> SelectorOption;
}

/// Builds a [`FilterOption`] for a claimed `filter` fragment.
pub trait FilterHandler: QueryHandler {
    fn build_filter_option(&self, filter: &str) -> FilterOption;
}

/// Builds a [`SortOption`] for a claimed `sort` fragment.
pub trait SortHandler: QueryHandler {
    fn build_sort_option(&self, sort: &str) -> SortOption;
}

/// Ordered registry of query handlers of one kind.
pub struct HandlerRegistry<H: ?Sized + QueryHandler> {
    handlers: Vec<Box<H>>,
}

pub type SelectorRegistry = HandlerRegistry<dyn SelectorHandler>;
pub type FilterRegistry = HandlerRegistry<dyn FilterHandler>;
pub type SortRegistry = HandlerRegistry<dyn SortHandler>;

impl<H: ?Sized + QueryHandler> HandlerRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler after all existing ones.
    pub fn register(&mut self, handler: Box<H>) {
        self.handlers.push(handler);
    }

    /// Get all registered handlers.
    pub fn handlers(&self) -> &[Box<H>] {
        &self.handlers
    }

    /// The first handler, in registration order, that claims `fragment`.
    pub fn find(&self, fragment: &str) -> Option<&H> {
        self.handlers
            .iter()
            .find(|h| h.can_handle(fragment))
            .map(|h| h.as_ref())
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Return the count of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

impl<H: ?Sized + QueryHandler> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerRegistry<dyn SelectorHandler> {
    /// Resolve a `fetch` fragment, or `None` when no handler claims it.
    pub fn build_option(&self, fetch: &str) -> Option<SelectorOption> {
        match self.find(fetch) {
            Some(handler) => Some(handler.build_selector_option(fetch)),
            None => {
                tracing::debug!("No selector handler claims '{}'", fetch);
                None
            }
        }
    }
}

impl HandlerRegistry<dyn FilterHandler> {
    /// Resolve `filter` fragments in order, dropping unclaimed ones.
    pub fn build_options<S: AsRef<str>>(&self, filters: &[S]) -> Vec<FilterOption> {
        filters
            .iter()
            .filter_map(|f| {
                let f = f.as_ref();
                let option = self.find(f).map(|h| h.build_filter_option(f));
                if option.is_none() {
                    tracing::debug!("No filter handler claims '{}', ignoring", f);
                }
                option
            })
            .collect()
    }
}

impl HandlerRegistry<dyn SortHandler> {
    /// Resolve `sort` fragments in order, dropping unclaimed ones.
    pub fn build_options<S: AsRef<str>>(&self, sorts: &[S]) -> Vec<SortOption> {
        sorts
            .iter()
            .filter_map(|s| {
                let s = s.as_ref();
                let option = self.find(s).map(|h| h.build_sort_option(s));
                if option.is_none() {
                    tracing::debug!("No sort handler claims '{}', ignoring", s);
                }
                option
            })
            .collect()
    }
}
