//! Content index handlers and the index-building pipeline.
//!
//! A [`ContentIndexHandler`] contributes field definitions to the index
//! schema and field values to each indexed document. Handlers are collected
//! in a [`ContentIndexHandlerRegistry`], populated once at startup and
//! read-only afterwards.
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │        ContentIndexHandlerRegistry        │
//! │  ┌────────┐ ┌─────────┐ ┌──────────────┐  │
//! │  │ itemId │ │  name   │ │ custom (Rust)│  │
//! │  └────────┘ └─────────┘ └──────────────┘  │
//! └──────────────┬────────────────────────────┘
//!                ▼
//!   ContentIndexer → IndexDocument → IndexWriter
//! ```

pub mod indexer;
pub mod memory;

use thiserror::Error;

use crate::content::ContentItem;
use crate::fields::{IndexField, IndexFieldValue};

/// A plugin contributing fields to the content index.
///
/// Implementations must be free of per-call mutable state: they are
/// invoked concurrently and repeatedly.
///
/// # Example
///
/// ```rust
/// use delivery_query_core::content::ContentItem;
/// use delivery_query_core::fields::{FieldType, IndexField, IndexFieldValue};
/// use delivery_query_core::index::ContentIndexHandler;
///
/// struct AuthorIndexHandler;
///
/// impl ContentIndexHandler for AuthorIndexHandler {
///     fn name(&self) -> &str { "author" }
///
///     fn fields(&self) -> Vec<IndexField> {
///         vec![IndexField::new("author", FieldType::StringRaw, false)]
///     }
///
///     fn field_values(&self, content: &ContentItem, _culture: Option<&str>) -> Vec<IndexFieldValue> {
///         content
///             .properties
///             .get("author")
///             .and_then(|v| v.as_str())
///             .map(|a| vec![IndexFieldValue::single("author", a)])
///             .unwrap_or_default()
///     }
/// }
/// ```
pub trait ContentIndexHandler: Send + Sync {
    /// Identity of the handler within a registry.
    fn name(&self) -> &str;

    /// Field definitions this handler contributes to the schema.
    fn fields(&self) -> Vec<IndexField>;

    /// Field values for one document of `content`.
    ///
    /// `culture` is the culture of the document being built, or `None` for
    /// the single document of invariant content.
    fn field_values(&self, content: &ContentItem, culture: Option<&str>) -> Vec<IndexFieldValue>;
}

/// Schema construction failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexSchemaError {
    #[error("field '{field}' is defined by both '{first}' and '{second}'")]
    DuplicateField {
        field: String,
        first: String,
        second: String,
    },
}

/// Ordered, deduplicated collection of [`ContentIndexHandler`]s.
pub struct ContentIndexHandlerRegistry {
    handlers: Vec<Box<dyn ContentIndexHandler>>,
}

impl ContentIndexHandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a handler.
    ///
    /// A handler with the same name as an existing one replaces it and moves
    /// to the end of the registration order.
    pub fn register(&mut self, handler: Box<dyn ContentIndexHandler>) {
        self.handlers.retain(|h| h.name() != handler.name());
        self.handlers.push(handler);
    }

    /// All registered handlers in registration order.
    pub fn handlers(&self) -> &[Box<dyn ContentIndexHandler>] {
        &self.handlers
    }

    /// The index schema: the union of every handler's fields.
    ///
    /// When two handlers define the same field name, the last-registered
    /// definition wins (keeping the position of the first) and a warning is
    /// logged. Use [`try_fields`](Self::try_fields) to fail instead.
    pub fn fields(&self) -> Vec<IndexField> {
        let mut fields: Vec<(IndexField, &str)> = Vec::new();
        for handler in &self.handlers {
            for field in handler.fields() {
                match fields.iter_mut().find(|(f, _)| f.field_name == field.field_name) {
                    Some(existing) => {
                        tracing::warn!(
                            "Index field '{}' from handler '{}' overrides the definition from '{}'",
                            field.field_name,
                            handler.name(),
                            existing.1
                        );
                        *existing = (field, handler.name());
                    }
                    None => fields.push((field, handler.name())),
                }
            }
        }
        fields.into_iter().map(|(f, _)| f).collect()
    }

    /// The index schema, failing on the first field name collision.
    pub fn try_fields(&self) -> Result<Vec<IndexField>, IndexSchemaError> {
        let mut fields: Vec<(IndexField, &str)> = Vec::new();
        for handler in &self.handlers {
            for field in handler.fields() {
                if let Some((_, owner)) = fields.iter().find(|(f, _)| f.field_name == field.field_name) {
                    return Err(IndexSchemaError::DuplicateField {
                        field: field.field_name,
                        first: owner.to_string(),
                        second: handler.name().to_string(),
                    });
                }
                fields.push((field, handler.name()));
            }
        }
        Ok(fields.into_iter().map(|(f, _)| f).collect())
    }

    /// The values of every handler for one document, in registration order.
    pub fn field_values(&self, content: &ContentItem, culture: Option<&str>) -> Vec<IndexFieldValue> {
        self.handlers
            .iter()
            .flat_map(|h| h.field_values(content, culture))
            .collect()
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

impl Default for ContentIndexHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fields::FieldType;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    /// Handler defining fixed fields and echoing its name as a value.
    pub(crate) struct FixedHandler {
        pub name: &'static str,
        pub fields: Vec<IndexField>,
    }

    impl ContentIndexHandler for FixedHandler {
        fn name(&self) -> &str {
            self.name
        }

        fn fields(&self) -> Vec<IndexField> {
            self.fields.clone()
        }

        fn field_values(&self, _content: &ContentItem, culture: Option<&str>) -> Vec<IndexFieldValue> {
            self.fields
                .iter()
                .map(|f| {
                    let value = match culture {
                        Some(c) if f.varies_by_culture => format!("{}-{}", self.name, c),
                        _ => self.name.to_string(),
                    };
                    IndexFieldValue::single(f.field_name.clone(), value)
                })
                .collect()
        }
    }

    pub(crate) fn sample_content(names: &[(&str, &str)]) -> ContentItem {
        ContentItem {
            id: 1234,
            key: Uuid::new_v4(),
            content_type: "article".to_string(),
            parent_key: None,
            path: vec![1234],
            ancestor_keys: vec![],
            level: 1,
            sort_order: 0,
            create_date: Utc::now(),
            update_date: Utc::now(),
            names: names
                .iter()
                .map(|(c, n)| (c.to_string(), n.to_string()))
                .collect(),
            properties: BTreeMap::new(),
        }
    }

    fn handler(name: &'static str, fields: &[(&str, FieldType)]) -> Box<FixedHandler> {
        Box::new(FixedHandler {
            name,
            fields: fields
                .iter()
                .map(|(n, t)| IndexField::new(*n, *t, false))
                .collect(),
        })
    }

    #[test]
    fn test_fields_union_in_registration_order() {
        let mut registry = ContentIndexHandlerRegistry::new();
        registry.register(handler("a", &[("one", FieldType::StringRaw)]));
        registry.register(handler("b", &[("two", FieldType::Number), ("three", FieldType::Date)]));

        let names: Vec<String> = registry.fields().into_iter().map(|f| f.field_name).collect();
        assert_eq!(names, vec!["one", "two", "three"]);
        assert_eq!(registry.try_fields().unwrap().len(), 3);
    }

    #[test]
    fn test_collision_last_registered_wins() {
        let mut registry = ContentIndexHandlerRegistry::new();
        registry.register(handler("a", &[("shared", FieldType::StringRaw), ("x", FieldType::Number)]));
        registry.register(handler("b", &[("shared", FieldType::Date)]));

        let fields = registry.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].field_name, "shared");
        assert_eq!(fields[0].field_type, FieldType::Date);
    }

    #[test]
    fn test_collision_fails_fast_when_strict() {
        let mut registry = ContentIndexHandlerRegistry::new();
        registry.register(handler("a", &[("shared", FieldType::StringRaw)]));
        registry.register(handler("b", &[("shared", FieldType::Date)]));

        assert_eq!(
            registry.try_fields(),
            Err(IndexSchemaError::DuplicateField {
                field: "shared".to_string(),
                first: "a".to_string(),
                second: "b".to_string(),
            })
        );
    }

    #[test]
    fn test_register_same_name_replaces_and_moves_last() {
        let mut registry = ContentIndexHandlerRegistry::new();
        registry.register(handler("a", &[("one", FieldType::StringRaw)]));
        registry.register(handler("b", &[("two", FieldType::StringRaw)]));
        registry.register(handler("a", &[("three", FieldType::StringRaw)]));

        assert_eq!(registry.len(), 2);
        let names: Vec<&str> = registry.handlers().iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
        let fields: Vec<String> = registry.fields().into_iter().map(|f| f.field_name).collect();
        assert_eq!(fields, vec!["two", "three"]);
    }

    #[test]
    fn test_field_values_concatenated() {
        let mut registry = ContentIndexHandlerRegistry::new();
        registry.register(handler("a", &[("one", FieldType::StringRaw)]));
        registry.register(handler("b", &[("two", FieldType::StringRaw)]));

        let values = registry.field_values(&sample_content(&[("", "Home")]), None);
        let names: Vec<&str> = values.iter().map(|v| v.field_name.as_str()).collect();
        assert_eq!(names, vec!["one", "two"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = ContentIndexHandlerRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.fields().is_empty());
    }
}
