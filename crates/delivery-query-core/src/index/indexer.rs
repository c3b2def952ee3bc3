//! Assembles per-culture index documents from handler output.
//!
//! Culture-variant content produces one document per culture, keyed by
//! [`index_id`](crate::composite_id::index_id)`(id, culture)`. Invariant
//! content produces a single document keyed with the empty culture.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::composite_id::index_id;
use crate::content::ContentItem;
use crate::fields::{FieldValue, IndexField, IndexFieldValue};

use super::{ContentIndexHandlerRegistry, IndexSchemaError};

/// One document of the content index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDocument {
    /// Composite id (content id + culture).
    pub id: String,
    pub content_id: i32,
    pub content_key: Uuid,
    /// `None` for the document of invariant content.
    pub culture: Option<String>,
    pub fields: Vec<IndexFieldValue>,
}

impl IndexDocument {
    /// The values stored for `field_name`, across all contributions.
    pub fn values<'a>(&'a self, field_name: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.field_name == field_name)
            .flat_map(|f| f.values.iter())
    }
}

/// Index engine integration receiving schema and documents.
#[async_trait]
pub trait IndexWriter: Send + Sync {
    /// (Re)create the index with the given schema, dropping existing documents.
    async fn create_schema(&self, fields: &[IndexField]) -> Result<()>;

    /// Insert or replace documents by composite id.
    async fn write_documents(&self, documents: Vec<IndexDocument>) -> Result<()>;

    /// Remove every document of a content item (all cultures).
    async fn remove_content(&self, content_id: i32) -> Result<()>;
}

/// Builds the index schema and documents from a handler registry.
#[derive(Clone)]
pub struct ContentIndexer {
    handlers: Arc<ContentIndexHandlerRegistry>,
}

impl ContentIndexer {
    pub fn new(handlers: Arc<ContentIndexHandlerRegistry>) -> Self {
        Self { handlers }
    }

    /// The index schema. `strict` fails on field name collisions instead of
    /// letting the last-registered definition win.
    pub fn build_schema(&self, strict: bool) -> Result<Vec<IndexField>, IndexSchemaError> {
        if strict {
            self.handlers.try_fields()
        } else {
            Ok(self.handlers.fields())
        }
    }

    /// The documents for one content item.
    pub fn documents(&self, content: &ContentItem) -> Vec<IndexDocument> {
        if !content.varies_by_culture() {
            return vec![IndexDocument {
                id: index_id(content.id, ""),
                content_id: content.id,
                content_key: content.key,
                culture: None,
                fields: self.handlers.field_values(content, None),
            }];
        }

        content
            .cultures()
            .into_iter()
            .map(|culture| IndexDocument {
                id: index_id(content.id, culture),
                content_id: content.id,
                content_key: content.key,
                culture: Some(culture.to_string()),
                fields: self.handlers.field_values(content, Some(culture)),
            })
            .collect()
    }

    /// Rebuild the index: create the schema and write every item's documents.
    ///
    /// Returns the number of documents written.
    pub async fn index<W: IndexWriter + ?Sized>(
        &self,
        writer: &W,
        items: &[ContentItem],
        strict: bool,
    ) -> Result<usize> {
        let schema = self.build_schema(strict)?;
        writer.create_schema(&schema).await?;

        let documents: Vec<IndexDocument> = items.iter().flat_map(|c| self.documents(c)).collect();
        let count = documents.len();
        writer.write_documents(documents).await?;

        tracing::info!(
            "Indexed {} content items as {} documents ({} fields)",
            items.len(),
            count,
            schema.len()
        );
        Ok(count)
    }

    /// Re-index a single item, replacing all of its previous documents.
    pub async fn reindex<W: IndexWriter + ?Sized>(&self, writer: &W, content: &ContentItem) -> Result<usize> {
        writer.remove_content(content.id).await?;
        let documents = self.documents(content);
        let count = documents.len();
        writer.write_documents(documents).await?;
        Ok(count)
    }
}
