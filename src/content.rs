//! Content loading and the content tree.
//!
//! Content is read from a JSON file holding an array of
//! [`ContentItem`]s. Hierarchy data the file omits (`ancestor_keys`, `path`,
//! `level`) is derived from `parent_key` links through a [`ContentTree`].

use anyhow::{bail, Context, Result};
use delivery_query_core::content::ContentItem;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// Parent links between content items, keyed by content key.
#[derive(Debug, Clone, Default)]
pub struct ContentTree {
    parents: HashMap<Uuid, Option<Uuid>>,
    ids: HashMap<Uuid, i32>,
}

impl ContentTree {
    pub fn new(items: &[ContentItem]) -> Self {
        Self {
            parents: items.iter().map(|c| (c.key, c.parent_key)).collect(),
            ids: items.iter().map(|c| (c.key, c.id)).collect(),
        }
    }

    pub fn contains(&self, key: &Uuid) -> bool {
        self.parents.contains_key(key)
    }

    /// Keys of the ancestors of `key`, root first. Empty for unknown keys.
    pub fn ancestor_keys(&self, key: &Uuid) -> Vec<Uuid> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::from([*key]);
        let mut current = self.parents.get(key).copied().flatten();

        while let Some(parent) = current {
            if !seen.insert(parent) {
                tracing::warn!("Cycle in content tree at {}", parent);
                break;
            }
            ancestors.push(parent);
            current = self.parents.get(&parent).copied().flatten();
        }

        ancestors.reverse();
        ancestors
    }

    /// Id path from the root down to and including `key`.
    fn id_path(&self, key: &Uuid) -> Vec<i32> {
        self.ancestor_keys(key)
            .iter()
            .chain(std::iter::once(key))
            .filter_map(|k| self.ids.get(k).copied())
            .collect()
    }
}

/// Fill in hierarchy fields that the source left empty.
pub fn complete_hierarchy(items: &mut [ContentItem], tree: &ContentTree) {
    for item in items.iter_mut() {
        if item.ancestor_keys.is_empty() {
            item.ancestor_keys = tree.ancestor_keys(&item.key);
        }
        if item.path.is_empty() {
            item.path = tree.id_path(&item.key);
        }
        if item.level == 0 {
            item.level = item.ancestor_keys.len() as u32 + 1;
        }
    }
}

/// Parse content from JSON and complete its hierarchy.
pub fn parse_content(json: &str) -> Result<(Vec<ContentItem>, ContentTree)> {
    let mut items: Vec<ContentItem> =
        serde_json::from_str(json).with_context(|| "Failed to parse content JSON")?;

    let mut keys = HashSet::new();
    for item in &items {
        if !keys.insert(item.key) {
            bail!("duplicate content key: {}", item.key);
        }
    }

    let tree = ContentTree::new(&items);
    for item in &items {
        if let Some(parent) = item.parent_key {
            if !tree.contains(&parent) {
                tracing::warn!("Content {} references unknown parent {}", item.key, parent);
            }
        }
    }

    complete_hierarchy(&mut items, &tree);
    Ok((items, tree))
}

/// Load content from a JSON file.
pub fn load_content(path: &Path) -> Result<(Vec<ContentItem>, ContentTree)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read content file: {}", path.display()))?;
    let (items, tree) = parse_content(&json)?;
    tracing::info!("Loaded {} content items from {}", items.len(), path.display());
    Ok((items, tree))
}
