//! # Delivery Query Core
//!
//! Engine-agnostic logic for the content delivery query pipeline: the index
//! field model, composite index ids, the content index handler registry,
//! selector/filter/sort handler registries and the content query service.
//!
//! This crate does no filesystem or network I/O. The index engine is
//! reached through the [`provider::ContentQueryProvider`] and
//! [`index::indexer::IndexWriter`] traits; [`index::memory`] ships an
//! in-memory implementation of both.

pub mod composite_id;
pub mod content;
pub mod fields;
pub mod index;
pub mod paging;
pub mod provider;
pub mod query;
pub mod service;
