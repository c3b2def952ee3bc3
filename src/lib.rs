//! # Delivery Query
//!
//! Content delivery queries over a content index. A query names a
//! selector (`fetch`), filters and sorts as short string fragments; pluggable
//! handlers turn each fragment into a structured option and the index
//! engine executes the result.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌───────────────────┐   ┌──────────────────┐
//! │ content.json │──▶│  ContentIndexer   │──▶│ InMemoryContent  │
//! │ (ContentItem)│   │  index handlers   │   │      Index       │
//! └──────────────┘   └───────────────────┘   └────────┬─────────┘
//!                                                     │ ContentQueryProvider
//!                    ┌───────────────────┐            │
//!  fetch/filter/ ───▶│ContentQueryService│────────────┘
//!  sort fragments    │ selector/filter/  │
//!                    │ sort registries   │
//!                    └─────────┬─────────┘
//!                      ┌───────┴───────┐
//!                      ▼               ▼
//!                 ┌─────────┐    ┌──────────┐
//!                 │   CLI   │    │   HTTP   │
//!                 │  (dq)   │    │ /content │
//!                 └─────────┘    └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`content`] | Content file loading and the content tree |
//! | [`index_handlers`] | Built-in index field names and the content key handler |
//! | [`selectors`] | Built-in `fetch` selectors |
//! | [`filters`] | Built-in `filter` handlers |
//! | [`sorts`] | Built-in `sort` handlers |
//! | [`delivery`] | Built-in registries and application wiring |
//! | [`server`] | HTTP server |
//!
//! The engine-agnostic pipeline lives in the `delivery-query-core` crate.

pub mod config;
pub mod content;
pub mod delivery;
pub mod filters;
mod fragment;
pub mod index_handlers;
pub mod selectors;
pub mod server;
pub mod sorts;
