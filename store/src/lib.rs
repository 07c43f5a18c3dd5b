//! Storage backend for the deduplication pipeline.
//!
//! Three tables are involved: scraped listings (id, source, title, image),
//! persisted embeddings (item_id, embedding as a JSON float array), and
//! cluster assignments (cluster_id, item_id). The [`ListingStore`] trait
//! exposes the handful of reads the pipeline needs plus a batch upsert of
//! assignments keyed on item_id.
//!
//! [`RestStore`] talks to a PostgREST-compatible endpoint; [`MemoryStore`]
//! backs tests.

pub mod config;
pub mod error;
pub mod memory;
pub mod rest;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::{AssignmentRow, EmbeddingRow, ListingRow, ListingStore, SourceRow};
