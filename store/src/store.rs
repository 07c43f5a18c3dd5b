use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// One row of the embeddings table. The embedding is kept as JSON text
/// until the loader parses it; malformed rows are a loader concern, not
/// a storage one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRow {
    pub item_id: String,
    pub embedding: String,
}

/// Item id and the retailer it was scraped from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRow {
    pub id: String,
    pub source: String,
}

/// A scraped listing awaiting an embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRow {
    pub id: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
}

/// One persisted item -> cluster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRow {
    pub cluster_id: String,
    pub item_id: String,
}

/// Storage operations the deduplication pipeline depends on.
///
/// Implementations must be safe for concurrent use (Send + Sync).
#[async_trait::async_trait]
pub trait ListingStore: Send + Sync {
    /// Returns every persisted embedding row.
    async fn embeddings(&self) -> Result<Vec<EmbeddingRow>, StoreError>;

    /// Returns the item -> source mapping for all scraped listings.
    async fn sources(&self) -> Result<Vec<SourceRow>, StoreError>;

    /// Returns every persisted cluster assignment.
    async fn assignments(&self) -> Result<Vec<AssignmentRow>, StoreError>;

    /// Upserts assignment rows keyed on item_id, last write wins.
    async fn upsert_assignments(&self, rows: &[AssignmentRow]) -> Result<(), StoreError>;

    /// Returns listings that have an image reference but no embedding yet.
    async fn unembedded_listings(&self) -> Result<Vec<ListingRow>, StoreError>;

    /// Persists an embedding for one item as a JSON float array.
    async fn insert_embedding(&self, item_id: &str, embedding: &[f32]) -> Result<(), StoreError>;
}
