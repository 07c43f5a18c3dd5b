use std::sync::Mutex;

use crate::error::StoreError;
use crate::store::{AssignmentRow, EmbeddingRow, ListingRow, ListingStore, SourceRow};

/// In-memory [`ListingStore`] implementation.
/// Data is lost on drop. Suitable for testing or ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    listings: Vec<Listing>,
    embeddings: Vec<EmbeddingRow>,
    assignments: Vec<AssignmentRow>,
}

#[derive(Clone)]
struct Listing {
    id: String,
    source: String,
    title: Option<String>,
    image_url: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one scraped listing.
    pub fn insert_listing(
        &self,
        id: &str,
        source: &str,
        title: Option<&str>,
        image_url: Option<&str>,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner.listings.push(Listing {
            id: id.to_string(),
            source: source.to_string(),
            title: title.map(str::to_string),
            image_url: image_url.map(str::to_string),
        });
    }

    /// Seeds one embedding row with raw JSON text, bypassing encoding.
    /// Lets tests plant malformed rows.
    pub fn insert_raw_embedding(&self, item_id: &str, embedding_json: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.embeddings.push(EmbeddingRow {
            item_id: item_id.to_string(),
            embedding: embedding_json.to_string(),
        });
    }

    /// Number of persisted assignment rows.
    pub fn assignment_count(&self) -> usize {
        self.inner.lock().unwrap().assignments.len()
    }
}

#[async_trait::async_trait]
impl ListingStore for MemoryStore {
    async fn embeddings(&self) -> Result<Vec<EmbeddingRow>, StoreError> {
        Ok(self.inner.lock().unwrap().embeddings.clone())
    }

    async fn sources(&self) -> Result<Vec<SourceRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .listings
            .iter()
            .map(|l| SourceRow {
                id: l.id.clone(),
                source: l.source.clone(),
            })
            .collect())
    }

    async fn assignments(&self) -> Result<Vec<AssignmentRow>, StoreError> {
        Ok(self.inner.lock().unwrap().assignments.clone())
    }

    async fn upsert_assignments(&self, rows: &[AssignmentRow]) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        for row in rows {
            match inner
                .assignments
                .iter()
                .position(|existing| existing.item_id == row.item_id)
            {
                Some(i) => inner.assignments[i].cluster_id = row.cluster_id.clone(),
                None => inner.assignments.push(row.clone()),
            }
        }
        Ok(())
    }

    async fn unembedded_listings(&self) -> Result<Vec<ListingRow>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .listings
            .iter()
            .filter(|l| l.image_url.is_some())
            .filter(|l| !inner.embeddings.iter().any(|e| e.item_id == l.id))
            .map(|l| ListingRow {
                id: l.id.clone(),
                title: l.title.clone(),
                image_url: l.image_url.clone(),
            })
            .collect())
    }

    async fn insert_embedding(&self, item_id: &str, embedding: &[f32]) -> Result<(), StoreError> {
        let encoded =
            serde_json::to_string(embedding).map_err(|e| StoreError::Decode(e.to_string()))?;
        let mut inner = self.inner.lock().unwrap();
        inner.embeddings.push(EmbeddingRow {
            item_id: item_id.to_string(),
            embedding: encoded,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_is_idempotent_per_item() {
        let store = MemoryStore::new();
        let rows = vec![
            AssignmentRow {
                cluster_id: "c1".into(),
                item_id: "i1".into(),
            },
            AssignmentRow {
                cluster_id: "c1".into(),
                item_id: "i2".into(),
            },
        ];
        store.upsert_assignments(&rows).await.unwrap();
        store.upsert_assignments(&rows).await.unwrap();
        assert_eq!(store.assignment_count(), 2);
    }

    #[tokio::test]
    async fn upsert_last_write_wins() {
        let store = MemoryStore::new();
        store
            .upsert_assignments(&[AssignmentRow {
                cluster_id: "c1".into(),
                item_id: "i1".into(),
            }])
            .await
            .unwrap();
        store
            .upsert_assignments(&[AssignmentRow {
                cluster_id: "c2".into(),
                item_id: "i1".into(),
            }])
            .await
            .unwrap();

        let rows = store.assignments().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cluster_id, "c2");
    }

    #[tokio::test]
    async fn unembedded_requires_image_and_no_embedding() {
        let store = MemoryStore::new();
        store.insert_listing("a", "shop-x", Some("Bike A"), Some("http://img/a"));
        store.insert_listing("b", "shop-x", Some("Bike B"), None);
        store.insert_listing("c", "shop-y", Some("Bike C"), Some("http://img/c"));
        store.insert_embedding("c", &[1.0, 0.0]).await.unwrap();

        let missing = store.unembedded_listings().await.unwrap();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id, "a");
    }

    #[tokio::test]
    async fn embedding_round_trips_as_json() {
        let store = MemoryStore::new();
        store.insert_embedding("a", &[0.5, -1.25, 3.0]).await.unwrap();

        let rows = store.embeddings().await.unwrap();
        let decoded: Vec<f32> = serde_json::from_str(&rows[0].embedding).unwrap();
        assert_eq!(decoded, vec![0.5, -1.25, 3.0]);
    }
}
