use std::collections::HashSet;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::store::{AssignmentRow, EmbeddingRow, ListingRow, ListingStore, SourceRow};

/// PostgREST-style storage client.
///
/// Reads use `GET {base}/{table}?select=...`; the assignment upsert uses
/// `POST {base}/{table}?on_conflict=item_id` with
/// `Prefer: resolution=merge-duplicates` for last-write-wins semantics.
pub struct RestStore {
    cfg: StoreConfig,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingInsert<'a> {
    item_id: &'a str,
    embedding: String,
}

#[derive(serde::Deserialize)]
struct ItemIdRow {
    item_id: String,
}

impl RestStore {
    pub fn new(cfg: StoreConfig) -> Self {
        Self {
            cfg,
            client: Client::new(),
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &str,
    ) -> Result<Vec<T>, StoreError> {
        let url = format!("{}/{}?{}", self.cfg.base_url, table, query);
        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.cfg.api_key)
            .header("Authorization", format!("Bearer {}", self.cfg.api_key))
            .send()
            .await
            .map_err(|e| StoreError::Api(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Http { status, body });
        }

        resp.json().await.map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn insert<B: Serialize + ?Sized>(
        &self,
        table: &str,
        query: &str,
        body: &B,
        upsert: bool,
    ) -> Result<(), StoreError> {
        let url = if query.is_empty() {
            format!("{}/{}", self.cfg.base_url, table)
        } else {
            format!("{}/{}?{}", self.cfg.base_url, table, query)
        };
        let mut req = self
            .client
            .post(&url)
            .header("apikey", &self.cfg.api_key)
            .header("Authorization", format!("Bearer {}", self.cfg.api_key))
            .json(body);
        if upsert {
            req = req.header("Prefer", "resolution=merge-duplicates");
        }

        let resp = req.send().await.map_err(|e| StoreError::Api(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Http { status, body });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ListingStore for RestStore {
    async fn embeddings(&self) -> Result<Vec<EmbeddingRow>, StoreError> {
        self.select(&self.cfg.embeddings_table, "select=item_id,embedding")
            .await
    }

    async fn sources(&self) -> Result<Vec<SourceRow>, StoreError> {
        self.select(&self.cfg.listings_table, "select=id,source").await
    }

    async fn assignments(&self) -> Result<Vec<AssignmentRow>, StoreError> {
        self.select(&self.cfg.assignments_table, "select=cluster_id,item_id")
            .await
    }

    async fn upsert_assignments(&self, rows: &[AssignmentRow]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        self.insert(&self.cfg.assignments_table, "on_conflict=item_id", rows, true)
            .await
    }

    async fn unembedded_listings(&self) -> Result<Vec<ListingRow>, StoreError> {
        // Set difference is computed client-side: listings with an image
        // minus item ids already present in the embeddings table.
        let listings: Vec<ListingRow> = self
            .select(
                &self.cfg.listings_table,
                "select=id,title,image_url&image_url=not.is.null",
            )
            .await?;
        let embedded: Vec<ItemIdRow> = self
            .select(&self.cfg.embeddings_table, "select=item_id")
            .await?;
        let embedded_ids: HashSet<String> =
            embedded.into_iter().map(|row| row.item_id).collect();

        Ok(listings
            .into_iter()
            .filter(|row| !embedded_ids.contains(&row.id))
            .collect())
    }

    async fn insert_embedding(&self, item_id: &str, embedding: &[f32]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(embedding)
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let row = EmbeddingInsert {
            item_id,
            embedding: encoded,
        };
        self.insert(&self.cfg.embeddings_table, "", &[row], false).await
    }
}
