use tracing::{info, warn};

use dedup_embed::Embedder;
use dedup_store::ListingStore;

use crate::error::PipelineError;

/// Outcome of one backfill pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BackfillReport {
    /// Listings that received an embedding.
    pub embedded: usize,

    /// Listings skipped: missing title or image, or embedding failed.
    pub skipped: usize,
}

/// Embeds every listing that has no embedding row yet.
///
/// Listings without a title or image are skipped, as are listings the
/// embedder fails on; failures are logged, never retried. A failed insert
/// of a successfully produced vector aborts the pass.
pub async fn backfill_embeddings(
    store: &dyn ListingStore,
    embedder: &dyn Embedder,
) -> Result<BackfillReport, PipelineError> {
    let missing = store.unembedded_listings().await?;
    if missing.is_empty() {
        info!("no listings missing embeddings");
        return Ok(BackfillReport::default());
    }
    info!(missing = missing.len(), "starting embedding backfill");

    let mut report = BackfillReport::default();
    for listing in &missing {
        let (Some(title), Some(image_url)) = (&listing.title, &listing.image_url) else {
            report.skipped += 1;
            continue;
        };
        match embedder.embed(title, image_url).await {
            Ok(embedding) => {
                store.insert_embedding(&listing.id, &embedding).await?;
                report.embedded += 1;
            }
            Err(e) => {
                warn!(item = %listing.id, error = %e, "embedding failed, skipping");
                report.skipped += 1;
            }
        }
    }

    info!(
        embedded = report.embedded,
        skipped = report.skipped,
        "backfill complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedup_embed::EmbedError;
    use dedup_store::MemoryStore;

    /// Embedder returning a fixed vector, failing on marked titles.
    struct FakeEmbedder;

    #[async_trait::async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, title: &str, _image_url: &str) -> Result<Vec<f32>, EmbedError> {
            if title.starts_with("bad") {
                return Err(EmbedError::Api("decode failure".into()));
            }
            Ok(vec![1.0, 0.0, 0.0])
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    #[tokio::test]
    async fn embeds_only_missing_listings() {
        let store = MemoryStore::new();
        store.insert_listing("a", "shop-x", Some("Bike A"), Some("http://img/a"));
        store.insert_listing("b", "shop-x", Some("Bike B"), Some("http://img/b"));
        store.insert_embedding("b", &[0.5, 0.5, 0.0]).await.unwrap();

        let report = backfill_embeddings(&store, &FakeEmbedder).await.unwrap();
        assert_eq!(report, BackfillReport { embedded: 1, skipped: 0 });
        assert_eq!(store.embeddings().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn skips_incomplete_and_failed_listings() {
        let store = MemoryStore::new();
        store.insert_listing("no-title", "shop-x", None, Some("http://img/1"));
        store.insert_listing("bad-embed", "shop-x", Some("bad title"), Some("http://img/2"));
        store.insert_listing("ok", "shop-x", Some("Bike"), Some("http://img/3"));

        let report = backfill_embeddings(&store, &FakeEmbedder).await.unwrap();
        assert_eq!(report, BackfillReport { embedded: 1, skipped: 2 });

        let rows = store.embeddings().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].item_id, "ok");
    }

    #[tokio::test]
    async fn nothing_to_do_is_clean() {
        let store = MemoryStore::new();
        let report = backfill_embeddings(&store, &FakeEmbedder).await.unwrap();
        assert_eq!(report, BackfillReport::default());
    }
}
