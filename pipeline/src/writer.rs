use std::collections::HashMap;

use tracing::{info, warn};

use dedup_store::{AssignmentRow, ListingStore};

use crate::error::PipelineError;

/// Outcome of a best-effort persistence pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Rows accepted by the store.
    pub written: usize,

    /// Rows in batches that failed; left unpersisted, never retried.
    pub failed: usize,
}

/// Member count of one persisted cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSize {
    pub cluster_id: String,
    pub members: usize,
}

/// Upserts assignment rows in fixed-size batches.
///
/// A failed batch is logged and skipped; the run continues with the next
/// one. Partial persistence is an accepted outcome, so this never returns
/// an error.
pub async fn write_assignments(
    store: &dyn ListingStore,
    rows: &[AssignmentRow],
    batch_size: usize,
) -> WriteReport {
    if rows.is_empty() {
        info!("no assignments to write");
        return WriteReport::default();
    }

    let batch_size = batch_size.max(1);
    let mut report = WriteReport::default();
    for batch in rows.chunks(batch_size) {
        match store.upsert_assignments(batch).await {
            Ok(()) => report.written += batch.len(),
            Err(e) => {
                warn!(rows = batch.len(), error = %e, "assignment batch failed, continuing");
                report.failed += batch.len();
            }
        }
    }
    info!(
        written = report.written,
        failed = report.failed,
        "assignments persisted"
    );
    report
}

/// Reads assignments back and returns the `top` largest clusters by member
/// count, largest first. Observational only; ties order by cluster id.
pub async fn largest_clusters(
    store: &dyn ListingStore,
    top: usize,
) -> Result<Vec<ClusterSize>, PipelineError> {
    let rows = store.assignments().await?;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.cluster_id).or_insert(0) += 1;
    }

    let mut sizes: Vec<ClusterSize> = counts
        .into_iter()
        .map(|(cluster_id, members)| ClusterSize {
            cluster_id,
            members,
        })
        .collect();
    sizes.sort_by(|a, b| {
        b.members
            .cmp(&a.members)
            .then_with(|| a.cluster_id.cmp(&b.cluster_id))
    });
    sizes.truncate(top);
    Ok(sizes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedup_store::{EmbeddingRow, ListingRow, MemoryStore, SourceRow, StoreError};

    fn row(cluster_id: &str, item_id: &str) -> AssignmentRow {
        AssignmentRow {
            cluster_id: cluster_id.into(),
            item_id: item_id.into(),
        }
    }

    #[tokio::test]
    async fn writes_in_batches() {
        let store = MemoryStore::new();
        let rows: Vec<AssignmentRow> = (0..7).map(|i| row("c", &format!("i{i}"))).collect();

        let report = write_assignments(&store, &rows, 3).await;
        assert_eq!(report, WriteReport { written: 7, failed: 0 });
        assert_eq!(store.assignment_count(), 7);
    }

    #[tokio::test]
    async fn rewrite_is_idempotent() {
        let store = MemoryStore::new();
        let rows = vec![row("c1", "i1"), row("c2", "i2")];

        write_assignments(&store, &rows, 500).await;
        write_assignments(&store, &rows, 500).await;
        assert_eq!(store.assignment_count(), 2);
    }

    #[tokio::test]
    async fn zero_batch_size_still_writes() {
        let store = MemoryStore::new();
        let report = write_assignments(&store, &[row("c", "i")], 0).await;
        assert_eq!(report.written, 1);
    }

    /// Store whose upsert fails on the first call only.
    struct FlakyStore {
        inner: MemoryStore,
        failures: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl dedup_store::ListingStore for FlakyStore {
        async fn embeddings(&self) -> Result<Vec<EmbeddingRow>, StoreError> {
            self.inner.embeddings().await
        }
        async fn sources(&self) -> Result<Vec<SourceRow>, StoreError> {
            self.inner.sources().await
        }
        async fn assignments(&self) -> Result<Vec<AssignmentRow>, StoreError> {
            self.inner.assignments().await
        }
        async fn upsert_assignments(&self, rows: &[AssignmentRow]) -> Result<(), StoreError> {
            use std::sync::atomic::Ordering;
            if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n > 0 { Some(n - 1) } else { None }
            }).is_ok()
            {
                return Err(StoreError::Api("connection reset".into()));
            }
            self.inner.upsert_assignments(rows).await
        }
        async fn unembedded_listings(&self) -> Result<Vec<ListingRow>, StoreError> {
            self.inner.unembedded_listings().await
        }
        async fn insert_embedding(
            &self,
            item_id: &str,
            embedding: &[f32],
        ) -> Result<(), StoreError> {
            self.inner.insert_embedding(item_id, embedding).await
        }
    }

    #[tokio::test]
    async fn failed_batch_is_skipped_and_run_continues() {
        let store = FlakyStore {
            inner: MemoryStore::new(),
            failures: std::sync::atomic::AtomicUsize::new(1),
        };
        let rows: Vec<AssignmentRow> = (0..4).map(|i| row("c", &format!("i{i}"))).collect();

        let report = write_assignments(&store, &rows, 2).await;
        assert_eq!(report, WriteReport { written: 2, failed: 2 });
        assert_eq!(store.inner.assignment_count(), 2);
    }

    #[tokio::test]
    async fn largest_clusters_ranks_by_member_count() {
        let store = MemoryStore::new();
        let rows = vec![
            row("big", "i1"),
            row("big", "i2"),
            row("big", "i3"),
            row("mid", "i4"),
            row("mid", "i5"),
            row("small", "i6"),
        ];
        write_assignments(&store, &rows, 500).await;

        let sizes = largest_clusters(&store, 2).await.unwrap();
        assert_eq!(sizes.len(), 2);
        assert_eq!(sizes[0].cluster_id, "big");
        assert_eq!(sizes[0].members, 3);
        assert_eq!(sizes[1].cluster_id, "mid");
    }

    #[tokio::test]
    async fn largest_clusters_empty_store() {
        let store = MemoryStore::new();
        let sizes = largest_clusters(&store, 10).await.unwrap();
        assert!(sizes.is_empty());
    }
}
