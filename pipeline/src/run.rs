use tracing::info;

use dedup_cluster::{ClusterConfig, Engine};
use dedup_store::{AssignmentRow, ListingStore};

use crate::error::PipelineError;
use crate::loader::load_items;
use crate::writer::{ClusterSize, WriteReport, largest_clusters, write_assignments};

/// One full deduplication pass.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub cluster: ClusterConfig,

    /// Cluster only items without a persisted assignment.
    pub only_new: bool,

    /// Rows per upsert batch. Default: 500.
    pub batch_size: usize,

    /// How many of the largest clusters to report. Default: 10.
    pub top: usize,
}

impl RunConfig {
    pub fn new(cluster: ClusterConfig) -> Self {
        Self {
            cluster,
            only_new: false,
            batch_size: 500,
            top: 10,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Items that entered clustering.
    pub loaded: usize,

    /// Clusters produced by this run.
    pub clusters: usize,

    /// Persistence outcome.
    pub write: WriteReport,

    /// Largest persisted clusters, read back after writing.
    pub largest: Vec<ClusterSize>,
}

/// Loads items, clusters them, persists the assignments and reads back the
/// cluster-size summary.
///
/// An empty load (nothing to cluster) is a clean no-op, not an error.
pub async fn run(store: &dyn ListingStore, cfg: RunConfig) -> Result<RunReport, PipelineError> {
    let items = load_items(store, cfg.only_new).await?;
    if items.is_empty() {
        info!("nothing to cluster");
        return Ok(RunReport::default());
    }

    let outcome = Engine::new(cfg.cluster).cluster(&items)?;

    let rows: Vec<AssignmentRow> = outcome
        .assignments
        .iter()
        .map(|a| AssignmentRow {
            cluster_id: a.cluster_id.clone(),
            item_id: a.item_id.clone(),
        })
        .collect();
    let write = write_assignments(store, &rows, cfg.batch_size).await;
    let largest = largest_clusters(store, cfg.top).await?;

    Ok(RunReport {
        loaded: items.len(),
        clusters: outcome.clusters.len(),
        write,
        largest,
    })
}
