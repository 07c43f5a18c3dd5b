use thiserror::Error;

use dedup_cluster::ClusterError;
use dedup_embed::EmbedError;
use dedup_store::StoreError;

/// Errors that abort a pipeline pass.
///
/// Row-scoped problems (a malformed embedding, one failed write batch, one
/// failed embedding call) are logged and skipped instead of surfacing here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error("pipeline: bad embedding row: {0}")]
    Data(String),
}
