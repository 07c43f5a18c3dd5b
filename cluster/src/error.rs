use thiserror::Error;

/// Errors returned by clustering operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster: baseline source {baseline:?} absent from loaded items (saw: {seen})")]
    BaselineMissing { baseline: String, seen: String },

    #[error("cluster: similarity threshold {0} outside (0, 1]")]
    InvalidThreshold(f32),
}
