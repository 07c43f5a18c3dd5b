use crate::error::EmbedError;

/// Embedder converts a listing's title and image into one dense float32
/// vector.
///
/// Implementations must be safe for concurrent use (Send + Sync).
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Return the joint embedding for one listing.
    async fn embed(&self, title: &str, image_url: &str) -> Result<Vec<f32>, EmbedError>;

    /// Return the dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
