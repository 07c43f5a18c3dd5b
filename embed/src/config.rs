/// Builder-style configuration for embedder implementations.
#[derive(Debug, Clone)]
pub struct EmbedConfig {
    pub base_url: String,
    pub api_key: String,
    pub dimension: usize,
}

impl EmbedConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            dimension: 0,
        }
    }

    /// Expected output dimension; 0 disables the check.
    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.dimension = dim;
        self
    }
}
