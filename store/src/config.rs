/// Builder-style configuration for the REST store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root of the REST API, e.g. "https://project.example/rest/v1".
    pub base_url: String,

    /// API key, sent as both `apikey` and bearer token.
    pub api_key: String,

    /// Table of scraped listings (id, source, title, image_url).
    pub listings_table: String,

    /// Table of persisted embeddings (item_id, embedding).
    pub embeddings_table: String,

    /// Table of cluster assignments (cluster_id, item_id).
    pub assignments_table: String,
}

impl StoreConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            listings_table: "scraped_listings".to_string(),
            embeddings_table: "vector_storage".to_string(),
            assignments_table: "master_listings".to_string(),
        }
    }

    pub fn with_listings_table(mut self, table: &str) -> Self {
        self.listings_table = table.to_string();
        self
    }

    pub fn with_embeddings_table(mut self, table: &str) -> Self {
        self.embeddings_table = table.to_string();
        self
    }

    pub fn with_assignments_table(mut self, table: &str) -> Self {
        self.assignments_table = table.to_string();
        self
    }
}
