use std::collections::HashSet;
use std::fmt;

/// A listing to be clustered: one scraped product from one retailer.
#[derive(Debug, Clone)]
pub struct Item {
    /// Opaque unique key from the scraping pipeline.
    pub id: String,

    /// Retailer/marketplace the listing came from.
    pub source: String,

    /// Joint image+text embedding, dimension fixed by the encoder.
    pub embedding: Vec<f32>,
}

/// A group of listings believed to be the same physical product.
#[derive(Clone)]
pub struct Cluster {
    /// Freshly generated unique key.
    pub id: String,

    /// Comparison anchor. The embedding of the item that created the
    /// cluster; never recomputed under the static strategy.
    pub representative: Vec<f32>,

    /// Sources already represented in this cluster. No source appears
    /// twice among the members.
    pub sources: HashSet<String>,

    /// Number of member items.
    pub count: usize,
}

impl fmt::Debug for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cluster")
            .field("id", &self.id)
            .field("count", &self.count)
            .field("sources", &self.sources)
            .field("representative_len", &self.representative.len())
            .finish()
    }
}

/// One item -> cluster pairing produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub item_id: String,
    pub cluster_id: String,
}
