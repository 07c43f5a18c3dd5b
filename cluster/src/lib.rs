//! Groups near-identical product listings from different retailers into
//! shared master clusters, using cosine similarity over joint image+text
//! embeddings.
//!
//! # Usage
//!
//! ```
//! use dedup_cluster::{ClusterConfig, Engine, Item};
//!
//! let cfg = ClusterConfig::new("baseline-shop.example");
//! let items = vec![Item {
//!     id: "listing-1".into(),
//!     source: "baseline-shop.example".into(),
//!     embedding: vec![1.0, 0.0, 0.0],
//! }];
//! let outcome = Engine::new(cfg).cluster(&items).unwrap();
//! assert_eq!(outcome.clusters.len(), 1);
//! ```
//!
//! # Design
//!
//! Listings from the baseline source each seed their own cluster without any
//! similarity comparison; every other listing greedily joins the most similar
//! existing cluster that does not already contain its source, or starts a new
//! one. A cluster's representative is the embedding of the item that created
//! it; under the default [`RepresentativeStrategy::Static`] it is never
//! recomputed, so earlier members never drift the anchor that later members
//! are compared against.
//!
//! The single greedy pass is order-sensitive: clusters are scanned in
//! creation order and ties keep the earliest-created cluster, so a run over
//! the same items in the same order always produces the same grouping.

mod cosine;
mod engine;
mod error;
mod types;

pub use cosine::cosine_similarity;
pub use engine::{ClusterConfig, ClusterOutcome, Engine, RepresentativeStrategy};
pub use error::ClusterError;
pub use types::{Assignment, Cluster, Item};
