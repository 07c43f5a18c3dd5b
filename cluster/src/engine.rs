use std::collections::HashSet;

use tracing::{debug, info};
use uuid::Uuid;

use crate::cosine::cosine_similarity;
use crate::error::ClusterError;
use crate::types::{Assignment, Cluster, Item};

/// Controls engine behavior.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Minimum cosine similarity to join an existing cluster (inclusive).
    /// Must lie in (0, 1]. Default: 0.95.
    pub threshold: f32,

    /// Source whose listings seed the initial one-cluster-per-item set.
    /// Assumed to list each distinct product at most once.
    pub baseline_source: String,

    /// How a cluster's representative evolves as members join.
    pub representative: RepresentativeStrategy,
}

/// How a cluster's comparison anchor is maintained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepresentativeStrategy {
    /// The creating item's embedding, never recomputed.
    #[default]
    Static,

    /// Running mean over all member embeddings.
    Centroid,
}

impl ClusterConfig {
    pub fn new(baseline_source: impl Into<String>) -> Self {
        Self {
            threshold: 0.95,
            baseline_source: baseline_source.into(),
            representative: RepresentativeStrategy::default(),
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_representative(mut self, strategy: RepresentativeStrategy) -> Self {
        self.representative = strategy;
        self
    }
}

/// Result of one clustering run.
#[derive(Debug, Default)]
pub struct ClusterOutcome {
    /// All clusters, in creation order.
    pub clusters: Vec<Cluster>,

    /// One entry per input item, in processing order.
    pub assignments: Vec<Assignment>,
}

/// Single-run clustering engine.
///
/// Owns all mutable clustering state for the duration of one batch pass;
/// create a fresh engine per run.
pub struct Engine {
    cfg: ClusterConfig,
    clusters: Vec<Cluster>,
    assignments: Vec<Assignment>,
}

impl Engine {
    pub fn new(cfg: ClusterConfig) -> Self {
        Self {
            cfg,
            clusters: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// Assigns every item to a cluster and returns the full outcome.
    ///
    /// Two phases: baseline items each seed their own cluster with no
    /// similarity check, then the remaining items are processed in input
    /// order. Each joins the most similar cluster not already containing
    /// its source if the similarity reaches the threshold (inclusive), or
    /// starts a new cluster otherwise. Ties keep the earliest-created
    /// cluster.
    ///
    /// An empty input yields an empty outcome. A missing baseline source
    /// is a configuration error and aborts before any cluster is created.
    pub fn cluster(mut self, items: &[Item]) -> Result<ClusterOutcome, ClusterError> {
        if !(0.0..=1.0).contains(&self.cfg.threshold) || self.cfg.threshold == 0.0 {
            return Err(ClusterError::InvalidThreshold(self.cfg.threshold));
        }
        if items.is_empty() {
            info!("no items to cluster");
            return Ok(ClusterOutcome::default());
        }
        if !items.iter().any(|it| it.source == self.cfg.baseline_source) {
            let mut seen: Vec<&str> = items
                .iter()
                .map(|it| it.source.as_str())
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            seen.sort_unstable();
            return Err(ClusterError::BaselineMissing {
                baseline: self.cfg.baseline_source.clone(),
                seen: seen.join(", "),
            });
        }

        let baseline = self.cfg.baseline_source.clone();

        // Phase A: every baseline item seeds its own cluster.
        for item in items.iter().filter(|it| it.source == baseline) {
            self.create_cluster(item);
        }
        let seeds = self.clusters.len();
        info!(baseline = %baseline, seeds, "seeded baseline clusters");

        // Phase B: greedy assignment of everything else, in input order.
        for item in items.iter().filter(|it| it.source != baseline) {
            self.assign(item);
        }
        info!(
            items = items.len(),
            clusters = self.clusters.len(),
            "clustering complete"
        );

        Ok(ClusterOutcome {
            clusters: self.clusters,
            assignments: self.assignments,
        })
    }

    /// Creates a new cluster seeded by `item` and assigns the item to it.
    fn create_cluster(&mut self, item: &Item) {
        let cluster_id = Uuid::new_v4().to_string();
        self.clusters.push(Cluster {
            id: cluster_id.clone(),
            representative: item.embedding.clone(),
            sources: HashSet::from([item.source.clone()]),
            count: 1,
        });
        self.assignments.push(Assignment {
            item_id: item.id.clone(),
            cluster_id,
        });
    }

    /// Assigns one non-baseline item: join the best eligible cluster or
    /// start a new one.
    fn assign(&mut self, item: &Item) {
        let mut best_sim: f32 = -1.0;
        let mut best_idx: Option<usize> = None;
        for (i, c) in self.clusters.iter().enumerate() {
            // Exclusivity: a cluster never holds two items from one source.
            if c.sources.contains(&item.source) {
                continue;
            }
            let sim = cosine_similarity(&item.embedding, &c.representative);
            // Strict comparison keeps the earliest-created cluster on ties.
            if sim > best_sim {
                best_sim = sim;
                best_idx = Some(i);
            }
        }

        if let Some(idx) = best_idx {
            if best_sim >= self.cfg.threshold {
                let cluster = &mut self.clusters[idx];
                cluster.sources.insert(item.source.clone());
                if self.cfg.representative == RepresentativeStrategy::Centroid {
                    update_centroid(&mut cluster.representative, &item.embedding, cluster.count);
                }
                cluster.count += 1;
                debug!(
                    item = %item.id,
                    cluster = %cluster.id,
                    similarity = best_sim,
                    "joined cluster"
                );
                self.assignments.push(Assignment {
                    item_id: item.id.clone(),
                    cluster_id: cluster.id.clone(),
                });
                return;
            }
        }

        self.create_cluster(item);
    }
}

/// Folds `emb` into a running mean over `count` prior members.
fn update_centroid(representative: &mut [f32], emb: &[f32], count: usize) {
    if representative.len() != emb.len() {
        return;
    }
    let n = count as f32;
    for (r, &e) in representative.iter_mut().zip(emb.iter()) {
        *r = (*r * n + e) / (n + 1.0);
    }
}
