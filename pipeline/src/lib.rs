//! Batch passes over the listing store.
//!
//! Data flows strictly loader -> engine -> writer within one run; nothing
//! feeds back. The loader materializes all embeddings in memory, the engine
//! owns the in-run cluster state, and the writer persists assignments
//! best-effort in fixed-size batches.

pub mod backfill;
pub mod error;
pub mod loader;
pub mod run;
pub mod writer;

pub use backfill::{BackfillReport, backfill_embeddings};
pub use error::PipelineError;
pub use loader::load_items;
pub use run::{RunConfig, RunReport, run};
pub use writer::{ClusterSize, WriteReport, largest_clusters, write_assignments};
