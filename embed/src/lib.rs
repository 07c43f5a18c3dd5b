//! Client for the external embedding service.
//!
//! The encoder itself (a pretrained joint vision-text model) runs elsewhere;
//! this crate only defines the seam the pipeline calls through and a REST
//! implementation of it. Embedding failures are reported, never retried —
//! callers decide whether to skip the item.

pub mod config;
pub mod embed;
pub mod error;
pub mod rest;

pub use config::EmbedConfig;
pub use embed::Embedder;
pub use error::EmbedError;
pub use rest::RestEmbedder;
