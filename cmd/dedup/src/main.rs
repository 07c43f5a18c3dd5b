//! Listing deduplication CLI.
//!
//! Clusters near-identical product listings from different retailers into
//! master clusters and persists the item -> cluster assignments.
//!
//! The storage backend and embedding service are configured through
//! environment variables:
//!   - DEDUP_STORE_URL / DEDUP_STORE_KEY: PostgREST endpoint and API key
//!   - DEDUP_EMBED_URL / DEDUP_EMBED_KEY: embedding service (backfill only)

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dedup_cluster::{ClusterConfig, RepresentativeStrategy};
use dedup_embed::{EmbedConfig, RestEmbedder};
use dedup_pipeline::RunConfig;
use dedup_store::{RestStore, StoreConfig};

#[derive(Parser)]
#[command(name = "dedup")]
#[command(about = "Cluster near-duplicate product listings across retailers")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load embeddings, cluster them and persist the assignments
    Run {
        /// Source whose listings seed the clusters
        #[arg(short = 'b', long)]
        baseline: String,

        /// Minimum cosine similarity to join a cluster
        #[arg(short = 't', long, default_value_t = 0.95)]
        threshold: f32,

        /// Only cluster items without a persisted assignment
        #[arg(long)]
        only_new: bool,

        /// Rows per upsert batch
        #[arg(long, default_value_t = 500)]
        batch_size: usize,

        /// How many of the largest clusters to report
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Track cluster representatives as running centroids
        #[arg(long)]
        centroid: bool,
    },
    /// Embed listings that have no embedding yet
    Backfill {
        /// Expected embedding dimension (0 disables the check)
        #[arg(short = 'd', long, default_value_t = 0)]
        dimension: usize,
    },
    /// Report the largest persisted clusters
    Validate {
        /// How many clusters to report
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn env_var(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("{name} is not set"))
}

fn store_from_env() -> anyhow::Result<RestStore> {
    let url = env_var("DEDUP_STORE_URL")?;
    let key = env_var("DEDUP_STORE_KEY")?;
    Ok(RestStore::new(StoreConfig::new(url, key)))
}

fn print_sizes(sizes: &[dedup_pipeline::ClusterSize]) {
    println!("Top {} largest clusters:", sizes.len());
    for size in sizes {
        println!("  {}: {} items", size.cluster_id, size.members);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    match cli.command {
        Commands::Run {
            baseline,
            threshold,
            only_new,
            batch_size,
            top,
            centroid,
        } => {
            let store = store_from_env()?;
            let mut cluster_cfg = ClusterConfig::new(baseline).with_threshold(threshold);
            if centroid {
                cluster_cfg =
                    cluster_cfg.with_representative(RepresentativeStrategy::Centroid);
            }
            let mut cfg = RunConfig::new(cluster_cfg);
            cfg.only_new = only_new;
            cfg.batch_size = batch_size;
            cfg.top = top;

            let report = dedup_pipeline::run(&store, cfg).await?;
            info!(
                loaded = report.loaded,
                clusters = report.clusters,
                written = report.write.written,
                failed = report.write.failed,
                "run complete"
            );
            print_sizes(&report.largest);
        }
        Commands::Backfill { dimension } => {
            let store = store_from_env()?;
            let url = env_var("DEDUP_EMBED_URL")?;
            let key = env_var("DEDUP_EMBED_KEY")?;
            let embedder =
                RestEmbedder::new(EmbedConfig::new(url, key).with_dimension(dimension));

            let report = dedup_pipeline::backfill_embeddings(&store, &embedder).await?;
            println!(
                "Backfill complete: {} embedded, {} skipped.",
                report.embedded, report.skipped
            );
        }
        Commands::Validate { top } => {
            let store = store_from_env()?;
            let sizes = dedup_pipeline::largest_clusters(&store, top).await?;
            print_sizes(&sizes);
        }
    }

    Ok(())
}
