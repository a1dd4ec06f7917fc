//! # Context Vault CLI (`cvault`)
//!
//! The `cvault` binary is the primary interface for Context Vault. It
//! provides commands for store initialization, bundle submission, pattern
//! queries, bounded retrieval, and context destruction.
//!
//! ## Usage
//!
//! ```bash
//! cvault --config ./config/cvault.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cvault init` | Create the store root directory |
//! | `cvault bundle` | Validate and submit assimilation descriptors |
//! | `cvault query <ctx-re> <blob-re>` | List blob identities matching both patterns |
//! | `cvault retrieve <ctx-re> <blob-re>` | Fetch matching blobs under a budget |
//! | `cvault destroy <name>...` | Destroy contexts and all their blobs |
//! | `cvault completions <shell>` | Generate shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # Initialize the store
//! cvault init --config ./config/cvault.toml
//!
//! # Assimilate a single file
//! cvault bundle --src file::/tmp/data.bin --dst vault::my_dataset
//!
//! # Assimilate a whole directory, one blob per file
//! cvault bundle --src file::/data/runs --dst vault::experiments
//!
//! # Submit a descriptor file (ranges, formats, dependencies)
//! cvault bundle descriptors.json
//!
//! # List everything in a context
//! cvault query "my_dataset" ".*"
//!
//! # Fetch up to 500 blobs within a 512 MiB budget, 16 fetches in flight
//! cvault retrieve "large_dataset" "chunk_.*" --max-results 500 \
//!     --max-bytes 536870912 --window 16
//!
//! # Drop temporary contexts
//! cvault destroy temp_1 temp_2
//! ```

mod bundle;
mod config;
mod destroy;
mod dir_store;
mod query;
mod retrieve;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use context_vault_core::RetrievalBudget;

use crate::bundle::SingleDescriptor;

/// Context Vault CLI — a pattern-addressed blob store query and retrieval
/// layer.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/cvault.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "cvault",
    about = "Context Vault — a pattern-addressed blob store query and retrieval layer",
    version,
    long_about = "Context Vault ingests data from external sources into named contexts, \
    enumerates stored blobs by regex pattern over (context, blob) names, and retrieves \
    matching blobs' bytes under explicit resource bounds."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/cvault.toml`. The store root and retrieval
    /// defaults are read from this file.
    #[arg(long, global = true, default_value = "./config/cvault.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the store root directory.
    ///
    /// Creates the directory configured in `[store].root`. This command is
    /// idempotent; running it multiple times is safe.
    Init,

    /// Validate and submit assimilation descriptors.
    ///
    /// Either pass a JSON file holding an array of descriptors, or
    /// describe a single source with `--src`/`--dst`. A `--src` naming a
    /// directory expands into one descriptor per contained file. The
    /// bundle is all-or-nothing: one malformed descriptor rejects the
    /// whole submission.
    Bundle {
        /// JSON file holding an array of raw descriptors. Takes
        /// precedence over `--src`/`--dst`.
        file: Option<PathBuf>,

        /// Source locator, e.g. `file::/tmp/data.bin`.
        #[arg(long)]
        src: Option<String>,

        /// Destination locator, e.g. `vault::my_dataset`.
        #[arg(long)]
        dst: Option<String>,

        /// Data format tag (default: `binary`).
        #[arg(long)]
        format: Option<String>,

        /// Byte offset into the source.
        #[arg(long)]
        range_off: Option<u64>,

        /// Number of bytes to read from the source (0 = to end).
        #[arg(long)]
        range_size: Option<u64>,
    },

    /// List blob identities matching a (context, blob) pattern pair.
    ///
    /// Both patterns are regular expressions matched against full names;
    /// use `.*` to match any name. Zero matches is a normal outcome, not
    /// an error.
    Query {
        /// Context name pattern.
        context_pattern: String,

        /// Blob name pattern.
        blob_pattern: String,

        /// Maximum number of identities to return (0 = unlimited).
        #[arg(long, default_value_t = 0)]
        max_results: usize,

        /// Emit the identities as a JSON array.
        #[arg(long)]
        json: bool,
    },

    /// Fetch matching blobs under a retrieval budget.
    ///
    /// Matches like `query`, then fetches the blobs concurrently while
    /// honoring the result-count bound, the total byte budget, and the
    /// concurrency window. Defaults for the bounds come from
    /// `[retrieval]` in the config file.
    Retrieve {
        /// Context name pattern.
        context_pattern: String,

        /// Blob name pattern.
        blob_pattern: String,

        /// Maximum number of blobs to fetch (0 = unlimited).
        #[arg(long)]
        max_results: Option<usize>,

        /// Total byte budget over fetched payloads.
        #[arg(long)]
        max_bytes: Option<u64>,

        /// Maximum concurrently in-flight fetches.
        #[arg(long)]
        window: Option<usize>,

        /// Also write each fetched blob to `<dir>/<context>/<name>`.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Destroy contexts and all their blobs.
    ///
    /// Destruction is atomic per named context. Destroying an absent
    /// context is not an error.
    Destroy {
        /// Names of the contexts to destroy.
        names: Vec<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Completions don't need a config file.
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            tokio::fs::create_dir_all(&cfg.store.root).await?;
            println!("initialized store at {}", cfg.store.root.display());
        }
        Commands::Bundle {
            file,
            src,
            dst,
            format,
            range_off,
            range_size,
        } => {
            let single = match (&src, &dst) {
                (Some(src), Some(dst)) => Some(SingleDescriptor {
                    src,
                    dst,
                    format: format.as_deref(),
                    range_off,
                    range_size,
                }),
                _ => None,
            };
            bundle::run_bundle(&cfg, file.as_deref(), single).await?;
        }
        Commands::Query {
            context_pattern,
            blob_pattern,
            max_results,
            json,
        } => {
            query::run_query(&cfg, &context_pattern, &blob_pattern, max_results, json).await?;
        }
        Commands::Retrieve {
            context_pattern,
            blob_pattern,
            max_results,
            max_bytes,
            window,
            out,
        } => {
            let budget = RetrievalBudget::new(
                max_results.unwrap_or(cfg.retrieval.max_results),
                max_bytes.unwrap_or(cfg.retrieval.max_total_bytes),
                window.unwrap_or(cfg.retrieval.window),
            );
            retrieve::run_retrieve(&cfg, &context_pattern, &blob_pattern, budget, out.as_deref())
                .await?;
        }
        Commands::Destroy { names } => {
            destroy::run_destroy(&cfg, &names).await?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
