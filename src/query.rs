//! Blob identity queries over (context-pattern, blob-pattern) pairs.

use anyhow::Result;

use context_vault_core::ContextOps;

use crate::config::Config;
use crate::dir_store::DirStore;

/// CLI entry point for `cvault query`.
pub async fn run_query(
    config: &Config,
    context_pattern: &str,
    blob_pattern: &str,
    max_results: usize,
    json: bool,
) -> Result<()> {
    let ops = ContextOps::new(DirStore::new(&config.store.root));
    let matches = ops.query(context_pattern, blob_pattern, max_results).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!(
            "no blobs matched context_pattern='{}' blob_pattern='{}'",
            context_pattern, blob_pattern
        );
        return Ok(());
    }

    println!("found {} blob(s):", matches.len());
    for id in &matches {
        println!("  - {id}");
    }
    Ok(())
}
