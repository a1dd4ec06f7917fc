//! Context destruction.

use anyhow::Result;

use context_vault_core::ContextOps;

use crate::config::Config;
use crate::dir_store::DirStore;

/// CLI entry point for `cvault destroy`.
pub async fn run_destroy(config: &Config, names: &[String]) -> Result<()> {
    let ops = ContextOps::new(DirStore::new(&config.store.root));
    let receipt = ops.destroy(names).await?;
    println!(
        "destroyed {} context(s): {}",
        receipt.destroyed,
        names.join(", ")
    );
    Ok(())
}
