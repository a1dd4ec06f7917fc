//! Bounded retrieval of matching blobs, with digests and previews.
//!
//! Prints one block per fetched blob (size, SHA-256 digest, hex preview
//! of the leading bytes) followed by a partial-failure tally and totals.
//! With `--out <dir>`, payloads are also written to
//! `<dir>/<context>/<name>`.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use context_vault_core::{ContextOps, RetrievalBudget};

use crate::config::Config;
use crate::dir_store::DirStore;

/// Number of leading payload bytes shown in the preview line.
const PREVIEW_BYTES: usize = 32;

fn hex_preview(bytes: &[u8]) -> String {
    let shown: Vec<String> = bytes
        .iter()
        .take(PREVIEW_BYTES)
        .map(|b| format!("{b:02x}"))
        .collect();
    let mut preview = shown.join(" ");
    if bytes.len() > PREVIEW_BYTES {
        preview.push_str(" ...");
    }
    preview
}

/// CLI entry point for `cvault retrieve`.
pub async fn run_retrieve(
    config: &Config,
    context_pattern: &str,
    blob_pattern: &str,
    budget: RetrievalBudget,
    out: Option<&Path>,
) -> Result<()> {
    let ops = ContextOps::new(DirStore::new(&config.store.root));
    let report = ops.retrieve(context_pattern, blob_pattern, budget).await?;

    if report.blobs.is_empty() && report.failures.is_empty() {
        println!(
            "no blobs matched context_pattern='{}' blob_pattern='{}'",
            context_pattern, blob_pattern
        );
        return Ok(());
    }

    for blob in &report.blobs {
        println!("{}", blob.id);
        println!("  size: {} bytes", blob.bytes.len());
        println!("  sha256: {}", hex::encode(Sha256::digest(&blob.bytes)));
        println!("  preview: {}", hex_preview(&blob.bytes));

        if let Some(out_dir) = out {
            let dir = out_dir.join(&blob.id.context);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create output dir: {}", dir.display()))?;
            let path = dir.join(&blob.id.name);
            std::fs::write(&path, &blob.bytes)
                .with_context(|| format!("Failed to write blob: {}", path.display()))?;
            println!("  wrote: {}", path.display());
        }
    }

    if !report.failures.is_empty() {
        println!("failed {} blob(s):", report.failures.len());
        for failure in &report.failures {
            println!("  - {}: {}", failure.id, failure.error);
        }
    }

    println!(
        "retrieved {} blob(s), {} bytes total",
        report.blobs.len(),
        report.total_bytes
    );
    println!("ok");
    Ok(())
}
