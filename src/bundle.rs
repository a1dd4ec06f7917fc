//! Bundle submission: validate descriptors and hand them to the store.
//!
//! Descriptors come from one of two places:
//!
//! - a JSON file holding an array of raw descriptors (`cvault bundle
//!   descriptors.json`), or
//! - `--src`/`--dst` flags describing a single source. A `--src` that
//!   names a directory expands into one descriptor per contained file, so
//!   a whole dataset can be assimilated in one call.

use std::path::Path;

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use context_vault_core::store::split_locator;
use context_vault_core::{ContextOps, RawDescriptor};

use crate::config::Config;
use crate::dir_store::DirStore;

/// Flags for a single-descriptor bundle.
pub struct SingleDescriptor<'a> {
    pub src: &'a str,
    pub dst: &'a str,
    pub format: Option<&'a str>,
    pub range_off: Option<u64>,
    pub range_size: Option<u64>,
}

fn descriptor_for(src: String, single: &SingleDescriptor<'_>) -> RawDescriptor {
    RawDescriptor {
        src: Some(src),
        dst: Some(single.dst.to_string()),
        format: single.format.map(str::to_string),
        range_off: single.range_off,
        range_size: single.range_size,
        ..RawDescriptor::default()
    }
}

/// Expand `--src`/`--dst` flags into descriptors.
///
/// A source locator whose path is a directory yields one descriptor per
/// regular file underneath it (recursively); anything else passes through
/// as a single descriptor.
pub fn expand_descriptors(single: &SingleDescriptor<'_>) -> Result<Vec<RawDescriptor>> {
    let (_, path) = split_locator(single.src);
    if !Path::new(path).is_dir() {
        return Ok(vec![descriptor_for(single.src.to_string(), single)]);
    }

    if single.range_off.is_some() || single.range_size.is_some() {
        bail!("byte ranges apply to single-file sources, not directories");
    }

    let mut descriptors = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            descriptors.push(descriptor_for(
                format!("file::{}", entry.path().display()),
                single,
            ));
        }
    }
    if descriptors.is_empty() {
        bail!("directory source `{}` contains no files", single.src);
    }
    Ok(descriptors)
}

/// Read an array of raw descriptors from a JSON bundle file.
pub fn read_descriptor_file(path: &Path) -> Result<Vec<RawDescriptor>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor file: {}", path.display()))?;
    let descriptors: Vec<RawDescriptor> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse descriptor file: {}", path.display()))?;
    Ok(descriptors)
}

/// CLI entry point for `cvault bundle`.
pub async fn run_bundle(
    config: &Config,
    file: Option<&Path>,
    single: Option<SingleDescriptor<'_>>,
) -> Result<()> {
    let descriptors = match (file, single) {
        (Some(path), _) => read_descriptor_file(path)?,
        (None, Some(single)) => expand_descriptors(&single)?,
        (None, None) => bail!("provide a descriptor file or --src and --dst"),
    };

    let ops = ContextOps::new(DirStore::new(&config.store.root));
    let receipt = ops.bundle(&descriptors).await?;

    println!("bundle");
    println!("  descriptors: {}", descriptors.len());
    println!("  submitted: {}", receipt.submitted);
    println!("ok");
    Ok(())
}
