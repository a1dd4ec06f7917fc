//! Directory-backed [`ContextStore`]: one directory per context, one file
//! per blob.
//!
//! This is the backend the `cvault` binary runs against. Layout under the
//! configured root:
//!
//! ```text
//! <root>/
//!   <context>/
//!     <blob-name>
//! ```
//!
//! Enumeration sorts directory entries, so the order is stable for a
//! fixed store state. Context destruction removes the whole directory in
//! a single call. Per-request ingest failures are logged and folded into
//! the batch's non-zero status code, mirroring how a remote engine would
//! report a partially failed submission.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use context_vault_core::error::{VaultError, VaultResult};
use context_vault_core::models::BlobId;
use context_vault_core::pattern::PatternMatcher;
use context_vault_core::request::AssimilationRequest;
use context_vault_core::store::{
    apply_range, context_of, source_blob_name, split_locator, ContextStore, FILE_SCHEME,
};

pub struct DirStore {
    root: PathBuf,
}

/// A name usable as a single path component under the store root.
fn sane_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/') && !name.contains('\\')
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, id: &BlobId) -> VaultResult<PathBuf> {
        if !sane_component(&id.context) || !sane_component(&id.name) {
            return Err(VaultError::Backend {
                message: format!("identity `{id}` is not addressable in this store"),
            });
        }
        Ok(self.root.join(&id.context).join(&id.name))
    }

    async fn ingest(&self, request: &AssimilationRequest) -> VaultResult<()> {
        let (scheme, src_path) = split_locator(&request.src);
        match scheme {
            Some(FILE_SCHEME) | None => {}
            Some(other) => {
                return Err(VaultError::Backend {
                    message: format!("unsupported source scheme `{other}` in `{}`", request.src),
                })
            }
        }

        let context = context_of(&request.dst).to_string();
        let name = source_blob_name(&request.src).ok_or_else(|| VaultError::Backend {
            message: format!("source `{}` has no usable blob name", request.src),
        })?;
        let target = self.blob_path(&BlobId::new(context.clone(), name.clone()))?;

        let bytes = tokio::fs::read(src_path).await?;
        let bytes = apply_range(bytes, request.range_off, request.range_size);

        tokio::fs::create_dir_all(self.root.join(&context)).await?;
        tokio::fs::write(&target, &bytes).await?;
        debug!(blob = %BlobId::new(context, name), size = bytes.len(), "blob assimilated");
        Ok(())
    }

    /// Sorted names of the entries under `dir` (directories when
    /// `dirs_only`, plain files otherwise). A missing directory is an
    /// empty listing.
    async fn sorted_entries(&self, dir: &Path, dirs_only: bool) -> VaultResult<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let is_dir = entry.file_type().await?.is_dir();
            if is_dir == dirs_only {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl ContextStore for DirStore {
    async fn submit_assimilation(&self, requests: &[AssimilationRequest]) -> VaultResult<u32> {
        let mut failed = 0u32;
        for (index, request) in requests.iter().enumerate() {
            if let Err(error) = self.ingest(request).await {
                warn!(index, src = %request.src, %error, "assimilation request failed");
                failed += 1;
            }
        }
        Ok(failed)
    }

    async fn enumerate_blobs(
        &self,
        context_pattern: &str,
        blob_pattern: &str,
        limit: usize,
    ) -> VaultResult<Vec<BlobId>> {
        let matcher = PatternMatcher::compile(context_pattern, blob_pattern)?;
        let mut matched = Vec::new();
        for context in self.sorted_entries(&self.root, true).await? {
            if !matcher.matches_context(&context) {
                continue;
            }
            for name in self
                .sorted_entries(&self.root.join(&context), false)
                .await?
            {
                if matcher.matches_blob(&name) {
                    matched.push(BlobId::new(context.clone(), name));
                    if limit > 0 && matched.len() == limit {
                        return Ok(matched);
                    }
                }
            }
        }
        Ok(matched)
    }

    async fn fetch_blob(&self, id: &BlobId) -> VaultResult<Vec<u8>> {
        let path = self.blob_path(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(VaultError::BlobNotFound(id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn destroy_contexts(&self, names: &[String]) -> VaultResult<u32> {
        let mut failed = 0u32;
        for name in names {
            if !sane_component(name) {
                warn!(context = %name, "context name is not addressable in this store");
                failed += 1;
                continue;
            }
            let dir = self.root.join(name);
            match tokio::fs::remove_dir_all(&dir).await {
                Ok(()) => debug!(context = %name, "context destroyed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(error) => {
                    warn!(context = %name, %error, "context destruction failed");
                    failed += 1;
                }
            }
        }
        Ok(failed)
    }
}
