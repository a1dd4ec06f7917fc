//! In-memory [`ContextStore`] implementation for testing and embedding.
//!
//! Contexts map to blobs behind a `std::sync::RwLock`; `BTreeMap`s keep
//! the enumeration order stable. Only `file::` sources are supported:
//! assimilation reads the file, applies the byte range, and stores the
//! payload under the source's basename. Requests are applied in submission
//! order, so a `depends_on` naming an earlier request in the same bundle
//! is trivially satisfied; the identifier is otherwise ignored here.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{VaultError, VaultResult};
use crate::models::BlobId;
use crate::pattern::PatternMatcher;
use crate::request::AssimilationRequest;

use super::{apply_range, context_of, source_blob_name, split_locator, ContextStore, FILE_SCHEME};

/// In-memory store with stable, sorted enumeration order.
pub struct MemoryStore {
    contexts: RwLock<BTreeMap<String, BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            contexts: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert a blob directly, bypassing assimilation. Test setup helper.
    pub fn put(&self, context: &str, name: &str, bytes: Vec<u8>) {
        let mut contexts = self.contexts.write().unwrap();
        contexts
            .entry(context.to_string())
            .or_default()
            .insert(name.to_string(), bytes);
    }

    fn ingest(&self, request: &AssimilationRequest) -> VaultResult<()> {
        let (scheme, path) = split_locator(&request.src);
        match scheme {
            Some(FILE_SCHEME) | None => {}
            Some(other) => {
                return Err(VaultError::Backend {
                    message: format!("unsupported source scheme `{other}` in `{}`", request.src),
                })
            }
        }

        let context = context_of(&request.dst);
        if context.is_empty() {
            return Err(VaultError::Backend {
                message: format!("destination `{}` names no context", request.dst),
            });
        }
        let name = source_blob_name(&request.src).ok_or_else(|| VaultError::Backend {
            message: format!("source `{}` has no usable blob name", request.src),
        })?;

        let bytes = std::fs::read(path)?;
        let bytes = apply_range(bytes, request.range_off, request.range_size);

        let mut contexts = self.contexts.write().unwrap();
        contexts
            .entry(context.to_string())
            .or_default()
            .insert(name, bytes);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for MemoryStore {
    async fn submit_assimilation(&self, requests: &[AssimilationRequest]) -> VaultResult<u32> {
        let mut failed = 0u32;
        for (index, request) in requests.iter().enumerate() {
            if let Err(error) = self.ingest(request) {
                warn!(index, src = %request.src, %error, "assimilation request failed");
                failed += 1;
            }
        }
        debug!(
            submitted = requests.len() as u32 - failed,
            failed, "assimilation batch applied"
        );
        Ok(failed)
    }

    async fn enumerate_blobs(
        &self,
        context_pattern: &str,
        blob_pattern: &str,
        limit: usize,
    ) -> VaultResult<Vec<BlobId>> {
        let matcher = PatternMatcher::compile(context_pattern, blob_pattern)?;
        let contexts = self.contexts.read().unwrap();
        let candidates = contexts
            .iter()
            .filter(|(context, _)| matcher.matches_context(context))
            .flat_map(|(context, blobs)| {
                blobs
                    .keys()
                    .map(move |name| BlobId::new(context.clone(), name.clone()))
            });
        Ok(matcher.filter(candidates, limit))
    }

    async fn fetch_blob(&self, id: &BlobId) -> VaultResult<Vec<u8>> {
        let contexts = self.contexts.read().unwrap();
        contexts
            .get(&id.context)
            .and_then(|blobs| blobs.get(&id.name))
            .cloned()
            .ok_or_else(|| VaultError::BlobNotFound(id.clone()))
    }

    async fn destroy_contexts(&self, names: &[String]) -> VaultResult<u32> {
        let mut contexts = self.contexts.write().unwrap();
        for name in names {
            if contexts.remove(name).is_some() {
                debug!(context = %name, "context destroyed");
            }
        }
        Ok(0)
    }
}
