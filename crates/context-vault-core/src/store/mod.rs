//! Storage abstraction for Context Vault.
//!
//! The [`ContextStore`] trait defines the narrow contract the query and
//! retrieval engine consumes from a storage backend, enabling pluggable
//! implementations (in-memory, directory-backed, remote engines).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! Store-level verdicts travel as status codes: `0` is success and any
//! non-zero value is surfaced verbatim to the caller inside a
//! [`Submission`](crate::error::VaultError::Submission) or
//! [`Destruction`](crate::error::VaultError::Destruction) error.

pub mod memory;

use std::path::Path;

use async_trait::async_trait;

use crate::error::VaultResult;
use crate::models::BlobId;
use crate::request::AssimilationRequest;

/// Locator scheme for filesystem sources (`file::/path/to/data`).
pub const FILE_SCHEME: &str = "file";

/// Split a scheme-qualified locator into `(scheme, rest)`.
///
/// A locator without a `::` separator has no scheme; the whole string is
/// the rest.
pub fn split_locator(locator: &str) -> (Option<&str>, &str) {
    match locator.split_once("::") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, locator),
    }
}

/// Context name addressed by a destination locator.
///
/// The scheme designates the store and is opaque at this layer; the rest
/// is the context name.
pub fn context_of(dst: &str) -> &str {
    split_locator(dst).1
}

/// Blob name a source locator assimilates under: the basename of its path
/// portion. `None` when the path has no terminal component.
pub fn source_blob_name(src: &str) -> Option<String> {
    let (_, path) = split_locator(src);
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Slice `bytes` to the descriptor's byte range.
///
/// `range_size = 0` reads from `range_off` to the end; out-of-range
/// offsets clamp to an empty slice.
pub fn apply_range(bytes: Vec<u8>, range_off: u64, range_size: u64) -> Vec<u8> {
    let len = bytes.len() as u64;
    let start = range_off.min(len);
    let end = if range_size == 0 {
        len
    } else {
        start.saturating_add(range_size).min(len)
    };
    if start == 0 && end == len {
        return bytes;
    }
    bytes[start as usize..end as usize].to_vec()
}

/// Abstract storage backend for Context Vault.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`submit_assimilation`](ContextStore::submit_assimilation) | Ingest validated requests, returning the store's status code |
/// | [`enumerate_blobs`](ContextStore::enumerate_blobs) | List blob identities matching a pattern pair, in the store's stable enumeration order |
/// | [`fetch_blob`](ContextStore::fetch_blob) | Read one blob's bytes |
/// | [`destroy_contexts`](ContextStore::destroy_contexts) | Remove whole contexts with their blobs, returning the store's status code |
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Submit a batch of validated assimilation requests.
    ///
    /// Returns the store's status code: `0` on success, non-zero when the
    /// store rejected or partially failed the batch.
    async fn submit_assimilation(&self, requests: &[AssimilationRequest]) -> VaultResult<u32>;

    /// Enumerate blob identities whose context and name full-match the
    /// respective patterns.
    ///
    /// `limit = 0` returns every match; `limit = N` stops after N matches
    /// without scanning the remainder of the store. The order is the
    /// store's natural enumeration order: stable for a fixed store state,
    /// but callers must not rely on it across structural changes.
    async fn enumerate_blobs(
        &self,
        context_pattern: &str,
        blob_pattern: &str,
        limit: usize,
    ) -> VaultResult<Vec<BlobId>>;

    /// Read one blob's bytes.
    async fn fetch_blob(&self, id: &BlobId) -> VaultResult<Vec<u8>>;

    /// Destroy each named context and all of its blobs, atomically per
    /// name. Returns the store's status code; destroying an absent context
    /// is not an error.
    async fn destroy_contexts(&self, names: &[String]) -> VaultResult<u32>;
}
