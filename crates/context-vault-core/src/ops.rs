//! The four context operations: bundle, query, retrieve, destroy.
//!
//! [`ContextOps`] composes the pattern matcher, the request builder, and
//! the bounded batch retriever over an explicitly injected
//! [`ContextStore`]. Owning the store handle (instead of reaching for a
//! process-wide singleton) lets callers run multiple independent
//! instances and tear stores down deterministically in tests.
//!
//! Input validation always happens before the store is involved: an empty
//! bundle, an empty context list, or an uncompilable pattern never reaches
//! the backend.

use tracing::debug;

use crate::error::{ValidationError, VaultError, VaultResult};
use crate::models::{BlobId, BundleReceipt, DestroyReceipt};
use crate::pattern::PatternMatcher;
use crate::request::{self, RawDescriptor};
use crate::retrieve::{retrieve_batch, RetrievalBudget, RetrievalReport};
use crate::store::ContextStore;

/// The public operations facade over one store.
pub struct ContextOps<S> {
    store: S,
}

impl<S: ContextStore> ContextOps<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The injected store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate, default, and submit a bundle of raw descriptors.
    ///
    /// All-or-nothing: the first malformed descriptor fails the whole
    /// bundle and nothing is submitted. A non-zero store status surfaces
    /// as [`VaultError::Submission`].
    pub async fn bundle(&self, descriptors: &[RawDescriptor]) -> VaultResult<BundleReceipt> {
        let requests = request::build_bundle(descriptors)?;
        debug!(count = requests.len(), "submitting assimilation bundle");
        let code = self.store.submit_assimilation(&requests).await?;
        if code != 0 {
            return Err(VaultError::Submission { code });
        }
        Ok(BundleReceipt {
            submitted: requests.len(),
        })
    }

    /// Enumerate blob identities full-matching both patterns.
    ///
    /// `max_results = 0` returns every match. Zero matches is a normal
    /// empty result, never an error.
    pub async fn query(
        &self,
        context_pattern: &str,
        blob_pattern: &str,
        max_results: usize,
    ) -> VaultResult<Vec<BlobId>> {
        // Compile first so a bad pattern fails here, not inside the store.
        PatternMatcher::compile(context_pattern, blob_pattern)?;
        self.store
            .enumerate_blobs(context_pattern, blob_pattern, max_results)
            .await
    }

    /// Query, then fetch the matching blobs under `budget`.
    ///
    /// The report's blob order equals the query order for the same
    /// patterns; per-blob fetch failures are collected in the report
    /// rather than aborting the call.
    pub async fn retrieve(
        &self,
        context_pattern: &str,
        blob_pattern: &str,
        budget: RetrievalBudget,
    ) -> VaultResult<RetrievalReport> {
        let identities = self
            .query(context_pattern, blob_pattern, budget.max_results)
            .await?;
        if identities.is_empty() {
            return Ok(RetrievalReport::default());
        }
        let store = &self.store;
        let report = retrieve_batch(identities, &budget, |id| async move {
            store.fetch_blob(&id).await
        })
        .await;
        Ok(report)
    }

    /// Destroy each named context and all of its blobs.
    ///
    /// Idempotent at this layer: whether destroying an absent context
    /// counts as success is the store's call, surfaced through its status
    /// code as [`VaultError::Destruction`] when non-zero.
    pub async fn destroy(&self, contexts: &[String]) -> VaultResult<DestroyReceipt> {
        if contexts.is_empty() {
            return Err(ValidationError::EmptyContextList.into());
        }
        debug!(count = contexts.len(), "destroying contexts");
        let code = self.store.destroy_contexts(contexts).await?;
        if code != 0 {
            return Err(VaultError::Destruction { code });
        }
        Ok(DestroyReceipt {
            destroyed: contexts.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::request::AssimilationRequest;
    use crate::store::memory::MemoryStore;

    /// Counts store calls so tests can prove validation short-circuits.
    #[derive(Default)]
    struct ProbeStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ContextStore for ProbeStore {
        async fn submit_assimilation(&self, _: &[AssimilationRequest]) -> VaultResult<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }

        async fn enumerate_blobs(&self, _: &str, _: &str, _: usize) -> VaultResult<Vec<BlobId>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn fetch_blob(&self, id: &BlobId) -> VaultResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(VaultError::BlobNotFound(id.clone()))
        }

        async fn destroy_contexts(&self, _: &[String]) -> VaultResult<u32> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(0)
        }
    }

    fn descriptor(src: &str, dst: &str) -> RawDescriptor {
        RawDescriptor {
            src: Some(src.to_string()),
            dst: Some(dst.to_string()),
            ..RawDescriptor::default()
        }
    }

    fn write_source(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> String {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        format!("file::{}", path.display())
    }

    #[tokio::test]
    async fn test_empty_bundle_fails_without_store_call() {
        let ops = ContextOps::new(ProbeStore::default());
        let err = ops.bundle(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            VaultError::Validation(ValidationError::EmptyBundle)
        ));
        assert_eq!(ops.store().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_destroy_fails_without_store_call() {
        let ops = ContextOps::new(ProbeStore::default());
        let err = ops.destroy(&[]).await.unwrap_err();
        assert!(matches!(
            err,
            VaultError::Validation(ValidationError::EmptyContextList)
        ));
        assert_eq!(ops.store().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_descriptor_fails_whole_bundle() {
        let ops = ContextOps::new(ProbeStore::default());
        let descriptors = vec![descriptor("file::/a", "vault::t"), RawDescriptor::default()];
        let err = ops.bundle(&descriptors).await.unwrap_err();
        assert!(matches!(
            err,
            VaultError::Validation(ValidationError::MissingField { index: 1, .. })
        ));
        assert_eq!(ops.store().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_pattern_fails_before_store_call() {
        let ops = ContextOps::new(ProbeStore::default());
        let err = ops.query("(", ".*", 0).await.unwrap_err();
        assert!(matches!(err, VaultError::Pattern { .. }));
        assert_eq!(ops.store().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submission_failure_surfaces_store_code() {
        let ops = ContextOps::new(MemoryStore::new());
        let err = ops
            .bundle(&[descriptor("file::/no/such/source", "vault::t1")])
            .await
            .unwrap_err();
        match err {
            VaultError::Submission { code } => assert_ne!(code, 0),
            other => panic!("expected Submission error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_returns_empty_for_no_matches() {
        let ops = ContextOps::new(MemoryStore::new());
        let matches = ops.query("anything", ".*", 0).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_query_limit_is_prefix_of_unbounded() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c", "d", "e"] {
            store.put("ctx", name, vec![0]);
        }
        let ops = ContextOps::new(store);
        let all = ops.query("ctx", ".*", 0).await.unwrap();
        let three = ops.query("ctx", ".*", 3).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(three.len(), 3);
        assert_eq!(&all[..3], &three[..]);
    }

    #[tokio::test]
    async fn test_retrieve_order_equals_query_order() {
        let store = MemoryStore::new();
        store.put("ctx", "c", vec![3]);
        store.put("ctx", "a", vec![1]);
        store.put("ctx", "b", vec![2]);
        let ops = ContextOps::new(store);

        let queried = ops.query("ctx", ".*", 0).await.unwrap();
        let report = ops
            .retrieve("ctx", ".*", RetrievalBudget::new(0, 0, 2))
            .await
            .unwrap();
        let retrieved: Vec<BlobId> = report.blobs.iter().map(|b| b.id.clone()).collect();
        assert_eq!(queried, retrieved);
    }

    #[tokio::test]
    async fn test_retrieve_zero_matches_is_empty_report() {
        let ops = ContextOps::new(MemoryStore::new());
        let report = ops
            .retrieve("ghost", ".*", RetrievalBudget::new(0, 1 << 20, 8))
            .await
            .unwrap();
        assert!(report.blobs.is_empty());
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_bundle_query_retrieve_destroy_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let payload = b"roundtrip payload";
        let src = write_source(&dir, "a.bin", payload);
        let ops = ContextOps::new(MemoryStore::new());

        let receipt = ops.bundle(&[descriptor(&src, "vault::ctxA")]).await.unwrap();
        assert_eq!(receipt.submitted, 1);

        let matches = ops.query("ctxA", ".*", 0).await.unwrap();
        assert_eq!(matches, vec![BlobId::new("ctxA", "a.bin")]);

        let report = ops
            .retrieve("ctxA", ".*", RetrievalBudget::new(0, 1 << 20, 8))
            .await
            .unwrap();
        assert_eq!(report.blobs.len(), 1);
        assert_eq!(report.blobs[0].bytes, payload);
        assert_eq!(report.total_bytes, payload.len() as u64);

        let receipt = ops.destroy(&["ctxA".to_string()]).await.unwrap();
        assert_eq!(receipt.destroyed, 1);
        assert!(ops.query("ctxA", ".*", 0).await.unwrap().is_empty());
    }
}
