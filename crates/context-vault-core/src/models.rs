//! Core data models used throughout Context Vault.
//!
//! These types represent the blob identities and operation receipts that
//! flow through the query and retrieval pipeline.

use std::fmt;

use serde::Serialize;

/// Unique identity of a stored blob: the (context, name) pair.
///
/// Contexts group blobs; a blob name is unique within its context. The
/// pair is displayed as `context/name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BlobId {
    /// Name of the context the blob belongs to.
    pub context: String,
    /// Blob name, unique within the context.
    pub name: String,
}

impl BlobId {
    pub fn new(context: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.context, self.name)
    }
}

/// Receipt for a successful bundle submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleReceipt {
    /// Number of assimilation requests submitted to the store.
    pub submitted: usize,
}

/// Receipt for a successful context destruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DestroyReceipt {
    /// Number of contexts the store was asked to destroy.
    pub destroyed: usize,
}
