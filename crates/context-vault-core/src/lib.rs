//! # Context Vault Core
//!
//! Engine logic for Context Vault: the blob identity model, full-match
//! pattern filtering, assimilation request validation, bounded batched
//! retrieval, the storage abstraction, and the operations facade.
//!
//! This crate contains no CLI, configuration, or filesystem-walking
//! dependencies; storage backends beyond the in-memory one live in the
//! application crate.

pub mod error;
pub mod models;
pub mod ops;
pub mod pattern;
pub mod request;
pub mod retrieve;
pub mod store;

pub use error::{ValidationError, VaultError, VaultResult};
pub use models::{BlobId, BundleReceipt, DestroyReceipt};
pub use ops::ContextOps;
pub use pattern::PatternMatcher;
pub use request::{AssimilationRequest, RawDescriptor};
pub use retrieve::{RetrievalBudget, RetrievalReport, RetrievedBlob, DEFAULT_WINDOW};
pub use store::ContextStore;
