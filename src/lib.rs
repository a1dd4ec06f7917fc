//! # Context Vault
//!
//! **A pattern-addressed blob store query and retrieval layer.**
//!
//! Context Vault ingests data from external sources into named contexts,
//! enumerates stored blobs by regex pattern over (context-name,
//! blob-name), and retrieves matching blobs' bytes under explicit
//! resource bounds: result count, total byte budget, and retrieval
//! concurrency.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌───────────────┐   ┌──────────────┐
//! │ Descriptors │──▶│  ContextOps   │──▶│ ContextStore │
//! │ file/flags  │   │ bundle/query/ │   │ (directory   │
//! └─────────────┘   │ retrieve/     │   │  or memory)  │
//!                   │ destroy       │   └──────────────┘
//!                   └───────┬───────┘
//!                           ▼
//!                     ┌──────────┐
//!                     │   CLI    │
//!                     │ (cvault) │
//!                     └──────────┘
//! ```
//!
//! The engine (pattern matching, request validation, the bounded batch
//! retriever, and the [`ContextStore`](context_vault_core::ContextStore)
//! trait) lives in `context-vault-core`. This crate supplies
//! configuration, the directory-backed store, and the command surface.
//!
//! ## Quick Start
//!
//! ```bash
//! cvault init                                        # create the store root
//! cvault bundle --src file::/tmp/a.bin --dst vault::t1
//! cvault query "t1" ".*"                             # list matching blobs
//! cvault retrieve "t1" ".*" --max-bytes 1048576      # fetch under budget
//! cvault destroy t1                                  # drop a context
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration: store root and retrieval defaults |
//! | [`dir_store`] | Directory-backed `ContextStore` (one dir per context) |
//! | [`bundle`] | Descriptor loading, directory expansion, bundle submission |
//! | [`query`] | Pattern queries over blob identities |
//! | [`retrieve`] | Bounded retrieval with digests, previews, and `--out` |
//! | [`destroy`] | Context destruction |
//!
//! ## Configuration
//!
//! Context Vault is configured via a TOML file (default:
//! `config/cvault.toml`). See [`config`] for the available options.

pub mod bundle;
pub mod config;
pub mod destroy;
pub mod dir_store;
pub mod query;
pub mod retrieve;

pub use context_vault_core::{
    BlobId, ContextOps, ContextStore, RawDescriptor, RetrievalBudget, VaultError,
};
pub use dir_store::DirStore;
