use crate::models::BlobId;

/// Caller-input problems detected before any store call.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A bundle submission with no descriptors.
    #[error("empty bundle")]
    EmptyBundle,

    /// A destruction request with no context names.
    #[error("empty context list")]
    EmptyContextList,

    /// A descriptor is missing a required field (or the field is empty).
    #[error("descriptor {index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },
}

/// Errors surfaced by vault operations.
///
/// Each variant maps to a distinct remediation: `Validation` and `Pattern`
/// mean the caller must fix its input; `Submission` and `Destruction` carry
/// the store's verbatim status code; `BlobNotFound` and `Backend` come from
/// the storage backend. No operation retries automatically.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Malformed or empty caller input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A regular expression failed to compile.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The store rejected an assimilation submission.
    #[error("assimilation rejected by store (status {code})")]
    Submission { code: u32 },

    /// The store rejected a context destruction.
    #[error("context destruction rejected by store (status {code})")]
    Destruction { code: u32 },

    /// A blob named by an enumeration no longer exists in the store.
    #[error("blob not found: {0}")]
    BlobNotFound(BlobId),

    /// Failure inside a storage backend.
    #[error("store backend error: {message}")]
    Backend { message: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;
