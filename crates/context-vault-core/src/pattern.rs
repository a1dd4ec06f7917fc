//! Full-match pattern filtering over blob identities.
//!
//! A [`PatternMatcher`] evaluates two independent regular expressions, one
//! against context names and one against blob names. Both expressions are
//! implicitly anchored, so `data` matches only the name `data`, never
//! `metadata`. Use `.*` to match any name.

use regex::Regex;

use crate::error::{VaultError, VaultResult};
use crate::models::BlobId;

/// Compiled (context-pattern, blob-pattern) pair.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    context: Regex,
    blob: Regex,
}

/// Anchor an expression so it must match the full name.
fn anchored(pattern: &str) -> VaultResult<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| VaultError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl PatternMatcher {
    /// Compile both expressions, reporting the offending one on failure.
    pub fn compile(context_pattern: &str, blob_pattern: &str) -> VaultResult<Self> {
        Ok(Self {
            context: anchored(context_pattern)?,
            blob: anchored(blob_pattern)?,
        })
    }

    /// Whether a context name matches the context expression in full.
    pub fn matches_context(&self, context: &str) -> bool {
        self.context.is_match(context)
    }

    /// Whether a blob name matches the blob expression in full.
    pub fn matches_blob(&self, name: &str) -> bool {
        self.blob.is_match(name)
    }

    /// Whether both halves of an identity match.
    pub fn is_match(&self, id: &BlobId) -> bool {
        self.matches_context(&id.context) && self.matches_blob(&id.name)
    }

    /// Filter identities in enumeration order.
    ///
    /// `limit = 0` keeps every match; `limit = N` stops consuming the input
    /// as soon as N matches are found, so callers can hand in a lazy
    /// enumeration without paying for the remainder of the store.
    pub fn filter<I>(&self, identities: I, limit: usize) -> Vec<BlobId>
    where
        I: IntoIterator<Item = BlobId>,
    {
        let mut matched = Vec::new();
        for id in identities {
            if self.is_match(&id) {
                matched.push(id);
                if limit > 0 && matched.len() == limit {
                    break;
                }
            }
        }
        matched
    }
}
