//! Assimilation request validation and defaulting.
//!
//! Raw descriptors arrive as loosely-populated dictionaries (typically
//! deserialized from a JSON bundle file). [`build_bundle`] turns them into
//! well-formed [`AssimilationRequest`]s or rejects the whole batch at the
//! first malformed entry; no partial bundle is ever submitted.
//!
//! Building performs no filesystem or network I/O; it only validates and
//! fills defaults. Reading sources is the store's job at submission time.

use serde::Deserialize;

use crate::error::ValidationError;

/// Format tag applied when a descriptor does not name one.
pub const DEFAULT_FORMAT: &str = "binary";

/// One ingestion unit as described by the caller, before validation.
///
/// Unknown field names are rejected at deserialization time, so a typo in
/// an optional field surfaces as an error instead of silently applying the
/// default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDescriptor {
    /// Source locator, e.g. `file::/tmp/data.bin`. Required.
    pub src: Option<String>,
    /// Destination locator, e.g. `vault::my_dataset`. Required.
    pub dst: Option<String>,
    /// Data format tag. Defaults to `binary`.
    pub format: Option<String>,
    /// Identifier of a request this one depends on. Defaults to none.
    pub depends_on: Option<String>,
    /// Byte offset into the source. Defaults to 0.
    pub range_off: Option<u64>,
    /// Number of bytes to read from the source; 0 reads to the end.
    pub range_size: Option<u64>,
    /// Source authentication token. Defaults to empty.
    pub src_token: Option<String>,
    /// Destination authentication token. Defaults to empty.
    pub dst_token: Option<String>,
}

/// A validated, fully-defaulted ingestion unit, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssimilationRequest {
    pub src: String,
    pub dst: String,
    pub format: String,
    pub depends_on: String,
    pub range_off: u64,
    pub range_size: u64,
    pub src_token: String,
    pub dst_token: String,
}

fn required<'a>(
    index: usize,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField { index, field }),
    }
}

/// Validate one descriptor and apply defaults.
///
/// `index` is the descriptor's position in its bundle, used for error
/// reporting.
pub fn build_request(
    index: usize,
    raw: &RawDescriptor,
) -> Result<AssimilationRequest, ValidationError> {
    let src = required(index, "src", raw.src.as_deref())?;
    let dst = required(index, "dst", raw.dst.as_deref())?;

    Ok(AssimilationRequest {
        src: src.to_string(),
        dst: dst.to_string(),
        format: raw
            .format
            .clone()
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string()),
        depends_on: raw.depends_on.clone().unwrap_or_default(),
        range_off: raw.range_off.unwrap_or(0),
        range_size: raw.range_size.unwrap_or(0),
        src_token: raw.src_token.clone().unwrap_or_default(),
        dst_token: raw.dst_token.clone().unwrap_or_default(),
    })
}

/// Validate a whole bundle, all-or-nothing.
///
/// Fails with [`ValidationError::EmptyBundle`] on empty input and with the
/// first offending descriptor's index otherwise.
pub fn build_bundle(
    descriptors: &[RawDescriptor],
) -> Result<Vec<AssimilationRequest>, ValidationError> {
    if descriptors.is_empty() {
        return Err(ValidationError::EmptyBundle);
    }
    descriptors
        .iter()
        .enumerate()
        .map(|(index, raw)| build_request(index, raw))
        .collect()
}
