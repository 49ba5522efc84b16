//! Error taxonomy for field spec operations.

use thiserror::Error;

/// Error raised by a field spec operation.
///
/// [`MalformedFrame`](SpecError::MalformedFrame) is frame-scoped: the
/// payload is too short or structurally broken for the spec that raised
/// it, and the caller is expected to drop the offending frame while the
/// rest of the tag stays usable. Every other kind is a hard failure of
/// the individual call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The frame payload cannot be decoded by this spec.
    #[error("malformed frame data: {0}")]
    MalformedFrame(&'static str),
    /// A value is outside the representable range of its wire form.
    #[error("value out of range: {0}")]
    Range(&'static str),
    /// A sized field was given a value of the wrong length.
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length required by the spec.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// A value has the wrong type or shape for this spec.
    #[error("invalid format: {0}")]
    Format(&'static str),
}

impl SpecError {
    /// True for errors scoped to a single frame rather than the whole call.
    pub fn is_frame_local(&self) -> bool {
        matches!(self, SpecError::MalformedFrame(_))
    }
}
