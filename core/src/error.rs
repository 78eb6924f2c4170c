//! Error types for value encoding.
//!
//! Decoding never produces errors — malformed stored data yields "no value"
//! so row fills stay resilient. Encoding failures are real errors because
//! they abort statement generation.

use thiserror::Error;

/// Errors that can occur while encoding a value for storage.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Non-finite floating point values have no SQL literal.
    #[error("non-finite real value {0} cannot be stored")]
    NonFiniteReal(f64),

    /// Sequences may only contain scalar elements.
    #[error("nested sequences cannot be encoded")]
    NestedSequence,
}

/// Convenience alias for results with [`CodecError`].
pub type Result<T> = std::result::Result<T, CodecError>;
