//! Error taxonomy shared by every decoder.
//!
//! The policy split is deliberate: binary fixed-layout formats (EDF, NIfTI,
//! binary STL) are strict, because a partial binary decode risks silent data
//! corruption. Text formats (CSV, XYZ, PCD) are lenient and skip malformed
//! rows instead of failing the whole file.

/// Errors that can occur while decoding a source file.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The buffer ends before a structurally required byte range.
    ///
    /// Always fatal for the current decode call; fixed binary layouts are
    /// never padded with zeros.
    #[error("truncated input: needed {expected} bytes, buffer has {actual}")]
    TruncatedInput {
        /// Number of bytes the layout requires up to and including the field.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// A structurally present field failed to parse as its expected type.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Recognized format family, but a variant this crate does not decode.
    #[error("unsupported variant: {0}")]
    UnsupportedVariant(String),

    /// Decoded mesh or point data violates a structural invariant.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}

impl DecodeError {
    /// Build a `TruncatedInput` from a required byte count and a buffer length.
    pub(crate) fn truncated(expected: usize, actual: usize) -> Self {
        Self::TruncatedInput { expected, actual }
    }

    /// Build a `MalformedHeader` with a formatted message.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedHeader(message.into())
    }
}
