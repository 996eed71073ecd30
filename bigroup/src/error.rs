/// Errors from the bilinear-group wrapper.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum BigroupError {
    /// A deserialized element's curve tag did not match what the caller
    /// expected — mixed-curve arithmetic failing fast (spec §4.3).
    #[error("curve/group tag mismatch: expected {expected:#x}, got {actual:#x}")]
    TagMismatch { expected: u8, actual: u8 },

    #[error("malformed group element bytes: {0}")]
    Malformed(String),

    #[error("vector length mismatch: {a} vs {b}")]
    LengthMismatch { a: usize, b: usize },
}
