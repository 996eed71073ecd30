/// Errors from the vector commitment layer.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum VcError {
    #[error("index {idx} out of range for a vector of length {n}")]
    IndexOutOfRange { idx: usize, n: usize },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("malformed proof or commitment bytes: {0}")]
    Malformed(String),

    #[error("proof failed to verify")]
    VerificationFailed,

    #[error("operation not supported by this vector commitment backend: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Bigroup(#[from] bigroup::BigroupError),
}
