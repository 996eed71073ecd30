/// Errors raised by the database plane and its bulk-XOR kernels.
///
/// Bounds and size-mismatch errors are the only recoverable outcomes this
/// crate produces; a caller seeing one should treat it as a programmer or
/// client/server-desync error rather than retry blindly (see spec §7).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DbError {
    #[error("index {idx} is out of bounds (capacity is {capacity})")]
    Bounds { idx: usize, capacity: usize },

    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}
