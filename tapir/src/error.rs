/// Errors from the TAPIR client/server protocol (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum TapirError {
    #[error("index {idx} out of bounds (limit {limit})")]
    Bounds { idx: usize, limit: usize },

    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Raised whenever the two servers' responses disagree on something
    /// that must be identical by protocol construction: digests, record
    /// values, update batches. A real deployment treats this as evidence
    /// one server is faulty or malicious.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// The client and server sides of a multi-step exchange are out of
    /// sync (e.g. `query` called before `ver_setup`, or mismatched batch
    /// shapes between update and update_hint).
    #[error("protocol inconsistency: {0}")]
    ProtocolInconsistency(String),

    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    #[error(transparent)]
    Db(#[from] dbplane::DbError),

    #[error(transparent)]
    Vc(#[from] vc::VcError),
}
