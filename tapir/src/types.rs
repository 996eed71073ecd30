//! Wire types for the TAPIR offline (digest/hint) and online
//! (query/answer) phases (spec §4.7, §4.8). The original expresses these
//! as empty Go interfaces (`Digest`, `HintQuery`, `Query`, ...) satisfied
//! by a single concrete struct apiece; since TAPIR is the only PIR
//! variant this workspace implements, the interface layer collapses to
//! these concrete types directly.

use dbplane::Record;
use vc::{AggProof, Commitment};

/// The `Q` partition commitments, in partition order.
#[derive(Debug, Clone)]
pub struct Digest {
    pub coms: Vec<Commitment>,
}

/// Carries no data: both servers are simply asked for their full record
/// set. Kept as a distinct type (rather than `()`) so the wire format has
/// a stable, self-describing envelope to grow into.
#[derive(Debug, Clone, Default)]
pub struct HintQuery;

#[derive(Debug, Clone)]
pub struct HintResp {
    pub answers: Vec<Record>,
}

/// Client-side state describing how database indices are scattered across
/// the `Q` puncturable sets (spec §4.6, §4.8).
#[derive(Debug, Clone)]
pub struct Hint {
    pub parities: Vec<Record>,
    /// `idx_to_set_idx[q][s]` = the database column, within partition `q`,
    /// holding the set-position-`s` element.
    pub idx_to_set_idx: Vec<Vec<u32>>,
    /// The position-wise inverse of `idx_to_set_idx`.
    pub set_idx_to_idx: Vec<Vec<u32>>,
}

#[derive(Debug, Clone)]
pub struct Query {
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct Answer {
    pub flat_records: Vec<u8>,
    pub agg_proof: AggProof,
}
