//! Self-describing on-disk encoding for a TAPIR server (spec §6): replay a
//! server after `gen_digest` in a later process without repeating VC setup
//! over the wire.
//!
//! The VC back-end is never itself persisted — it carries large public
//! parameters that are cheaply re-derived from `(vc_kind, m)` — so the
//! decoder's caller gets back a server that already has its back-end
//! reattached via [`crate::server::Server::from_parts`], mirroring the
//! original's `SetVC` reconstruction step (spec §9's polymorphic-dispatch
//! redesign note).

use serde::{Deserialize, Serialize};
use vc::{Commitment, Proof, VcKind, VcScheme};

use crate::error::TapirError;
use crate::server::Server;
use crate::types::Digest;

/// Tags the PIR variant a persisted server was built under. TAPIR is the
/// only variant this workspace implements, but the tag is kept distinct
/// from the envelope's absence so capability discovery stays a tagged
/// variant rather than an implicit format (spec §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PirKind {
    ApirTapir,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    pir_kind: PirKind,
    vc_kind: VcKind,
    role: u8,
    q: usize,
    n: usize,
    capacity: usize,
    r: usize,
    db_data: Vec<u8>,
    coms: Vec<Vec<u8>>,
    proofs: Vec<Vec<u8>>,
}

/// `n` is irrelevant to byte (de)serialization of a single commitment or
/// proof — only the back-end kind is — so a cheap placeholder scheme
/// drives the conversion instead of re-deriving the server's real (and
/// possibly large) public parameters.
fn scratch_scheme(vc_kind: VcKind) -> VcScheme {
    VcScheme::setup(vc_kind, 1)
}

pub fn encode(server: &Server) -> Result<Vec<u8>, TapirError> {
    let digest = server.digest().ok_or_else(|| {
        TapirError::ProtocolInconsistency("cannot persist a server before gen_digest".into())
    })?;
    let vc_kind = server.vc_kind();
    let scratch = scratch_scheme(vc_kind);

    let coms: Vec<Vec<u8>> = digest.coms.iter().map(|c| scratch.commitment_to_bytes(c)).collect();
    let proofs: Vec<Vec<u8>> = server.proofs().iter().map(|p| scratch.proof_to_bytes(p)).collect();

    let env = Envelope {
        pir_kind: PirKind::ApirTapir,
        vc_kind,
        role: server.role(),
        q: server.q(),
        n: server.db().n(),
        capacity: server.db().capacity(),
        r: server.db().record_size(),
        db_data: server.db().data().to_vec(),
        coms,
        proofs,
    };
    bincode::serialize(&env).map_err(|e| TapirError::ProtocolInconsistency(format!("server encode failed: {e}")))
}

pub fn decode(bytes: &[u8]) -> Result<Server, TapirError> {
    let env: Envelope = bincode::deserialize(bytes)
        .map_err(|e| TapirError::ProtocolInconsistency(format!("server decode failed: {e}")))?;
    match env.pir_kind {
        PirKind::ApirTapir => {}
    }

    let db = dbplane::Database::from_raw(env.db_data, env.n, env.capacity, env.r)?;
    let scratch = scratch_scheme(env.vc_kind);

    let coms: Result<Vec<Commitment>, _> = env.coms.iter().map(|b| scratch.bytes_to_commitment(b)).collect();
    let proofs: Result<Vec<Proof>, _> = env.proofs.iter().map(|b| scratch.bytes_to_proof(b)).collect();
    let digest = Digest { coms: coms? };

    Ok(Server::from_parts(db, proofs?, env.q, env.role, Some(digest), env.vc_kind))
}
