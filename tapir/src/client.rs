//! The TAPIR client side (spec §4.8): offline hint setup, online query
//! construction, answer verification + single-pass hint refresh, and the
//! update-patching path.
//!
//! State machine: `NEW -> HINTED -> (QUERIED -> HINTED)* -> (UPDATED ->
//! HINTED)*`. `hint` is `None` until `ver_setup` succeeds, which is how
//! the "no query before setup" ordering guarantee of spec §5 is enforced
//! at the type level rather than by a separate state enum.

use dbplane::{xor, OpKind, Record, Update};
use permute::{generate_perms, generate_single_perm, squash_seed};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;
use vc::{VcKind, VcScheme};

use crate::error::TapirError;
use crate::types::{Answer, Digest, Hint, HintQuery, HintResp, Query};

/// The fixed secret seed the permutation PRG is re-derived from at both
/// `request_hint` and `update_hint`. Matches the original's
/// `seedHint = [32]byte{2}` (`pir/apir_tapir.go`): a 32-byte ChaCha8 key
/// with the first byte set to 2 and the rest zero.
const SEED_HINT: [u8; 32] = {
    let mut seed = [0u8; 32];
    seed[0] = 2;
    seed
};

/// Transient state for one outstanding query, cleared on `reconstruct`.
struct PendingQuery {
    queried_idx: usize,
    row: usize,
    pos: usize,
    rand_swaps: Vec<u32>,
    set_offline: Vec<u32>,
    set_online: Vec<u32>,
}

pub struct Client {
    n: usize,
    q: usize,
    m: usize,
    r: usize,
    vc: VcScheme,
    digest: Option<Digest>,
    hint: Option<Hint>,
    /// Single client-owned PRG. Reset to a fresh `ChaCha8Rng::from_seed(SEED_HINT)`
    /// at the start of `request_hint` and `update_hint` (after which one
    /// 32-byte draw derives that call's permutation seed) and otherwise
    /// advanced by every `query`'s random-swap sampling. This mirrors the
    /// original's single `c.Prg` field exactly (see spec §9's note on the
    /// two nominally-independent PRG roles actually sharing one stream).
    prg: ChaCha8Rng,
    pending: Option<PendingQuery>,
}

impl Client {
    pub fn new(n: usize, q: usize, r: usize, vc_kind: VcKind) -> Self {
        let m = n / q;
        Client {
            n,
            q,
            m,
            r,
            vc: VcScheme::setup(vc_kind, m),
            digest: None,
            hint: None,
            prg: ChaCha8Rng::from_seed(SEED_HINT),
            pending: None,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn q(&self) -> usize {
        self.q
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }

    pub fn hint(&self) -> Option<&Hint> {
        self.hint.as_ref()
    }

    /// Resets `self.prg` to a fresh stream keyed by [`SEED_HINT`] and draws
    /// the 32-byte block both `request_hint` and `update_hint` squash into
    /// a permutation seed (spec §4.8, §9).
    fn derive_perm_seed(&mut self) -> u64 {
        self.prg = ChaCha8Rng::from_seed(SEED_HINT);
        let mut buf = [0u8; 32];
        self.prg.fill_bytes(&mut buf);
        squash_seed(&buf)
    }

    fn digests_equal(&self, a: &Digest, b: &Digest) -> bool {
        a.coms.len() == b.coms.len()
            && a.coms
                .iter()
                .zip(b.coms.iter())
                .all(|(x, y)| self.vc.equal_commitments(x, y))
    }

    /// Offline phase, step 1: derive this session's permutation seed and
    /// lay out `Q` independent length-`M` permutations. The returned
    /// queries carry no data — both servers are simply asked for their
    /// full record set by `gen_hint`.
    pub fn request_hint(&mut self) -> (HintQuery, HintQuery) {
        let seed = self.derive_perm_seed();
        let (perm, inv) = generate_perms(self.n, self.q, seed);

        let mut idx_to_set_idx = Vec::with_capacity(self.q);
        let mut set_idx_to_idx = Vec::with_capacity(self.q);
        for part in 0..self.q {
            idx_to_set_idx.push(perm[part * self.m..(part + 1) * self.m].to_vec());
            set_idx_to_idx.push(inv[part * self.m..(part + 1) * self.m].to_vec());
        }

        self.hint = Some(Hint {
            parities: Vec::new(),
            idx_to_set_idx,
            set_idx_to_idx,
        });
        (HintQuery, HintQuery)
    }

    /// Offline phase, step 2: checks that the two servers agree on digest
    /// and raw records, then folds the raw database into `M` parities,
    /// one XOR per puncturable set (spec §3, §4.8).
    pub fn ver_setup(
        &mut self,
        d0: Digest,
        d1: Digest,
        resp0: HintResp,
        resp1: HintResp,
    ) -> Result<(Digest, &Hint), TapirError> {
        if !self.digests_equal(&d0, &d1) {
            return Err(TapirError::AuthFailure("vector commitments are not equal".into()));
        }
        if resp0.answers.len() != resp1.answers.len() {
            return Err(TapirError::SizeMismatch {
                expected: resp0.answers.len(),
                actual: resp1.answers.len(),
            });
        }
        for i in 0..resp0.answers.len() {
            if resp0.answers[i] != resp1.answers[i] {
                return Err(TapirError::AuthFailure("received databases not equal".into()));
            }
        }

        let hint = self
            .hint
            .as_mut()
            .ok_or_else(|| TapirError::ProtocolInconsistency("ver_setup called before request_hint".into()))?;

        let mut parities = vec![vec![0u8; self.r]; self.m];
        for s in 0..self.m {
            for part in 0..self.q {
                let idx = part * self.m + hint.idx_to_set_idx[part][s] as usize;
                xor::xor_into(&mut parities[s], &resp0.answers[idx])?;
            }
        }
        hint.parities = parities;
        self.digest = Some(d0.clone());
        Ok((d0, hint))
    }

    /// Online phase: builds the offline/online index pair for database
    /// index `i`. The online query's row-`row` entry is deliberately
    /// swapped away from the true column — that substitution, and the
    /// client reinserting the hint's parity in its place at reconstruction
    /// time, is the hiding step that keeps the query private (spec §4.8).
    pub fn query(&mut self, i: usize) -> Result<(Query, Query), TapirError> {
        if i >= self.m * self.q {
            return Err(TapirError::Bounds { idx: i, limit: self.m * self.q });
        }
        let hint = self
            .hint
            .as_ref()
            .ok_or_else(|| TapirError::ProtocolInconsistency("query called before ver_setup".into()))?;

        let row = i / self.m;
        let col = i % self.m;
        let pos = hint.set_idx_to_idx[row][col] as usize;

        let mut set_online = vec![0u32; self.q];
        let mut set_offline = vec![0u32; self.q];
        let mut rand_swaps = vec![0u32; self.q];
        for part in 0..self.q {
            set_online[part] = hint.idx_to_set_idx[part][pos];
            let swap = (self.prg.next_u64() % self.m as u64) as u32;
            rand_swaps[part] = swap;
            set_offline[part] = hint.idx_to_set_idx[part][swap as usize];
        }
        set_online[row] = hint.idx_to_set_idx[row][rand_swaps[row] as usize];

        self.pending = Some(PendingQuery {
            queried_idx: i,
            row,
            pos,
            rand_swaps,
            set_offline: set_offline.clone(),
            set_online: set_online.clone(),
        });

        Ok((Query { indices: set_offline }, Query { indices: set_online }))
    }

    /// Verifies both answers, recovers the queried record, and refreshes
    /// the hint in one pass so the same parity slot is never answered
    /// from twice with the same permutation state (spec §4.8, invariant
    /// in §3 and property 2 of §8).
    ///
    /// On `AuthFailure` the hint is left untouched: refreshing it anyway
    /// would let a malicious server degrade the client to a denial of
    /// service with no authentication benefit (spec §7).
    pub fn reconstruct(&mut self, answer0: &Answer, answer1: &Answer) -> Result<Record, TapirError> {
        let digest = self
            .digest
            .clone()
            .ok_or_else(|| TapirError::ProtocolInconsistency("reconstruct called before ver_setup".into()))?;
        let pending = self
            .pending
            .take()
            .ok_or_else(|| TapirError::ProtocolInconsistency("reconstruct called before query".into()))?;

        let r = self.r;
        if answer0.flat_records.len() != answer1.flat_records.len() {
            return Err(TapirError::SizeMismatch {
                expected: answer0.flat_records.len(),
                actual: answer1.flat_records.len(),
            });
        }
        if answer1.flat_records.len() != self.q * r {
            return Err(TapirError::SizeMismatch {
                expected: self.q * r,
                actual: answer1.flat_records.len(),
            });
        }

        let recs_off: Vec<Record> = (0..self.q).map(|i| answer0.flat_records[i * r..(i + 1) * r].to_vec()).collect();
        let recs_on: Vec<Record> = (0..self.q).map(|i| answer1.flat_records[i * r..(i + 1) * r].to_vec()).collect();
        let idxs_off: Vec<usize> = pending.set_offline.iter().map(|&x| x as usize).collect();
        let idxs_on: Vec<usize> = pending.set_online.iter().map(|&x| x as usize).collect();

        let ok_off = self
            .vc
            .verify_aggregation(&answer0.agg_proof, &digest.coms, &idxs_off, &recs_off)?;
        if !ok_off {
            return Err(TapirError::AuthFailure("answer verification failed for offline server".into()));
        }
        let ok_on = self
            .vc
            .verify_aggregation(&answer1.agg_proof, &digest.coms, &idxs_on, &recs_on)?;
        if !ok_on {
            return Err(TapirError::AuthFailure("answer verification failed for online server".into()));
        }

        let mut xor0 = vec![0u8; r];
        xor::xor_all_rows(&answer0.flat_records, self.q, r, &mut xor0)?;
        let mut xor1 = vec![0u8; r];
        xor::xor_all_rows(&answer1.flat_records, self.q, r, &mut xor1)?;

        let hint = self
            .hint
            .as_mut()
            .ok_or_else(|| TapirError::ProtocolInconsistency("reconstruct called before ver_setup".into()))?;

        let pos = pending.pos;
        let row = pending.row;
        let online_row_rec = &recs_on[row];

        let mut out = xor1.clone();
        xor::xor_into(&mut out, &hint.parities[pos])?;
        xor::xor_into(&mut out, online_row_rec)?;

        hint.parities[pos] = xor0;
        for part in 0..self.q {
            let swap = pending.rand_swaps[part] as usize;
            xor::xor_into(&mut hint.parities[swap], &recs_off[part])?;
            xor::xor_into(&mut hint.parities[swap], &recs_on[part])?;

            let a = hint.idx_to_set_idx[part][pos];
            let b = hint.idx_to_set_idx[part][swap];
            hint.idx_to_set_idx[part][pos] = b;
            hint.idx_to_set_idx[part][swap] = a;
            hint.set_idx_to_idx[part][b as usize] = pos as u32;
            hint.set_idx_to_idx[part][a as usize] = swap as u32;
        }

        let swap_row = pending.rand_swaps[row] as usize;
        xor::xor_into(&mut hint.parities[swap_row], online_row_rec)?;
        xor::xor_into(&mut hint.parities[swap_row], &out)?;

        debug!(idx = pending.queried_idx, "tapir client reconstructed record");
        Ok(out)
    }

    /// Patches the hint for a batch of server-side updates, without
    /// re-running the offline phase (spec §4.7, §4.8). Any disagreement
    /// between the two servers' reported `(N, Q, digest, ops)` aborts
    /// with the client state left at its pre-update snapshot.
    pub fn update_hint(
        &mut self,
        n0: usize,
        n1: usize,
        q0: usize,
        q1: usize,
        d0: Digest,
        d1: Digest,
        ops0: Vec<Update>,
        ops1: Vec<Update>,
    ) -> Result<(usize, usize, Digest), TapirError> {
        if n0 != n1 || q0 != q1 || !self.digests_equal(&d0, &d1) || ops0.len() != ops1.len() {
            return Err(TapirError::ProtocolInconsistency(
                "update parameters from servers do not match".into(),
            ));
        }

        let old_q = self.q;
        let seed = self.derive_perm_seed();
        let m = self.m;

        let hint = self
            .hint
            .as_mut()
            .ok_or_else(|| TapirError::ProtocolInconsistency("update_hint called before ver_setup".into()))?;

        for part in 0..q0 {
            let (lo, hi) = (part * m, (part + 1) * m);
            let members: Vec<usize> = (0..ops0.len())
                .filter(|&i| ops0[i].idx >= lo && ops0[i].idx < hi)
                .collect();
            if members.is_empty() {
                continue;
            }

            if part >= old_q {
                let (perm, inv) = generate_single_perm(m, seed);
                hint.idx_to_set_idx.push(perm);
                hint.set_idx_to_idx.push(inv);

                for &i in &members {
                    if ops0[i] != ops1[i] {
                        return Err(TapirError::ProtocolInconsistency(
                            "update operations from servers do not match".into(),
                        ));
                    }
                    if ops0[i].op != OpKind::Add {
                        return Err(TapirError::ProtocolInconsistency(
                            "only ADD ops are possible in a brand-new partition".into(),
                        ));
                    }
                    let col = ops0[i].idx % m;
                    let pos = hint.set_idx_to_idx[part][col] as usize;
                    xor::xor_into(&mut hint.parities[pos], &ops0[i].val)?;
                }
            } else {
                for &i in &members {
                    if ops0[i] != ops1[i] {
                        return Err(TapirError::ProtocolInconsistency(
                            "update operations from servers do not match".into(),
                        ));
                    }
                    let col = ops0[i].idx % m;
                    let pos = hint.set_idx_to_idx[part][col] as usize;
                    xor::xor_into(&mut hint.parities[pos], &ops0[i].val)?;
                }
            }
        }

        self.n = n0;
        self.q = q0;
        self.digest = Some(d0.clone());
        debug!(n = self.n, q = self.q, "tapir client hint updated");
        Ok((self.n, self.q, d0))
    }
}
