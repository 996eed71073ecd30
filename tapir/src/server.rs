//! The TAPIR server side (spec §4.7): offline digest/proof generation and
//! online answering, plus the partition-aware update path that folds
//! commitment patching and delta computation into one pass over the
//! touched partitions.

use dbplane::{Database, OpKind, Record, Update};
use tracing::debug;
use vc::{Proof, VcKind, VcScheme};

use crate::error::TapirError;
use crate::types::{Answer, Digest, HintQuery, HintResp, Query};

pub struct Server {
    db: Database,
    proofs: Vec<Proof>,
    q: usize,
    m: usize,
    /// 0 for the offline server, 1 for the online server. Purely
    /// informational: the two servers run the identical algorithm.
    role: u8,
    digest: Option<Digest>,
    vc: VcScheme,
}

impl Server {
    pub fn new(db: Database, q: usize, role: u8, vc_kind: VcKind) -> Self {
        let m = db.n() / q;
        let vc = VcScheme::setup(vc_kind, m);
        Server {
            db,
            proofs: Vec::new(),
            q,
            m,
            role,
            digest: None,
            vc,
        }
    }

    pub fn role(&self) -> u8 {
        self.role
    }

    pub fn q(&self) -> usize {
        self.q
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn vc_kind(&self) -> VcKind {
        self.vc.kind()
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn digest(&self) -> Option<&Digest> {
        self.digest.as_ref()
    }

    pub fn proofs(&self) -> &[Proof] {
        &self.proofs
    }

    /// Rebuilds a server from parts recovered by the persistence decoder
    /// (spec §6). The VC back-end is never itself serialized — it carries
    /// large public parameters that are cheaply re-derived from `(vc_kind, m)` —
    /// so the caller supplies `vc_kind` explicitly, matching the original's
    /// `SetVC` reattachment step.
    pub fn from_parts(
        db: Database,
        proofs: Vec<Proof>,
        q: usize,
        role: u8,
        digest: Option<Digest>,
        vc_kind: VcKind,
    ) -> Self {
        let m = db.n() / q;
        let vc = VcScheme::setup(vc_kind, m);
        Server { db, proofs, q, m, role, digest, vc }
    }

    /// Commits every partition and caches every opening proof. Partitions
    /// are independent; a production deployment would fan this loop out
    /// across threads, but the sequential form is what this crate ships.
    pub fn gen_digest(&mut self) -> Result<Digest, TapirError> {
        let mut coms = Vec::with_capacity(self.q);
        let mut proofs = Vec::with_capacity(self.db.n());
        for q in 0..self.q {
            let recs = self.db.get_range(q * self.m, self.m)?;
            let vector = self.vc.vector_from_records(&recs)?;
            let com = self.vc.commit(&vector)?;
            for i in 0..self.m {
                proofs.push(self.vc.open(&vector, i)?);
            }
            coms.push(com);
        }
        self.proofs = proofs;
        let digest = Digest { coms };
        self.digest = Some(digest.clone());
        Ok(digest)
    }

    /// The hint phase carries no server-side computation: the client
    /// builds its own puncturable-set hint from the raw record list.
    pub fn gen_hint(&self, _hint_query: &HintQuery) -> Result<HintResp, TapirError> {
        if self.db.record_size() % 16 != 0 {
            return Err(TapirError::ProtocolInconsistency(
                "record size must be a multiple of 16 bytes".into(),
            ));
        }
        Ok(HintResp {
            answers: self.db.get_range(0, self.db.n())?,
        })
    }

    pub fn answer(&self, query: &Query) -> Result<Answer, TapirError> {
        let rec_size = self.db.record_size();
        let digest = self
            .digest
            .as_ref()
            .ok_or_else(|| TapirError::ProtocolInconsistency("answer requested before gen_digest".into()))?;

        let mut flat_records = vec![0u8; self.q * rec_size];
        let mut proofs = Vec::with_capacity(self.q);
        for i in 0..self.q {
            let col = query.indices[i] as usize;
            let rec = self.db.get(self.m * i + col)?;
            flat_records[i * rec_size..(i + 1) * rec_size].copy_from_slice(&rec);
            proofs.push(self.proofs[self.m * i + col].clone());
        }

        let agg_proof = self.vc.aggregate(&proofs, &digest.coms)?;
        Ok(Answer { flat_records, agg_proof })
    }

    /// Applies a batch of updates, bucketing by target partition, patching
    /// commitments and opening proofs in place, and rewriting each op's
    /// `val` to the XOR delta the client needs to refresh its hint
    /// (spec §4.7). Any VC or bounds failure here indicates the caller's
    /// view of the database has drifted from the server's and is fatal.
    pub fn update(&mut self, mut ops: Vec<Update>) -> Result<(usize, usize, Digest, Vec<Update>), TapirError> {
        let digest = self
            .digest
            .take()
            .ok_or_else(|| TapirError::ProtocolInconsistency("update requested before gen_digest".into()))?;
        let mut coms = digest.coms;

        let mut add_ctr = 0usize;
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); self.q];
        for (i, op) in ops.iter_mut().enumerate() {
            if op.op == OpKind::Add {
                op.idx = self.db.n() + add_ctr;
                add_ctr += 1;
            }
            let part = op.idx / self.m;
            if part >= buckets.len() {
                buckets.resize(part + 1, Vec::new());
            }
            buckets[part].push(i);
        }

        for (part, members) in buckets.iter().enumerate() {
            if members.is_empty() {
                continue;
            }

            if part >= self.q {
                if members.len() > self.m {
                    return Err(TapirError::ProtocolInconsistency(
                        "number of ops too big for new partition".into(),
                    ));
                }
                self.db.extend_capacity(self.m);

                for &i in members {
                    let op = &ops[i];
                    self.db.set(op.idx, &op.val)?;
                }
                self.db.bump_n(members.len());

                let recs = self.db.get_range(part * self.m, self.m)?;
                let vector = self.vc.vector_from_records(&recs)?;
                let com = self.vc.commit(&vector)?;
                coms.push(com);

                for m in 0..self.m {
                    self.proofs.push(self.vc.open(&vector, m)?);
                }
            } else {
                let recs = self.db.get_range(part * self.m, self.m)?;
                let mut vector = self.vc.vector_from_records(&recs)?;
                let mut com = coms[part].clone();

                for &i in members {
                    let local_idx = ops[i].idx % self.m;
                    let val_old: Record = self.db.get(ops[i].idx)?;

                    self.db.set(ops[i].idx, &ops[i].val)?;
                    if ops[i].op == OpKind::Add {
                        self.db.bump_n(1);
                    }

                    let patch = Update { op: ops[i].op, idx: local_idx, val: ops[i].val.clone() };
                    com = self.vc.update(com, &mut vector, &patch)?;

                    let mut delta = val_old;
                    dbplane::xor::xor_into(&mut delta, &ops[i].val)?;
                    ops[i].val = delta;
                }
                coms[part] = com;

                for m in 0..self.m {
                    self.proofs[m + part * self.m] = self.vc.open(&vector, m)?;
                }
            }
        }

        self.q = buckets.len();
        let new_digest = Digest { coms };
        self.digest = Some(new_digest.clone());
        debug!(n = self.db.n(), q = self.q, "tapir server update applied");
        Ok((self.db.n(), self.q, new_digest, ops))
    }
}
