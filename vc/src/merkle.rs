//! Merkle-tree vector commitment (spec §4.3, §4.4): `O(log N)` proofs with
//! no aggregation beyond naive proof-list concatenation. Grounded on
//! `modules/vc/merkle.go`'s `MerkleParams`/`MerkleVector`/`MerkleProof`
//! surface; the tree implementation itself (`modules/merkle`) wasn't part
//! of the retrieved source, so the binary tree below follows the common
//! domain-separated construction (leaf/internal hash tags distinguishing
//! the two, closing the classic second-preimage gap).

use dbplane::Record;
use sha2::{Digest, Sha256};

use crate::error::VcError;

const LEAF_TAG: u8 = 0x00;
const NODE_TAG: u8 = 0x01;

fn hash_leaf(record: &Record) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_TAG]);
    hasher.update(record);
    hasher.finalize().into()
}

fn hash_node(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([NODE_TAG]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// A Merkle inclusion proof: one sibling hash per level, root to leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub index: usize,
    pub siblings: Vec<[u8; 32]>,
}

pub fn encode_proof(proof: &MerkleProof) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + 8 + proof.siblings.len() * 32);
    out.extend_from_slice(&(proof.index as u64).to_le_bytes());
    out.extend_from_slice(&(proof.siblings.len() as u64).to_le_bytes());
    for s in &proof.siblings {
        out.extend_from_slice(s);
    }
    out
}

pub fn decode_proof(bytes: &[u8]) -> Result<MerkleProof, VcError> {
    if bytes.len() < 16 {
        return Err(VcError::Malformed("merkle proof too short".into()));
    }
    let index = u64::from_le_bytes(bytes[0..8].try_into().unwrap()) as usize;
    let count = u64::from_le_bytes(bytes[8..16].try_into().unwrap()) as usize;
    let rest = &bytes[16..];
    if rest.len() != count * 32 {
        return Err(VcError::Malformed("merkle proof sibling count mismatch".into()));
    }
    let siblings = rest.chunks_exact(32).map(|c| c.try_into().unwrap()).collect();
    Ok(MerkleProof { index, siblings })
}

/// Verifies a proof against a root without needing the whole tree.
pub fn verify_proof(record: &Record, proof: &MerkleProof, idx: usize, root: [u8; 32]) -> bool {
    if proof.index != idx {
        return false;
    }
    let mut acc = hash_leaf(record);
    let mut pos = idx;
    for sib in &proof.siblings {
        acc = if pos % 2 == 0 {
            hash_node(&acc, sib)
        } else {
            hash_node(sib, &acc)
        };
        pos /= 2;
    }
    acc == root
}

/// A full Merkle tree over a fixed-length record vector, rebuilt whenever
/// a leaf changes or a record is appended. `N log N` instead of `log N`
/// per update, traded for a much simpler, obviously-correct implementation
/// — acceptable since commit/open/verify, not update throughput, dominate
/// the point-proof-vs-Merkle comparison this backend exists to provide.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    leaves: Vec<[u8; 32]>,
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    pub fn from_records(records: &[Record]) -> Self {
        let leaves: Vec<[u8; 32]> = records.iter().map(hash_leaf).collect();
        let levels = Self::build_levels(&leaves);
        MerkleTree { leaves, levels }
    }

    fn build_levels(leaves: &[[u8; 32]]) -> Vec<Vec<[u8; 32]>> {
        if leaves.is_empty() {
            return vec![vec![[0u8; 32]]];
        }
        let mut levels = vec![leaves.to_vec()];
        while levels.last().unwrap().len() > 1 {
            let cur = levels.last().unwrap();
            let mut next = Vec::with_capacity((cur.len() + 1) / 2);
            let mut i = 0;
            while i < cur.len() {
                let left = &cur[i];
                let right = if i + 1 < cur.len() { &cur[i + 1] } else { &cur[i] };
                next.push(hash_node(left, right));
                i += 2;
            }
            levels.push(next);
        }
        levels
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn root(&self) -> [u8; 32] {
        self.levels.last().unwrap()[0]
    }

    pub fn generate_proof(&self, idx: usize) -> Result<MerkleProof, VcError> {
        if idx >= self.leaves.len() {
            return Err(VcError::IndexOutOfRange { idx, n: self.leaves.len() });
        }
        let mut siblings = Vec::with_capacity(self.levels.len() - 1);
        let mut pos = idx;
        for level in &self.levels[..self.levels.len() - 1] {
            let sib_pos = if pos % 2 == 0 {
                if pos + 1 < level.len() { pos + 1 } else { pos }
            } else {
                pos - 1
            };
            siblings.push(level[sib_pos]);
            pos /= 2;
        }
        Ok(MerkleProof { index: idx, siblings })
    }

    /// In-place edit of an existing record.
    pub fn update_leaf(&mut self, idx: usize, record: &Record) -> Result<[u8; 32], VcError> {
        if idx >= self.leaves.len() {
            return Err(VcError::IndexOutOfRange { idx, n: self.leaves.len() });
        }
        self.leaves[idx] = hash_leaf(record);
        self.levels = Self::build_levels(&self.leaves);
        Ok(self.root())
    }

    /// Appends a new record, growing the tree by one leaf.
    pub fn append_leaf(&mut self, record: &Record) -> [u8; 32] {
        self.leaves.push(hash_leaf(record));
        self.levels = Self::build_levels(&self.leaves);
        self.root()
    }
}
