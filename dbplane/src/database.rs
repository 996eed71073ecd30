use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand::RngCore;
use tracing::debug;

use crate::error::DbError;
use crate::update::{OpKind, Update};
use crate::xor;

/// One database record: an immutable, fixed-length byte sequence of size `R`.
pub type Record = Vec<u8>;

/// Flat byte-packed store of `N` equal-size records, backed by a single
/// contiguous buffer of `Capacity * R` bytes (spec §3).
///
/// Invariants: `data.len() == capacity * r`, `n <= capacity`, and record `i`
/// occupies `data[i*r..(i+1)*r]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    data: Vec<u8>,
    n: usize,
    capacity: usize,
    r: usize,
}

impl Database {
    /// Builds a database with `capacity == n` from records already in memory.
    /// All records must be exactly `r` bytes.
    pub fn from_records(records: &[Record], r: usize) -> Result<Self, DbError> {
        let mut data = vec![0u8; records.len() * r];
        for (i, rec) in records.iter().enumerate() {
            if rec.len() != r {
                return Err(DbError::SizeMismatch {
                    expected: r,
                    actual: rec.len(),
                });
            }
            data[i * r..(i + 1) * r].copy_from_slice(rec);
        }
        Ok(Self {
            n: records.len(),
            capacity: records.len(),
            r,
            data,
        })
    }

    /// Deterministic fill via a stream cipher keyed by `seed`; used by tests
    /// and benchmarks (spec §4.1). `ChaCha8` matches the PRG the original
    /// implementation seeds its databases with, so fixtures built from the
    /// same seed are byte-identical across ports.
    pub fn new_random(seed: [u8; 32], n: usize, r: usize) -> Self {
        let mut rng = ChaCha8Rng::from_seed(seed);
        let mut data = vec![0u8; n * r];
        rng.fill_bytes(&mut data);
        Self {
            n,
            capacity: n,
            r,
            data,
        }
    }

    /// A "number database": record `i` is `r` bytes all of value `i as u8`.
    /// Handy for smoke tests (spec §8, scenario S1).
    pub fn number_db(n: usize, r: usize) -> Self {
        let mut data = vec![0u8; n * r];
        for i in 0..n {
            let byte = (i & 0xFF) as u8;
            data[i * r..(i + 1) * r].fill(byte);
        }
        Self {
            n,
            capacity: n,
            r,
            data,
        }
    }

    /// Rebuilds a database directly from its raw parts, as the persistence
    /// envelope's decoder does (spec §6). Trusts the caller that
    /// `data.len() == capacity * r`.
    pub fn from_raw(data: Vec<u8>, n: usize, capacity: usize, r: usize) -> Result<Self, DbError> {
        if data.len() != capacity * r {
            return Err(DbError::SizeMismatch {
                expected: capacity * r,
                actual: data.len(),
            });
        }
        Ok(Self { data, n, capacity, r })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record_size(&self) -> usize {
        self.r
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn bounds_check(&self, idx: usize) -> Result<(), DbError> {
        if idx >= self.capacity {
            return Err(DbError::Bounds {
                idx,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Returns a copy of record `i`. Fails if `i >= capacity`.
    pub fn get(&self, i: usize) -> Result<Record, DbError> {
        self.bounds_check(i)?;
        Ok(self.data[i * self.r..(i + 1) * self.r].to_vec())
    }

    /// Returns `num` consecutive records starting at `start`.
    pub fn get_range(&self, start: usize, num: usize) -> Result<Vec<Record>, DbError> {
        let mut out = Vec::with_capacity(num);
        for i in start..start + num {
            out.push(self.get(i)?);
        }
        Ok(out)
    }

    /// Overwrites slot `i`. Fails if `i >= capacity` or `v.len() != r`.
    pub fn set(&mut self, i: usize, v: &[u8]) -> Result<(), DbError> {
        self.bounds_check(i)?;
        if v.len() != self.r {
            return Err(DbError::SizeMismatch {
                expected: self.r,
                actual: v.len(),
            });
        }
        self.data[i * self.r..(i + 1) * self.r].copy_from_slice(v);
        Ok(())
    }

    /// Advances the live record count by `k` without touching capacity.
    /// Callers that write records beyond the old `n` (TAPIR's
    /// partition-aware update path) must extend capacity first.
    pub fn bump_n(&mut self, k: usize) {
        self.n += k;
    }

    /// Reallocates so `capacity = n + k`.
    pub fn extend_capacity(&mut self, k: usize) {
        let new_capacity = self.n + k;
        let mut new_data = vec![0u8; new_capacity * self.r];
        new_data[..self.data.len()].copy_from_slice(&self.data);
        self.data = new_data;
        self.capacity = new_capacity;
        debug!(new_capacity, "database capacity extended");
    }

    /// Applies a non-partitioned update batch: every `Edit` first, in order,
    /// then capacity grows once by the number of `Add`s and they are
    /// appended in order, incrementing `n` per append (spec §4.1). TAPIR does
    /// not use this path; its partition-aware update lives in the `tapir`
    /// crate, which buckets by partition before touching capacity.
    pub fn apply(&mut self, updates: &[Update]) -> Result<(), DbError> {
        let mut adds = Vec::new();
        for u in updates {
            match u.op {
                OpKind::Edit => self.set(u.idx, &u.val)?,
                OpKind::Add => adds.push(u),
            }
        }
        if !adds.is_empty() {
            self.extend_capacity(adds.len());
            for u in adds {
                let idx = self.n;
                self.set(idx, &u.val)?;
                self.n += 1;
            }
        }
        Ok(())
    }

    /// XOR of all records whose bit is set in `bitvec` (little-endian,
    /// LSB-first, `ceil(n/8)` bytes).
    pub fn vector_prod(&self, bitvec: &[u8]) -> Result<Record, DbError> {
        let mut out = vec![0u8; self.r];
        xor::xor_rows_by_bitvector(&self.data, self.n, self.r, bitvec, &mut out)?;
        Ok(out)
    }

    /// Treats the database as an `H x W` record matrix (`W = ceil(sqrt(N*R)/R)`,
    /// `H = ceil(N/W)`) and returns the XOR of all rows whose bit is set in
    /// `bitvec`, zero-extending any row tail that runs past the live data
    /// (spec §4.1).
    pub fn flat_bool_mul(&self, bitvec: &[u8]) -> Record {
        let total_bytes = (self.n as f64) * (self.r as f64);
        let w = ((total_bytes.sqrt() / self.r as f64).ceil() as usize).max(1);
        let h = (self.n + w - 1) / w;
        let row_bytes = w * self.r;
        let mut out = vec![0u8; row_bytes];

        for i in 0..h {
            let bit_set = (bitvec[i / 8] >> (i % 8)) & 1 != 0;
            if !bit_set {
                continue;
            }
            let start = i * row_bytes;
            if start >= self.data.len() {
                continue; // entirely beyond live data: implicitly all-zero
            }
            let end = (start + row_bytes).min(self.data.len());
            for (o, b) in out.iter_mut().zip(&self.data[start..end]) {
                *o ^= b;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_db_smoke() {
        let db = Database::number_db(100, 16);
        assert_eq!(db.get(37).unwrap(), vec![37u8; 16]);
    }

    #[test]
    fn set_get_roundtrip() {
        let mut db = Database::number_db(8, 4);
        db.set(3, &[9, 9, 9, 9]).unwrap();
        assert_eq!(db.get(3).unwrap(), vec![9, 9, 9, 9]);
    }

    #[test]
    fn get_out_of_bounds_errors() {
        let db = Database::number_db(4, 4);
        assert!(matches!(db.get(4), Err(DbError::Bounds { .. })));
    }

    #[test]
    fn extend_capacity_preserves_data() {
        let mut db = Database::number_db(4, 4);
        db.extend_capacity(4);
        assert_eq!(db.capacity(), 8);
        assert_eq!(db.get(2).unwrap(), vec![2, 2, 2, 2]);
    }

    #[test]
    fn apply_edits_then_adds() {
        let mut db = Database::number_db(4, 4);
        let updates = vec![
            Update::edit(0, vec![0xAA; 4]),
            Update::add(vec![0xBB; 4]),
            Update::add(vec![0xCC; 4]),
        ];
        db.apply(&updates).unwrap();
        assert_eq!(db.n(), 6);
        assert_eq!(db.get(0).unwrap(), vec![0xAA; 4]);
        assert_eq!(db.get(4).unwrap(), vec![0xBB; 4]);
        assert_eq!(db.get(5).unwrap(), vec![0xCC; 4]);
    }

    #[test]
    fn vector_prod_xors_selected_records() {
        let db = Database::number_db(8, 16);
        // record 0 is all 0x00, record 1 is all 0x01; selecting both XORs to all 0x01.
        let out = db.vector_prod(&[0b0000_0011]).unwrap();
        assert_eq!(out, vec![1u8; 16]);
    }

    #[test]
    fn flat_bool_mul_matches_manual_row_xor() {
        let db = Database::new_random([7u8; 32], 64, 32);
        let total_bytes = 64.0 * 32.0;
        let w = (total_bytes.sqrt() / 32.0).ceil() as usize;
        let h = (64 + w - 1) / w;
        let bitvec_len = (h + 7) / 8;
        let bitvec = vec![0xFFu8; bitvec_len];
        let out = db.flat_bool_mul(&bitvec);
        assert_eq!(out.len(), w * 32);

        // Manually XOR every row.
        let mut expected = vec![0u8; w * 32];
        for i in 0..h {
            let start = i * w * 32;
            let end = (start + w * 32).min(db.data().len());
            if start >= db.data().len() {
                continue;
            }
            for (o, b) in expected.iter_mut().zip(&db.data()[start..end]) {
                *o ^= b;
            }
        }
        assert_eq!(out, expected);
    }
}
