//! Deterministic puncturable-set permutations (spec §4.6). Both servers
//! and the client must derive bit-for-bit identical permutations from the
//! same seed, so the shuffle is driven by `ChaCha8Rng` — a deterministic,
//! cryptographically-sound stream cipher PRG — rather than the platform
//! RNG, matching the original's `math/rand/v2.NewChaCha8`.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn rng_from_seed(seed: u64) -> ChaCha8Rng {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    ChaCha8Rng::from_seed(bytes)
}

/// Fisher-Yates over `{0,...,len-1}`, consuming `rng`. Returns the
/// permutation and its position-wise inverse.
fn shuffle_with_inverse(len: usize, rng: &mut ChaCha8Rng) -> (Vec<u32>, Vec<u32>) {
    let mut perm: Vec<u32> = (0..len as u32).collect();
    for i in (1..len).rev() {
        let j = (rng.next_u32() as usize) % (i + 1);
        perm.swap(i, j);
    }
    let mut inv = vec![0u32; len];
    for (pos, &val) in perm.iter().enumerate() {
        inv[val as usize] = pos as u32;
    }
    (perm, inv)
}

/// Produces `q` independent length-`m` permutations (`n = q*m`), laid out
/// consecutively, plus their position-wise inverses. The same `seed` on
/// the same `(n, q)` always produces the same output.
pub fn generate_perms(n: usize, q: usize, seed: u64) -> (Vec<u32>, Vec<u32>) {
    assert_eq!(n % q, 0, "n must be a multiple of q");
    let m = n / q;
    let mut rng = rng_from_seed(seed);
    let mut perms = Vec::with_capacity(n);
    let mut invs = Vec::with_capacity(n);
    for _ in 0..q {
        let (p, i) = shuffle_with_inverse(m, &mut rng);
        perms.extend(p);
        invs.extend(i);
    }
    (perms, invs)
}

/// The single-partition variant, used when a new partition is appended
/// during an update (spec §4.6, §4.7).
pub fn generate_single_perm(m: usize, seed: u64) -> (Vec<u32>, Vec<u32>) {
    let mut rng = rng_from_seed(seed);
    shuffle_with_inverse(m, &mut rng)
}

/// Byte-sums a 32-byte PRG-derived seed into a 64-bit integer. This
/// collapses most of the seed's entropy and is kept only because the
/// client and server must derive identical seeds bit-for-bit; see the
/// open question recorded in the workspace design notes.
pub fn squash_seed(bytes: &[u8; 32]) -> u64 {
    bytes.iter().map(|&b| b as u64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_same_seed() {
        let (p1, i1) = generate_perms(12, 3, 42);
        let (p2, i2) = generate_perms(12, 3, 42);
        assert_eq!(p1, p2);
        assert_eq!(i1, i2);
    }

    #[test]
    fn different_seeds_differ() {
        let (p1, _) = generate_perms(12, 3, 1);
        let (p2, _) = generate_perms(12, 3, 2);
        assert_ne!(p1, p2);
    }

    #[test]
    fn each_segment_is_a_valid_permutation() {
        let q = 4;
        let m = 5;
        let (perm, inv) = generate_perms(q * m, q, 7);
        for seg in 0..q {
            let slice = &perm[seg * m..seg * m + m];
            let mut sorted = slice.to_vec();
            sorted.sort();
            assert_eq!(sorted, (0..m as u32).collect::<Vec<_>>());
        }
        for seg in 0..q {
            for s in 0..m {
                let p = perm[seg * m + s] as usize;
                assert_eq!(inv[seg * m + p], s as u32);
            }
        }
    }

    #[test]
    fn single_perm_matches_one_segment_of_generate_perms_with_same_rng_state() {
        let (perm, inv) = generate_single_perm(6, 99);
        let mut sorted = perm.clone();
        sorted.sort();
        assert_eq!(sorted, (0..6u32).collect::<Vec<_>>());
        for (s, &p) in perm.iter().enumerate() {
            assert_eq!(inv[p as usize], s as u32);
        }
    }

    #[test]
    fn squash_seed_is_deterministic() {
        let bytes = [7u8; 32];
        assert_eq!(squash_seed(&bytes), squash_seed(&bytes));
        assert_eq!(squash_seed(&bytes), 7 * 32);
    }
}
