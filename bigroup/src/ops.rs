use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup, Group, VariableBaseMSM};
use ark_ff::{Field, PrimeField, UniformRand, Zero};
use ark_std::ops::Mul;
use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::error::BigroupError;
use crate::{Bn254, Gt, Scalar, G1, G1Proj, G2, G2Proj};

/// Samples a uniformly random scalar from a CSPRNG.
pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    Scalar::rand(rng)
}

pub fn g1_generator() -> G1 {
    G1::generator()
}

pub fn g2_generator() -> G2 {
    G2::generator()
}

/// `base^scalar` in `G1` (additive notation: `base * scalar`).
pub fn g1_mul(base: &G1, scalar: &Scalar) -> G1 {
    base.mul(*scalar).into_affine()
}

/// `base^scalar` in `G2`.
pub fn g2_mul(base: &G2, scalar: &Scalar) -> G2 {
    base.mul(*scalar).into_affine()
}

pub fn g1_add(a: &G1, b: &G1) -> G1 {
    (a.into_group() + b.into_group()).into_affine()
}

pub fn g1_sub(a: &G1, b: &G1) -> G1 {
    (a.into_group() - b.into_group()).into_affine()
}

/// The pairing `e: G2 x G1 -> Gt`, matching the order spec.md §4.3 names it in.
pub fn pairing(g2_elem: &G2, g1_elem: &G1) -> Gt {
    Bn254::pairing(*g1_elem, *g2_elem)
}

/// `gt^scalar`.
pub fn gt_pow(base: &Gt, scalar: &Scalar) -> Gt {
    base.mul(*scalar)
}

/// Hashes arbitrary bytes into `Zr` via SHA-256 and a big-endian
/// mod-order reduction (matches the record-to-scalar injection's byte
/// order convention; see `vc::record_to_scalar`).
pub fn hash_to_scalar(bytes: &[u8]) -> Scalar {
    let digest = Sha256::digest(bytes);
    Scalar::from_be_bytes_mod_order(&digest)
}

/// The generalized pairing inner product `prod_i e(g2s[i], g1s[i])`, computed
/// additively in `Gt` (spec §4.3).
pub fn inner_product(g1s: &[G1], g2s: &[G2]) -> Result<Gt, BigroupError> {
    if g1s.len() != g2s.len() {
        return Err(BigroupError::LengthMismatch {
            a: g1s.len(),
            b: g2s.len(),
        });
    }
    let mut acc = Gt::zero();
    for (g1, g2) in g1s.iter().zip(g2s.iter()) {
        acc += pairing(g2, g1);
    }
    Ok(acc)
}

/// `G1s * Zrs`: scalar-vector multiplication, element-wise.
pub fn g1s_scale(g1s: &[G1], scalars: &[Scalar]) -> Result<Vec<G1>, BigroupError> {
    if g1s.len() != scalars.len() {
        return Err(BigroupError::LengthMismatch {
            a: g1s.len(),
            b: scalars.len(),
        });
    }
    Ok(g1s
        .iter()
        .zip(scalars.iter())
        .map(|(g, s)| g1_mul(g, s))
        .collect())
}

/// Sums a slice of `G1` points.
pub fn g1_sum(points: &[G1]) -> G1 {
    let mut acc = G1Proj::zero();
    for p in points {
        acc += p.into_group();
    }
    acc.into_affine()
}

/// `G1s * Zrs`, summed — a multi-scalar multiplication.
pub fn g1_msm(g1s: &[G1], scalars: &[Scalar]) -> Result<G1, BigroupError> {
    if g1s.len() != scalars.len() {
        return Err(BigroupError::LengthMismatch {
            a: g1s.len(),
            b: scalars.len(),
        });
    }
    G1Proj::msm(g1s, scalars)
        .map(|p| p.into_affine())
        .map_err(|_| BigroupError::Malformed("msm: bases/scalars length mismatch".into()))
}

/// Inner product of two scalar vectors, into a scalar.
pub fn scalar_inner_product(a: &[Scalar], b: &[Scalar]) -> Result<Scalar, BigroupError> {
    if a.len() != b.len() {
        return Err(BigroupError::LengthMismatch { a: a.len(), b: b.len() });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| *x * y).sum())
}

#[allow(dead_code)]
fn _assert_field_bounds<F: Field>() {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairing_bilinearity() {
        let mut rng = ark_std::test_rng();
        let a = random_scalar(&mut rng);
        let b = random_scalar(&mut rng);
        let g1 = g1_generator();
        let g2 = g2_generator();

        let lhs = pairing(&g2_mul(&g2, &a), &g1_mul(&g1, &b));
        let rhs = gt_pow(&pairing(&g2, &g1), &(a * b));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn inner_product_matches_sum_of_pairings() {
        let mut rng = ark_std::test_rng();
        let g1s = vec![g1_generator(), g1_mul(&g1_generator(), &random_scalar(&mut rng))];
        let g2s = vec![g2_generator(), g2_mul(&g2_generator(), &random_scalar(&mut rng))];
        let ip = inner_product(&g1s, &g2s).unwrap();
        let expected = pairing(&g2s[0], &g1s[0]) + pairing(&g2s[1], &g1s[1]);
        assert_eq!(ip, expected);
    }

    #[test]
    fn msm_matches_manual_sum() {
        let mut rng = ark_std::test_rng();
        let g1s: Vec<G1> = (0..4).map(|_| g1_mul(&g1_generator(), &random_scalar(&mut rng))).collect();
        let scalars: Vec<Scalar> = (0..4).map(|_| random_scalar(&mut rng)).collect();
        let msm = g1_msm(&g1s, &scalars).unwrap();
        let manual = g1_sum(&g1s_scale(&g1s, &scalars).unwrap());
        assert_eq!(msm, manual);
    }

    #[test]
    fn hash_to_scalar_is_deterministic() {
        let a = hash_to_scalar(b"tapir");
        let b = hash_to_scalar(b"tapir");
        assert_eq!(a, b);
        let c = hash_to_scalar(b"tapir2");
        assert_ne!(a, c);
    }
}
