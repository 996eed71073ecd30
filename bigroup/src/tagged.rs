//! Curve/group-tagged serialization.
//!
//! Arkworks already makes mixed-curve arithmetic a compile error (a
//! `G1Affine<Bn254>` and a `G1Affine<SomeOtherCurve>` are different Rust
//! types), but that protection evaporates the moment an element crosses the
//! wire as bytes. Every group element this crate serializes is therefore
//! prefixed with a one-byte tag identifying both the curve and the group it
//! belongs to, so a corrupted or cross-curve payload is rejected before the
//! expensive canonical deserialization even runs (spec §4.3).

use crate::error::BigroupError;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

/// BN254 tag family. A second curve, if ever added, would get its own
/// `0xCn` family so no tag byte is shared across curves.
pub const TAG_BN254_SCALAR: u8 = 0xB0;
pub const TAG_BN254_G1: u8 = 0xB1;
pub const TAG_BN254_G2: u8 = 0xB2;
pub const TAG_BN254_GT: u8 = 0xB3;

pub fn serialize_tagged<T: CanonicalSerialize>(tag: u8, val: &T) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + val.compressed_size());
    buf.push(tag);
    val.serialize_compressed(&mut buf)
        .expect("serialization into a Vec is infallible");
    buf
}

pub fn deserialize_tagged<T: CanonicalDeserialize>(tag: u8, bytes: &[u8]) -> Result<T, BigroupError> {
    let (actual, rest) = bytes
        .split_first()
        .ok_or_else(|| BigroupError::Malformed("empty buffer".into()))?;
    if *actual != tag {
        return Err(BigroupError::TagMismatch {
            expected: tag,
            actual: *actual,
        });
    }
    T::deserialize_compressed(rest).map_err(|e| BigroupError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scalar, G1};
    use ark_ff::UniformRand;
    use ark_ec::AffineRepr;

    #[test]
    fn tag_roundtrip() {
        let mut rng = ark_std::test_rng();
        let s = Scalar::rand(&mut rng);
        let bytes = serialize_tagged(TAG_BN254_SCALAR, &s);
        let back: Scalar = deserialize_tagged(TAG_BN254_SCALAR, &bytes).unwrap();
        assert_eq!(s, back);
    }

    #[test]
    fn wrong_tag_rejected() {
        let g = G1::generator();
        let bytes = serialize_tagged(TAG_BN254_G1, &g);
        let err = deserialize_tagged::<G1>(TAG_BN254_G2, &bytes).unwrap_err();
        assert!(matches!(err, BigroupError::TagMismatch { .. }));
    }
}
