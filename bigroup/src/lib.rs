//! Bilinear-group arithmetic for the point-proof vector commitment (spec
//! §4.3). Wraps `ark-bn254`, a pairing-friendly curve at roughly the
//! 128-bit security level the spec asks for, behind a small, tagged API so
//! the rest of the workspace never has to reach into `ark_ec`/`ark_ff`
//! directly.
//!
//! This wrapper claims no side-channel hardening beyond what `ark-bn254`
//! itself provides; per spec §9's design note, that is an acceptable
//! trade-off under the one-honest-server-of-two trust model TAPIR assumes.

pub mod error;
pub mod ops;
pub mod tagged;

pub use ark_bn254::Bn254;
pub use error::BigroupError;

/// The scalar field `Zr`.
pub type Scalar = ark_bn254::Fr;
/// `G1`, in affine form (the form every public-parameter vector is stored in).
pub type G1 = ark_bn254::G1Affine;
/// `G1` in projective form, for accumulation before a single affine conversion.
pub type G1Proj = ark_bn254::G1Projective;
/// `G2`, in affine form.
pub type G2 = ark_bn254::G2Affine;
pub type G2Proj = ark_bn254::G2Projective;
/// The target group `Gt = e(g,h)^...`.
pub type Gt = ark_ec::pairing::PairingOutput<Bn254>;

pub use ops::*;
