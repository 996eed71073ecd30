//! Injection of database records into the scalar field, shared by every
//! backend that needs to treat a record as a `Zr` element.

use bigroup::Scalar;
use ark_ff::PrimeField;
use dbplane::Record;

/// Reduces a record's raw bytes into `Zr` via big-endian mod-order
/// reduction — no hashing. Mirrors the original's `FieldElementFromBytes`,
/// which is really just `NewZrFromBytes` run on the record directly.
pub fn record_to_scalar(record: &Record) -> Scalar {
    Scalar::from_be_bytes_mod_order(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_give_same_scalar() {
        let r: Record = vec![1, 2, 3, 4];
        assert_eq!(record_to_scalar(&r), record_to_scalar(&r));
    }

    #[test]
    fn different_bytes_give_different_scalars() {
        let a: Record = vec![1, 2, 3, 4];
        let b: Record = vec![1, 2, 3, 5];
        assert_ne!(record_to_scalar(&a), record_to_scalar(&b));
    }
}
