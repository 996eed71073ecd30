//! Wire/config types for the external benchmark driver (spec §6). The
//! driver itself — config file reading, CSV writing, the timing loop — is
//! out of scope per spec.md §1; this module exists only so that external
//! collaborator has concrete `serde`-deserializable types to target, the
//! same way `vc::VcKind` gives the workspace a typed back-end tag instead
//! of a bare integer.

use serde::{Deserialize, Serialize};

/// `PirType` (spec §6). Every variant but `ApirTapir` names a sibling
/// scheme out of this core's scope (spec.md §1); they're kept here only
/// because the benchmark config format names them by this exact
/// enumeration and a driver needs to round-trip configs that mention them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PirType {
    PirMatrix = 0,
    PirDpf = 1,
    PirSinglePass = 2,
    ApirMatrix = 3,
    ApirDpf128 = 4,
    ApirTapir = 5,
}

/// `VcType` (spec §6), matching `vc::VcKind` but including the `None`
/// variant non-authenticated sibling schemes use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VcType {
    None = 0,
    VcPointProof = 1,
    VcMerkleTree = 2,
}

impl VcType {
    pub fn to_vc_kind(self) -> Option<vc::VcKind> {
        match self {
            VcType::None => None,
            VcType::VcPointProof => Some(vc::VcKind::PointProof),
            VcType::VcMerkleTree => Some(vc::VcKind::MerkleTree),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateTypes {
    Add = 0,
    Edit = 1,
    Both = 2,
}

/// One experiment record from the driver's JSON config file (spec §6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub pir_type: PirType,
    pub repetitions: u32,
    pub db_size: usize,
    pub num_parts: usize,
    pub rec_size: usize,
    pub vc_type: VcType,
    #[serde(default)]
    pub num_updates: usize,
    #[serde(default)]
    pub update_types: Option<UpdateTypes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn experiment_config_roundtrips_through_json() {
        let cfg = ExperimentConfig {
            pir_type: PirType::ApirTapir,
            repetitions: 10,
            db_size: 4096,
            num_parts: 32,
            rec_size: 16,
            vc_type: VcType::VcPointProof,
            num_updates: 10,
            update_types: Some(UpdateTypes::Both),
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: ExperimentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn vc_type_maps_to_vc_kind() {
        assert_eq!(VcType::VcMerkleTree.to_vc_kind(), Some(vc::VcKind::MerkleTree));
        assert_eq!(VcType::None.to_vc_kind(), None);
    }
}
