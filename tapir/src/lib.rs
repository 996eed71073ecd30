//! TAPIR: a two-server authenticated private information retrieval engine
//! (spec.md §§1-9). Composes `dbplane` (record storage, bulk XOR),
//! `bigroup` + `vc` (vector commitments), and `permute` (puncturable-set
//! permutations) into the offline digest/hint phase and the online
//! query/answer/reconstruct cycle, plus the update protocol that patches
//! both in place.

pub mod bench_surface;
pub mod client;
pub mod error;
pub mod persist;
pub mod server;
pub mod types;

pub use client::Client;
pub use error::TapirError;
pub use server::Server;
pub use types::{Answer, Digest, Hint, HintQuery, HintResp, Query};
pub use vc::VcKind;
