//! Record/database plane and bulk-XOR kernels shared by the whole PIR family
//! (spec §4.1, §4.2). Every higher layer (vector commitments, the
//! permutation primitive, TAPIR itself) builds on the [`Database`] and the
//! kernels in [`xor`].

pub mod database;
pub mod error;
pub mod update;
pub mod xor;

pub use database::{Database, Record};
pub use error::DbError;
pub use update::{OpKind, Update};
