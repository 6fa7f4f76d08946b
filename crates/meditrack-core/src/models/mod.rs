//! Domain models for the MediTrack client.

mod identity;
mod medicine;
mod prescription;
pub(crate) mod wire;

pub use identity::*;
pub use medicine::*;
pub use prescription::*;
pub use wire::decode_records;
