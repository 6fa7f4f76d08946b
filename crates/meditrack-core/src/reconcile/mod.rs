//! Client-side reconciliation of prescriptions against inventory.
//!
//! Pipeline: raw records → validity filter → ownership partition → search
//! filter → render, with stock lookups answered from a [`StockIndex`]
//! rebuilt from the latest inventory.

mod classifier;
mod search;
mod stock;

pub use classifier::*;
pub use search::*;
pub use stock::*;
