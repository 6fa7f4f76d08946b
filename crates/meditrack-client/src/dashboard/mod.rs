//! Role dashboards.
//!
//! Each dashboard is a view model: it owns its state slots and a
//! [`ViewScope`](crate::scope::ViewScope), receives the session identity at
//! construction and refetches in full after every mutation.

mod doctor;
mod patient;
mod pharmacy;

pub use doctor::*;
pub use patient::*;
pub use pharmacy::*;
