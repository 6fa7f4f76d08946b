//! Write paths: the doctor's prescription draft and the pharmacy's
//! inventory form. Both validate locally before anything is sent.

mod draft;
mod inventory;

pub use draft::*;
pub use inventory::*;
