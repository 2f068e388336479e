//! Data structures for titratable sites and the model contract.
//!
//! - [`site`] - `Site` and `Instance`, the ordered bookkeeping the
//!   enumeration engine references by index.
//! - [`model`] - the [`ProtonationModel`](model::ProtonationModel) trait:
//!   what the engine requires from the external physical model.

pub mod model;
pub mod site;
