//! # Core Module
//!
//! The fundamental building blocks for titration modeling: the data
//! structures that describe titratable sites and their protonation
//! instances, the contract a physical model must satisfy, and a concrete
//! microstate energy function.
//!
//! ## Architecture
//!
//! - **Model Representation** ([`models`]) - Sites, instances, and the
//!   [`ProtonationModel`](models::model::ProtonationModel) trait the
//!   enumeration engine works against.
//! - **Energy Calculations** ([`energetics`]) - The intrinsic /
//!   proton-chemical-potential / pairwise-interaction decomposition of a
//!   microstate's energy.
//!
//! Everything in this layer is stateless with respect to enumeration: the
//! energy function is pure in the state vector's contents, and sites are
//! immutable once a model is built (occupancy probabilities being the one
//! field written by a probability calculation).

pub mod energetics;
pub mod models;
