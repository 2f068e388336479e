//! # Titra Core Library
//!
//! A library for exploring the protonation-state energetics of macromolecules:
//! given a continuum-electrostatics titration model, it enumerates and ranks
//! the microstates of a chosen subset of titratable sites.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains the stateless data models (`Site`,
//!   `Instance`, the [`ProtonationModel`](core::models::model::ProtonationModel)
//!   contract) and the pure microstate energy function
//!   (`core::energetics::microstate`).
//!
//! - **[`engine`]: The Logic Core.** This stateful layer drives the combinatorics:
//!   the mixed-radix [`StateVector`](engine::state::StateVector) counter, the
//!   [`Substate`](engine::substate::Substate) enumeration and ranking engine,
//!   analytic probability calculation, progress reporting, and error handling.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer. It
//!   ties the `engine` and `core` together to execute a complete substate
//!   analysis with a single entry point.

pub mod core;
pub mod engine;
pub mod workflows;
