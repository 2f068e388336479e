//! # Engine Module
//!
//! The stateful layer that explores the combinatorial space of protonation
//! microstates: a mixed-radix counter over site instances, the substate
//! enumeration and ranking engine built on top of it, and the supporting
//! configuration, progress and error machinery.
//!
//! ## Architecture
//!
//! - **State Counting** ([`state`]) - the [`StateVector`](state::StateVector)
//!   mixed-radix counter with full-space and substate-restricted traversal.
//! - **Substate Analysis** ([`substate`]) - resolves a site selection,
//!   seeds from occupancy probabilities, enumerates and ranks combinations,
//!   and caches the result for the lifetime of the substate.
//! - **Reporting** ([`summary`]) - renders calculated substates as tables.
//! - **Tasks** ([`tasks`]) - self-contained calculations over a model,
//!   such as analytic occupancy probabilities.
//! - **Configuration** ([`config`]) - site selection and pH parameters.
//! - **Progress Monitoring** ([`progress`]) - callback-based enumeration
//!   progress events.
//! - **Error Handling** ([`error`]) - the engine error taxonomy.

pub mod config;
pub mod error;
pub mod progress;
pub mod state;
pub mod substate;
pub mod summary;
pub mod tasks;
