//! # Workflows Module
//!
//! High-level entry points that tie the engine and core together.
//!
//! Workflows are the top-level API for users of the library. Each one
//! encapsulates a complete analysis from configuration through result
//! organization, with progress reporting and logging along the way.
//!
//! - **Substate Analysis** ([`substate`]) - enumerate and rank every
//!   instance combination of a selected set of titratable sites.

pub mod substate;
