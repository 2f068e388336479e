//! Self-contained calculations over a titration model.
//!
//! Tasks run against a model outside of any particular substate: they
//! prepare or derive data the enumeration engine consumes, such as the
//! per-instance occupancy probabilities the seeding step needs.

pub mod probabilities;
