//! Microstate energy evaluation.

pub mod microstate;
