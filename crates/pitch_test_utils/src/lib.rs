//! # Pitch Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Fixture configs, simulations and input scripts
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
