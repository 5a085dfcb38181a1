//! # Tick Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - Fixture maps, stat records, scripted random sources and engines
//! - Monte-Carlo matchup statistics
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod matchup;

/// Re-export proptest for convenience.
pub use proptest;
