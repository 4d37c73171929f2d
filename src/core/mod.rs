//! Core primitives.
//!
//! Shared building blocks with no knowledge of lottery rules.

pub mod rng;

// Re-export core types
pub use rng::{OsRandom, RandomSource, ReplayRandom, RngError};
