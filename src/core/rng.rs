//! Random Number Sources
//!
//! Draws and guesses must be unguessable, so production code pulls from the
//! operating system CSPRNG. A scripted source exists for reproducible tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::distributions::{Distribution, Uniform};
use rand::rngs::OsRng;
use thiserror::Error;

/// Random source errors.
#[derive(Debug, Error)]
pub enum RngError {
    /// Requested range contains no values.
    #[error("empty range [{min}, {max}]")]
    EmptyRange {
        /// Lower bound (inclusive).
        min: u32,
        /// Upper bound (inclusive).
        max: u32,
    },

    /// The source cannot produce values.
    #[error("random source failure: {0}")]
    Source(String),
}

/// A source of uniformly distributed integers.
///
/// Implementations must be safe to share between concurrently running
/// variants; `next_int` takes `&self` for that reason.
pub trait RandomSource: Send + Sync {
    /// Generate an integer in `[min, max]` (both inclusive).
    fn next_int(&self, min: u32, max: u32) -> Result<u32, RngError>;
}

/// Operating-system CSPRNG.
///
/// Stateless handle around [`OsRng`], so concurrent callers never contend on a lock.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl OsRandom {
    /// Create a new handle.
    pub fn new() -> Self {
        Self
    }
}

impl RandomSource for OsRandom {
    fn next_int(&self, min: u32, max: u32) -> Result<u32, RngError> {
        if min > max {
            return Err(RngError::EmptyRange { min, max });
        }
        Ok(Uniform::new_inclusive(min, max).sample(&mut OsRng))
    }
}

/// Scripted source that replays a fixed sequence forever.
///
/// Each value is clamped into the requested range. Only useful for tests
/// and demos where a draw has to be predictable.
#[derive(Debug)]
pub struct ReplayRandom {
    values: Vec<u32>,
    cursor: AtomicUsize,
}

impl ReplayRandom {
    /// Create a source cycling through `values`.
    pub fn new(values: Vec<u32>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Number of values handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

impl RandomSource for ReplayRandom {
    fn next_int(&self, min: u32, max: u32) -> Result<u32, RngError> {
        if min > max {
            return Err(RngError::EmptyRange { min, max });
        }
        if self.values.is_empty() {
            return Err(RngError::Source("replay sequence is empty".to_string()));
        }
        let idx = self.cursor.fetch_add(1, Ordering::SeqCst) % self.values.len();
        Ok(self.values[idx].clamp(min, max))
    }
}

// =============================================================================
// TESTS
// =============================================================================
