//! Lottery Variants
//!
//! A variant knows the shape of its draws, how to generate one, and how to
//! score a guess against a target. The scheduler and store only ever see the
//! [`LotteryVariant`] trait and the serialized [`Draw`].
//!
//! ## Module Structure
//!
//! - `eurojackpot`: 5 of 50 + 2 of 12, both groups sorted
//! - `powerball`: 5 of 69 (generation order) + 1 of 26

pub mod eurojackpot;
pub mod powerball;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rng::{RandomSource, RngError};

pub use eurojackpot::EuroJackpot;
pub use powerball::Powerball;

/// One simulated outcome.
///
/// Guesses share this type: a guess is just another independent draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Draw {
    /// 5 main numbers in [1,50] and 2 stars in [1,12].
    Eurojackpot {
        /// Main numbers, ascending.
        numbers: Vec<u32>,
        /// Star numbers, ascending.
        stars: Vec<u32>,
    },
    /// 5 main numbers in [1,69] and a powerball in [1,26].
    Powerball {
        /// Main numbers, in generation order.
        numbers: Vec<u32>,
        /// The powerball.
        powerball: u32,
    },
}

impl Draw {
    /// Main numbers of any variant.
    pub fn numbers(&self) -> &[u32] {
        match self {
            Draw::Eurojackpot { numbers, .. } | Draw::Powerball { numbers, .. } => numbers,
        }
    }
}

/// Variant errors.
#[derive(Debug, Error)]
pub enum LotteryError {
    /// Random source failed while drawing.
    #[error("random source: {0}")]
    Rng(#[from] RngError),

    /// A draw of another shape was handed to a variant.
    #[error("draw shape does not match variant {variant}")]
    ShapeMismatch {
        /// Key of the variant that rejected the draw.
        variant: &'static str,
    },

    /// More distinct values requested than the range holds.
    #[error("cannot sample {count} distinct values from [{min}, {max}]")]
    InsufficientRange {
        /// Values requested.
        count: usize,
        /// Lower bound.
        min: u32,
        /// Upper bound.
        max: u32,
    },

    /// Two variants registered under one key.
    #[error("variant {0} is already registered")]
    DuplicateVariant(String),
}

/// A lottery game definition.
pub trait LotteryVariant: Send + Sync {
    /// Unique key, also stored as `lottery_type`.
    fn key(&self) -> &'static str;

    /// Generate a new random draw.
    fn draw(&self, rng: &dyn RandomSource) -> Result<Draw, LotteryError>;

    /// Fraction of matchable slots in `guess` found in `target`, in [0, 1].
    ///
    /// Matching is by value membership within a category, never by position.
    /// Exactly 1.0 is a jackpot.
    fn score(&self, guess: &Draw, target: &Draw) -> Result<f64, LotteryError>;
}

/// Sample `count` distinct values from `[min, max]`.
///
/// Duplicates are rejected and redrawn, which keeps every value equally
/// likely. The result is in generation order; callers sort if their variant
/// wants sorted groups.
pub fn sample_distinct(
    rng: &dyn RandomSource,
    count: usize,
    min: u32,
    max: u32,
) -> Result<Vec<u32>, LotteryError> {
    let available = max.checked_sub(min).map(|d| d as u64 + 1).unwrap_or(0);
    if count as u64 > available {
        return Err(LotteryError::InsufficientRange { count, min, max });
    }

    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let value = rng.next_int(min, max)?;
        if !picked.contains(&value) {
            picked.push(value);
        }
    }
    Ok(picked)
}

/// How many of `guess` appear anywhere in `target`.
pub(crate) fn count_matches(guess: &[u32], target: &[u32]) -> usize {
    guess.iter().filter(|n| target.contains(n)).count()
}

/// Registered variants, in registration order.
#[derive(Default, Clone)]
pub struct VariantRegistry {
    variants: Vec<Arc<dyn LotteryVariant>>,
}

impl VariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the two shipped games: eurojackpot, then powerball.
    pub fn builtin() -> Self {
        Self {
            variants: vec![Arc::new(EuroJackpot), Arc::new(Powerball)],
        }
    }

    /// Add a variant. Keys must be unique.
    pub fn register(&mut self, variant: Arc<dyn LotteryVariant>) -> Result<(), LotteryError> {
        if self.get(variant.key()).is_some() {
            return Err(LotteryError::DuplicateVariant(variant.key().to_string()));
        }
        self.variants.push(variant);
        Ok(())
    }

    /// Look up a variant by key.
    pub fn get(&self, key: &str) -> Option<&Arc<dyn LotteryVariant>> {
        self.variants.iter().find(|v| v.key() == key)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn LotteryVariant>> {
        self.variants.iter()
    }

    /// Registered keys.
    pub fn keys(&self) -> Vec<&'static str> {
        self.variants.iter().map(|v| v.key()).collect()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl std::fmt::Debug for VariantRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantRegistry")
            .field("variants", &self.keys())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
