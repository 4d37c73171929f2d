//! Powerball
//!
//! 5 distinct main numbers from 1-69 plus a single powerball from 1-26.
//! Main numbers keep the order they were drawn in.

use crate::core::rng::RandomSource;
use crate::lottery::{count_matches, sample_distinct, Draw, LotteryError, LotteryVariant};

/// Variant key.
pub const KEY: &str = "powerball";

/// Main numbers per draw.
pub const MAIN_COUNT: usize = 5;
/// Highest main number.
pub const MAIN_MAX: u32 = 69;
/// Highest powerball.
pub const POWERBALL_MAX: u32 = 26;

/// Matchable slots: five main numbers plus the powerball.
const SLOTS: f64 = (MAIN_COUNT + 1) as f64;

/// The 5+1 game.
#[derive(Debug, Clone, Copy, Default)]
pub struct Powerball;

impl LotteryVariant for Powerball {
    fn key(&self) -> &'static str {
        KEY
    }

    fn draw(&self, rng: &dyn RandomSource) -> Result<Draw, LotteryError> {
        let numbers = sample_distinct(rng, MAIN_COUNT, 1, MAIN_MAX)?;
        let powerball = rng.next_int(1, POWERBALL_MAX)?;

        Ok(Draw::Powerball { numbers, powerball })
    }

    fn score(&self, guess: &Draw, target: &Draw) -> Result<f64, LotteryError> {
        match (guess, target) {
            (
                Draw::Powerball { numbers: gn, powerball: gp },
                Draw::Powerball { numbers: tn, powerball: tp },
            ) => {
                let matched = count_matches(gn, tn) + usize::from(gp == tp);
                Ok(matched as f64 / SLOTS)
            }
            _ => Err(LotteryError::ShapeMismatch { variant: KEY }),
        }
    }
}
