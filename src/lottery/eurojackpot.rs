//! EuroJackpot
//!
//! 5 distinct main numbers from 1-50 plus 2 distinct stars from 1-12.
//! Both groups are sorted ascending before they leave the variant.

use crate::core::rng::RandomSource;
use crate::lottery::{count_matches, sample_distinct, Draw, LotteryError, LotteryVariant};

/// Variant key.
pub const KEY: &str = "eurojackpot";

/// Main numbers per draw.
pub const MAIN_COUNT: usize = 5;
/// Highest main number.
pub const MAIN_MAX: u32 = 50;
/// Stars per draw.
pub const STAR_COUNT: usize = 2;
/// Highest star.
pub const STAR_MAX: u32 = 12;

/// Matchable slots: every main number plus every star.
const SLOTS: f64 = (MAIN_COUNT + STAR_COUNT) as f64;

/// The 5+2 game.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuroJackpot;

impl LotteryVariant for EuroJackpot {
    fn key(&self) -> &'static str {
        KEY
    }

    fn draw(&self, rng: &dyn RandomSource) -> Result<Draw, LotteryError> {
        let mut numbers = sample_distinct(rng, MAIN_COUNT, 1, MAIN_MAX)?;
        let mut stars = sample_distinct(rng, STAR_COUNT, 1, STAR_MAX)?;
        numbers.sort_unstable();
        stars.sort_unstable();

        Ok(Draw::Eurojackpot { numbers, stars })
    }

    fn score(&self, guess: &Draw, target: &Draw) -> Result<f64, LotteryError> {
        match (guess, target) {
            (
                Draw::Eurojackpot { numbers: gn, stars: gs },
                Draw::Eurojackpot { numbers: tn, stars: ts },
            ) => {
                let matched = count_matches(gn, tn) + count_matches(gs, ts);
                Ok(matched as f64 / SLOTS)
            }
            _ => Err(LotteryError::ShapeMismatch { variant: KEY }),
        }
    }
}
