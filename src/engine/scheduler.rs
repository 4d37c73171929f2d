//! Draw Scheduler
//!
//! Fixed-cadence tick loop. Each tick draws for every registered variant,
//! persists the results, publishes them, and pauses after a jackpot.
//!
//! ## State Machine
//!
//! ```text
//!            jackpot in tick
//!   RUNNING ─────────────────▶ PAUSED { resume_at = tick start + cooldown }
//!      ▲                          │
//!      └──── now >= resume_at ────┘  (the resuming tick draws normally)
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument};

use crate::config::{env_flag, env_parse};
use crate::core::rng::RandomSource;
use crate::engine::broadcast::Broadcaster;
use crate::lottery::{LotteryError, LotteryVariant, VariantRegistry};
use crate::store::{DrawResult, ResultStore, StoreError};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Nominal time between tick starts.
    pub tick_period: Duration,
    /// How long draws stay suspended after a jackpot.
    pub jackpot_cooldown: Duration,
    /// Suspend draws after a jackpot at all.
    pub pause_on_jackpot: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            jackpot_cooldown: Duration::from_secs(30),
            pause_on_jackpot: true,
        }
    }
}

impl SchedulerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tick_period: env_parse("LOTTO_TICK_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_period),
            jackpot_cooldown: env_parse("LOTTO_COOLDOWN_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.jackpot_cooldown),
            pause_on_jackpot: env_flag("LOTTO_PAUSE_ON_JACKPOT")
                .unwrap_or(defaults.pause_on_jackpot),
        }
    }
}

/// Scheduler errors. All of them are per-tick and non-fatal.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Drawing or scoring failed.
    #[error("Lottery error: {0}")]
    Lottery(#[from] LotteryError),

    /// Persisting a result failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A result could not be serialized for the feed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Whether draws are currently suspended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseState {
    /// Ticks draw normally.
    Running,
    /// Ticks are skipped until `resume_at`.
    Paused {
        /// First instant at which ticks draw again.
        resume_at: Instant,
    },
}

/// What a single tick did.
#[derive(Debug)]
pub enum TickReport {
    /// Cooldown still active; nothing drawn, stored or published.
    Skipped {
        /// Time left until draws resume.
        resume_in: Duration,
    },
    /// Every variant drew, stored and published.
    Completed {
        /// One result per variant, in registration order.
        results: Vec<DrawResult>,
        /// At least one result was a jackpot.
        jackpot: bool,
        /// Payloads accepted by subscribers, summed over results.
        delivered: usize,
    },
}

/// The tick loop.
pub struct DrawScheduler {
    config: SchedulerConfig,
    variants: Arc<VariantRegistry>,
    store: Arc<dyn ResultStore>,
    broadcaster: Arc<Broadcaster>,
    rng: Arc<dyn RandomSource>,
    state: PauseState,
    ticks: u64,
}

impl DrawScheduler {
    /// Create a scheduler in the running state.
    pub fn new(
        config: SchedulerConfig,
        variants: Arc<VariantRegistry>,
        store: Arc<dyn ResultStore>,
        broadcaster: Arc<Broadcaster>,
        rng: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            config,
            variants,
            store,
            broadcaster,
            rng,
            state: PauseState::Running,
            ticks: 0,
        }
    }

    /// Current pause state.
    pub fn state(&self) -> PauseState {
        self.state
    }

    /// Ticks attempted so far, including skipped and failed ones.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run forever.
    ///
    /// The next tick starts `tick_period` minus the previous body's duration
    /// after that body finished. Bodies never overlap and missed ticks are
    /// not made up.
    #[instrument(skip(self), fields(variants = ?self.variants.keys()))]
    pub async fn run(mut self) {
        info!(
            "Draw scheduler started: period {:?}, jackpot cooldown {:?}",
            self.config.tick_period, self.config.jackpot_cooldown
        );

        loop {
            let started = Instant::now();

            if let Err(e) = self.tick_at(started).await {
                error!("Tick {} failed: {}", self.ticks, e);
            }

            let elapsed = started.elapsed();
            tokio::time::sleep(self.config.tick_period.saturating_sub(elapsed)).await;
        }
    }

    /// Run one tick body as if it started at `now`.
    pub async fn tick_at(&mut self, now: Instant) -> Result<TickReport, SchedulerError> {
        self.ticks += 1;

        // 1. Cooldown gate
        if let PauseState::Paused { resume_at } = self.state {
            if now < resume_at {
                return Ok(TickReport::Skipped {
                    resume_in: resume_at - now,
                });
            }
            self.state = PauseState::Running;
            info!("Resuming lottery draws after jackpot cooldown");
        }

        // 2. Draw, score and store every variant; join before anything is published
        let results = try_join_all(self.variants.iter().map(|v| self.run_variant(v))).await?;

        // 3. Serialize everything up front so a failure publishes nothing
        let payloads = results
            .iter()
            .map(DrawResult::to_json)
            .collect::<Result<Vec<_>, _>>()?;

        // 4. Publish
        let mut delivered = 0;
        for payload in &payloads {
            delivered += self.broadcaster.publish(payload).await;
        }

        // 5. Pause decision
        let jackpot = results.iter().any(DrawResult::is_jackpot);
        if jackpot {
            for result in results.iter().filter(|r| r.is_jackpot()) {
                info!("JACKPOT! {} result #{}", result.lottery_type, result.id);
            }
            if self.config.pause_on_jackpot {
                self.state = PauseState::Paused {
                    resume_at: now + self.config.jackpot_cooldown,
                };
                info!("Pausing lottery draws for {:?}", self.config.jackpot_cooldown);
            }
        }

        debug!("Tick {} stored {} results", self.ticks, results.len());
        Ok(TickReport::Completed {
            results,
            jackpot,
            delivered,
        })
    }

    async fn run_variant(
        &self,
        variant: &Arc<dyn LotteryVariant>,
    ) -> Result<DrawResult, SchedulerError> {
        let draw = variant.draw(self.rng.as_ref())?;
        let guess = variant.draw(self.rng.as_ref())?;
        let score = variant.score(&guess, &draw)?;

        let result = self
            .store
            .append(variant.key(), &draw, std::slice::from_ref(&guess), score)
            .await?;
        Ok(result)
    }
}
