//! # Lottery Feed Server
//!
//! Continuously simulates lottery draws, scores a simulated guess against
//! each one, persists the result and streams it to live subscribers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   LOTTERY FEED SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  └── rng.rs      - CSPRNG + scripted random sources          │
//! │                                                              │
//! │  lottery/        - Variant definitions                       │
//! │  ├── mod.rs      - Draw, LotteryVariant, VariantRegistry     │
//! │  ├── eurojackpot - 5 of 50 + 2 of 12                         │
//! │  └── powerball   - 5 of 69 + 1 of 26                         │
//! │                                                              │
//! │  store/          - Persistence                               │
//! │  └── sqlite.rs   - Append-only SQLite result log             │
//! │                                                              │
//! │  engine/         - The draw loop                             │
//! │  ├── scheduler   - Tick loop + jackpot pause state machine   │
//! │  └── broadcast   - Best-effort fan-out to subscribers        │
//! │                                                              │
//! │  network/        - Outer surfaces                            │
//! │  ├── server.rs   - Listener + WebSocket live feed            │
//! │  ├── api.rs      - Routes: history, wins, feed upgrade       │
//! │  ├── query.rs    - Framework-free query logic                │
//! │  └── protocol.rs - Response types                            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! Every tick the [`DrawScheduler`] asks each registered variant for a draw
//! and a guess, scores them, appends the result to the [`ResultStore`] and
//! publishes it through the [`Broadcaster`]. A perfect score pauses the
//! scheduler for a cooldown window.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub(crate) mod config;
pub mod core;
pub mod engine;
pub mod lottery;
pub mod network;
pub mod store;

// Re-export commonly used types
pub use core::rng::{OsRandom, RandomSource, ReplayRandom};
pub use engine::{Broadcaster, DrawScheduler, PauseState, SchedulerConfig, TickReport};
pub use lottery::{Draw, LotteryVariant, VariantRegistry};
pub use store::{DrawResult, ResultStore, SqliteStore, StoreConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
