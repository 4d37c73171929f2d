//! Draw Engine
//!
//! The tick loop and the fan-out it publishes through.
//!
//! ## Module Structure
//!
//! - `scheduler`: Fixed-cadence tick loop and jackpot pause state machine
//! - `broadcast`: Best-effort delivery to live subscribers

pub mod broadcast;
pub mod scheduler;

// Re-export key types
pub use broadcast::{Broadcaster, SubscriberId, Subscription};
pub use scheduler::{DrawScheduler, PauseState, SchedulerConfig, SchedulerError, TickReport};
