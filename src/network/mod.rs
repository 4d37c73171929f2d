//! Network Layer
//!
//! Live WebSocket feed and the HTTP query API, served from one listener.
//! Both are thin: the feed relays whatever the broadcaster publishes, the
//! API reads the store.

pub mod api;
pub mod protocol;
pub mod query;
pub mod server;

pub use api::ApiState;
pub use protocol::{HistoryParams, HistoryResponse, WinsResponse};
pub use query::QueryError;
pub use server::{serve, FeedHub, ServerConfig};
