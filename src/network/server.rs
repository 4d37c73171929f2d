//! Feed Server
//!
//! One HTTP listener carries both the query API and the live WebSocket feed.
//! Every feed connection becomes a broadcaster subscription; the feed is
//! server-to-client only, so anything a client sends is ignored.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, instrument, warn};

use crate::config::env_parse;
use crate::engine::broadcast::{Broadcaster, Subscription, DEFAULT_SUBSCRIBER_BUFFER};
use crate::network::api::{router, ApiState, DEFAULT_PAGE_SIZE};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address shared by the feed and the query API.
    pub bind_addr: SocketAddr,
    /// Request path that upgrades to the feed.
    pub feed_path: String,
    /// Maximum concurrent feed connections.
    pub max_connections: usize,
    /// Payloads queued per subscriber before new ones are dropped.
    pub subscriber_buffer: usize,
    /// Results per history page.
    pub page_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3350)),
            feed_path: "/ws".to_string(),
            max_connections: 1000,
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: env_parse("LOTTO_HTTP_ADDR").unwrap_or(defaults.bind_addr),
            feed_path: std::env::var("LOTTO_FEED_PATH")
                .ok()
                .filter(|path| {
                    let valid = path.starts_with('/') && path.len() > 1;
                    if !valid {
                        warn!("Ignoring invalid LOTTO_FEED_PATH={:?}, using default", path);
                    }
                    valid
                })
                .unwrap_or(defaults.feed_path),
            max_connections: env_parse("LOTTO_MAX_CONNECTIONS").unwrap_or(defaults.max_connections),
            subscriber_buffer: env_parse("LOTTO_SUBSCRIBER_BUFFER")
                .unwrap_or(defaults.subscriber_buffer),
            page_size: env_parse::<u32>("LOTTO_PAGE_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
        }
    }
}

/// Live feed connections.
///
/// A connection slot is taken when the upgrade request arrives, before the
/// handshake response goes out, and held until the socket is cleaned up.
pub struct FeedHub {
    /// Where results come from.
    broadcaster: Arc<Broadcaster>,
    /// Request path that upgrades to the feed.
    path: String,
    /// Slot count.
    max_connections: usize,
    /// One permit per open or opening connection.
    slots: Arc<Semaphore>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl FeedHub {
    /// Create a hub publishing from `broadcaster`.
    pub fn new(config: &ServerConfig, broadcaster: Arc<Broadcaster>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let max_connections = config.max_connections.min(Semaphore::MAX_PERMITS);

        Self {
            broadcaster,
            path: config.feed_path.clone(),
            max_connections,
            slots: Arc::new(Semaphore::new(max_connections)),
            shutdown_tx,
        }
    }

    /// Request path that upgrades to the feed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Connections holding a slot, including ones still mid-handshake.
    pub fn connection_count(&self) -> usize {
        self.max_connections - self.slots.available_permits()
    }

    /// Close every feed connection.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Reserve a slot and complete the upgrade, or refuse with 503.
    pub(crate) fn accept(self: &Arc<Self>, ws: WebSocketUpgrade) -> Response {
        let permit = match self.slots.clone().try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting feed client");
                return (StatusCode::SERVICE_UNAVAILABLE, "Connection limit reached")
                    .into_response();
            }
        };

        let hub = self.clone();
        ws.on_upgrade(move |socket| hub.handle_socket(socket, permit))
    }

    async fn handle_socket(self: Arc<Self>, socket: WebSocket, permit: OwnedSemaphorePermit) {
        let connected_at = Instant::now();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let (mut ws_sender, mut ws_receiver) = socket.split();
        let Subscription { id, mut receiver } = self.broadcaster.subscribe().await;
        info!("Feed client {} connected", id);

        // Forward published results
        let sender_task = tokio::spawn(async move {
            while let Some(payload) = receiver.recv().await {
                if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
        });

        // Watch for disconnects
        loop {
            tokio::select! {
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Close(_))) | None => {
                            debug!("Feed client {} disconnected", id);
                            break;
                        }
                        Some(Err(e)) => {
                            debug!("WebSocket error for {}: {}", id, e);
                            break;
                        }
                        Some(Ok(_)) => {}
                    }
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }

        // Cleanup; the slot frees before the subscription goes away
        sender_task.abort();
        drop(permit);
        self.broadcaster.unsubscribe(&id).await;
        info!(
            "Feed client {} cleaned up after {:?}",
            id,
            connected_at.elapsed()
        );
    }
}

/// Serve the query API and the feed on an already bound listener until
/// `shutdown` resolves.
#[instrument(skip_all)]
pub async fn serve<F>(listener: TcpListener, state: ApiState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        "Listening on {} (feed path {})",
        listener.local_addr()?,
        state.feed().path()
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
