//! Lottery Feed Server
//!
//! Runs the draw scheduler and serves the live WebSocket feed and the HTTP
//! query API from one listener.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lottery_feed::{
    network::{serve, ApiState, FeedHub, ServerConfig},
    Broadcaster, DrawScheduler, OsRandom, ResultStore, SchedulerConfig, SqliteStore, StoreConfig,
    VariantRegistry, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let scheduler_config = SchedulerConfig::from_env();
    let server_config = ServerConfig::from_env();
    let store_config = StoreConfig::from_env();

    info!("Lottery Feed Server v{}", VERSION);
    info!("Tick Period: {:?}", scheduler_config.tick_period);
    info!(
        "Jackpot Cooldown: {:?} (enabled: {})",
        scheduler_config.jackpot_cooldown, scheduler_config.pause_on_jackpot
    );
    info!("Database: {}", store_config.database_path.display());

    let store: Arc<dyn ResultStore> =
        Arc::new(SqliteStore::open(&store_config.database_path).await?);
    let variants = Arc::new(VariantRegistry::builtin());
    let broadcaster = Arc::new(Broadcaster::new(server_config.subscriber_buffer));

    // Draw loop
    let scheduler = DrawScheduler::new(
        scheduler_config,
        variants.clone(),
        store.clone(),
        broadcaster.clone(),
        Arc::new(OsRandom::new()),
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    // Query API + live feed
    let listener = TcpListener::bind(server_config.bind_addr).await?;
    let feed = Arc::new(FeedHub::new(&server_config, broadcaster));
    let state = ApiState::new(store, variants, feed.clone(), server_config.page_size);

    serve(listener, state, async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received, shutting down"),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
        feed.shutdown();
    })
    .await?;

    scheduler_handle.abort();

    Ok(())
}
