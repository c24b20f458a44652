//! Checkers room server binary.
//!
//! Composition root: reads configuration, installs logging, starts the room
//! runtime and keeps it alive until Ctrl-C. Request and fan-out transports
//! attach to the [`runtime::RuntimeHandle`] and [`runtime::EventBus`].

mod config;
mod logging;
mod sink;

use anyhow::Result;
use runtime::Runtime;

use config::ServerConfig;
use sink::LogPublisher;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env();
    let _log_guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!("Starting checkers server");
    tracing::info!(
        "Board {}x{}, rejoin window {}ms, room id length {}",
        checkers_core::GameConfig::BOARD_SIZE,
        checkers_core::GameConfig::BOARD_SIZE,
        config.runtime.game_config.rejoin_window_ms,
        config.runtime.room_id_len,
    );

    let runtime = Runtime::builder()
        .config(config.runtime)
        .publisher(LogPublisher)
        .build();

    let handle = runtime.handle();
    tracing::info!("Runtime ready ({} rooms)", handle.stats().await.rooms);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    drop(handle);
    runtime.shutdown().await?;

    Ok(())
}
