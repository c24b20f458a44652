//! Server configuration read from the environment.
use std::env;
use std::path::PathBuf;

use runtime::RuntimeConfig;

/// Process-level configuration for the checkers server.
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    pub runtime: RuntimeConfig,
    /// Directory for the log file. Stderr only when unset.
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Construct configuration from environment variables.
    ///
    /// Environment variables:
    /// - `EVENT_BUFFER_SIZE` - Per-room broadcast capacity (default: 100)
    /// - `PUBLISH_QUEUE_SIZE` - Events buffered ahead of the publish worker (default: 256)
    /// - `REJOIN_WINDOW_MS` - Window for folding duplicate joins (default: 2000)
    /// - `ROOM_ID_LEN` - Hex characters per room id, 4 to 32 (default: 8)
    /// - `LOG_DIR` - Also write logs to `<LOG_DIR>/server.log`
    pub fn from_env() -> Self {
        let mut runtime = RuntimeConfig::default();

        if let Some(size) = read_env::<usize>("EVENT_BUFFER_SIZE") {
            runtime = runtime.with_event_buffer_size(size.max(1));
        }
        if let Some(size) = read_env::<usize>("PUBLISH_QUEUE_SIZE") {
            runtime = runtime.with_publish_queue_size(size.max(1));
        }
        if let Some(window) = read_env::<u64>("REJOIN_WINDOW_MS") {
            runtime = runtime.with_rejoin_window_ms(window);
        }
        if let Some(len) = read_env::<usize>("ROOM_ID_LEN") {
            runtime = runtime.with_room_id_len(len);
        }

        let log_dir = env::var_os("LOG_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        Self { runtime, log_dir }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
