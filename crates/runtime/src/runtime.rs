//! High-level runtime orchestrator.
//!
//! The runtime owns the room registry and the publish worker, and exposes a
//! builder-based API for transports to drive rooms through [`RuntimeHandle`].

use std::sync::Arc;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

use checkers_core::GameConfig;

use crate::api::handle::Shared;
use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{EventBus, EventPublisher};
use crate::providers::{Clock, IdProvider, RandomIds, SystemClock};
use crate::registry::RoomRegistry;
use crate::workers::PublishQueue;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Per-room broadcast capacity of the in-process event bus.
    pub event_buffer_size: usize,
    /// Events waiting for the publish worker before new ones are dropped.
    pub publish_queue_size: usize,
    /// Length of generated room identifiers (clamped to 4..=32).
    pub room_id_len: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 100,
            publish_queue_size: 256,
            room_id_len: 8,
        }
    }
}

impl RuntimeConfig {
    pub fn with_rejoin_window_ms(mut self, window_ms: u64) -> Self {
        self.game_config = GameConfig::with_rejoin_window_ms(window_ms);
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    pub fn with_publish_queue_size(mut self, size: usize) -> Self {
        self.publish_queue_size = size;
        self
    }

    pub fn with_room_id_len(mut self, len: usize) -> Self {
        self.room_id_len = len;
        self
    }
}

/// Main runtime that hosts the rooms.
///
/// Runtime owns the publish worker; [`RuntimeHandle`] provides a cloneable
/// façade for transports.
pub struct Runtime {
    handle: RuntimeHandle,
    publish_worker: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Start a runtime with the given configuration and default providers.
    pub fn start(config: RuntimeConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// The in-process event bus every room event is fanned out to.
    pub fn event_bus(&self) -> EventBus {
        self.handle.event_bus().clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Events already queued are delivered before this returns. Events
    /// produced afterwards through surviving handles are dropped.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(());
        drop(self.handle);

        self.publish_worker
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        info!("runtime stopped");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    publishers: Vec<Arc<dyn EventPublisher>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdProvider>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            publishers: Vec::new(),
            clock: None,
            ids: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Add an event sink next to the built-in event bus.
    pub fn publisher(mut self, publisher: impl EventPublisher + 'static) -> Self {
        self.publishers.push(Arc::new(publisher));
        self
    }

    /// Replace the wall clock (default: [`SystemClock`]).
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Replace the identifier source (default: [`RandomIds`]).
    pub fn ids(mut self, ids: impl IdProvider + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    /// Build the runtime and spawn its publish worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Runtime {
        let config = self.config;
        let bus = EventBus::with_capacity(config.event_buffer_size);

        let mut sinks: Vec<Arc<dyn EventPublisher>> = Vec::with_capacity(self.publishers.len() + 1);
        sinks.push(Arc::new(bus.clone()));
        sinks.extend(self.publishers);

        let (queue, worker) = PublishQueue::new(config.publish_queue_size, sinks);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let worker = worker.with_shutdown(shutdown_rx);

        let publish_worker = tokio::spawn(async move {
            worker.run().await;
        });

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(RandomIds::new(config.room_id_len)) as Arc<dyn IdProvider>);

        info!(
            "runtime started (publish queue: {}, rejoin window: {}ms)",
            config.publish_queue_size, config.game_config.rejoin_window_ms
        );

        let handle = RuntimeHandle::new(Shared {
            config,
            registry: RoomRegistry::new(),
            clock,
            ids,
            queue,
            bus,
        });

        Runtime {
            handle,
            publish_worker,
            shutdown_tx,
        }
    }
}
