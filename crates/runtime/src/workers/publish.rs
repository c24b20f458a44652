//! Publish worker that drains committed room events into the sinks.
//!
//! Transitions hand events to [`PublishQueue`] without waiting; the
//! [`PublishWorker`] delivers them in order to every [`EventPublisher`].

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::events::{EventPublisher, RoomEvent};

/// Non-blocking producer side of the publish queue.
#[derive(Clone)]
pub struct PublishQueue {
    tx: mpsc::Sender<RoomEvent>,
}

impl PublishQueue {
    /// Creates a queue with the given capacity and the worker that drains it.
    pub fn new(capacity: usize, sinks: Vec<Arc<dyn EventPublisher>>) -> (Self, PublishWorker) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = PublishWorker {
            rx,
            sinks,
            shutdown: None,
        };
        (Self { tx }, worker)
    }

    /// Enqueues an event without waiting. Drops it if the queue is full or closed.
    pub fn enqueue(&self, event: RoomEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!(
                    "publish queue full, dropping {} for room {}",
                    event.name(),
                    event.room_id()
                );
            }
            Err(TrySendError::Closed(event)) => {
                debug!(
                    "publish queue closed, dropping {} for room {}",
                    event.name(),
                    event.room_id()
                );
            }
        }
    }
}

/// Background task that delivers queued events.
pub struct PublishWorker {
    rx: mpsc::Receiver<RoomEvent>,
    sinks: Vec<Arc<dyn EventPublisher>>,
    shutdown: Option<oneshot::Receiver<()>>,
}

enum Next {
    Event(Option<RoomEvent>),
    Shutdown,
}

impl PublishWorker {
    /// Stop accepting events once `signal` fires (or its sender is dropped).
    ///
    /// Events already queued are still delivered.
    pub fn with_shutdown(mut self, signal: oneshot::Receiver<()>) -> Self {
        self.shutdown = Some(signal);
        self
    }

    /// Main worker loop. Returns once the queue is closed and drained.
    pub async fn run(mut self) {
        let mut shutdown = self.shutdown.take();
        let mut closing = false;

        loop {
            let next = tokio::select! {
                event = self.rx.recv() => Next::Event(event),
                _ = signalled(&mut shutdown), if !closing => Next::Shutdown,
            };

            match next {
                Next::Shutdown => {
                    debug!("publish worker draining before shutdown");
                    closing = true;
                    self.rx.close();
                }
                Next::Event(Some(event)) => self.deliver(&event).await,
                Next::Event(None) => break,
            }
        }
        debug!("publish worker stopped");
    }

    async fn deliver(&self, event: &RoomEvent) {
        for sink in &self.sinks {
            if let Err(err) = sink.publish(event).await {
                warn!(
                    "failed to publish {} for room {}: {}",
                    event.name(),
                    event.room_id(),
                    err
                );
            }
        }
        trace!("published {} for room {}", event.name(), event.room_id());
    }
}

async fn signalled(shutdown: &mut Option<oneshot::Receiver<()>>) {
    match shutdown {
        Some(signal) => {
            let _ = signal.await;
        }
        None => std::future::pending().await,
    }
}
