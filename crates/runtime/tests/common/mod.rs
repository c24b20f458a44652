//! Shared fixtures for runtime integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use checkers_core::{RoomId, SessionId, Timestamp};
use runtime::{
    Clock, EventPublisher, IdProvider, PublishError, RoomEvent, Runtime, RuntimeConfig,
};

/// Clock the test advances by hand.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.load(Ordering::SeqCst))
    }
}

/// Predictable ids: `room-1`, `room-2`, ... and `session-1`, ...
#[derive(Clone, Default)]
pub struct SequentialIds {
    rooms: Arc<AtomicUsize>,
    sessions: Arc<AtomicUsize>,
}

impl IdProvider for SequentialIds {
    fn room_id(&self) -> RoomId {
        let n = self.rooms.fetch_add(1, Ordering::SeqCst) + 1;
        RoomId::new(format!("room-{n}"))
    }

    fn session_id(&self) -> SessionId {
        let n = self.sessions.fetch_add(1, Ordering::SeqCst) + 1;
        SessionId::new(format!("session-{n}"))
    }
}

/// Sink that keeps every delivered event.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    events: Arc<Mutex<Vec<RoomEvent>>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<RoomEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(RoomEvent::name).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &RoomEvent) -> Result<(), PublishError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Sink that is always down.
pub struct FailingPublisher;

#[async_trait]
impl EventPublisher for FailingPublisher {
    async fn publish(&self, _event: &RoomEvent) -> Result<(), PublishError> {
        Err(PublishError::Unavailable("broker offline".into()))
    }
}

pub struct Harness {
    pub runtime: Runtime,
    pub clock: ManualClock,
    pub recorder: RecordingPublisher,
}

pub fn harness() -> Harness {
    harness_with(RuntimeConfig::default())
}

pub fn harness_with(config: RuntimeConfig) -> Harness {
    let clock = ManualClock::default();
    let recorder = RecordingPublisher::default();
    let runtime = Runtime::builder()
        .config(config)
        .clock(clock.clone())
        .ids(SequentialIds::default())
        .publisher(recorder.clone())
        .build();
    Harness {
        runtime,
        clock,
        recorder,
    }
}
