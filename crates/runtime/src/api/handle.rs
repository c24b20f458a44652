//! Cloneable façade over the room engine.
//!
//! [`RuntimeHandle`] exposes the operations a transport needs: create, join,
//! leave, move, lookup and listing. Each mutating call locks exactly one room,
//! runs the transition, queues the resulting events and releases the lock.
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use checkers_core::{
    GameError, JoinRequest, Room, RoomId, RoomSummary, SeatAssignment, SessionId, Square,
};

use super::errors::Result;
use crate::events::{EventBus, RoomEvent};
use crate::providers::{Clock, IdProvider};
use crate::registry::RoomRegistry;
use crate::runtime::RuntimeConfig;
use crate::workers::PublishQueue;

/// Response to a successful join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinResponse {
    pub room: Room,
    pub seat: SeatAssignment,
}

/// Engine health counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuntimeStats {
    pub rooms: usize,
}

pub(crate) struct Shared {
    pub(crate) config: RuntimeConfig,
    pub(crate) registry: RoomRegistry,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdProvider>,
    pub(crate) queue: PublishQueue,
    pub(crate) bus: EventBus,
}

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    shared: Arc<Shared>,
}

impl RuntimeHandle {
    pub(crate) fn new(shared: Shared) -> Self {
        Self {
            shared: Arc::new(shared),
        }
    }

    /// Create an empty waiting room with a fresh identifier.
    pub async fn create_room(&self) -> Room {
        let ids = &self.shared.ids;
        self.shared
            .registry
            .create(|| ids.room_id(), self.shared.clock.now())
            .await
    }

    /// Seat a player, or return the existing seat for a repeated request.
    pub async fn join_room(&self, room_id: &RoomId, request: JoinRequest) -> Result<JoinResponse> {
        let mut slot = self.shared.registry.lock(room_id).await?;
        let room = slot.live_mut()?;

        let now = self.shared.clock.now();
        let ids = &self.shared.ids;
        let outcome = room
            .join(request, now, &self.shared.config.game_config, || {
                ids.session_id()
            })
            .inspect_err(|err| {
                debug!(
                    "join rejected in room {} ({}): {}",
                    room_id,
                    err.severity().as_str(),
                    err
                )
            })?;

        if outcome.rejoined {
            debug!(
                "repeated join in room {} mapped to existing {} seat",
                room_id, outcome.seat.color
            );
        } else {
            info!(
                "player {} joined room {} as {} (status: {})",
                outcome.seat.session_id, room_id, outcome.seat.color, room.status
            );
            self.shared.queue.enqueue(RoomEvent::room_updated(room));
        }

        Ok(JoinResponse {
            room: room.clone(),
            seat: outcome.seat,
        })
    }

    /// Remove a player. An emptied room is reclaimed.
    pub async fn leave_room(&self, room_id: &RoomId, session: &SessionId) -> Result<Room> {
        let snapshot = {
            let mut slot = self.shared.registry.lock(room_id).await?;
            let room = slot.live_mut()?;

            let outcome = room
                .leave(session)
                .inspect_err(|err| {
                    debug!(
                        "leave rejected in room {} ({}): {}",
                        room_id,
                        err.severity().as_str(),
                        err
                    )
                })?;

            if outcome.ended_game {
                info!(
                    "player {} ({}) left room {}, {:?} wins by forfeit",
                    session, outcome.player.color, room_id, room.winner
                );
            } else {
                info!(
                    "player {} ({}) left room {}",
                    session, outcome.player.color, room_id
                );
            }

            self.shared.queue.enqueue(RoomEvent::room_updated(room));
            self.shared.queue.enqueue(RoomEvent::PlayerLeft {
                room_id: room_id.clone(),
                session_id: outcome.player.session_id,
                color: outcome.player.color,
            });
            room.clone()
        };

        if snapshot.is_empty() && self.shared.registry.reap(room_id).await {
            self.shared.queue.enqueue(RoomEvent::RoomClosed {
                room_id: room_id.clone(),
            });
        }

        Ok(snapshot)
    }

    /// Validate and apply one half-move.
    pub async fn make_move(
        &self,
        room_id: &RoomId,
        session: &SessionId,
        from: Square,
        to: Square,
    ) -> Result<Room> {
        let mut slot = self.shared.registry.lock(room_id).await?;
        let room = slot.live_mut()?;

        let record = room
            .apply_move(session, from, to)
            .inspect_err(|err| {
                debug!(
                    "move {} -> {} rejected in room {} ({}): {}",
                    from,
                    to,
                    room_id,
                    err.severity().as_str(),
                    err
                )
            })?;

        debug!("move in room {}: {} {} -> {}", room_id, record.color, from, to);
        if let Some(winner) = room.winner {
            info!("room {} finished, {} wins", room_id, winner);
        }

        self.shared
            .queue
            .enqueue(RoomEvent::board_changed(room, record));
        self.shared.queue.enqueue(RoomEvent::room_updated(room));

        Ok(room.clone())
    }

    /// Current snapshot of a room.
    pub async fn get_room(&self, room_id: &RoomId) -> Result<Room> {
        self.shared.registry.get(room_id).await
    }

    /// All rooms, newest first.
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        self.shared.registry.list().await
    }

    /// Squares the piece on `square` can reach in one half-move.
    ///
    /// Read-only and turn-agnostic; empty when the square holds no piece.
    pub async fn valid_moves(&self, room_id: &RoomId, square: Square) -> Result<Vec<Square>> {
        let room = self.shared.registry.get(room_id).await?;
        Ok(room
            .board
            .destinations(square)
            .into_iter()
            .map(|d| d.to)
            .collect())
    }

    pub async fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            rooms: self.shared.registry.len().await,
        }
    }

    /// Subscribe to a live room's events on the in-process bus.
    ///
    /// The room stays locked until the channel exists, so a room cannot be
    /// reaped in between and leave an orphaned channel behind.
    pub async fn subscribe(&self, room_id: &RoomId) -> Result<broadcast::Receiver<RoomEvent>> {
        let _slot = self.shared.registry.lock(room_id).await?;
        Ok(self.shared.bus.subscribe(room_id).await)
    }

    /// The in-process event bus, for subscribers outside the handle.
    pub fn event_bus(&self) -> &EventBus {
        &self.shared.bus
    }
}
