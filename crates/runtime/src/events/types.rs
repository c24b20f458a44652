//! Event payloads published per room.

use serde::{Deserialize, Serialize};

use checkers_core::{Board, Color, MoveRecord, Room, RoomId, SessionId};

/// Events published on a room's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RoomEvent {
    /// Full post-mutation snapshot. Sufficient on its own to rebuild the room.
    RoomUpdated { room: Box<Room> },

    /// Lightweight board notification, emitted for moves only.
    BoardChanged {
        room_id: RoomId,
        board: Board,
        turn: Color,
        last_move: MoveRecord,
        version: u64,
    },

    /// A player left the room.
    PlayerLeft {
        room_id: RoomId,
        session_id: SessionId,
        color: Color,
    },

    /// The room was reclaimed after its roster emptied. Nothing follows.
    RoomClosed { room_id: RoomId },
}

impl RoomEvent {
    pub fn room_updated(room: &Room) -> Self {
        Self::RoomUpdated {
            room: Box::new(room.clone()),
        }
    }

    pub fn board_changed(room: &Room, last_move: MoveRecord) -> Self {
        Self::BoardChanged {
            room_id: room.id.clone(),
            board: room.board.clone(),
            turn: room.turn,
            last_move,
            version: room.version,
        }
    }

    /// Room whose channel this event belongs to.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::RoomUpdated { room } => &room.id,
            Self::BoardChanged { room_id, .. }
            | Self::PlayerLeft { room_id, .. }
            | Self::RoomClosed { room_id } => room_id,
        }
    }

    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoomUpdated { .. } => "room-update",
            Self::BoardChanged { .. } => "game-move",
            Self::PlayerLeft { .. } => "player-left",
            Self::RoomClosed { .. } => "room-closed",
        }
    }

    /// Channel name for external fan-out transports.
    pub fn channel(&self) -> String {
        format!("room:{}", self.room_id())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
