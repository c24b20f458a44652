//! Room lifecycle: roster, status and the pure join/leave/move transitions.
//!
//! A room moves through `waiting → playing → finished`. Transitions here are
//! deterministic: identifiers and timestamps are supplied by the caller, which
//! is also responsible for serializing access to a room.

use std::fmt;

use arrayvec::ArrayVec;

use crate::board::{Board, Color, Square};
use crate::config::GameConfig;
use crate::engine::{MatchEngine, MoveError, MoveRecord};
use crate::error::{ErrorSeverity, GameError};

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Milliseconds elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub const fn millis_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Short shareable room identifier.
    RoomId
}

string_id! {
    /// Server-issued seat credential, unique per successful join.
    SessionId
}

string_id! {
    /// Opaque, client-chosen identity that survives reconnects.
    ClientId
}

/// Where a join request came from. Used only for the near-duplicate join guard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Provenance {
    /// Origin address as reported by the transport.
    pub address: String,
    /// Client signature string (e.g. a user agent).
    pub signature: String,
}

impl Provenance {
    pub fn new(address: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            signature: signature.into(),
        }
    }
}

/// A seated participant.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub session_id: SessionId,
    pub color: Color,
    pub joined_at: Timestamp,
    pub client_id: Option<ClientId>,
    pub display_name: Option<String>,
    /// Kept out of published snapshots.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub provenance: Option<Provenance>,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum RoomStatus {
    /// Fewer than two players seated.
    #[default]
    Waiting,
    Playing,
    /// Terminal. No further moves are accepted.
    Finished,
}

/// Why a finished room ended without a natural win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum EndReason {
    OpponentLeft,
}

/// Optional fields a client sends when joining.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoinRequest {
    pub client_id: Option<ClientId>,
    pub display_name: Option<String>,
    pub provenance: Option<Provenance>,
}

impl JoinRequest {
    pub fn with_client_id(client_id: impl Into<ClientId>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            ..Self::default()
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = Some(provenance);
        self
    }
}

/// Seat handed back to a joining client.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeatAssignment {
    pub session_id: SessionId,
    pub color: Color,
}

/// Result of a join: the seat and whether it already existed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinOutcome {
    pub seat: SeatAssignment,
    /// True when the request was folded into an existing seat; nothing changed.
    pub rejoined: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JoinError {
    #[error("room is full")]
    RoomFull,
}

impl GameError for JoinError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::RoomFull => "JOIN_ROOM_FULL",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeaveError {
    #[error("session is not seated in this room")]
    UnknownPlayer,
}

impl GameError for LeaveError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPlayer => "LEAVE_UNKNOWN_PLAYER",
        }
    }
}

/// Result of a successful leave.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// The player that was removed.
    pub player: Player,
    /// True when the departure ended a live game.
    pub ended_game: bool,
}

/// Listing entry for a room.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomSummary {
    pub id: RoomId,
    pub players: usize,
    pub status: RoomStatus,
    pub created_at: Timestamp,
}

/// One match's complete authoritative state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    pub id: RoomId,
    /// Seat order is join order. At most one player per color.
    pub players: ArrayVec<Player, { GameConfig::MAX_PLAYERS }>,
    pub status: RoomStatus,
    pub turn: Color,
    pub board: Board,
    pub winner: Option<Color>,
    pub end_reason: Option<EndReason>,
    pub last_move: Option<MoveRecord>,
    pub created_at: Timestamp,
    /// Bumped on every committed mutation so observers can drop stale snapshots.
    pub version: u64,
}

impl Room {
    /// Creates an empty waiting room with the standard setup.
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            players: ArrayVec::new(),
            status: RoomStatus::Waiting,
            turn: Color::Light,
            board: Board::initial(),
            winner: None,
            end_reason: None,
            last_move: None,
            created_at,
            version: 0,
        }
    }

    pub fn player(&self, session: &SessionId) -> Option<&Player> {
        self.players.iter().find(|p| &p.session_id == session)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// True once the roster is empty and the room may be reclaimed.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.is_full()
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            players: self.players.len(),
            status: self.status,
            created_at: self.created_at,
        }
    }

    /// Seats a player, or returns the existing seat for a repeated request.
    ///
    /// `mint_session` is only called when a new seat is actually created.
    pub fn join(
        &mut self,
        request: JoinRequest,
        now: Timestamp,
        config: &GameConfig,
        mint_session: impl FnOnce() -> SessionId,
    ) -> Result<JoinOutcome, JoinError> {
        if let Some(existing) = self.seat_for_repeat(&request, now, config) {
            return Ok(JoinOutcome {
                seat: existing,
                rejoined: true,
            });
        }

        let color = self.free_color().ok_or(JoinError::RoomFull)?;
        let player = Player {
            session_id: mint_session(),
            color,
            joined_at: now,
            client_id: request.client_id,
            display_name: request.display_name,
            provenance: request.provenance,
        };
        let seat = SeatAssignment {
            session_id: player.session_id.clone(),
            color,
        };

        self.players
            .try_push(player)
            .map_err(|_| JoinError::RoomFull)?;
        if self.is_full() && self.status == RoomStatus::Waiting {
            self.status = RoomStatus::Playing;
        }
        self.version += 1;

        Ok(JoinOutcome {
            seat,
            rejoined: false,
        })
    }

    /// Removes a player. Leaving a live game hands the win to the other side.
    pub fn leave(&mut self, session: &SessionId) -> Result<LeaveOutcome, LeaveError> {
        let index = self
            .players
            .iter()
            .position(|p| &p.session_id == session)
            .ok_or(LeaveError::UnknownPlayer)?;
        let player = self.players.remove(index);

        let ended_game = self.status == RoomStatus::Playing;
        if ended_game {
            self.status = RoomStatus::Finished;
            self.winner = self.players.first().map(|p| p.color);
            self.end_reason = Some(EndReason::OpponentLeft);
        }
        self.version += 1;

        Ok(LeaveOutcome { player, ended_game })
    }

    /// Applies a half-move for `session` through the [`MatchEngine`].
    pub fn apply_move(
        &mut self,
        session: &SessionId,
        from: Square,
        to: Square,
    ) -> Result<MoveRecord, MoveError> {
        let record = MatchEngine::new(self).apply_move(session, from, to)?;
        self.version += 1;
        Ok(record)
    }

    /// Light for the first seat, otherwise whichever color is unclaimed.
    fn free_color(&self) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|&color| self.players.iter().all(|p| p.color != color))
    }

    fn seat_for_repeat(
        &self,
        request: &JoinRequest,
        now: Timestamp,
        config: &GameConfig,
    ) -> Option<SeatAssignment> {
        let seat = |p: &Player| SeatAssignment {
            session_id: p.session_id.clone(),
            color: p.color,
        };

        if let Some(client_id) = &request.client_id
            && let Some(player) = self
                .players
                .iter()
                .find(|p| p.client_id.as_ref() == Some(client_id))
        {
            return Some(seat(player));
        }

        // Near-duplicate guard: same origin and signature within the window.
        let provenance = request.provenance.as_ref()?;
        self.players
            .iter()
            .rev()
            .find(|p| {
                p.provenance.as_ref() == Some(provenance)
                    && now.millis_since(p.joined_at) < config.rejoin_window_ms
            })
            .map(seat)
    }
}
