//! Deterministic checkers rules and room state shared by the runtime.
//!
//! `checkers-core` defines the canonical rules (board geometry, half-move
//! validation, room lifecycle) and exposes pure APIs with no clock, randomness
//! or I/O. Every board mutation flows through [`engine::MatchEngine`]; room
//! roster changes flow through [`room::Room::join`] and [`room::Room::leave`].
pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod room;

pub use board::{
    Board, BoardError, Capture, Color, Destination, Piece, PlacedPiece, Rank, Square,
    candidate_captures, candidate_steps, is_back_rank, is_playable,
};
pub use config::GameConfig;
pub use engine::{MatchEngine, MoveError, MoveRecord};
pub use error::{ErrorSeverity, GameError};
pub use room::{
    ClientId, EndReason, JoinError, JoinOutcome, JoinRequest, LeaveError, LeaveOutcome, Player,
    Provenance, Room, RoomId, RoomStatus, RoomSummary, SeatAssignment, SessionId, Timestamp,
};
