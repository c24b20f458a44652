//! Unified error types surfaced by the runtime API.
//!
//! Wraps rule rejections from `checkers-core` together with lookup failures
//! so transports can map every failure onto one flat taxonomy.
use thiserror::Error;

use checkers_core::{ErrorSeverity, GameError, JoinError, LeaveError, MoveError, RoomId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("room {room_id} not found")]
    NotFound { room_id: RoomId },

    #[error(transparent)]
    Join(#[from] JoinError),

    #[error(transparent)]
    Leave(#[from] LeaveError),

    #[error(transparent)]
    Move(#[from] MoveError),

    #[error("publish worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    pub(crate) fn not_found(room_id: &RoomId) -> Self {
        Self::NotFound {
            room_id: room_id.clone(),
        }
    }

    /// Flat classification for transports (status codes, client messages).
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Join(JoinError::RoomFull) => ErrorKind::RoomFull,
            Self::Leave(LeaveError::UnknownPlayer) => ErrorKind::UnknownPlayer,
            Self::Move(err) => match err {
                MoveError::NotPlaying { .. } => ErrorKind::NotPlaying,
                MoveError::UnknownPlayer => ErrorKind::UnknownPlayer,
                MoveError::NotYourTurn { .. } => ErrorKind::NotYourTurn,
                MoveError::NoPieceAtSource { .. } => ErrorKind::NoPieceAtSource,
                MoveError::WrongOwner { .. } => ErrorKind::WrongOwner,
                MoveError::IllegalDestination { .. } => ErrorKind::IllegalDestination,
            },
            Self::WorkerJoin(_) => ErrorKind::Internal,
        }
    }

    /// Severity of the underlying failure. Only worker failures are internal.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotFound { .. } => ErrorSeverity::Validation,
            Self::Join(err) => err.severity(),
            Self::Leave(err) => err.severity(),
            Self::Move(err) => err.severity(),
            Self::WorkerJoin(_) => ErrorSeverity::Internal,
        }
    }

    /// Stable identifier for logs and metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "ROOM_NOT_FOUND",
            Self::Join(err) => err.error_code(),
            Self::Leave(err) => err.error_code(),
            Self::Move(err) => err.error_code(),
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}

/// Request-level failure categories.
///
/// Everything except `Internal` is recoverable and leaves state untouched.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum ErrorKind {
    NotFound,
    RoomFull,
    UnknownPlayer,
    NotPlaying,
    NotYourTurn,
    NoPieceAtSource,
    WrongOwner,
    IllegalDestination,
    Internal,
}
