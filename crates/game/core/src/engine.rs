//! Half-move validation and application.
//!
//! The [`MatchEngine`] is the authoritative reducer for a room's board and
//! turn. A move goes through two phases: `validate` reads the room and plans
//! the move, `apply` commits the plan. Nothing is written unless validation
//! passes, so every rejection leaves the room untouched.

use crate::board::{Color, Piece, Square, is_back_rank};
use crate::error::{ErrorSeverity, GameError};
use crate::room::{Room, RoomStatus, SessionId};

/// Reasons a half-move is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("room is not playing (status: {status})")]
    NotPlaying { status: RoomStatus },

    #[error("session is not seated in this room")]
    UnknownPlayer,

    #[error("it is {turn}'s turn")]
    NotYourTurn { turn: Color },

    #[error("no piece at {from}")]
    NoPieceAtSource { from: Square },

    #[error("piece at {from} belongs to {owner}")]
    WrongOwner { from: Square, owner: Color },

    #[error("{to} is not reachable from {from}")]
    IllegalDestination { from: Square, to: Square },
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotPlaying { .. } | Self::NotYourTurn { .. } => ErrorSeverity::Recoverable,
            Self::UnknownPlayer
            | Self::NoPieceAtSource { .. }
            | Self::WrongOwner { .. }
            | Self::IllegalDestination { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotPlaying { .. } => "MOVE_NOT_PLAYING",
            Self::UnknownPlayer => "MOVE_UNKNOWN_PLAYER",
            Self::NotYourTurn { .. } => "MOVE_NOT_YOUR_TURN",
            Self::NoPieceAtSource { .. } => "MOVE_NO_PIECE_AT_SOURCE",
            Self::WrongOwner { .. } => "MOVE_WRONG_OWNER",
            Self::IllegalDestination { .. } => "MOVE_ILLEGAL_DESTINATION",
        }
    }
}

/// Outcome of a committed half-move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveRecord {
    pub color: Color,
    pub from: Square,
    pub to: Square,
    /// Square of the jumped piece, for captures.
    pub captured: Option<Square>,
    /// True when this move crowned a man.
    pub promoted: bool,
}

/// A validated move waiting to be committed.
#[derive(Clone, Copy, Debug)]
struct PlannedMove {
    piece: Piece,
    record: MoveRecord,
}

/// Reducer for a single room's match state.
pub struct MatchEngine<'a> {
    room: &'a mut Room,
}

impl<'a> MatchEngine<'a> {
    pub fn new(room: &'a mut Room) -> Self {
        Self { room }
    }

    /// Validates and applies one half-move by `session`.
    ///
    /// On success the board, turn and (possibly) status/winner are updated and
    /// the move record is returned. On failure the room is unchanged.
    pub fn apply_move(
        &mut self,
        session: &SessionId,
        from: Square,
        to: Square,
    ) -> Result<MoveRecord, MoveError> {
        let plan = validate(self.room, session, from, to)?;
        self.apply(plan);
        self.settle();
        Ok(plan.record)
    }

    fn apply(&mut self, plan: PlannedMove) {
        let record = plan.record;
        let board = &mut self.room.board;

        board.take(record.from);
        if let Some(captured) = record.captured {
            board.take(captured);
        }
        let piece = if record.promoted {
            plan.piece.promoted()
        } else {
            plan.piece
        };
        board.put(record.to, piece);

        self.room.turn = self.room.turn.opponent();
        self.room.last_move = Some(record);
    }

    /// Terminal check: a side with no pieces left loses.
    fn settle(&mut self) {
        let board = &self.room.board;
        let winner = match (board.count(Color::Light), board.count(Color::Dark)) {
            (0, 0) => return,
            (_, 0) => Color::Light,
            (0, _) => Color::Dark,
            _ => return,
        };

        self.room.status = RoomStatus::Finished;
        self.room.winner = Some(winner);
        self.room.end_reason = None;
    }
}

/// Validates a half-move against the room without touching it.
fn validate(
    room: &Room,
    session: &SessionId,
    from: Square,
    to: Square,
) -> Result<PlannedMove, MoveError> {
    if room.status != RoomStatus::Playing {
        return Err(MoveError::NotPlaying {
            status: room.status,
        });
    }

    let player = room.player(session).ok_or(MoveError::UnknownPlayer)?;
    if player.color != room.turn {
        return Err(MoveError::NotYourTurn { turn: room.turn });
    }

    let piece = room
        .board
        .piece_at(from)
        .ok_or(MoveError::NoPieceAtSource { from })?;
    if piece.color != player.color {
        return Err(MoveError::WrongOwner {
            from,
            owner: piece.color,
        });
    }

    let destination = room
        .board
        .destinations(from)
        .into_iter()
        .find(|d| d.to == to)
        .ok_or(MoveError::IllegalDestination { from, to })?;

    let promoted = !piece.is_king() && is_back_rank(piece.color.opponent(), to.row);

    Ok(PlannedMove {
        piece,
        record: MoveRecord {
            color: piece.color,
            from,
            to,
            captured: destination.captured,
            promoted,
        },
    })
}
