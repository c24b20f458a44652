//! Board geometry and piece placement.
//!
//! The board is a sparse map from occupied playable squares to pieces. Only
//! squares where `row + col` is odd are ever occupied. Light sets up on rows
//! `0..3` and moves toward increasing rows; dark sets up on rows `5..8` and
//! moves toward row 0.

use std::collections::BTreeMap;
use std::fmt;

use arrayvec::ArrayVec;

use crate::config::GameConfig;

/// Board coordinate expressed as row and column.
///
/// Coordinates outside `0..8` can be constructed (they arrive from clients)
/// but are never playable and never hold a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// True when the square lies inside the 8×8 grid.
    pub const fn is_on_board(self) -> bool {
        self.row < GameConfig::BOARD_SIZE && self.col < GameConfig::BOARD_SIZE
    }

    /// True when the square is a dark (playable) square.
    pub const fn is_playable(self) -> bool {
        self.is_on_board() && (self.row + self.col) % 2 == 1
    }

    /// Square reached by moving `dr` rows and `dc` columns, if it stays on the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Square> {
        let row = i16::from(self.row) + i16::from(dr);
        let col = i16::from(self.col) + i16::from(dc);
        let size = i16::from(GameConfig::BOARD_SIZE);
        if (0..size).contains(&row) && (0..size).contains(&col) {
            Some(Square::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Number of rows between two squares.
    pub const fn row_distance(self, other: Square) -> u8 {
        self.row.abs_diff(other.row)
    }

    /// Square halfway along a two-square diagonal jump.
    pub fn midpoint(self, other: Square) -> Option<Square> {
        if self.row_distance(other) != 2 || self.col.abs_diff(other.col) != 2 {
            return None;
        }
        Some(Square::new(
            (self.row + other.row) / 2,
            (self.col + other.col) / 2,
        ))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Side a piece or player belongs to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Color {
    /// Takes the first seat and the first turn.
    Light,
    Dark,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Light, Color::Dark];

    pub const fn opponent(self) -> Color {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Row delta of a forward step for this color's men.
    pub const fn forward(self) -> i8 {
        match self {
            Color::Light => 1,
            Color::Dark => -1,
        }
    }

    /// Row this color sets up from and defends.
    pub const fn home_row(self) -> u8 {
        match self {
            Color::Light => 0,
            Color::Dark => GameConfig::BOARD_SIZE - 1,
        }
    }

    /// Rows filled with this color's men at setup.
    pub fn setup_rows(self) -> std::ops::Range<u8> {
        match self {
            Color::Light => 0..GameConfig::SETUP_ROWS,
            Color::Dark => (GameConfig::BOARD_SIZE - GameConfig::SETUP_ROWS)..GameConfig::BOARD_SIZE,
        }
    }
}

/// Returns true when `row` is `color`'s own back rank.
///
/// A man is promoted when it lands on the *opponent's* back rank.
pub const fn is_back_rank(color: Color, row: u8) -> bool {
    row == color.home_row()
}

/// Returns true when the square may ever hold a piece.
pub const fn is_playable(square: Square) -> bool {
    square.is_playable()
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Rank {
    #[default]
    Man,
    /// Gained only by promotion; moves along all four diagonals.
    King,
}

/// Immutable piece value. Promotion replaces the piece rather than editing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    pub color: Color,
    pub rank: Rank,
}

impl Piece {
    pub const fn man(color: Color) -> Self {
        Self {
            color,
            rank: Rank::Man,
        }
    }

    pub const fn king(color: Color) -> Self {
        Self {
            color,
            rank: Rank::King,
        }
    }

    pub const fn is_king(self) -> bool {
        matches!(self.rank, Rank::King)
    }

    /// The king this piece becomes on promotion. Kings stay kings.
    pub const fn promoted(self) -> Self {
        Self::king(self.color)
    }

    /// Diagonal directions as `(row delta, col delta)`.
    pub fn directions(self) -> ArrayVec<(i8, i8), 4> {
        let mut dirs = ArrayVec::new();
        match self.rank {
            Rank::Man => {
                let dr = self.color.forward();
                dirs.push((dr, -1));
                dirs.push((dr, 1));
            }
            Rank::King => {
                dirs.extend([(1, -1), (1, 1), (-1, -1), (-1, 1)]);
            }
        }
        dirs
    }
}

/// A two-square jump: where the piece lands and which piece it removes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Capture {
    pub landing: Square,
    pub captured: Square,
}

/// One-step diagonal destinations for `piece` standing on `from`.
///
/// Pure geometry: occupancy is not considered.
pub fn candidate_steps(piece: Piece, from: Square) -> ArrayVec<Square, 4> {
    piece
        .directions()
        .into_iter()
        .filter_map(|(dr, dc)| from.offset(dr, dc))
        .collect()
}

/// Jumps available to `piece` on `from`: over an adjacent enemy onto an empty square.
pub fn candidate_captures(board: &Board, piece: Piece, from: Square) -> ArrayVec<Capture, 4> {
    piece
        .directions()
        .into_iter()
        .filter_map(|(dr, dc)| {
            let captured = from.offset(dr, dc)?;
            let landing = captured.offset(dr, dc)?;
            let jumped = board.piece_at(captured)?;
            (jumped.color != piece.color && board.is_empty_at(landing))
                .then_some(Capture { landing, captured })
        })
        .collect()
}

/// A reachable destination and, for jumps, the square it clears.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Destination {
    pub to: Square,
    pub captured: Option<Square>,
}

/// Errors raised when assembling a board from explicit placements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("square {0} is not playable")]
    NotPlayable(Square),

    #[error("square {0} holds more than one piece")]
    Duplicate(Square),
}

/// Sparse mapping from occupied playable squares to pieces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(into = "Vec<PlacedPiece>", try_from = "Vec<PlacedPiece>")
)]
pub struct Board {
    squares: BTreeMap<Square, Piece>,
}

impl Board {
    /// Standard setup: 12 men per side on the playable squares of each side's three home rows.
    pub fn initial() -> Self {
        let mut squares = BTreeMap::new();
        for color in Color::ALL {
            for row in color.setup_rows() {
                for col in 0..GameConfig::BOARD_SIZE {
                    let square = Square::new(row, col);
                    if square.is_playable() {
                        squares.insert(square, Piece::man(color));
                    }
                }
            }
        }
        Self { squares }
    }

    /// Builds a board from explicit placements, enforcing the parity invariant.
    pub fn from_pieces<I>(pieces: I) -> Result<Self, BoardError>
    where
        I: IntoIterator<Item = (Square, Piece)>,
    {
        let mut squares = BTreeMap::new();
        for (square, piece) in pieces {
            if !square.is_playable() {
                return Err(BoardError::NotPlayable(square));
            }
            if squares.insert(square, piece).is_some() {
                return Err(BoardError::Duplicate(square));
            }
        }
        Ok(Self { squares })
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares.get(&square).copied()
    }

    /// True for an on-board square that holds no piece.
    pub fn is_empty_at(&self, square: Square) -> bool {
        square.is_on_board() && !self.squares.contains_key(&square)
    }

    /// Number of pieces of `color` still on the board.
    pub fn count(&self, color: Color) -> usize {
        self.squares.values().filter(|p| p.color == color).count()
    }

    pub fn len(&self) -> usize {
        self.squares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.squares.is_empty()
    }

    /// Occupied squares in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares.iter().map(|(square, piece)| (*square, *piece))
    }

    /// Every destination the piece on `from` can reach in one half-move.
    ///
    /// Empty steps come first, then captures. Returns nothing for an empty square.
    pub fn destinations(&self, from: Square) -> ArrayVec<Destination, { GameConfig::MAX_DESTINATIONS }> {
        let mut out = ArrayVec::new();
        let Some(piece) = self.piece_at(from) else {
            return out;
        };

        for to in candidate_steps(piece, from) {
            if self.is_empty_at(to) {
                out.push(Destination { to, captured: None });
            }
        }
        for capture in candidate_captures(self, piece, from) {
            out.push(Destination {
                to: capture.landing,
                captured: Some(capture.captured),
            });
        }
        out
    }

    pub(crate) fn take(&mut self, square: Square) -> Option<Piece> {
        self.squares.remove(&square)
    }

    pub(crate) fn put(&mut self, square: Square, piece: Piece) {
        debug_assert!(square.is_playable(), "piece placed on non-playable {square}");
        self.squares.insert(square, piece);
    }
}

/// Wire form of one occupied square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedPiece {
    pub square: Square,
    pub piece: Piece,
}

impl From<Board> for Vec<PlacedPiece> {
    fn from(board: Board) -> Self {
        board
            .iter()
            .map(|(square, piece)| PlacedPiece { square, piece })
            .collect()
    }
}

impl TryFrom<Vec<PlacedPiece>> for Board {
    type Error = BoardError;

    fn try_from(pieces: Vec<PlacedPiece>) -> Result<Self, Self::Error> {
        Board::from_pieces(pieces.into_iter().map(|p| (p.square, p.piece)))
    }
}
