/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Window in milliseconds within which a seatless join carrying the same
    /// provenance as an already seated player is folded into that seat.
    pub rejoin_window_ms: u64,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Width and height of the board.
    pub const BOARD_SIZE: u8 = 8;
    /// Rows filled with men for each side at setup.
    pub const SETUP_ROWS: u8 = 3;
    /// Seats per room, one per color.
    pub const MAX_PLAYERS: usize = 2;
    /// Upper bound on destinations reachable from a single square (4 steps + 4 jumps).
    pub const MAX_DESTINATIONS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_REJOIN_WINDOW_MS: u64 = 2_000;

    pub fn new() -> Self {
        Self {
            rejoin_window_ms: Self::DEFAULT_REJOIN_WINDOW_MS,
        }
    }

    pub fn with_rejoin_window_ms(rejoin_window_ms: u64) -> Self {
        Self { rejoin_window_ms }
    }

    /// Number of men each side starts with.
    pub const fn pieces_per_side() -> usize {
        (Self::SETUP_ROWS as usize) * (Self::BOARD_SIZE as usize) / 2
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
