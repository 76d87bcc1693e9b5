//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are plain data with no I/O, making them usable in any context
//! (core logic, terminal rendering, input mapping).
//!
//! # Board Dimensions
//!
//! The board is a square grid of `N x N` cells, `N` defaulting to 8:
//!
//! - **Rows**: indexed `0..N` from top to bottom
//! - **Columns**: indexed `0..N` from left to right
//! - **Gravity**: pulls toward row `N - 1`
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_GRID_SIZE` | 8 | Side length of the board |
//! | `DEFAULT_SHUFFLE_COST` | 15 | Points deducted by a shuffle |
//! | `DEFAULT_MAX_CASCADE_ROUNDS` | 1000 | Round cap for one resolution |
//! | `MIN_MATCH_LEN` | 3 | Shortest run that counts as a match |
//! | `MIN_PALETTE_SIZE` | 4 | Fewest colors a board may use |
//! | `TICK_MS` | 16 | Fixed timestep of the terminal loop (~60 FPS) |
//! | `CASCADE_FRAME_MS` | 120 | How long each cascade frame is shown |
//!
//! # Examples
//!
//! ```
//! use rock_em_blocks_types::{BoardConfig, ColorId, Pos, DEFAULT_GRID_SIZE};
//!
//! let config = BoardConfig::default();
//! assert_eq!(config.size, DEFAULT_GRID_SIZE);
//! assert!(config.validate().is_ok());
//!
//! assert!(Pos::new(2, 3).is_adjacent(Pos::new(2, 4)));
//! assert!(!Pos::new(0, 0).is_adjacent(Pos::new(1, 1)));
//!
//! assert_eq!(ColorId::from_letter('b'), Some(ColorId(1)));
//! ```

use thiserror::Error;

/// Default board side length (8 x 8)
pub const DEFAULT_GRID_SIZE: usize = 8;

/// Smallest board that can hold a run
pub const MIN_GRID_SIZE: usize = 3;

/// Largest supported board side length
pub const MAX_GRID_SIZE: usize = 64;

/// Shortest run of equal colors that counts as a match
pub const MIN_MATCH_LEN: usize = 3;

/// Fewest palette entries a board may be configured with
pub const MIN_PALETTE_SIZE: usize = 4;

/// Most palette entries (one per letter `A..=Z`)
pub const MAX_PALETTE_SIZE: usize = 26;

/// Points deducted by an accepted shuffle
pub const DEFAULT_SHUFFLE_COST: u32 = 15;

/// Round cap for a single resolution before it is treated as an overrun
pub const DEFAULT_MAX_CASCADE_ROUNDS: u32 = 1000;

/// Fixed timestep interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Display time of one cascade frame in the terminal front-end
pub const CASCADE_FRAME_MS: u32 = 120;

/// Number of colors in [`DEFAULT_PALETTE`]
pub const DEFAULT_PALETTE_SIZE: usize = 6;

/// Red, green, blue, yellow, magenta, cyan
pub const DEFAULT_PALETTE: [ColorId; DEFAULT_PALETTE_SIZE] = [
    ColorId(0),
    ColorId(1),
    ColorId(2),
    ColorId(3),
    ColorId(4),
    ColorId(5),
];


/// A palette entry
///
/// Colors are opaque indices; the renderer decides what each one looks like.
/// For text fixtures and logs each color also has a letter (`A` for 0, `B`
/// for 1, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorId(pub u8);

impl ColorId {
    /// Palette index of this color
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Uppercase letter for this color (`A..=Z`), `?` past the alphabet
    pub fn letter(self) -> char {
        if (self.0 as usize) < MAX_PALETTE_SIZE {
            (b'A' + self.0) as char
        } else {
            '?'
        }
    }

    /// Parse a color letter (case-insensitive)
    pub fn from_letter(ch: char) -> Option<Self> {
        let upper = ch.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(ColorId(upper as u8 - b'A'))
        } else {
            None
        }
    }
}

/// A cell on the board
///
/// - `None`: Empty cell (only observable mid-resolution)
/// - `Some(ColorId)`: Cell holding a block of that color
pub type Cell = Option<ColorId>;

/// Board coordinate, row first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Manhattan distance between two positions
    pub fn manhattan(self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// True when the positions share a row or column and differ by one
    pub fn is_adjacent(self, other: Pos) -> bool {
        self.manhattan(other) == 1
    }
}

/// Session state machine
///
/// - **Idle**: accepting swap and shuffle requests
/// - **Resolving**: a cascade is running; mutating requests are rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Resolving,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Resolving => "resolving",
        }
    }
}

/// Requests the input layer can issue against a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Swap two cells (adjacency is checked again by the session)
    Swap(Pos, Pos),
    /// Permute every color on the board, paid for with score
    Shuffle,
    /// Throw the board away and start over
    Restart,
}

impl GameAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Swap(..) => "swap",
            GameAction::Shuffle => "shuffle",
            GameAction::Restart => "restart",
        }
    }
}

/// Why a swap or shuffle request was turned down
///
/// These are expected outcomes of play, not errors: the board is left
/// exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A cascade is in progress
    Busy,
    /// The two cells are not orthogonal neighbours
    NotAdjacent,
    /// One of the cells is empty
    EmptyCell,
    /// The swap would not create a match
    NoMatch,
    /// Not enough score to pay for a shuffle
    InsufficientScore { score: u32, cost: u32 },
}

impl Rejection {
    pub fn code(self) -> &'static str {
        match self {
            Rejection::Busy => "busy",
            Rejection::NotAdjacent | Rejection::EmptyCell | Rejection::NoMatch => "invalid_swap",
            Rejection::InsufficientScore { .. } => "insufficient_score",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Rejection::Busy => "board is still resolving",
            Rejection::NotAdjacent => "cells are not adjacent",
            Rejection::EmptyCell => "cannot swap an empty cell",
            Rejection::NoMatch => "swap would not make a match",
            Rejection::InsufficientScore { .. } => "not enough score to shuffle",
        }
    }
}

/// Failures that leave the call without effect, or signal a broken invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("position ({row}, {col}) is outside a {size}x{size} board")]
    OutOfRange { row: usize, col: usize, size: usize },

    #[error("resolution did not settle after {rounds} cascade rounds")]
    ResolutionOverrun { rounds: u32 },

    #[error("invalid board config: {0}")]
    InvalidConfig(String),
}

/// Host-supplied board configuration
///
/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Side length of the square board
    pub size: usize,
    /// Colors new blocks are drawn from (uniformly)
    pub palette: Vec<ColorId>,
    /// Points an accepted shuffle costs
    pub shuffle_cost: u32,
    /// Resolution round cap
    pub max_cascade_rounds: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            palette: DEFAULT_PALETTE.to_vec(),
            shuffle_cost: DEFAULT_SHUFFLE_COST,
            max_cascade_rounds: DEFAULT_MAX_CASCADE_ROUNDS,
        }
    }
}

impl BoardConfig {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_palette(mut self, palette: Vec<ColorId>) -> Self {
        self.palette = palette;
        self
    }

    /// Use the first `count` letters as the palette
    pub fn with_color_count(mut self, count: usize) -> Self {
        self.palette = (0..count.min(MAX_PALETTE_SIZE) as u8).map(ColorId).collect();
        self
    }

    pub fn with_shuffle_cost(mut self, cost: u32) -> Self {
        self.shuffle_cost = cost;
        self
    }

    pub fn with_max_cascade_rounds(mut self, rounds: u32) -> Self {
        self.max_cascade_rounds = rounds;
        self
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.size < MIN_GRID_SIZE || self.size > MAX_GRID_SIZE {
            return Err(BoardError::InvalidConfig(format!(
                "size must be within {MIN_GRID_SIZE}..={MAX_GRID_SIZE}, got {}",
                self.size
            )));
        }
        if self.palette.len() < MIN_PALETTE_SIZE {
            return Err(BoardError::InvalidConfig(format!(
                "palette needs at least {MIN_PALETTE_SIZE} colors, got {}",
                self.palette.len()
            )));
        }
        for (i, color) in self.palette.iter().enumerate() {
            if self.palette[..i].contains(color) {
                return Err(BoardError::InvalidConfig(format!(
                    "palette lists color {} twice",
                    color.letter()
                )));
            }
        }
        if self.max_cascade_rounds == 0 {
            return Err(BoardError::InvalidConfig(
                "max_cascade_rounds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
