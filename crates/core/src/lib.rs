//! Core board logic - pure, deterministic, and testable
//!
//! Everything needed to play Rock Em Blocks without a screen: the square
//! grid, run detection, gravity and refill, swap validation and the session
//! that keeps score. Nothing here touches the terminal or the clock.
//!
//! # Module Structure
//!
//! - [`grid`]: square board of optional colors with bounds-checked access
//! - [`matcher`]: horizontal and vertical runs of three or more
//! - [`resolve`]: clear, collapse, refill, repeated until quiescent
//! - [`swap`]: adjacency checks and tentative swaps
//! - [`hint`]: search for a swap that would be accepted
//! - [`session`]: score, Idle/Resolving state, swap and shuffle requests
//! - [`rng`]: the randomness seam (seeded ChaCha or a scripted source)
//!
//! # Rules
//!
//! - A swap is accepted only between orthogonal neighbours and only if it
//!   leaves at least one run of three or more on the board.
//! - Every matched cell scores one point; cascades keep scoring.
//! - A shuffle costs [`DEFAULT_SHUFFLE_COST`](types::DEFAULT_SHUFFLE_COST)
//!   points and is refused when the score is lower.
//! - Between requests the board is always full and has no runs.
//!
//! # Example
//!
//! ```
//! use rock_em_blocks_core::{find_matches, GameSession};
//! use rock_em_blocks_core::types::{BoardConfig, SessionState};
//!
//! let mut session = GameSession::with_seed(BoardConfig::default(), 12345).unwrap();
//! assert_eq!(session.state(), SessionState::Idle);
//! assert!(find_matches(session.grid()).is_empty());
//!
//! if let Some((a, b)) = session.hint() {
//!     let outcome = session.swap(a, b).unwrap();
//!     assert!(outcome.is_accepted());
//!     assert!(session.score() >= 3);
//! }
//! ```

pub mod grid;
pub mod hint;
pub mod matcher;
pub mod resolve;
pub mod rng;
pub mod session;
pub mod snapshot;
pub mod swap;

pub use rock_em_blocks_types as types;

// Re-export commonly used types for convenience
pub use grid::Grid;
pub use hint::{find_valid_swap, has_valid_move};
pub use matcher::{find_matches, has_match, MatchSet};
pub use resolve::{resolve, Cascade, CascadeStep, Resolution};
pub use rng::{RandomSource, ScriptedSource};
pub use session::{GameSession, Outcome};
pub use snapshot::GameSnapshot;
pub use swap::{try_swap, validate_swap, SwapCheck};
