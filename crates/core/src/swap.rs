//! Swap validation - tentative swap, keep it only if it makes a match
//!
//! The validator never resolves anything itself; the session runs the
//! cascade after an accepted swap.

use crate::grid::Grid;
use crate::matcher::has_match;
use crate::types::{BoardError, Pos, Rejection};

/// Result of a swap attempt that did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapCheck {
    /// The swap stays in place; the board now has at least one match
    Accepted,
    /// The board is exactly as it was before the call
    Rejected(Rejection),
}

impl SwapCheck {
    pub fn is_accepted(self) -> bool {
        matches!(self, SwapCheck::Accepted)
    }
}

/// Check preconditions without touching the board
pub fn validate_swap(grid: &Grid, a: Pos, b: Pos) -> Result<Option<Rejection>, BoardError> {
    grid.check(a)?;
    grid.check(b)?;

    if !a.is_adjacent(b) {
        return Ok(Some(Rejection::NotAdjacent));
    }
    if grid.at(a).is_none() || grid.at(b).is_none() {
        return Ok(Some(Rejection::EmptyCell));
    }
    Ok(None)
}

/// Swap `a` and `b` if that creates a match, otherwise leave the board alone
///
/// Out-of-range positions fail with [`BoardError::OutOfRange`] before
/// anything is touched.
pub fn try_swap(grid: &mut Grid, a: Pos, b: Pos) -> Result<SwapCheck, BoardError> {
    if let Some(rejection) = validate_swap(grid, a, b)? {
        return Ok(SwapCheck::Rejected(rejection));
    }

    grid.swap(a, b)?;
    if has_match(grid) {
        return Ok(SwapCheck::Accepted);
    }

    grid.swap(a, b)?;
    Ok(SwapCheck::Rejected(Rejection::NoMatch))
}
