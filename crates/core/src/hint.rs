//! Move search - find a swap that would be accepted
//!
//! Used for hints and to tell the player the board is stuck (only a shuffle
//! helps then).

use crate::grid::Grid;
use crate::matcher::has_match;
use crate::types::Pos;

/// First accepted swap in row-major order, trying the right neighbour and
/// then the one below
pub fn find_valid_swap(grid: &Grid) -> Option<(Pos, Pos)> {
    let mut scratch = grid.clone();

    for a in grid.positions() {
        if grid.at(a).is_none() {
            continue;
        }
        for b in grid.neighbors(a).into_iter().filter(|&b| b > a) {
            if grid.at(b).is_none() {
                continue;
            }
            scratch.put(a, grid.at(b));
            scratch.put(b, grid.at(a));
            let found = has_match(&scratch);
            scratch.put(a, grid.at(a));
            scratch.put(b, grid.at(b));
            if found {
                return Some((a, b));
            }
        }
    }
    None
}

/// Whether any swap would be accepted
pub fn has_valid_move(grid: &Grid) -> bool {
    find_valid_swap(grid).is_some()
}
