//! Resolution engine - clear matches, apply gravity, refill, repeat
//!
//! One cascade round:
//!
//! 1. Find matches; stop if there are none
//! 2. Empty every matched cell
//! 3. Compact each column downward, keeping block order, so the empties
//!    end up at the top
//! 4. Fill the top empties with fresh random colors
//!
//! Rounds repeat until the board is quiescent. A round cap guards against a
//! palette that can never settle; running into it is a
//! [`BoardError::ResolutionOverrun`].
//!
//! [`resolve`] runs the loop in place. [`Cascade`] runs the same loop lazily
//! and yields a [`CascadeStep`] per round, with copies of the board before the
//! clear, after the collapse and after the refill. Front-ends replay those to
//! animate cascades.

use tracing::{debug, warn};

use crate::grid::Grid;
use crate::matcher::{find_matches, has_match, MatchSet};
use crate::rng::RandomSource;
use crate::types::{BoardError, Cell, ColorId, Pos};

/// Totals for one full resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// Cells removed across all rounds
    pub cleared: u32,
    /// Rounds that removed at least one run
    pub rounds: u32,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.rounds == 0
    }
}

/// One cascade round, as seen by a presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeStep {
    /// 1-based round number within the cascade
    pub round: u32,
    /// Board as it stood when the round began
    pub before: Grid,
    /// Cells removed this round
    pub matched: MatchSet,
    /// Board after gravity, before refill (empties at the top)
    pub collapsed: Grid,
    /// Board after refill
    pub filled: Grid,
}

impl CascadeStep {
    pub fn cleared(&self) -> u32 {
        self.matched.len() as u32
    }
}

/// Empty every matched cell; returns how many were cleared
pub fn clear_cells(grid: &mut Grid, matches: &MatchSet) -> u32 {
    let mut cleared = 0;
    for &pos in matches {
        if grid.contains(pos) {
            grid.put(pos, None);
            cleared += 1;
        }
    }
    cleared
}

/// Stable downward compaction of a single column
///
/// Blocks keep their relative order, the bottom-most block stays
/// bottom-most, and the vacated cells at the top are left empty.
/// Returns the number of empty cells now at the top.
pub fn compact_column(grid: &mut Grid, col: usize) -> usize {
    let n = grid.size();
    if col >= n {
        return 0;
    }

    // Two-pointer scan from the bottom: `write` is the next slot to fill.
    let mut write = n;
    for read in (0..n).rev() {
        let cell = grid.at(Pos::new(read, col));
        if cell.is_some() {
            write -= 1;
            if write != read {
                grid.put(Pos::new(write, col), cell);
            }
        }
    }

    for row in 0..write {
        grid.put(Pos::new(row, col), None);
    }
    write
}

/// Apply gravity to every column; returns the total number of empties
pub fn collapse(grid: &mut Grid) -> usize {
    (0..grid.size()).map(|col| compact_column(grid, col)).sum()
}

/// Fill every empty cell with a uniform draw from `palette`
///
/// Cells are filled row-major. Returns the number of cells spawned.
pub fn refill<R: RandomSource + ?Sized>(grid: &mut Grid, palette: &[ColorId], rng: &mut R) -> usize {
    if palette.is_empty() {
        return 0;
    }
    let mut spawned = 0;
    for cell in grid.cells_mut() {
        if cell.is_none() {
            *cell = Some(palette[rng.next_index(palette.len())]);
            spawned += 1;
        }
    }
    spawned
}

/// Fill the whole board with fresh random colors, discarding what was there
pub fn fill_random<R: RandomSource + ?Sized>(grid: &mut Grid, palette: &[ColorId], rng: &mut R) {
    grid.clear();
    refill(grid, palette, rng);
}

/// Run one round. Returns the matches that were removed, or `None` when the
/// board was already quiescent. `on_collapse` sees the board between gravity
/// and refill.
fn run_round<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    palette: &[ColorId],
    rng: &mut R,
    mut on_collapse: impl FnMut(&Grid),
) -> Option<MatchSet> {
    let matches = find_matches(grid);
    if matches.is_empty() {
        return None;
    }

    clear_cells(grid, &matches);
    collapse(grid);
    on_collapse(grid);
    refill(grid, palette, rng);
    Some(matches)
}

fn overrun(rounds: u32, grid: &Grid) -> BoardError {
    warn!(rounds, board = %grid, "cascade did not settle within the round cap");
    BoardError::ResolutionOverrun { rounds }
}

/// Resolve the board to quiescence in place
pub fn resolve<R: RandomSource + ?Sized>(
    grid: &mut Grid,
    palette: &[ColorId],
    rng: &mut R,
    max_rounds: u32,
) -> Result<Resolution, BoardError> {
    let mut total = Resolution::default();

    loop {
        if total.rounds >= max_rounds {
            // The cap is only an error if there is still something to clear.
            if has_match(grid) {
                return Err(overrun(total.rounds, grid));
            }
            return Ok(total);
        }

        let Some(matches) = run_round(grid, palette, rng, |_| {}) else {
            return Ok(total);
        };

        total.rounds += 1;
        total.cleared += matches.len() as u32;
        debug!(round = total.rounds, cleared = matches.len(), "cascade round");
    }
}

/// Lazy cascade: yields one [`CascadeStep`] per round until quiescence
///
/// The sequence is finite: it ends when no matches remain, or after yielding
/// a single `Err` when the round cap is hit.
pub struct Cascade<'a, R: RandomSource + ?Sized> {
    grid: &'a mut Grid,
    palette: &'a [ColorId],
    rng: &'a mut R,
    round: u32,
    max_rounds: u32,
    done: bool,
}

impl<'a, R: RandomSource + ?Sized> Cascade<'a, R> {
    pub fn new(grid: &'a mut Grid, palette: &'a [ColorId], rng: &'a mut R, max_rounds: u32) -> Self {
        Self {
            grid,
            palette,
            rng,
            round: 0,
            max_rounds,
            done: false,
        }
    }

    /// Rounds yielded so far
    pub fn rounds(&self) -> u32 {
        self.round
    }
}

impl<R: RandomSource + ?Sized> Iterator for Cascade<'_, R> {
    type Item = Result<CascadeStep, BoardError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if self.round >= self.max_rounds {
            self.done = true;
            if has_match(self.grid) {
                return Some(Err(overrun(self.round, self.grid)));
            }
            return None;
        }

        let before = self.grid.clone();
        let mut collapsed: Option<Grid> = None;
        let Some(matched) = run_round(self.grid, self.palette, self.rng, |g| {
            collapsed = Some(g.clone());
        }) else {
            self.done = true;
            return None;
        };

        self.round += 1;
        debug!(round = self.round, cleared = matched.len(), "cascade round");

        Some(Ok(CascadeStep {
            round: self.round,
            before,
            collapsed: collapsed.unwrap_or_else(|| self.grid.clone()),
            filled: self.grid.clone(),
            matched,
        }))
    }
}

/// Non-empty cells of a column, top to bottom
pub fn column_blocks(grid: &Grid, col: usize) -> Vec<Cell> {
    (0..grid.size())
        .map(|row| grid.at(Pos::new(row, col)))
        .filter(Option::is_some)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;
    use crate::types::DEFAULT_PALETTE;

    fn letters(grid: &Grid) -> String {
        grid.to_string()
    }

    #[test]
    fn test_compact_column_is_stable() {
        let mut grid = Grid::from_letters(&["A...", "....", "B...", "...."]).unwrap();

        let empties = compact_column(&mut grid, 0);
        assert_eq!(empties, 2);
        assert_eq!(letters(&grid), "..../..../A.../B...");
    }

    #[test]
    fn test_compact_column_preserves_order_and_multiset() {
        let mut grid = Grid::from_letters(&["C....", "A....", ".....", "B....", "....."]).unwrap();
        let before = column_blocks(&grid, 0);

        compact_column(&mut grid, 0);

        assert_eq!(column_blocks(&grid, 0), before);
        assert_eq!(grid.get(4, 0), Ok(Some(ColorId(1))));
        assert_eq!(grid.get(3, 0), Ok(Some(ColorId(0))));
        assert_eq!(grid.get(2, 0), Ok(Some(ColorId(2))));
        assert_eq!(grid.get(1, 0), Ok(None));
        assert_eq!(grid.get(0, 0), Ok(None));
    }

    #[test]
    fn test_compact_full_column_is_noop() {
        let mut grid = Grid::from_letters(&["AB", "BA"]).unwrap();
        let before = grid.clone();
        assert_eq!(collapse(&mut grid), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_refill_only_touches_empties() {
        let mut grid = Grid::from_letters(&["..C", "A.C", "ABD"]).unwrap();
        let mut rng = ScriptedSource::new(vec![4, 5, 3]);

        let spawned = refill(&mut grid, &DEFAULT_PALETTE, &mut rng);

        assert_eq!(spawned, 3);
        assert_eq!(letters(&grid), "EFC/ADC/ABD");
    }

    #[test]
    fn test_resolve_single_round() {
        // Bottom row clears; the column tops are refilled with E, F, E.
        let mut grid = Grid::from_letters(&["ABC", "BCA", "DDD"]).unwrap();
        let mut rng = ScriptedSource::new(vec![4, 5]);

        let res = resolve(&mut grid, &DEFAULT_PALETTE, &mut rng, 100).unwrap();

        assert_eq!(res, Resolution { cleared: 3, rounds: 1 });
        assert_eq!(letters(&grid), "EFE/ABC/BCA");
        assert!(!has_match(&grid));
    }

    #[test]
    fn test_resolve_chains_a_second_round() {
        // Clearing EEE drops column 0 into a vertical AAA run.
        let mut grid = Grid::from_letters(&["ABCD", "EEEB", "ACDA", "ADBC"]).unwrap();
        assert_eq!(find_matches(&grid).len(), 3);

        let mut rng = ScriptedSource::new(vec![5, 4]);
        let res = resolve(&mut grid, &DEFAULT_PALETTE, &mut rng, 100).unwrap();

        assert_eq!(res, Resolution { cleared: 6, rounds: 2 });
        assert_eq!(letters(&grid), "EEFD/FBCB/ECDA/FDBC");
        assert!(!has_match(&grid));
    }

    #[test]
    fn test_resolve_quiescent_board_is_noop() {
        let mut grid = Grid::from_letters(&["AAB", "CDD", "ABB"]).unwrap();
        let before = grid.clone();
        let mut rng = ScriptedSource::zeros();

        let res = resolve(&mut grid, &DEFAULT_PALETTE, &mut rng, 100).unwrap();

        assert!(res.is_empty());
        assert_eq!(res.cleared, 0);
        assert_eq!(grid, before);
        assert_eq!(rng.consumed(), 0);
    }

    #[test]
    fn test_single_color_palette_overruns() {
        let mut grid = Grid::from_letters(&["AAA", "BCB", "CBC"]).unwrap();
        let mut rng = ScriptedSource::zeros();

        let err = resolve(&mut grid, &[ColorId(0)], &mut rng, 5).unwrap_err();
        assert_eq!(err, BoardError::ResolutionOverrun { rounds: 5 });
    }

    #[test]
    fn test_cascade_steps_match_resolve() {
        let start = Grid::from_letters(&["ABC", "BCA", "DDD"]).unwrap();

        let mut a = start.clone();
        let mut rng_a = ScriptedSource::new(vec![4, 5]);
        let res = resolve(&mut a, &DEFAULT_PALETTE, &mut rng_a, 100).unwrap();

        let mut b = start.clone();
        let mut rng_b = ScriptedSource::new(vec![4, 5]);
        let steps: Vec<CascadeStep> = Cascade::new(&mut b, &DEFAULT_PALETTE, &mut rng_b, 100)
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(steps.len() as u32, res.rounds);
        assert_eq!(steps.iter().map(CascadeStep::cleared).sum::<u32>(), res.cleared);

        let first = &steps[0];
        assert_eq!(first.round, 1);
        assert_eq!(first.before, start);
        assert_eq!(letters(&first.collapsed), ".../ABC/BCA");
        assert_eq!(first.filled, b);
    }

    #[test]
    fn test_cascade_ends_with_single_error_on_overrun() {
        let mut grid = Grid::from_letters(&["AAA", "BCB", "CBC"]).unwrap();
        let mut rng = ScriptedSource::zeros();
        let items: Vec<_> = Cascade::new(&mut grid, &[ColorId(0)], &mut rng, 3).collect();

        assert_eq!(items.len(), 4);
        assert!(items[..3].iter().all(Result::is_ok));
        assert_eq!(
            items[3].clone().unwrap_err(),
            BoardError::ResolutionOverrun { rounds: 3 }
        );
    }
}
