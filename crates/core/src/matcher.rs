//! Match detection - line scans for runs of three or more equal colors
//!
//! Rows are scanned left to right and columns top to bottom. A run is a
//! maximal stretch of equal, non-empty cells; empty cells break runs. Every
//! cell of a run of at least [`MIN_MATCH_LEN`] is part of the match set.
//! A cell in both a horizontal and a vertical run appears once.

use std::collections::BTreeSet;
use std::ops::{ControlFlow, Range};

use crate::grid::Grid;
use crate::types::{Pos, MIN_MATCH_LEN};

/// Unique matched coordinates, ordered row-major
pub type MatchSet = BTreeSet<Pos>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Row,
    Col,
}

impl Axis {
    #[inline(always)]
    fn pos(self, line: usize, i: usize) -> Pos {
        match self {
            Axis::Row => Pos::new(line, i),
            Axis::Col => Pos::new(i, line),
        }
    }
}

/// Visit every run of length >= MIN_MATCH_LEN, rows first, then columns.
fn visit_runs(
    grid: &Grid,
    mut visit: impl FnMut(Axis, usize, Range<usize>) -> ControlFlow<()>,
) -> ControlFlow<()> {
    let n = grid.size();
    for axis in [Axis::Row, Axis::Col] {
        for line in 0..n {
            let mut start = 0;
            while start < n {
                let Some(color) = grid.at(axis.pos(line, start)) else {
                    start += 1;
                    continue;
                };

                let mut end = start + 1;
                while end < n && grid.at(axis.pos(line, end)) == Some(color) {
                    end += 1;
                }

                if end - start >= MIN_MATCH_LEN {
                    visit(axis, line, start..end)?;
                }
                start = end;
            }
        }
    }
    ControlFlow::Continue(())
}

/// Every cell that belongs to a horizontal or vertical run of three or more
pub fn find_matches(grid: &Grid) -> MatchSet {
    let mut matches = MatchSet::new();
    let _ = visit_runs(grid, |axis, line, span| {
        matches.extend(span.map(|i| axis.pos(line, i)));
        ControlFlow::Continue(())
    });
    matches
}

/// Whether [`find_matches`] would return a non-empty set
pub fn has_match(grid: &Grid) -> bool {
    visit_runs(grid, |_, _, _| ControlFlow::Break(())).is_break()
}
