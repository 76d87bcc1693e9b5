//! Grid module - the N x N board of colored blocks
//!
//! Cells are stored in a flat row-major `Vec` (`row * size + col`), the side
//! length being fixed at construction. Coordinates are `(row, col)`, row 0 at
//! the top; gravity pulls toward row `size - 1`.

use std::fmt;

use arrayvec::ArrayVec;

use crate::types::{BoardError, Cell, ColorId, Pos};

/// The game board - `size` columns x `size` rows using flat storage
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
    /// Flat array of cells, row-major order (row * size + col)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a board with every cell empty
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Calculate flat index from (row, col) coordinates
    #[inline(always)]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(row * self.size + col)
    }

    #[inline]
    fn checked_index(&self, row: usize, col: usize) -> Result<usize, BoardError> {
        self.index(row, col).ok_or(BoardError::OutOfRange {
            row,
            col,
            size: self.size,
        })
    }

    /// Side length of the board
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get cell at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<Cell, BoardError> {
        self.checked_index(row, col).map(|idx| self.cells[idx])
    }

    /// Set cell at (row, col)
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> Result<(), BoardError> {
        let idx = self.checked_index(row, col)?;
        self.cells[idx] = cell;
        Ok(())
    }

    /// Bounds check for a position
    pub fn check(&self, pos: Pos) -> Result<(), BoardError> {
        self.checked_index(pos.row, pos.col).map(|_| ())
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.index(pos.row, pos.col).is_some()
    }

    /// Cell at a position already known to be on the board
    #[inline(always)]
    pub(crate) fn at(&self, pos: Pos) -> Cell {
        self.cells[pos.row * self.size + pos.col]
    }

    #[inline(always)]
    pub(crate) fn put(&mut self, pos: Pos, cell: Cell) {
        self.cells[pos.row * self.size + pos.col] = cell;
    }

    /// Exchange the contents of two cells
    pub fn swap(&mut self, a: Pos, b: Pos) -> Result<(), BoardError> {
        let ia = self.checked_index(a.row, a.col)?;
        let ib = self.checked_index(b.row, b.col)?;
        self.cells.swap(ia, ib);
        Ok(())
    }

    /// Orthogonal neighbours of `pos` that lie on the board
    pub fn neighbors(&self, pos: Pos) -> ArrayVec<Pos, 4> {
        let mut out = ArrayVec::new();
        if pos.row > 0 {
            out.push(Pos::new(pos.row - 1, pos.col));
        }
        if pos.col > 0 {
            out.push(Pos::new(pos.row, pos.col - 1));
        }
        if pos.col + 1 < self.size {
            out.push(Pos::new(pos.row, pos.col + 1));
        }
        if pos.row + 1 < self.size {
            out.push(Pos::new(pos.row + 1, pos.col));
        }
        out
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Iterate rows top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Pos::new(row, col)))
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_none()).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_some())
    }

    /// Set every cell empty
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Build a board from rows of cells; the rows must form a square
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, BoardError> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return Err(BoardError::InvalidConfig(format!(
                "rows do not form a {size}x{size} square"
            )));
        }
        Ok(Self {
            size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a board from letter rows: `A..Z` are colors, `.` is empty
    ///
    /// ```
    /// use rock_em_blocks_core::Grid;
    /// use rock_em_blocks_core::types::ColorId;
    ///
    /// let grid = Grid::from_letters(&["AB.", "CAB", "BCA"]).unwrap();
    /// assert_eq!(grid.size(), 3);
    /// assert_eq!(grid.get(0, 1).unwrap(), Some(ColorId(1)));
    /// assert_eq!(grid.get(0, 2).unwrap(), None);
    /// ```
    pub fn from_letters(rows: &[&str]) -> Result<Self, BoardError> {
        let parsed = rows
            .iter()
            .map(|row| {
                row.chars()
                    .map(|ch| match ch {
                        '.' => Ok(None),
                        _ => ColorId::from_letter(ch).map(Some).ok_or_else(|| {
                            BoardError::InvalidConfig(format!("unknown cell letter {ch:?}"))
                        }),
                    })
                    .collect::<Result<Vec<Cell>, BoardError>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(parsed)
    }

    /// Convert to a 2D vector (for tests and display)
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        self.rows().map(|row| row.to_vec()).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            for cell in row {
                let ch = cell.map(ColorId::letter).unwrap_or('.');
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}
