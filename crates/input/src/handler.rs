//! Cursor and two-click selection for the board.
//!
//! The first pick selects a cell; the second pick either swaps with the
//! selection (orthogonal neighbours) or just drops the selection. Keyboard
//! picks use the cursor; mouse picks come in as board positions.

use crate::map::{Direction, InputEvent};
use crate::types::{GameAction, Pos};

/// Tracks cursor, selection and hint highlight.
#[derive(Debug, Clone)]
pub struct InputHandler {
    size: usize,
    cursor: Pos,
    selected: Option<Pos>,
    hint: Option<(Pos, Pos)>,
}

impl InputHandler {
    pub fn new(size: usize) -> Self {
        Self {
            size: size.max(1),
            cursor: Pos::default(),
            selected: None,
            hint: None,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cursor(&self) -> Pos {
        self.cursor
    }

    pub fn selected(&self) -> Option<Pos> {
        self.selected
    }

    pub fn hint(&self) -> Option<(Pos, Pos)> {
        self.hint
    }

    /// Highlight a suggested swap until the next pick or cursor move
    pub fn set_hint(&mut self, hint: Option<(Pos, Pos)>) {
        self.hint = hint;
    }

    /// Feed one input event. Returns the game request it completes, if any.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<GameAction> {
        match event {
            InputEvent::Move(dir) => {
                self.move_cursor(dir);
                None
            }
            InputEvent::Select => self.pick(self.cursor),
            InputEvent::Cancel => {
                self.selected = None;
                self.hint = None;
                None
            }
            InputEvent::Shuffle => {
                self.selected = None;
                self.hint = None;
                Some(GameAction::Shuffle)
            }
            InputEvent::Restart => {
                self.reset();
                Some(GameAction::Restart)
            }
            // The caller owns the board and fills in the hint.
            InputEvent::Hint => None,
        }
    }

    /// Mouse pick on a board cell. The cursor follows the click.
    pub fn click(&mut self, pos: Pos) -> Option<GameAction> {
        if pos.row >= self.size || pos.col >= self.size {
            return None;
        }
        self.cursor = pos;
        self.pick(pos)
    }

    fn pick(&mut self, pos: Pos) -> Option<GameAction> {
        self.hint = None;
        match self.selected.take() {
            None => {
                self.selected = Some(pos);
                None
            }
            Some(first) if first.is_adjacent(pos) => Some(GameAction::Swap(first, pos)),
            // Same cell or too far away: the second pick only deselects.
            Some(_) => None,
        }
    }

    fn move_cursor(&mut self, dir: Direction) {
        self.hint = None;
        let last = self.size - 1;
        let Pos { row, col } = self.cursor;
        self.cursor = match dir {
            Direction::Up => Pos::new(row.saturating_sub(1), col),
            Direction::Down => Pos::new((row + 1).min(last), col),
            Direction::Left => Pos::new(row, col.saturating_sub(1)),
            Direction::Right => Pos::new(row, (col + 1).min(last)),
        };
    }

    pub fn reset(&mut self) {
        self.cursor = Pos::default();
        self.selected = None;
        self.hint = None;
    }
}
