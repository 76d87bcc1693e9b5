//! Key mapping from terminal events to board input events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Cursor direction on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Input the board cursor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Move(Direction),
    /// Pick the cell under the cursor (first or second click)
    Select,
    /// Drop the current selection
    Cancel,
    Shuffle,
    Restart,
    Hint,
}

impl InputEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputEvent::Move(Direction::Up) => "up",
            InputEvent::Move(Direction::Down) => "down",
            InputEvent::Move(Direction::Left) => "left",
            InputEvent::Move(Direction::Right) => "right",
            InputEvent::Select => "select",
            InputEvent::Cancel => "cancel",
            InputEvent::Shuffle => "shuffle",
            InputEvent::Restart => "restart",
            InputEvent::Hint => "hint",
        }
    }
}

/// Map keyboard input to board input events.
pub fn handle_key_event(key: KeyEvent) -> Option<InputEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        // Cursor
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(InputEvent::Move(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(InputEvent::Move(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(InputEvent::Move(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => Some(InputEvent::Move(Direction::Down)),

        // Selection
        KeyCode::Enter | KeyCode::Char(' ') => Some(InputEvent::Select),
        KeyCode::Esc => Some(InputEvent::Cancel),

        // Actions
        KeyCode::Char('s') | KeyCode::Char('S') => Some(InputEvent::Shuffle),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(InputEvent::Restart),
        KeyCode::Char('?') | KeyCode::Char('i') | KeyCode::Char('I') => Some(InputEvent::Hint),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
