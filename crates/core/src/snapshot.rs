use crate::types::{Cell, Pos, Rejection, SessionState};

/// Read-only projection of a session for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameSnapshot {
    pub size: usize,
    /// Row-major cells, `size * size` long
    pub cells: Vec<Cell>,
    pub score: u32,
    pub state: SessionState,
    pub shuffle_cost: u32,
    pub moves: u32,
    pub shuffles: u32,
    pub episode_id: u32,
    /// Cells cleared by the last accepted swap or shuffle
    pub last_cleared: u32,
    /// Cascade rounds of the last accepted swap or shuffle
    pub last_rounds: u32,
    pub last_rejection: Option<Rejection>,
    /// At least one swap would be accepted
    pub has_moves: bool,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.size = 0;
        self.cells.clear();
        self.score = 0;
        self.state = SessionState::Idle;
        self.shuffle_cost = 0;
        self.moves = 0;
        self.shuffles = 0;
        self.episode_id = 0;
        self.last_cleared = 0;
        self.last_rounds = 0;
        self.last_rejection = None;
        self.has_moves = false;
    }

    pub fn cell(&self, pos: Pos) -> Option<Cell> {
        if pos.row >= self.size || pos.col >= self.size {
            return None;
        }
        self.cells.get(pos.row * self.size + pos.col).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    pub fn playable(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn can_shuffle(&self) -> bool {
        self.playable() && self.score >= self.shuffle_cost
    }
}
