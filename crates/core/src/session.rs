//! Game session - owns the board and runs swaps, shuffles and cascades
//!
//! This module ties together the grid, match detection, swap validation and
//! the resolution engine. It keeps the score and an explicit
//! Idle/Resolving state machine; swap and shuffle requests are only taken
//! while Idle.
//!
//! Every call runs its whole cascade before returning. The rounds of the
//! last cascade are kept as [`CascadeStep`]s so a front-end can replay them.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::grid::Grid;
use crate::hint::{find_valid_swap, has_valid_move};
use crate::resolve::{fill_random, refill, resolve, Cascade, CascadeStep, Resolution};
use crate::rng::RandomSource;
use crate::snapshot::GameSnapshot;
use crate::swap::{try_swap, SwapCheck};
use crate::types::*;

/// What became of a swap, shuffle or restart request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The request was carried out and the board resolved to quiescence
    Accepted { cleared: u32, rounds: u32 },
    /// Nothing changed
    Rejected(Rejection),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    pub fn cleared(&self) -> u32 {
        match self {
            Outcome::Accepted { cleared, .. } => *cleared,
            Outcome::Rejected(_) => 0,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Accepted { .. } => None,
            Outcome::Rejected(r) => Some(*r),
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession<R = ChaCha8Rng> {
    config: BoardConfig,
    grid: Grid,
    rng: R,
    score: u32,
    state: SessionState,
    /// Accepted swaps since the last restart
    moves: u32,
    /// Accepted shuffles since the last restart
    shuffles: u32,
    /// Monotonic episode id (increments on restart)
    episode_id: u32,
    last: Resolution,
    last_rejection: Option<Rejection>,
    last_cascade: Vec<CascadeStep>,
    record_cascades: bool,
    has_moves: bool,
}

impl GameSession<ChaCha8Rng> {
    /// Create a session on a seeded `ChaCha8Rng`
    pub fn with_seed(config: BoardConfig, seed: u64) -> Result<Self, BoardError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: RandomSource> GameSession<R> {
    /// Create a session and bring a freshly filled board to quiescence
    pub fn new(config: BoardConfig, rng: R) -> Result<Self, BoardError> {
        config.validate()?;
        let mut session = Self::blank(Grid::new(config.size), config, rng);
        session.initialize()?;
        Ok(session)
    }

    /// Create a session around an existing board and score
    ///
    /// Empty cells are refilled and any matches on the board are resolved
    /// (and scored) before the session accepts input.
    pub fn from_grid(config: BoardConfig, grid: Grid, score: u32, rng: R) -> Result<Self, BoardError> {
        config.validate()?;
        if grid.size() != config.size {
            return Err(BoardError::InvalidConfig(format!(
                "grid is {0}x{0} but the config asks for {1}x{1}",
                grid.size(),
                config.size
            )));
        }
        let mut session = Self::blank(grid, config, rng);
        session.score = score;
        refill(&mut session.grid, &session.config.palette, &mut session.rng);
        session.settle()?;
        Ok(session)
    }

    fn blank(grid: Grid, config: BoardConfig, rng: R) -> Self {
        Self {
            config,
            grid,
            rng,
            score: 0,
            state: SessionState::Idle,
            moves: 0,
            shuffles: 0,
            episode_id: 0,
            last: Resolution::default(),
            last_rejection: None,
            last_cascade: Vec::new(),
            record_cascades: true,
            has_moves: false,
        }
    }

    /// Fill every cell at random and resolve to quiescence
    ///
    /// Cells cleared while settling the fresh board count toward the score,
    /// which starts from zero.
    pub fn initialize(&mut self) -> Result<(), BoardError> {
        self.score = 0;
        self.moves = 0;
        self.shuffles = 0;
        self.last_rejection = None;
        self.state = SessionState::Idle;
        fill_random(&mut self.grid, &self.config.palette, &mut self.rng);
        self.settle()?;
        info!(
            size = self.config.size,
            colors = self.config.palette.len(),
            score = self.score,
            "board initialized"
        );
        Ok(())
    }

    /// Start a new episode on a fresh board
    pub fn restart(&mut self) -> Result<(), BoardError> {
        self.episode_id = self.episode_id.wrapping_add(1);
        self.initialize()
    }

    /// Whether the last cascade's rounds are kept for replay
    pub fn set_record_cascades(&mut self, record: bool) {
        self.record_cascades = record;
        if !record {
            self.last_cascade.clear();
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn shuffles(&self) -> u32 {
        self.shuffles
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn last_resolution(&self) -> Resolution {
        self.last
    }

    pub fn last_rejection(&self) -> Option<Rejection> {
        self.last_rejection
    }

    /// Rounds of the most recent cascade, oldest first
    pub fn last_cascade(&self) -> &[CascadeStep] {
        &self.last_cascade
    }

    pub fn has_moves(&self) -> bool {
        self.has_moves
    }

    /// A swap that would currently be accepted
    pub fn hint(&self) -> Option<(Pos, Pos)> {
        find_valid_swap(&self.grid)
    }

    /// Swap two adjacent cells and resolve the resulting cascade
    pub fn swap(&mut self, a: Pos, b: Pos) -> Result<Outcome, BoardError> {
        if self.state != SessionState::Idle {
            return Ok(self.reject(Rejection::Busy));
        }

        match try_swap(&mut self.grid, a, b)? {
            SwapCheck::Rejected(rejection) => {
                debug!(?a, ?b, reason = rejection.message(), "swap rejected");
                Ok(self.reject(rejection))
            }
            SwapCheck::Accepted => {
                self.moves += 1;
                let res = self.settle()?;
                debug!(?a, ?b, cleared = res.cleared, rounds = res.rounds, "swap accepted");
                Ok(Outcome::Accepted {
                    cleared: res.cleared,
                    rounds: res.rounds,
                })
            }
        }
    }

    /// Randomly permute every color on the board, paying `shuffle_cost`
    pub fn shuffle(&mut self) -> Result<Outcome, BoardError> {
        if self.state != SessionState::Idle {
            return Ok(self.reject(Rejection::Busy));
        }
        let cost = self.config.shuffle_cost;
        if self.score < cost {
            return Ok(self.reject(Rejection::InsufficientScore {
                score: self.score,
                cost,
            }));
        }

        self.rng.shuffle_cells(self.grid.cells_mut());

        self.score -= cost;
        self.shuffles += 1;
        let res = self.settle()?;
        debug!(cost, cleared = res.cleared, rounds = res.rounds, "shuffle accepted");
        Ok(Outcome::Accepted {
            cleared: res.cleared,
            rounds: res.rounds,
        })
    }

    /// Apply a request from the input layer
    pub fn apply_action(&mut self, action: GameAction) -> Result<Outcome, BoardError> {
        match action {
            GameAction::Swap(a, b) => self.swap(a, b),
            GameAction::Shuffle => self.shuffle(),
            GameAction::Restart => {
                self.restart()?;
                Ok(Outcome::Accepted {
                    cleared: self.last.cleared,
                    rounds: self.last.rounds,
                })
            }
        }
    }

    fn reject(&mut self, rejection: Rejection) -> Outcome {
        self.last_rejection = Some(rejection);
        Outcome::Rejected(rejection)
    }

    /// Idle -> Resolving -> (cascade) -> Idle, adding the cleared cells to
    /// the score. On an overrun the session stays Resolving until restarted.
    fn settle(&mut self) -> Result<Resolution, BoardError> {
        self.state = SessionState::Resolving;
        self.last_rejection = None;
        self.last_cascade.clear();

        let palette = &self.config.palette;
        let max_rounds = self.config.max_cascade_rounds;
        let res = if self.record_cascades {
            let mut cascade = Cascade::new(&mut self.grid, palette, &mut self.rng, max_rounds);
            let mut total = Resolution::default();
            for step in cascade.by_ref() {
                let step = step?;
                total.cleared += step.cleared();
                self.last_cascade.push(step);
            }
            total.rounds = cascade.rounds();
            total
        } else {
            resolve(&mut self.grid, palette, &mut self.rng, max_rounds)?
        };

        self.score = self.score.saturating_add(res.cleared);
        self.last = res;
        self.has_moves = has_valid_move(&self.grid);
        self.state = SessionState::Idle;
        Ok(res)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.size = self.grid.size();
        out.cells.clear();
        out.cells.extend_from_slice(self.grid.cells());
        out.score = self.score;
        out.state = self.state;
        out.shuffle_cost = self.config.shuffle_cost;
        out.moves = self.moves;
        out.shuffles = self.shuffles;
        out.episode_id = self.episode_id;
        out.last_cleared = self.last.cleared;
        out.last_rounds = self.last.rounds;
        out.last_rejection = self.last_rejection;
        out.has_moves = self.has_moves;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::find_matches;
    use crate::rng::ScriptedSource;

    fn quiet_grid() -> Grid {
        // 4 colors, no runs, no valid swaps.
        Grid::from_letters(&["ABCD", "CDAB", "ABCD", "CDAB"]).unwrap()
    }

    fn small_config() -> BoardConfig {
        BoardConfig::default().with_size(4)
    }

    #[test]
    fn test_new_session_is_quiescent() {
        for seed in 0..20 {
            let session = GameSession::with_seed(BoardConfig::default(), seed).unwrap();
            assert_eq!(session.state(), SessionState::Idle);
            assert!(session.grid().is_full());
            assert!(find_matches(session.grid()).is_empty());
            assert_eq!(session.moves(), 0);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = GameSession::with_seed(BoardConfig::default().with_color_count(3), 1).unwrap_err();
        assert!(matches!(err, BoardError::InvalidConfig(_)));
    }

    #[test]
    fn test_from_grid_keeps_quiet_board() {
        let session =
            GameSession::from_grid(small_config(), quiet_grid(), 7, ScriptedSource::zeros()).unwrap();
        assert_eq!(session.grid(), &quiet_grid());
        assert_eq!(session.score(), 7);
        assert!(!session.has_moves());
        assert_eq!(session.hint(), None);
    }

    #[test]
    fn test_from_grid_rejects_size_mismatch() {
        let err = GameSession::from_grid(BoardConfig::default(), quiet_grid(), 0, ScriptedSource::zeros())
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidConfig(_)));
    }

    #[test]
    fn test_accepted_swap_scores_and_records_cascade() {
        // Swapping (0,2)/(1,2) lines up AAA on the top row; refills draw E, F.
        let grid = Grid::from_letters(&["AABD", "CDAB", "DCBA", "BADC"]).unwrap();
        let mut session =
            GameSession::from_grid(small_config(), grid, 0, ScriptedSource::new(vec![4, 5])).unwrap();
        assert_eq!(session.score(), 0);

        let outcome = session.swap(Pos::new(0, 2), Pos::new(1, 2)).unwrap();

        assert!(outcome.is_accepted());
        assert!(outcome.cleared() >= 3);
        assert_eq!(session.score(), outcome.cleared());
        assert_eq!(session.moves(), 1);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.last_cascade().is_empty());
        assert_eq!(session.last_cascade()[0].cleared(), 3);
        assert!(find_matches(session.grid()).is_empty());
    }

    #[test]
    fn test_rejected_swap_changes_nothing() {
        let mut session =
            GameSession::from_grid(small_config(), quiet_grid(), 5, ScriptedSource::zeros()).unwrap();

        let outcome = session.swap(Pos::new(0, 0), Pos::new(0, 1)).unwrap();

        assert_eq!(outcome, Outcome::Rejected(Rejection::NoMatch));
        assert_eq!(session.grid(), &quiet_grid());
        assert_eq!(session.score(), 5);
        assert_eq!(session.moves(), 0);
        assert_eq!(session.last_rejection(), Some(Rejection::NoMatch));
    }

    #[test]
    fn test_swap_while_resolving_is_busy() {
        let mut session =
            GameSession::from_grid(small_config(), quiet_grid(), 50, ScriptedSource::zeros()).unwrap();
        session.state = SessionState::Resolving;

        assert_eq!(
            session.swap(Pos::new(0, 0), Pos::new(0, 1)).unwrap(),
            Outcome::Rejected(Rejection::Busy)
        );
        assert_eq!(session.shuffle().unwrap(), Outcome::Rejected(Rejection::Busy));
        assert_eq!(session.score(), 50);
        assert_eq!(session.grid(), &quiet_grid());
    }

    #[test]
    fn test_shuffle_requires_score() {
        let mut session =
            GameSession::from_grid(small_config(), quiet_grid(), 10, ScriptedSource::zeros()).unwrap();

        let outcome = session.shuffle().unwrap();

        assert_eq!(
            outcome,
            Outcome::Rejected(Rejection::InsufficientScore { score: 10, cost: 15 })
        );
        assert_eq!(session.score(), 10);
        assert_eq!(session.grid(), &quiet_grid());
        assert_eq!(session.shuffles(), 0);
    }

    #[test]
    fn test_shuffle_deducts_cost_and_settles() {
        let mut session = GameSession::from_grid(
            small_config(),
            quiet_grid(),
            20,
            ChaCha8Rng::seed_from_u64(3),
        )
        .unwrap();

        let outcome = session.shuffle().unwrap();

        assert!(outcome.is_accepted());
        assert_eq!(session.score(), 5 + outcome.cleared());
        assert_eq!(session.shuffles(), 1);
        assert!(find_matches(session.grid()).is_empty());
    }

    #[test]
    fn test_restart_increments_episode_id() {
        let mut session = GameSession::with_seed(BoardConfig::default(), 12345).unwrap();
        assert_eq!(session.episode_id(), 0);
        assert!(session.apply_action(GameAction::Restart).unwrap().is_accepted());
        assert_eq!(session.episode_id(), 1);
        assert_eq!(session.moves(), 0);
    }

    #[test]
    fn test_overrun_leaves_session_resolving() {
        let config = BoardConfig::default().with_size(4).with_max_cascade_rounds(2);
        // Swapping (0,2)/(1,2) makes AAA; the refills are all A as well.
        let grid = Grid::from_letters(&["AABD", "CDAB", "DCBA", "BADC"]).unwrap();
        let mut session = GameSession::from_grid(config, grid, 0, ScriptedSource::zeros()).unwrap();

        let err = session.swap(Pos::new(0, 2), Pos::new(1, 2)).unwrap_err();

        assert_eq!(err, BoardError::ResolutionOverrun { rounds: 2 });
        assert_eq!(session.state(), SessionState::Resolving);
        assert_eq!(
            session.swap(Pos::new(0, 0), Pos::new(0, 1)).unwrap(),
            Outcome::Rejected(Rejection::Busy)
        );
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let session =
            GameSession::from_grid(small_config(), quiet_grid(), 20, ScriptedSource::zeros()).unwrap();
        let snap = session.snapshot();

        assert_eq!(snap.size, 4);
        assert_eq!(snap.cells, quiet_grid().cells());
        assert_eq!(snap.score, 20);
        assert_eq!(snap.state, SessionState::Idle);
        assert_eq!(snap.shuffle_cost, 15);
        assert!(snap.can_shuffle());
        assert!(!snap.has_moves);
        assert_eq!(snap.cell(Pos::new(1, 0)), Some(Some(ColorId(2))));
        assert_eq!(snap.cell(Pos::new(4, 0)), None);
    }
}
