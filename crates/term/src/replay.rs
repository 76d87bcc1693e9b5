//! Cascade replay timing.
//!
//! The session resolves a whole cascade in one call; the replay walks the
//! recorded rounds afterwards, showing each [`CascadePhase`] for a fixed
//! number of milliseconds.

use crate::core::CascadeStep;
use crate::game_view::CascadePhase;
use crate::types::CASCADE_FRAME_MS;

#[derive(Debug, Clone)]
pub struct CascadeReplay {
    steps: Vec<CascadeStep>,
    frame: usize,
    frame_ms: u32,
    elapsed_ms: u32,
}

impl Default for CascadeReplay {
    fn default() -> Self {
        Self::new(CASCADE_FRAME_MS)
    }
}

impl CascadeReplay {
    pub fn new(frame_ms: u32) -> Self {
        Self {
            steps: Vec::new(),
            frame: 0,
            frame_ms: frame_ms.max(1),
            elapsed_ms: 0,
        }
    }

    /// Replace whatever is playing with `steps`, starting at the first frame.
    pub fn start(&mut self, steps: &[CascadeStep]) {
        self.steps.clear();
        self.steps.extend_from_slice(steps);
        self.frame = 0;
        self.elapsed_ms = 0;
    }

    pub fn stop(&mut self) {
        self.steps.clear();
        self.frame = 0;
        self.elapsed_ms = 0;
    }

    fn frame_count(&self) -> usize {
        self.steps.len() * CascadePhase::ALL.len()
    }

    pub fn is_active(&self) -> bool {
        self.frame < self.frame_count()
    }

    /// Round and phase on screen right now.
    pub fn current(&self) -> Option<(&CascadeStep, CascadePhase)> {
        let phases = CascadePhase::ALL.len();
        let step = self.steps.get(self.frame / phases)?;
        Some((step, CascadePhase::ALL[self.frame % phases]))
    }

    pub fn advance(&mut self, elapsed_ms: u32) {
        if !self.is_active() {
            return;
        }
        self.elapsed_ms += elapsed_ms;
        while self.elapsed_ms >= self.frame_ms && self.is_active() {
            self.elapsed_ms -= self.frame_ms;
            self.frame += 1;
        }
        if !self.is_active() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{resolve::Cascade, Grid, ScriptedSource};
    use crate::types::DEFAULT_PALETTE;

    fn two_rounds() -> Vec<CascadeStep> {
        let mut grid = Grid::from_letters(&["ABCD", "EEEB", "ACDA", "ADBC"]).unwrap();
        let mut rng = ScriptedSource::new(vec![5, 4]);
        Cascade::new(&mut grid, &DEFAULT_PALETTE, &mut rng, 100)
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_walks_every_phase_of_every_round() {
        let steps = two_rounds();
        assert_eq!(steps.len(), 2);

        let mut replay = CascadeReplay::new(100);
        replay.start(&steps);

        let mut seen = Vec::new();
        while let Some((step, phase)) = replay.current() {
            seen.push((step.round, phase));
            replay.advance(100);
        }

        assert_eq!(
            seen,
            vec![
                (1, CascadePhase::Matched),
                (1, CascadePhase::Collapsed),
                (1, CascadePhase::Filled),
                (2, CascadePhase::Matched),
                (2, CascadePhase::Collapsed),
                (2, CascadePhase::Filled),
            ]
        );
        assert!(!replay.is_active());
    }

    #[test]
    fn test_frames_hold_until_their_time_is_up() {
        let mut replay = CascadeReplay::new(120);
        replay.start(&two_rounds());

        replay.advance(16);
        replay.advance(100);
        assert_eq!(replay.current().map(|(_, p)| p), Some(CascadePhase::Matched));

        replay.advance(16);
        assert_eq!(replay.current().map(|(_, p)| p), Some(CascadePhase::Collapsed));

        // A long stall skips frames instead of lagging behind.
        replay.advance(10_000);
        assert!(!replay.is_active());
        assert!(replay.current().is_none());
    }

    #[test]
    fn test_empty_cascade_is_inactive() {
        let mut replay = CascadeReplay::default();
        replay.start(&[]);
        assert!(!replay.is_active());
        replay.advance(500);
        assert!(replay.current().is_none());
    }
}
