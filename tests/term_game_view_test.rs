use crossterm::event::{KeyCode, KeyEvent};

use rock_em_blocks::core::{GameSession, GameSnapshot, Grid, ScriptedSource};
use rock_em_blocks::input::{handle_key_event, InputHandler};
use rock_em_blocks::term::{BoardOverlay, CascadePhase, CascadeReplay, FrameBuffer, GameView, Viewport};
use rock_em_blocks::types::{BoardConfig, GameAction, Pos};

fn screen_text(fb: &FrameBuffer) -> String {
    (0..fb.height()).map(|y| fb.row_text(y)).collect::<Vec<_>>().join("\n")
}

fn press(input: &mut InputHandler, code: KeyCode) -> Option<GameAction> {
    handle_key_event(KeyEvent::from(code)).and_then(|ev| input.handle_event(ev))
}

#[test]
fn term_view_renders_border_corners() {
    let session = GameSession::with_seed(BoardConfig::default(), 1).unwrap();
    let snap = session.snapshot();
    let view = GameView::default();

    let vp = Viewport::new(80, 24);
    let fb = view.render(&snap, &BoardOverlay::default(), vp);
    let l = view.layout(8, vp);

    assert_eq!(fb.get(l.x, l.y).unwrap().ch, '┌');
    assert_eq!(fb.get(l.x + l.frame_w - 1, l.y).unwrap().ch, '┐');
    assert_eq!(fb.get(l.x, l.y + l.frame_h - 1).unwrap().ch, '└');
    assert_eq!(fb.get(l.x + l.frame_w - 1, l.y + l.frame_h - 1).unwrap().ch, '┘');
}

#[test]
fn term_view_shows_every_block_letter() {
    let session = GameSession::with_seed(BoardConfig::default(), 2).unwrap();
    let mut snap = session.snapshot();
    // Keep the "NO MOVES" banner off the board.
    snap.has_moves = true;
    let view = GameView::default();
    let vp = Viewport::new(80, 24);
    let fb = view.render(&snap, &BoardOverlay::default(), vp);
    let l = view.layout(8, vp);

    for pos in session.grid().positions() {
        // Letter sits one column into the 4x2 cell, on its top row.
        let (x, y) = (l.x + 1 + pos.col as u16 * 4 + 1, l.y + 1 + pos.row as u16 * 2);
        let expected = snap.cell(pos).flatten().map(|c| c.letter());
        assert_eq!(fb.get(x, y).map(|g| g.ch), expected, "cell {pos:?}");
    }
}

#[test]
fn term_view_tiny_viewport_does_not_panic() {
    let snap = GameSession::with_seed(BoardConfig::default(), 3).unwrap().snapshot();
    let view = GameView::default();
    for (w, h) in [(0, 0), (1, 1), (10, 5), (30, 8)] {
        let vp = Viewport::new(w, h);
        let fb = view.fitted(snap.size, vp).render(&snap, &BoardOverlay::default(), vp);
        assert_eq!(fb.width(), w);
        assert_eq!(fb.height(), h);
    }
}

#[test]
fn keyboard_selection_drives_a_swap() {
    // Swapping (0,2) with (1,2) lines up AAA in the top row.
    let grid = Grid::from_letters(&["AABD", "CDAB", "DCBA", "BADC"]).unwrap();
    let config = BoardConfig::default().with_size(4);
    let mut session = GameSession::from_grid(config, grid, 0, ScriptedSource::new(vec![4, 5])).unwrap();
    let mut input = InputHandler::new(4);

    press(&mut input, KeyCode::Right);
    press(&mut input, KeyCode::Right);
    assert_eq!(press(&mut input, KeyCode::Enter), None);
    press(&mut input, KeyCode::Down);
    let action = press(&mut input, KeyCode::Enter).unwrap();
    assert_eq!(action, GameAction::Swap(Pos::new(0, 2), Pos::new(1, 2)));

    let outcome = session.apply_action(action).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(session.score(), 3);
}

#[test]
fn mouse_clicks_map_through_layout() {
    let view = GameView::default();
    let vp = Viewport::new(80, 24);
    let layout = view.layout(8, vp);
    let mut input = InputHandler::new(8);

    let first = layout.cell_at(layout.x + 1, layout.y + 1).unwrap();
    let second = layout.cell_at(layout.x + 1 + 4, layout.y + 1).unwrap();
    assert_eq!((first, second), (Pos::new(0, 0), Pos::new(0, 1)));

    assert_eq!(input.click(first), None);
    assert_eq!(input.click(second), Some(GameAction::Swap(first, second)));
}

#[test]
fn cascade_replay_renders_recorded_rounds() {
    let grid = Grid::from_letters(&["AABD", "CDAB", "DCBA", "BADC"]).unwrap();
    let config = BoardConfig::default().with_size(4);
    let mut session = GameSession::from_grid(config, grid, 0, ScriptedSource::new(vec![4, 5])).unwrap();
    session.swap(Pos::new(0, 2), Pos::new(1, 2)).unwrap();

    let mut replay = CascadeReplay::new(50);
    replay.start(session.last_cascade());
    let snap: GameSnapshot = session.snapshot();
    let view = GameView::default();
    let vp = Viewport::new(60, 16);
    let mut fb = FrameBuffer::new(0, 0);

    let mut phases = Vec::new();
    while let Some((step, phase)) = replay.current() {
        view.render_cascade_into(&snap, step, phase, vp, &mut fb);
        assert!(screen_text(&fb).contains("CHAIN 1"));
        phases.push(phase);
        replay.advance(50);
    }
    assert_eq!(phases, CascadePhase::ALL.to_vec());
}
