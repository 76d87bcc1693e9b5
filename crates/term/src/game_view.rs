//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{CascadeStep, GameSnapshot, Grid, MatchSet};
use crate::fb::{CellStyle, FrameBuffer, Glyph, Rgb};
use crate::types::{Cell, ColorId, Pos, SessionState};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Input-layer decorations drawn over the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardOverlay<'a> {
    pub cursor: Option<Pos>,
    pub selected: Option<Pos>,
    pub hint: Option<(Pos, Pos)>,
    /// Cells about to be cleared (cascade replay)
    pub flash: Option<&'a MatchSet>,
}

/// Which board of a [`CascadeStep`] a replay frame shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadePhase {
    /// The board before the clear, with the matched cells flashing
    Matched,
    /// After gravity, empties at the top
    Collapsed,
    /// After refill
    Filled,
}

impl CascadePhase {
    pub const ALL: [CascadePhase; 3] = [
        CascadePhase::Matched,
        CascadePhase::Collapsed,
        CascadePhase::Filled,
    ];

    pub fn grid(self, step: &CascadeStep) -> &Grid {
        match self {
            CascadePhase::Matched => &step.before,
            CascadePhase::Collapsed => &step.collapsed,
            CascadePhase::Filled => &step.filled,
        }
    }
}

/// Where the board frame lands on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub x: u16,
    pub y: u16,
    pub frame_w: u16,
    pub frame_h: u16,
    size: usize,
    cell_w: u16,
    cell_h: u16,
}

impl BoardLayout {
    /// Board position under terminal column `x`, row `y`.
    pub fn cell_at(&self, x: u16, y: u16) -> Option<Pos> {
        let inner_x = x.checked_sub(self.x + 1)?;
        let inner_y = y.checked_sub(self.y + 1)?;
        let col = (inner_x / self.cell_w) as usize;
        let row = (inner_y / self.cell_h) as usize;
        if row < self.size && col < self.size {
            Some(Pos::new(row, col))
        } else {
            None
        }
    }

    fn cell_origin(&self, pos: Pos) -> (u16, u16) {
        (
            self.x + 1 + pos.col as u16 * self.cell_w,
            self.y + 1 + pos.row as u16 * self.cell_h,
        )
    }
}

const PANEL_GAP: u16 = 2;
const PANEL_W: u16 = 26;

const BOARD_BG: Rgb = Rgb::new(30, 30, 40);

const COLORS: [Rgb; 8] = [
    Rgb::new(220, 70, 70),
    Rgb::new(80, 200, 100),
    Rgb::new(80, 120, 230),
    Rgb::new(240, 210, 70),
    Rgb::new(190, 110, 220),
    Rgb::new(250, 150, 40),
    Rgb::new(70, 210, 210),
    Rgb::new(235, 235, 235),
];

/// Display color for a block. Palettes longer than the color table reuse
/// it at a darker shade.
pub fn color_rgb(color: ColorId) -> Rgb {
    let i = color.index();
    let base = COLORS[i % COLORS.len()];
    if i < COLORS.len() {
        base
    } else {
        base.shade(160)
    }
}

/// A lightweight terminal renderer for the board and its side panel.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 4x2 keeps cells roughly square on typical terminal glyphs.
        Self { cell_w: 4, cell_h: 2 }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Same view with cells shrunk until a `size` board fits `viewport`.
    pub fn fitted(&self, size: usize, viewport: Viewport) -> GameView {
        let mut view = GameView::new(self.cell_w, self.cell_h);
        while view.cell_w > 1 || view.cell_h > 1 {
            let l = view.layout(size, viewport);
            if l.frame_w + PANEL_GAP + PANEL_W <= viewport.width && l.frame_h <= viewport.height {
                break;
            }
            if view.cell_w > 2 * view.cell_h || view.cell_h == 1 {
                view.cell_w = (view.cell_w - 1).max(1);
            } else {
                view.cell_h -= 1;
            }
        }
        view
    }

    pub fn layout(&self, size: usize, viewport: Viewport) -> BoardLayout {
        let frame_w = (size as u16) * self.cell_w + 2;
        let frame_h = (size as u16) * self.cell_h + 2;
        let total_w = frame_w + PANEL_GAP + PANEL_W;
        BoardLayout {
            x: viewport.width.saturating_sub(total_w) / 2,
            y: viewport.height.saturating_sub(frame_h) / 2,
            frame_w,
            frame_h,
            size,
            cell_w: self.cell_w,
            cell_h: self.cell_h,
        }
    }

    /// Render the live board into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when
    /// the terminal size changes.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        overlay: &BoardOverlay<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        let layout = self.begin_frame(snap.size, viewport, fb);
        self.draw_cells(fb, &layout, &snap.cells, overlay);
        self.draw_side_panel(fb, snap, None, viewport, &layout);

        if snap.state == SessionState::Resolving {
            self.draw_overlay_text(fb, &layout, "JAMMED - PRESS R");
        } else if !snap.has_moves {
            self.draw_overlay_text(fb, &layout, "NO MOVES");
        }
    }

    /// Render one replay frame of a cascade round.
    ///
    /// The panel shows `snap`, which already holds the settled totals.
    pub fn render_cascade_into(
        &self,
        snap: &GameSnapshot,
        step: &CascadeStep,
        phase: CascadePhase,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        let grid = phase.grid(step);
        let layout = self.begin_frame(grid.size(), viewport, fb);
        let overlay = BoardOverlay {
            flash: (phase == CascadePhase::Matched).then_some(&step.matched),
            ..BoardOverlay::default()
        };
        self.draw_cells(fb, &layout, grid.cells(), &overlay);
        self.draw_side_panel(fb, snap, Some(step.round), viewport, &layout);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, overlay: &BoardOverlay<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, overlay, viewport, &mut fb);
        fb
    }

    fn begin_frame(&self, size: usize, viewport: Viewport, fb: &mut FrameBuffer) -> BoardLayout {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Glyph::default());

        let layout = self.layout(size, viewport);
        let border = CellStyle::plain(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        fb.fill_rect(
            layout.x + 1,
            layout.y + 1,
            layout.frame_w - 2,
            layout.frame_h - 2,
            ' ',
            CellStyle::plain(BOARD_BG, BOARD_BG),
        );
        self.draw_border(fb, layout.x, layout.y, layout.frame_w, layout.frame_h, border);
        layout
    }

    fn draw_border(&self, fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_cells(&self, fb: &mut FrameBuffer, layout: &BoardLayout, cells: &[Cell], overlay: &BoardOverlay<'_>) {
        let size = layout.size;
        for (i, cell) in cells.iter().enumerate().take(size * size) {
            let pos = Pos::new(i / size, i % size);
            let (px, py) = layout.cell_origin(pos);
            let flashing = overlay.flash.is_some_and(|m| m.contains(&pos));

            let Some(color) = cell else {
                let dot = CellStyle::plain(Rgb::new(90, 90, 100), BOARD_BG).dim();
                fb.fill_rect(px, py, self.cell_w, self.cell_h, ' ', dot);
                fb.put_char(px + (self.cell_w - 1) / 2, py + (self.cell_h - 1) / 2, '·', dot);
                continue;
            };

            let rgb = color_rgb(*color);
            let (fill, style) = if flashing {
                ('*', CellStyle::plain(Rgb::new(255, 255, 255), rgb).bold())
            } else {
                (' ', CellStyle::plain(Rgb::new(20, 20, 20), rgb.shade(200)))
            };
            fb.fill_rect(px, py, self.cell_w, self.cell_h, fill, style);

            let mid_y = py + (self.cell_h - 1) / 2;
            if !flashing && self.cell_w >= 2 {
                fb.put_char(px + (self.cell_w - 1) / 2, mid_y, color.letter(), style.bold());
            }

            if overlay.hint.is_some_and(|(a, b)| a == pos || b == pos) {
                fb.put_char(px, py, '+', style.bold());
            }
            self.draw_markers(fb, px, mid_y, pos, overlay, style);
        }
    }

    fn draw_markers(&self, fb: &mut FrameBuffer, px: u16, y: u16, pos: Pos, overlay: &BoardOverlay<'_>, style: CellStyle) {
        let is_cursor = overlay.cursor == Some(pos);
        let is_selected = overlay.selected == Some(pos);
        let (open, close, style) = match (is_cursor, is_selected) {
            (false, false) => return,
            (true, false) => ('[', ']', style.bold()),
            (false, true) => ('<', '>', CellStyle { fg: Rgb::new(255, 255, 255), ..style }.bold()),
            (true, true) => ('[', ']', CellStyle { fg: Rgb::new(255, 255, 120), ..style }.bold()),
        };
        if self.cell_w >= 3 {
            fb.put_char(px, y, open, style);
            fb.put_char(px + self.cell_w - 1, y, close, style);
        } else {
            fb.put_char(px, y, open, style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        replay_round: Option<u32>,
        viewport: Viewport,
        layout: &BoardLayout,
    ) {
        let panel_x = layout.x.saturating_add(layout.frame_w).saturating_add(PANEL_GAP);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::plain(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let muted = value.dim();
        let alert = CellStyle::plain(Rgb::new(250, 150, 80), Rgb::new(0, 0, 0)).bold();

        let mut y = layout.y;
        fb.put_str(panel_x, y, "SCORE", label);
        y += 1;
        fb.put_u32(panel_x, y, snap.score, value);
        y += 2;

        fb.put_str(panel_x, y, "MOVES", label);
        fb.put_u32(panel_x + 9, y, snap.moves, value);
        y += 1;

        fb.put_str(panel_x, y, "SHUFFLE", label);
        let x = fb.put_u32(panel_x + 9, y, snap.shuffle_cost, value);
        fb.put_str(x + 1, y, if snap.can_shuffle() { "ready" } else { "locked" }, muted);
        y += 1;

        fb.put_str(panel_x, y, "LAST", label);
        let x = fb.put_str(panel_x + 9, y, "+", value);
        let x = fb.put_u32(x, y, snap.last_cleared, value);
        if snap.last_rounds > 1 {
            let x = fb.put_str(x + 1, y, "x", muted);
            fb.put_u32(x, y, snap.last_rounds, muted);
        }
        y += 2;

        // Status line: replay, jam, rejection, then stuck prompt.
        if let Some(round) = replay_round {
            let x = fb.put_str(panel_x, y, "CHAIN ", alert);
            fb.put_u32(x, y, round, alert);
        } else if snap.state == SessionState::Resolving {
            fb.put_str(panel_x, y, "board jammed, press r", alert);
        } else if let Some(rejection) = snap.last_rejection {
            fb.put_str(panel_x, y, rejection.message(), alert);
        } else if !snap.has_moves {
            let text = if snap.can_shuffle() {
                "no moves, press s"
            } else {
                "no moves, press r"
            };
            fb.put_str(panel_x, y, text, alert);
        }
        y += 2;

        for line in [
            "arrows  move",
            "space   pick",
            "s       shuffle",
            "?       hint",
            "r       restart",
            "q       quit",
        ] {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, line, muted);
            y += 1;
        }
    }

    fn draw_overlay_text(&self, fb: &mut FrameBuffer, layout: &BoardLayout, text: &str) {
        let mid_y = layout.y.saturating_add(layout.frame_h / 2);
        let text_w = text.chars().count() as u16;
        let x = layout.x.saturating_add(layout.frame_w.saturating_sub(text_w) / 2);
        let style = CellStyle::plain(Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)).bold();
        fb.put_str(x, mid_y, text, style);
    }
}
