//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! The first frame (and any frame after a resize or [`TerminalRenderer::invalidate`])
//! is a full redraw; later frames only rewrite runs of changed glyphs.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Glyph, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
    mouse: bool,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(64 * 1024),
            mouse: true,
        }
    }

    /// Whether to capture mouse clicks while the game is on screen.
    pub fn with_mouse(mut self, mouse: bool) -> Self {
        self.mouse = mouse;
        self
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        if self.mouse {
            self.buf.queue(EnableMouseCapture)?;
        }
        self.flush_buf()?;
        self.last = None;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        if self.mouse {
            self.buf.queue(DisableMouseCapture)?;
        }
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw (e.g. after a resize event).
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers keep one `FrameBuffer` and pass it in every frame. The
    /// renderer diffs against the previous frame and then swaps buffers, so
    /// the caller gets the old one back to draw into without cloning.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        let mut prev = match self.last.take() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                encode_diff_into(&prev, fb, &mut self.buf)?;
                prev
            }
            stale => {
                encode_full_into(fb, &mut self.buf)?;
                let mut prev = stale.unwrap_or_else(|| FrameBuffer::new(0, 0));
                prev.resize(fb.width(), fb.height());
                prev
            }
        };
        self.flush_buf()?;

        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(())
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Emits glyphs, only sending style changes when the style differs.
struct GlyphWriter<'a> {
    out: &'a mut Vec<u8>,
    style: Option<CellStyle>,
}

impl<'a> GlyphWriter<'a> {
    fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out, style: None }
    }

    fn glyph(&mut self, glyph: Glyph) -> Result<()> {
        if self.style != Some(glyph.style) {
            apply_style_into(self.out, glyph.style)?;
            self.style = Some(glyph.style);
        }
        self.out.queue(Print(glyph.ch))?;
        Ok(())
    }

    fn finish(self) -> Result<()> {
        self.out.queue(ResetColor)?;
        self.out.queue(SetAttribute(Attribute::Reset))?;
        Ok(())
    }
}

/// Encode a full-frame redraw into `out` without touching stdout.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let mut w = GlyphWriter::new(out);
    for y in 0..fb.height() {
        w.out.queue(cursor::MoveTo(0, y))?;
        for x in 0..fb.width() {
            w.glyph(fb.get(x, y).unwrap_or_default())?;
        }
    }
    w.finish()
}

/// Encode only the changed runs of `next` against `prev` into `out`.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut w = GlyphWriter::new(out);
    for_each_changed_run(prev, next, |x, y, len| {
        w.out.queue(cursor::MoveTo(x, y))?;
        for dx in 0..len {
            w.glyph(next.get(x + dx, y).unwrap_or_default())?;
        }
        Ok(())
    })?;
    w.finish()
}

fn apply_style_into(out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
    out.queue(SetAttribute(Attribute::Reset))?;
    out.queue(SetForegroundColor(rgb_to_color(style.fg)))?;
    out.queue(SetBackgroundColor(rgb_to_color(style.bg)))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

fn rgb_to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Calls `f(x, y, len)` for every horizontal run of glyphs that differ.
/// Buffers of different sizes count as entirely changed.
fn for_each_changed_run(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    let same_size = prev.width() == next.width() && prev.height() == next.height();
    let w = next.width();

    for y in 0..next.height() {
        if !same_size {
            f(0, y, w)?;
            continue;
        }

        let differs = |x: u16| prev.get(x, y) != next.get(x, y);
        let mut x = 0;
        while x < w {
            if !differs(x) {
                x += 1;
                continue;
            }
            let start = x;
            while x < w && differs(x) {
                x += 1;
            }
            f(start, y, x - start)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(a: &FrameBuffer, b: &FrameBuffer) -> Vec<(u16, u16, u16)> {
        let mut out = Vec::new();
        for_each_changed_run(a, b, |x, y, len| {
            out.push((x, y, len));
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn changed_runs_coalesce_adjacent_glyphs() {
        let style = CellStyle::default();
        let a = FrameBuffer::new(6, 2);
        let mut b = FrameBuffer::new(6, 2);
        for x in 1..=3 {
            b.set(x, 0, style.glyph('X'));
        }
        b.set(5, 1, style.glyph('Y'));

        assert_eq!(runs(&a, &b), vec![(1, 0, 3), (5, 1, 1)]);
        assert!(runs(&b, &b).is_empty());
    }

    #[test]
    fn style_only_change_is_a_run() {
        let a = FrameBuffer::new(3, 1);
        let mut b = FrameBuffer::new(3, 1);
        b.set(1, 0, CellStyle::default().bold().glyph(' '));
        assert_eq!(runs(&a, &b), vec![(1, 0, 1)]);
    }

    #[test]
    fn resized_buffer_is_fully_dirty() {
        let a = FrameBuffer::new(3, 1);
        let b = FrameBuffer::new(4, 2);
        assert_eq!(runs(&a, &b), vec![(0, 0, 4), (0, 1, 4)]);
    }

    #[test]
    fn diff_of_identical_frames_only_resets_style() {
        let fb = FrameBuffer::new(4, 4);
        let mut full = Vec::new();
        let mut diff = Vec::new();
        encode_full_into(&fb, &mut full).unwrap();
        encode_diff_into(&fb, &fb, &mut diff).unwrap();
        assert!(diff.len() < full.len());

        let mut reset = Vec::new();
        reset.queue(ResetColor).unwrap();
        reset.queue(SetAttribute(Attribute::Reset)).unwrap();
        assert_eq!(diff, reset);
    }
}
