//! Framebuffer and style types for terminal rendering.

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale each channel by `num / 256`
    pub const fn shade(self, num: u16) -> Self {
        Self {
            r: ((self.r as u16 * num) >> 8) as u8,
            g: ((self.g as u16 * num) >> 8) as u8,
            b: ((self.b as u16 * num) >> 8) as u8,
        }
    }
}

/// Minimal per-glyph styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellStyle {
    pub fg: Rgb,
    pub bg: Rgb,
    pub bold: bool,
    pub dim: bool,
}

impl CellStyle {
    pub const fn plain(fg: Rgb, bg: Rgb) -> Self {
        Self {
            fg,
            bg,
            bold: false,
            dim: false,
        }
    }

    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    pub const fn dim(self) -> Self {
        Self { dim: true, ..self }
    }

    pub const fn glyph(self, ch: char) -> Glyph {
        Glyph { ch, style: self }
    }
}

impl Default for CellStyle {
    fn default() -> Self {
        Self::plain(Rgb::new(220, 220, 220), Rgb::new(0, 0, 0))
    }
}

/// A single terminal character cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub style: CellStyle,
}

impl Default for Glyph {
    fn default() -> Self {
        CellStyle::default().glyph(' ')
    }
}

/// 2D framebuffer of styled glyphs. Writes outside the buffer are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let len = (width as usize) * (height as usize);
        Self {
            width,
            height,
            glyphs: vec![Glyph::default(); len],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Resize in place, keeping the allocation when possible.
    pub fn resize(&mut self, width: u16, height: u16) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let len = (width as usize) * (height as usize);
        self.glyphs.resize(len, Glyph::default());
    }

    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    #[inline(always)]
    fn idx(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Glyph> {
        self.idx(x, y).map(|i| self.glyphs[i])
    }

    pub fn set(&mut self, x: u16, y: u16, glyph: Glyph) {
        if let Some(i) = self.idx(x, y) {
            self.glyphs[i] = glyph;
        }
    }

    pub fn clear(&mut self, glyph: Glyph) {
        self.glyphs.fill(glyph);
    }

    pub fn put_char(&mut self, x: u16, y: u16, ch: char, style: CellStyle) {
        self.set(x, y, style.glyph(ch));
    }

    /// Write `s` left to right, clipped at the right edge. Returns the column
    /// after the last character written.
    pub fn put_str(&mut self, x: u16, y: u16, s: &str, style: CellStyle) -> u16 {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.put_char(cx, y, ch, style);
            cx += 1;
        }
        cx
    }

    /// Decimal rendering of `n` without allocating.
    pub fn put_u32(&mut self, x: u16, y: u16, n: u32, style: CellStyle) -> u16 {
        let mut digits = [0u8; 10];
        let mut len = 0;
        let mut rest = n;
        loop {
            digits[len] = b'0' + (rest % 10) as u8;
            len += 1;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }

        let mut cx = x;
        for &d in digits[..len].iter().rev() {
            if cx >= self.width {
                break;
            }
            self.put_char(cx, y, d as char, style);
            cx += 1;
        }
        cx
    }

    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, ch: char, style: CellStyle) {
        for dy in 0..h {
            for dx in 0..w {
                self.put_char(x.saturating_add(dx), y.saturating_add(dy), ch, style);
            }
        }
    }

    /// Characters of row `y` as a string, for tests and debugging.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|g| g.ch)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_u32_writes_digits() {
        let mut fb = FrameBuffer::new(12, 1);
        let end = fb.put_u32(1, 0, 4096, CellStyle::default());
        assert_eq!(end, 5);
        assert_eq!(fb.row_text(0), " 4096       ");

        fb.put_u32(8, 0, 0, CellStyle::default());
        assert_eq!(fb.get(8, 0).map(|g| g.ch), Some('0'));
    }

    #[test]
    fn test_writes_are_clipped() {
        let mut fb = FrameBuffer::new(4, 2);
        fb.put_str(2, 0, "SCORE", CellStyle::default());
        fb.put_char(9, 9, 'x', CellStyle::default());
        assert_eq!(fb.row_text(0), "  SC");
        assert_eq!(fb.row_text(1), "    ");
    }

    #[test]
    fn test_resize_keeps_length_consistent() {
        let mut fb = FrameBuffer::new(3, 3);
        fb.resize(5, 2);
        assert_eq!(fb.glyphs().len(), 10);
        assert_eq!(fb.get(4, 1), Some(Glyph::default()));
        assert_eq!(fb.get(5, 1), None);
    }
}
