// Pixel buffer - palette-indexed drawing surface
//
// A PixelBuffer is a flat byte grid of palette indices with a clip
// rectangle, a shared bitmap font, and a dirty-line set. Every drawing
// primitive clips silently (out-of-bounds requests degrade to no-ops, never
// errors) and marks the scan lines it touches as dirty. Dirty flags are only
// ever cleared by the compositor, for the span it actually redrew.

use std::sync::Arc;

use crate::font::{Font, CHAR_HEIGHT, CHAR_SPACING, LINE_SPACING};
use crate::palette::{
    OVERLAY_BLACK, OVERLAY_BLUE, OVERLAY_BRIGHT_OFFSET, OVERLAY_CYAN, OVERLAY_GREEN,
    OVERLAY_GREY, OVERLAY_MAGENTA, OVERLAY_RED, OVERLAY_YELLOW,
};
use crate::rect::Rect;

/// Line pitch is rounded up to a multiple of this, so 8-pixel processing
/// chunks always divide a line evenly
pub const PITCH_BLOCK: usize = 16;

/// Escape character that introduces an inline colour code in draw_string
pub const COLOUR_ESCAPE: char = '\x07';

/// One dirty flag per scan line
///
/// All lines start dirty to force a full first redraw. Drawing marks lines;
/// only the compositor clears them, and only for the span it transferred.
#[derive(Debug)]
pub struct DirtyLines {
    flags: Vec<bool>,
}

impl DirtyLines {
    pub fn new(height: usize) -> Self {
        Self {
            flags: vec![true; height],
        }
    }

    pub fn height(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn set(&mut self, line: usize) {
        if let Some(flag) = self.flags.get_mut(line) {
            *flag = true;
        }
    }

    pub fn set_all(&mut self) {
        self.flags.fill(true);
    }

    #[inline]
    pub fn is_dirty(&self, line: usize) -> bool {
        self.flags.get(line).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    /// Minimal contiguous span covering every dirty line
    pub fn span(&self) -> Option<(usize, usize)> {
        let first = self.flags.iter().position(|&d| d)?;
        let last = self.flags.iter().rposition(|&d| d)?;
        Some((first, last))
    }

    /// Clear flags for the inclusive line range
    ///
    /// Both ends are clamped to the flag count; a degenerate range is a
    /// no-op.
    pub fn clear_span(&mut self, first: usize, last: usize) {
        let end = last.min(self.flags.len().saturating_sub(1));
        if first > end || self.flags.is_empty() {
            return;
        }
        for flag in &mut self.flags[first..=end] {
            *flag = false;
        }
    }
}

/// Palette-indexed pixel grid with clipped drawing primitives
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    pitch: usize,
    clip: Rect,
    font: Arc<Font>,
    dirty: DirtyLines,
}

impl PixelBuffer {
    /// Allocate a buffer of `width` x `height` palette indices
    ///
    /// The pitch is the width rounded up to the next PITCH_BLOCK multiple.
    pub fn new(width: usize, height: usize) -> Self {
        let pitch = width.div_ceil(PITCH_BLOCK) * PITCH_BLOCK;
        Self {
            data: vec![0; pitch * height],
            width,
            height,
            pitch,
            clip: Rect::new(0, 0, width as i32, height as i32),
            font: Arc::new(Font::default()),
            dirty: DirtyLines::new(height),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Full stored bytes for one scan line (pitch wide)
    pub fn line(&self, y: usize) -> &[u8] {
        &self.data[y * self.pitch..(y + 1) * self.pitch]
    }

    /// Mutable line bytes; the line is marked dirty
    pub fn line_mut(&mut self, y: usize) -> &mut [u8] {
        self.dirty.set(y);
        &mut self.data[y * self.pitch..(y + 1) * self.pitch]
    }

    /// Mutable line bytes without touching the dirty flags
    ///
    /// For transforms that re-encode a line's storage without changing what
    /// it shows on screen (density upgrade).
    pub(crate) fn line_untracked_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.data[y * self.pitch..(y + 1) * self.pitch]
    }

    pub fn font(&self) -> &Arc<Font> {
        &self.font
    }

    pub fn set_font(&mut self, font: Arc<Font>) {
        self.font = font;
    }

    pub fn dirty(&self) -> &DirtyLines {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyLines {
        &mut self.dirty
    }

    /// Current clip rectangle
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Restrict the clip region; always constrained to buffer bounds
    pub fn set_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let mut r = Rect::new(x, y, w, h);
        r.intersect(&self.bounds());
        self.clip = r;
    }

    /// Reset the clip region to the full buffer
    pub fn reset_clip(&mut self) {
        self.clip = self.bounds();
    }

    /// Intersect a rectangle with the clip region, in place
    ///
    /// Returns false when nothing is left to draw.
    pub fn clip_rect(&self, r: &mut Rect) -> bool {
        r.intersect(&self.clip)
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Fill the whole buffer (ignores the clip region)
    pub fn clear(&mut self, ink: u8) {
        self.data.fill(ink);
        self.dirty.set_all();
    }

    /// Set a single pixel
    pub fn plot(&mut self, x: i32, y: i32, ink: u8) {
        if self.clip.contains(x, y) {
            self.data[y as usize * self.pitch + x as usize] = ink;
            self.dirty.set(y as usize);
        }
    }

    /// Draw a horizontal (h == 0) or vertical (w == 0) line
    ///
    /// Diagonals are unsupported and ignored.
    pub fn draw_line(&mut self, x: i32, y: i32, w: i32, h: i32, ink: u8) {
        if h == 0 {
            self.fill_rect(x, y, w, 1, ink);
        } else if w == 0 {
            self.fill_rect(x, y, 1, h, ink);
        }
    }

    /// Fill a rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ink: u8) {
        let mut r = Rect::new(x, y, w, h);
        if !self.clip_rect(&mut r) {
            return;
        }

        for row in r.y..r.bottom() {
            let start = row as usize * self.pitch + r.x as usize;
            self.data[start..start + r.w as usize].fill(ink);
            self.dirty.set(row as usize);
        }
    }

    /// Draw a rectangle outline
    ///
    /// With `rounded`, each edge line is inset one pixel at both ends so the
    /// corner pixels stay clear.
    pub fn frame_rect(&mut self, x: i32, y: i32, w: i32, h: i32, ink: u8, rounded: bool) {
        if w <= 0 || h <= 0 {
            return;
        }

        if rounded {
            self.draw_line(x + 1, y, w - 2, 0, ink);
            self.draw_line(x + 1, y + h - 1, w - 2, 0, ink);
            self.draw_line(x, y + 1, 0, h - 2, ink);
            self.draw_line(x + w - 1, y + 1, 0, h - 2, ink);
        } else {
            self.draw_line(x, y, w, 0, ink);
            self.draw_line(x, y + h - 1, w, 0, ink);
            self.draw_line(x, y + 1, 0, h - 2, ink);
            self.draw_line(x + w - 1, y + 1, 0, h - 2, ink);
        }
    }

    /// Copy a source index matrix through a per-call remap table
    ///
    /// `src` is `w` x `h` row-major palette indices. Index 0 is transparent:
    /// the destination pixel is skipped, not overwritten. Indices missing
    /// from the remap table pass through unchanged.
    pub fn draw_image(&mut self, x: i32, y: i32, w: i32, h: i32, src: &[u8], remap: &[u8]) {
        if w <= 0 || h <= 0 || src.len() < (w * h) as usize {
            return;
        }

        let mut r = Rect::new(x, y, w, h);
        if !self.clip_rect(&mut r) {
            return;
        }

        let sx0 = (r.x - x) as usize;
        let sy0 = (r.y - y) as usize;

        for row in 0..r.h as usize {
            let src_row = &src[(sy0 + row) * w as usize + sx0..][..r.w as usize];
            let dst_y = r.y as usize + row;
            let dst_row = &mut self.data[dst_y * self.pitch + r.x as usize..][..r.w as usize];
            for (dst, &v) in dst_row.iter_mut().zip(src_row.iter()) {
                if v != 0 {
                    *dst = remap.get(v as usize).copied().unwrap_or(v);
                }
            }
            self.dirty.set(dst_y);
        }
    }

    /// Raw byte copy into a single scan line, clipped horizontally
    pub fn poke(&mut self, x: i32, y: i32, bytes: &[u8]) {
        let mut r = Rect::new(x, y, bytes.len() as i32, 1);
        if !self.clip_rect(&mut r) {
            return;
        }

        let src = &bytes[(r.x - x) as usize..][..r.w as usize];
        let start = r.y as usize * self.pitch + r.x as usize;
        self.data[start..start + r.w as usize].copy_from_slice(src);
        self.dirty.set(r.y as usize);
    }

    /// Render a string with the current font, top-left of the first glyph
    /// at (x, y)
    ///
    /// Inline escapes: BEL followed by a code character switches the ink
    /// (letter -> colour, upper case for the bright variant), '0'/'1'
    /// disables/enables colour processing, and 'X' restores the default ink.
    /// '\n' returns to the starting column and advances one text line. A
    /// glyph whose full width does not fit inside the clip region is skipped
    /// whole (no partial glyphs), though the cursor still advances.
    pub fn draw_string(&mut self, x: i32, y: i32, s: &str, ink: u8) {
        let font = Arc::clone(&self.font);
        let start_x = x;
        let mut cx = x;
        let mut cy = y;
        let mut current = ink;
        let mut colour_enabled = true;

        let mut chars = s.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\n' => {
                    cx = start_x;
                    cy += (CHAR_HEIGHT + LINE_SPACING) as i32;
                }
                COLOUR_ESCAPE => {
                    let Some(code) = chars.next() else { break };
                    match code {
                        '0' => colour_enabled = false,
                        '1' => colour_enabled = true,
                        'X' if colour_enabled => current = ink,
                        c if colour_enabled => {
                            if let Some(i) = escape_ink(c) {
                                current = i;
                            }
                        }
                        _ => {}
                    }
                }
                _ => {
                    let glyph = font.glyph(ch);
                    let gw = glyph.width as i32;

                    // All-or-nothing horizontal clipping
                    if cx >= self.clip.x && cx + gw <= self.clip.right() {
                        for (row, &bits) in glyph.rows.iter().enumerate() {
                            let py = cy + row as i32;
                            if py < self.clip.y || py >= self.clip.bottom() {
                                continue;
                            }
                            let base = py as usize * self.pitch;
                            let mut bits = bits;
                            for col in 0..gw {
                                if bits & 0x80 != 0 {
                                    self.data[base + (cx + col) as usize] = current;
                                }
                                bits <<= 1;
                            }
                            self.dirty.set(py as usize);
                        }
                    }

                    cx += gw + CHAR_SPACING as i32;
                }
            }
        }
    }
}

/// Fixed letter -> overlay colour table for string escapes
///
/// Upper-case letters select the bright variant.
fn escape_ink(code: char) -> Option<u8> {
    let bright = code.is_ascii_uppercase();
    let base = match code.to_ascii_lowercase() {
        'k' => OVERLAY_BLACK,
        'b' => OVERLAY_BLUE,
        'r' => OVERLAY_RED,
        'm' => OVERLAY_MAGENTA,
        'g' => OVERLAY_GREEN,
        'c' => OVERLAY_CYAN,
        'y' => OVERLAY_YELLOW,
        'w' => OVERLAY_GREY,
        _ => return None,
    };
    Some(if bright { base + OVERLAY_BRIGHT_OFFSET } else { base })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::OVERLAY_WHITE;

    fn fresh(width: usize, height: usize) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(width, height);
        // Start from a clean dirty state so tests can watch marking
        buffer.dirty_mut().clear_span(0, height - 1);
        buffer
    }

    #[test]
    fn test_pitch_is_block_aligned() {
        assert_eq!(PixelBuffer::new(256, 192).pitch(), 256);
        assert_eq!(PixelBuffer::new(250, 192).pitch(), 256);
        assert_eq!(PixelBuffer::new(257, 192).pitch(), 272);
    }

    #[test]
    fn test_new_buffer_fully_dirty() {
        let buffer = PixelBuffer::new(32, 16);
        assert_eq!(buffer.dirty().span(), Some((0, 15)));
    }

    #[test]
    fn test_plot_and_clip() {
        let mut buffer = fresh(32, 16);
        buffer.plot(5, 5, 7);
        assert_eq!(buffer.line(5)[5], 7);
        assert!(buffer.dirty().is_dirty(5));

        // Outside the buffer: silent no-op
        buffer.plot(-1, 0, 7);
        buffer.plot(0, 99, 7);

        // Outside a narrowed clip region: also a no-op
        buffer.set_clip(0, 0, 4, 4);
        buffer.plot(10, 2, 9);
        assert_eq!(buffer.line(2)[10], 0);
    }

    #[test]
    fn test_draw_line_axes_only() {
        let mut buffer = fresh(32, 16);
        buffer.draw_line(2, 3, 5, 0, 1);
        for x in 2..7 {
            assert_eq!(buffer.line(3)[x], 1);
        }

        buffer.draw_line(4, 5, 0, 3, 2);
        for y in 5..8 {
            assert_eq!(buffer.line(y)[4], 2);
        }

        // Diagonal requests are ignored
        buffer.draw_line(0, 0, 5, 5, 3);
        assert_eq!(buffer.line(1)[1], 0);
    }

    #[test]
    fn test_fill_rect_clips_to_bounds() {
        let mut buffer = fresh(16, 8);
        buffer.fill_rect(12, 6, 10, 10, 4);
        assert_eq!(buffer.line(6)[12], 4);
        assert_eq!(buffer.line(7)[15], 4);
        assert!(buffer.dirty().is_dirty(6));
        assert!(buffer.dirty().is_dirty(7));
        assert!(!buffer.dirty().is_dirty(5));
    }

    #[test]
    fn test_frame_rect_rounded_corners() {
        let mut buffer = fresh(16, 16);
        buffer.frame_rect(2, 2, 6, 6, 5, true);
        // Corner pixels stay clear
        assert_eq!(buffer.line(2)[2], 0);
        assert_eq!(buffer.line(2)[7], 0);
        assert_eq!(buffer.line(7)[2], 0);
        assert_eq!(buffer.line(7)[7], 0);
        // Edge pixels next to the corners are set
        assert_eq!(buffer.line(2)[3], 5);
        assert_eq!(buffer.line(3)[2], 5);

        let mut square = fresh(16, 16);
        square.frame_rect(2, 2, 6, 6, 5, false);
        assert_eq!(square.line(2)[2], 5);
        assert_eq!(square.line(7)[7], 5);
    }

    #[test]
    fn test_draw_image_transparency_and_remap() {
        let mut buffer = fresh(16, 8);
        buffer.fill_rect(0, 0, 16, 8, 9);

        let src = [0u8, 1, 2, 0];
        let remap = [0u8, 10, 20];
        buffer.draw_image(1, 1, 2, 2, &src, &remap);

        assert_eq!(buffer.line(1)[1], 9); // index 0: untouched
        assert_eq!(buffer.line(1)[2], 10);
        assert_eq!(buffer.line(2)[1], 20);
        assert_eq!(buffer.line(2)[2], 9);
    }

    #[test]
    fn test_draw_image_partial_clip() {
        let mut buffer = fresh(8, 8);
        // 4x1 image hanging off the left edge: only the visible part lands
        let src = [1u8, 2, 3, 4];
        buffer.draw_image(-2, 0, 4, 1, &src, &[]);
        assert_eq!(buffer.line(0)[0], 3);
        assert_eq!(buffer.line(0)[1], 4);
    }

    #[test]
    fn test_poke_clipped() {
        let mut buffer = fresh(8, 4);
        buffer.poke(6, 1, &[1, 2, 3, 4]);
        assert_eq!(buffer.line(1)[6], 1);
        assert_eq!(buffer.line(1)[7], 2);
        assert!(buffer.dirty().is_dirty(1));

        buffer.poke(-2, 2, &[5, 6, 7]);
        assert_eq!(buffer.line(2)[0], 7);
    }

    #[test]
    fn test_draw_string_all_or_nothing_clip() {
        let mut buffer = fresh(64, 16);
        let gw = buffer.font().glyph('H').width as i32;

        // Clip exactly as wide as the glyph: it renders
        buffer.set_clip(0, 0, gw, 16);
        buffer.draw_string(0, 0, "H", OVERLAY_WHITE);
        let drawn: usize = (0..8).map(|y| bytes_set(buffer.line(y))).sum();
        assert!(drawn > 0);

        // One pixel narrower: nothing renders
        let mut narrow = fresh(64, 16);
        narrow.set_clip(0, 0, gw - 1, 16);
        narrow.draw_string(0, 0, "H", OVERLAY_WHITE);
        let drawn: usize = (0..8).map(|y| bytes_set(narrow.line(y))).sum();
        assert_eq!(drawn, 0);
    }

    #[test]
    fn test_draw_string_newline_and_escapes() {
        let mut buffer = fresh(64, 32);
        let font = Arc::clone(buffer.font());

        buffer.draw_string(4, 0, "A\nA", OVERLAY_WHITE);
        // Second 'A' starts back at the same column, one text line down
        let line2_y = CHAR_HEIGHT + LINE_SPACING;
        assert!(bytes_set(buffer.line(1)) > 0);
        assert!(bytes_set(buffer.line(line2_y + 1)) > 0);

        // Colour escape switches ink; 'X' restores the default
        let mut coloured = fresh(64, 16);
        coloured.draw_string(0, 0, "\x07R!\x07X!", OVERLAY_WHITE);
        let row = coloured.line(1);
        let bang = font.glyph('!').width as usize;
        let first = row[..bang].iter().find(|&&v| v != 0).copied();
        let second = row[bang + CHAR_SPACING..].iter().find(|&&v| v != 0).copied();
        assert_eq!(first, Some(OVERLAY_RED + OVERLAY_BRIGHT_OFFSET));
        assert_eq!(second, Some(OVERLAY_WHITE));
    }

    #[test]
    fn test_draw_string_colour_processing_toggle() {
        let mut buffer = fresh(64, 16);
        // Colour processing off: the 'r' code is ignored
        buffer.draw_string(0, 0, "\x070\x07r!", OVERLAY_WHITE);
        let first = buffer.line(1).iter().find(|&&v| v != 0).copied();
        assert_eq!(first, Some(OVERLAY_WHITE));
    }

    #[test]
    fn test_clear_span_clamps_range() {
        let mut dirty = DirtyLines::new(8);
        // An end past the last line clears up to it and no further
        dirty.clear_span(4, 100);
        assert_eq!(dirty.span(), Some((0, 3)));

        // Degenerate ranges are no-ops
        dirty.clear_span(100, 200);
        dirty.clear_span(5, 2);
        assert_eq!(dirty.span(), Some((0, 3)));

        dirty.clear_span(0, 3);
        assert_eq!(dirty.span(), None);
    }

    #[test]
    fn test_dirty_span_tracks_writes() {
        let mut buffer = fresh(32, 32);
        buffer.plot(0, 4, 1);
        buffer.plot(0, 20, 1);
        assert_eq!(buffer.dirty().span(), Some((4, 20)));

        buffer.dirty_mut().clear_span(4, 20);
        assert_eq!(buffer.dirty().span(), None);
    }

    fn bytes_set(line: &[u8]) -> usize {
        line.iter().filter(|&&v| v != 0).count()
    }
}
