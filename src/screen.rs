// Emulated screen - pixel buffer with per-line horizontal density
//
// Scan lines are stored at one of two horizontal densities: low (one index
// per two output pixels) or high (one index per output pixel). The buffer is
// allocated at the high-density width; a low line only uses the first half
// of its storage. Lines are upgraded lazily, and never downgraded.

use crate::compositor::FrameSource;
use crate::pixel_buffer::{DirtyLines, PixelBuffer};

/// Emulated pixels per low-density scan line
pub const SCREEN_WIDTH_LO: usize = 256;

/// Emulated pixels per high-density scan line
pub const SCREEN_WIDTH_HI: usize = SCREEN_WIDTH_LO * 2;

/// Visible scan lines
pub const SCREEN_HEIGHT: usize = 192;

/// Pixel buffer specialised with per-line density tracking
pub struct EmulatedScreen {
    buffer: PixelBuffer,
    width_lo: usize,
    hi_res: Vec<bool>,
}

impl EmulatedScreen {
    /// Create a screen with the given low-density width and height
    ///
    /// Storage is allocated at twice the width so any line can hold
    /// high-density data after upgrade. All lines start low-density and
    /// dirty (the first compositor pass redraws everything).
    pub fn new(width_lo: usize, height: usize) -> Self {
        Self {
            buffer: PixelBuffer::new(width_lo * 2, height),
            width_lo,
            hi_res: vec![false; height],
        }
    }

    pub fn width_lo(&self) -> usize {
        self.width_lo
    }

    pub fn width_hi(&self) -> usize {
        self.width_lo * 2
    }

    pub fn height(&self) -> usize {
        self.buffer.height()
    }

    /// The underlying pixel buffer, for drawing
    ///
    /// Drawing coordinates are in the high-density pixel grid; callers
    /// drawing onto a low-density line should upgrade it first.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    /// Whether a line currently stores high-density data
    pub fn is_high_density(&self, y: usize) -> bool {
        self.hi_res.get(y).copied().unwrap_or(false)
    }

    /// Upgrade a line to high density, in place
    ///
    /// Each stored index is duplicated into two adjacent cells, processed
    /// back to front so the overlapping source and destination ranges never
    /// corrupt source bytes that are still unread. Idempotent: an already
    /// high-density line is left untouched. Lines are never downgraded.
    pub fn upgrade_line(&mut self, y: usize) {
        if y >= self.hi_res.len() || self.hi_res[y] {
            return;
        }

        let width = self.width_lo;
        let line = self.buffer.line_untracked_mut(y);
        for i in (0..width).rev() {
            let v = line[i];
            line[i * 2] = v;
            line[i * 2 + 1] = v;
        }

        self.hi_res[y] = true;
    }

    /// Stored bytes for one line (full pitch; a low-density line only uses
    /// the first `width_lo` bytes)
    pub fn line(&self, y: usize) -> &[u8] {
        self.buffer.line(y)
    }

    /// Mutable stored bytes for one line; the line is marked dirty
    pub fn line_mut(&mut self, y: usize) -> &mut [u8] {
        self.buffer.line_mut(y)
    }

    /// Re-mark every line dirty (video mode change, palette change)
    pub fn mark_all_dirty(&mut self) {
        self.buffer.dirty_mut().set_all();
    }
}

impl FrameSource for EmulatedScreen {
    fn width_lo(&self) -> usize {
        self.width_lo
    }

    fn height(&self) -> usize {
        self.buffer.height()
    }

    fn pitch(&self) -> usize {
        self.buffer.pitch()
    }

    fn line(&self, y: usize) -> &[u8] {
        self.buffer.line(y)
    }

    fn is_high_density(&self, y: usize) -> bool {
        EmulatedScreen::is_high_density(self, y)
    }

    fn dirty(&self) -> &DirtyLines {
        self.buffer.dirty()
    }

    fn dirty_mut(&mut self) -> &mut DirtyLines {
        self.buffer.dirty_mut()
    }
}
