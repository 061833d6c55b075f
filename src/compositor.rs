// Display compositor - converts dirty scan lines to host pixels and
// transfers the changed region to an output surface
//
// One compositor pass per emulated frame: find the minimal contiguous span
// covering all dirty lines, convert exactly those lines into a host-depth
// back buffer, clear their flags, then copy (equal size) or stretch the
// span to the centred target rectangle. The surface lock is held for the
// whole pass; the borrow scope of the lock view guarantees release on every
// exit path.

use crate::pack::{Depth, Packer};
use crate::palette::Palette;
use crate::pixel_buffer::DirtyLines;
use crate::rect::Rect;

/// Source of emulated frame data, one scan line at a time
///
/// Implemented by EmulatedScreen; the compositor reads stored lines at
/// their current density and never upgrades them.
pub trait FrameSource {
    /// Emulated pixels per low-density line
    fn width_lo(&self) -> usize;

    /// Emulated pixels per high-density line
    fn width_hi(&self) -> usize {
        self.width_lo() * 2
    }

    fn height(&self) -> usize;

    /// Stored bytes per line
    fn pitch(&self) -> usize;

    /// Stored bytes for one line
    fn line(&self, y: usize) -> &[u8];

    fn is_high_density(&self, y: usize) -> bool;

    fn dirty(&self) -> &DirtyLines;

    fn dirty_mut(&mut self) -> &mut DirtyLines;
}

/// Locked view of an output surface
///
/// Holding the view is holding the lock: it borrows the surface, so the
/// lock is released exactly when the view goes out of scope.
pub struct SurfaceView<'a> {
    pub data: &'a mut [u8],
    pub pitch: usize,
}

/// Host surface the compositor transfers to
pub trait OutputSurface {
    fn depth(&self) -> Depth;
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Acquire the surface lock and expose the pixel bytes
    fn lock(&mut self) -> SurfaceView<'_>;
}

/// Plain in-memory surface, for tests and headless composition
pub struct MemorySurface {
    depth: Depth,
    width: usize,
    height: usize,
    pitch: usize,
    data: Vec<u8>,
}

impl MemorySurface {
    pub fn new(width: usize, height: usize, depth: Depth) -> Self {
        let pitch = width * depth.bytes_per_pixel();
        Self {
            depth,
            width,
            height,
            pitch,
            data: vec![0; pitch * height],
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }
}

impl OutputSurface for MemorySurface {
    fn depth(&self) -> Depth {
        self.depth
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn lock(&mut self) -> SurfaceView<'_> {
        SurfaceView {
            data: &mut self.data,
            pitch: self.pitch,
        }
    }
}

/// Presentation options applied when computing the target rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Stretch the target width to a 5:4 aspect
    pub aspect_54: bool,

    /// Double the vertical span (scan-line / interlace compensation)
    pub line_double: bool,
}

/// Converts dirty lines to host pixels and blits the changed region
pub struct DisplayCompositor {
    packer: Packer,
    options: ComposeOptions,
    width_hi: usize,
    height: usize,
    back: Vec<u8>,
    back_pitch: usize,
    source_rect: Rect,
    target_rect: Rect,
}

impl DisplayCompositor {
    /// Configure a compositor for a screen size and surface depth
    ///
    /// The depth strategy is selected here, once; it is not re-dispatched
    /// per pixel during composition.
    pub fn new(width_lo: usize, height: usize, depth: Depth, options: ComposeOptions) -> Self {
        let packer = Packer::for_depth(depth);
        let width_hi = width_lo * 2;
        let back_pitch = width_hi * packer.bytes_per_pixel();

        Self {
            packer,
            options,
            width_hi,
            height,
            back: vec![0; back_pitch * height],
            back_pitch,
            source_rect: Rect::new(0, 0, width_hi as i32, height as i32),
            target_rect: Rect::empty(),
        }
    }

    pub fn depth(&self) -> Depth {
        self.packer.depth()
    }

    pub fn options(&self) -> ComposeOptions {
        self.options
    }

    /// Source rectangle (full visible emulated area) of the last pass
    pub fn source_rect(&self) -> Rect {
        self.source_rect
    }

    /// Target rectangle computed by the last pass
    pub fn target_rect(&self) -> Rect {
        self.target_rect
    }

    /// Target size before centring, for sizing windows/surfaces
    pub fn natural_size(&self) -> (usize, usize) {
        let mut w = self.width_hi;
        let mut h = self.height;
        if self.options.line_double {
            h *= 2;
        }
        if self.options.aspect_54 {
            w = w * 5 / 4;
        }
        (w, h)
    }

    /// Converted back-buffer bytes and pitch (host depth)
    ///
    /// Valid for lines the compositor has converted at least once; a fresh
    /// screen is fully dirty, so after one pass this is the whole frame.
    pub fn frame_data(&self) -> (&[u8], usize) {
        (&self.back, self.back_pitch)
    }

    /// Run one compositor pass
    ///
    /// Returns the transferred rectangle in surface coordinates, or None
    /// when no line was dirty (nothing converted, nothing transferred).
    pub fn compose<S, T>(&mut self, screen: &mut S, palette: &Palette, surface: &mut T) -> Option<Rect>
    where
        S: FrameSource + ?Sized,
        T: OutputSurface + ?Sized,
    {
        let (first, last) = screen.dirty().span()?;

        let surface_w = surface.width();
        let surface_h = surface.height();
        let mut view = surface.lock();

        // Convert each dirty line in the span at its stored density
        let packer = self.packer;
        for y in first..=last {
            if !screen.dirty().is_dirty(y) {
                continue;
            }
            let hi = screen.is_high_density(y);
            let width = if hi { self.width_hi } else { self.width_hi / 2 };
            let src = &screen.line(y)[..width];
            let dst = &mut self.back[y * self.back_pitch..(y + 1) * self.back_pitch];
            packer.pack_line(src, hi, palette, dst);
        }

        // Exactly the transferred span is cleared; lines outside it keep
        // their flags for the next pass
        screen.dirty_mut().clear_span(first, last);

        self.source_rect = Rect::new(0, 0, self.width_hi as i32, self.height as i32);
        self.target_rect = self.compute_target(surface_w, surface_h);

        let changed = if self.target_rect.w == self.source_rect.w
            && self.target_rect.h == self.source_rect.h
        {
            self.blit_copy(&mut view, surface_w, surface_h, first, last)
        } else {
            self.blit_stretch(&mut view, surface_w, surface_h, first, last)
        };

        drop(view);
        Some(changed)
    }

    /// Centre the (optionally stretched) source in the surface
    fn compute_target(&self, surface_w: usize, surface_h: usize) -> Rect {
        let (w, h) = self.natural_size();
        let (w, h) = (w as i32, h as i32);
        Rect::new(
            (surface_w as i32 - w) / 2,
            (surface_h as i32 - h) / 2,
            w,
            h,
        )
    }

    /// Equal-size transfer of the converted span
    fn blit_copy(
        &self,
        view: &mut SurfaceView<'_>,
        surface_w: usize,
        surface_h: usize,
        first: usize,
        last: usize,
    ) -> Rect {
        let bpp = self.packer.bytes_per_pixel();
        let target = self.target_rect;

        for y in first..=last {
            let dy = target.y + y as i32;
            if dy < 0 || dy >= surface_h as i32 {
                continue;
            }

            // Horizontal clip against the surface
            let mut src_x = 0usize;
            let mut dst_x = target.x;
            let mut w = self.width_hi;
            if dst_x < 0 {
                src_x = (-dst_x) as usize;
                w = w.saturating_sub(src_x);
                dst_x = 0;
            }
            if dst_x as usize + w > surface_w {
                w = surface_w.saturating_sub(dst_x as usize);
            }
            if w == 0 {
                continue;
            }

            let src = &self.back[y * self.back_pitch + src_x * bpp..][..w * bpp];
            let dst_start = dy as usize * view.pitch + dst_x as usize * bpp;
            view.data[dst_start..dst_start + w * bpp].copy_from_slice(src);
        }

        Rect::new(target.x, target.y + first as i32, target.w, (last - first + 1) as i32)
    }

    /// Nearest-sample stretch of the converted span to the target size
    fn blit_stretch(
        &self,
        view: &mut SurfaceView<'_>,
        surface_w: usize,
        surface_h: usize,
        first: usize,
        last: usize,
    ) -> Rect {
        let bpp = self.packer.bytes_per_pixel();
        let target = self.target_rect;
        let src_w = self.width_hi as i32;
        let src_h = self.height as i32;

        // Destination rows covered by the converted span, rounded outward
        let dy0 = target.y + first as i32 * target.h / src_h;
        let dy1 = target.y + ((last as i32 + 1) * target.h + src_h - 1) / src_h;

        for dy in dy0..dy1 {
            if dy < 0 || dy >= surface_h as i32 {
                continue;
            }
            let sy = (((dy - target.y) * src_h) / target.h).clamp(0, src_h - 1) as usize;
            let src_row = &self.back[sy * self.back_pitch..(sy + 1) * self.back_pitch];
            let dst_base = dy as usize * view.pitch;

            for dx in 0..target.w {
                let tx = target.x + dx;
                if tx < 0 || tx >= surface_w as i32 {
                    continue;
                }
                let sx = ((dx * src_w) / target.w).clamp(0, src_w - 1) as usize;
                let src_px = &src_row[sx * bpp..(sx + 1) * bpp];
                let dst_start = dst_base + tx as usize * bpp;
                view.data[dst_start..dst_start + bpp].copy_from_slice(src_px);
            }
        }

        Rect::new(target.x, dy0, target.w, dy1 - dy0)
    }
}
