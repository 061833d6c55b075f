// Coordinate mapper - converts host pointer coordinates and deltas to
// emulated-screen coordinates and back
//
// Scaling uses the ratio of the source rectangle (as the compositor last
// computed it) to the target rectangle. Division truncates toward negative
// infinity for both signs, so a caller that keeps fractional remainders
// between calls accumulates small movements without drift. When the overlay
// is inactive the emulated X axis stores two host pixels per emulated pixel,
// so the source width is halved before scaling.

use crate::rect::Rect;

/// Maps between host and emulated pixel grids
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    source: Rect,
    target: Rect,
    overlay_active: bool,
}

impl CoordinateMapper {
    /// Build a mapper from the compositor's last source/target rectangles
    pub fn new(source: Rect, target: Rect, overlay_active: bool) -> Self {
        Self {
            source,
            target,
            overlay_active,
        }
    }

    pub fn set_overlay_active(&mut self, active: bool) {
        self.overlay_active = active;
    }

    /// Source width in the units pointer input addresses
    fn source_width(&self) -> i32 {
        if self.overlay_active {
            self.source.w
        } else {
            self.source.w / 2
        }
    }

    /// Scale a host delta to an emulated delta
    pub fn to_emulated(&self, dx: i32, dy: i32) -> (i32, i32) {
        (
            div_floor(dx * self.source_width(), self.target.w),
            div_floor(dy * self.source.h, self.target.h),
        )
    }

    /// Scale an emulated delta to a host delta
    pub fn to_host(&self, dx: i32, dy: i32) -> (i32, i32) {
        (
            div_floor(dx * self.target.w, self.source_width()),
            div_floor(dy * self.target.h, self.source.h),
        )
    }

    /// Map an absolute host position to emulated coordinates
    ///
    /// The position is first made relative to the target rectangle origin.
    pub fn to_emulated_point(&self, x: i32, y: i32) -> (i32, i32) {
        (
            div_floor((x - self.target.x) * self.source_width(), self.target.w),
            div_floor((y - self.target.y) * self.source.h, self.target.h),
        )
    }

    /// Map an absolute emulated position to host coordinates
    pub fn to_host_point(&self, x: i32, y: i32) -> (i32, i32) {
        (
            self.target.x + div_floor(x * self.target.w, self.source_width()),
            self.target.y + div_floor(y * self.target.h, self.source.h),
        )
    }
}

/// Integer division truncating toward negative infinity
fn div_floor(a: i32, b: i32) -> i32 {
    let q = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}
