// Rectangle type used for clip regions and blit geometry
//
// All clipping in the pipeline funnels through Rect::intersect, which
// mutates the rectangle in place and reports whether anything is left.

/// Integer rectangle (position + size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle with zero size at the origin
    pub const fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// True if the rectangle covers no pixels
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// One past the right-most column
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// One past the bottom-most row
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// True if the point lies inside the rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Intersect this rectangle with another, in place
    ///
    /// Returns false if the intersection is empty, in which case the
    /// rectangle is zeroed so callers can treat it as a no-op region.
    pub fn intersect(&mut self, other: &Rect) -> bool {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());

        if x1 <= x0 || y1 <= y0 {
            *self = Rect::empty();
            return false;
        }

        *self = Rect::new(x0, y0, x1 - x0, y1 - y0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_overlapping() {
        let mut r = Rect::new(0, 0, 100, 100);
        assert!(r.intersect(&Rect::new(50, 50, 100, 100)));
        assert_eq!(r, Rect::new(50, 50, 50, 50));
    }

    #[test]
    fn test_intersect_contained() {
        let mut r = Rect::new(10, 10, 20, 20);
        assert!(r.intersect(&Rect::new(0, 0, 100, 100)));
        assert_eq!(r, Rect::new(10, 10, 20, 20));
    }

    #[test]
    fn test_intersect_disjoint() {
        let mut r = Rect::new(0, 0, 10, 10);
        assert!(!r.intersect(&Rect::new(20, 20, 10, 10)));
        assert!(r.is_empty());
    }

    #[test]
    fn test_intersect_touching_edge_is_empty() {
        // Rectangles sharing only an edge have no common pixels
        let mut r = Rect::new(0, 0, 10, 10);
        assert!(!r.intersect(&Rect::new(10, 0, 10, 10)));
    }

    #[test]
    fn test_contains() {
        let r = Rect::new(5, 5, 10, 10);
        assert!(r.contains(5, 5));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 15));
        assert!(!r.contains(4, 5));
    }
}
