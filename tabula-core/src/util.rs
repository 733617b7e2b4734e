//! Utility types, used throughout the crate.
//! Integer points and rects for pixel grids and window areas, float rects for anything
//! that gets scaled.

/// An integer point. Window space or image space, depending on who's holding it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}
impl Point {
    pub const ZERO: Self = Self { x: 0, y: 0 };
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An integer rectangle. 0,0 is top left, +X Right, +Y down.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}
impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
    /// Is the point within the rect? Left and top edges are inclusive, right and bottom are not.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        // i64 so that a rect hugging i32::MAX doesn't wrap.
        let (x, y) = (i64::from(point.x), i64::from(point.y));
        x >= i64::from(self.x)
            && y >= i64::from(self.y)
            && x < i64::from(self.x) + i64::from(self.w)
            && y < i64::from(self.y) + i64::from(self.h)
    }
    /// Grow (or shrink, with negative deltas) the size while keeping the origin.
    /// Saturates at zero.
    pub fn resize_by(&mut self, dx: i32, dy: i32) {
        self.w = self.w.saturating_add_signed(dx);
        self.h = self.h.saturating_add_signed(dy);
    }
}

/// A float rectangle. Same conventions as [`Rect`].
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct FRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}
impl FRect {
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        // Negated so NaN sizes count as empty too.
        !(self.w > 0.0 && self.h > 0.0)
    }
    /// Same edge rules as [`Rect::contains`].
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }
    /// The overlapping region of the two rects, or None if they don't overlap.
    /// Rects that merely share an edge do not overlap.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        let overlap = Self {
            x: left,
            y: top,
            w: right - left,
            h: bottom - top,
        };
        (!overlap.is_empty()).then_some(overlap)
    }
}
#[allow(clippy::cast_precision_loss)]
impl From<Rect> for FRect {
    fn from(value: Rect) -> Self {
        Self {
            x: value.x as f32,
            y: value.y as f32,
            w: value.w as f32,
            h: value.h as f32,
        }
    }
}

/// A pixel coordinate fell outside of the image it was meant for.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("pixel ({x}, {y}) is outside of the {width}x{height} image")]
pub struct RangeError {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
impl RangeError {
    /// Check that `point` lies within a `width` by `height` grid at the origin.
    pub fn check(point: Point, width: u32, height: u32) -> Result<(u32, u32), Self> {
        match (u32::try_from(point.x), u32::try_from(point.y)) {
            (Ok(x), Ok(y)) if x < width && y < height => Ok((x, y)),
            _ => Err(Self {
                x: point.x,
                y: point.y,
                width,
                height,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{FRect, Point, RangeError, Rect};
    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(-2, 3, 4, 2);
        assert!(rect.contains(Point::new(-2, 3)));
        assert!(rect.contains(Point::new(1, 4)));
        // Right and bottom are exclusive
        assert!(!rect.contains(Point::new(2, 4)));
        assert!(!rect.contains(Point::new(1, 5)));
        assert!(!Rect::new(0, 0, 0, 0).contains(Point::ZERO));
    }
    #[test]
    fn resize_saturates() {
        let mut rect = Rect::new(0, 0, 10, 10);
        rect.resize_by(5, -4);
        assert_eq!(rect, Rect::new(0, 0, 15, 6));
        rect.resize_by(-100, 0);
        assert_eq!(rect.w, 0);
    }
    #[test]
    fn intersect() {
        let a = FRect::new(0.0, 0.0, 10.0, 10.0);
        let b = FRect::new(5.0, -5.0, 10.0, 10.0);
        assert_eq!(a.intersect(&b), Some(FRect::new(5.0, 0.0, 5.0, 5.0)));
        // Symmetric
        assert_eq!(b.intersect(&a), a.intersect(&b));
        // Contained
        let inner = FRect::new(2.0, 2.0, 1.0, 1.0);
        assert_eq!(a.intersect(&inner), Some(inner));
        // Touching only
        assert_eq!(a.intersect(&FRect::new(10.0, 0.0, 5.0, 5.0)), None);
        // Disjoint
        assert_eq!(a.intersect(&FRect::new(-20.0, -20.0, 5.0, 5.0)), None);
    }
    #[test]
    fn range_check() {
        assert_eq!(RangeError::check(Point::new(2, 1), 3, 2), Ok((2, 1)));
        assert!(RangeError::check(Point::new(3, 1), 3, 2).is_err());
        assert_eq!(
            RangeError::check(Point::new(-1, 0), 3, 2),
            Err(RangeError {
                x: -1,
                y: 0,
                width: 3,
                height: 2
            })
        );
    }
}
