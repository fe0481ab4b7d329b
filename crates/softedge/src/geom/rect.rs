use super::Vec2;

/// Axis-aligned rectangle in logical pixels (top-left origin).
///
/// Mostly a convenience for building axis-aligned [`Quad`](super::Quad)s.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn top_left(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn top_right(self) -> Vec2 {
        Vec2::new(self.origin.x + self.size.x, self.origin.y)
    }

    #[inline]
    pub fn bottom_left(self) -> Vec2 {
        Vec2::new(self.origin.x, self.origin.y + self.size.y)
    }

    #[inline]
    pub fn bottom_right(self) -> Vec2 {
        self.max()
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.origin.is_finite() && self.size.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.top_left(), Vec2::new(10.0, 20.0));
        assert_eq!(r.top_right(), Vec2::new(40.0, 20.0));
        assert_eq!(r.bottom_left(), Vec2::new(10.0, 60.0));
        assert_eq!(r.bottom_right(), Vec2::new(40.0, 60.0));
    }

    #[test]
    fn min_max() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.min(), Vec2::new(1.0, 2.0));
        assert_eq!(r.max(), Vec2::new(4.0, 6.0));
    }

    #[test]
    fn is_empty_zero_size() {
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
        assert!(Rect::new(0.0, 0.0, 5.0, 0.0).is_empty());
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }
}
