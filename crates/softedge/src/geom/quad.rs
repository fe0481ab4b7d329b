use core::ops::{Index, IndexMut};

use super::{Rect, Vec2};

/// Four corners of a quadrilateral.
///
/// Corner order is fixed: `lt`, `rt`, `lb`, `rb` (top-left, top-right,
/// bottom-left, bottom-right). Every algorithm here depends on that order;
/// reordering corners changes geometric meaning, not just representation.
///
/// Degenerate quads (collinear or coincident corners) are accepted as input.
/// The operations below degrade to defined fallback values rather than fail.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    pub lt: Vec2,
    pub rt: Vec2,
    pub lb: Vec2,
    pub rb: Vec2,
}

/// Unit quad spanning `(0,0)` to `(1,1)`.
impl Default for Quad {
    fn default() -> Self {
        Self::from_size(1.0, 1.0)
    }
}

/// Corner access by storage index: `0 → lt, 1 → rt, 2 → lb, 3 → rb`.
impl Index<usize> for Quad {
    type Output = Vec2;

    fn index(&self, index: usize) -> &Vec2 {
        match index {
            0 => &self.lt,
            1 => &self.rt,
            2 => &self.lb,
            3 => &self.rb,
            _ => panic!("quad corner index out of range: {index}"),
        }
    }
}

impl IndexMut<usize> for Quad {
    fn index_mut(&mut self, index: usize) -> &mut Vec2 {
        match index {
            0 => &mut self.lt,
            1 => &mut self.rt,
            2 => &mut self.lb,
            3 => &mut self.rb,
            _ => panic!("quad corner index out of range: {index}"),
        }
    }
}

/// Outcome of an inverse or composed quad mapping.
///
/// `point` is always written, even when the mapping falls outside the valid
/// range; `in_range` is the only validity signal. The out-of-range value is
/// deterministic and some callers use it deliberately (mesh UVs extrapolate
/// past the outer quad), so it is part of the contract.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapResult {
    pub point: Vec2,
    pub in_range: bool,
}

impl Quad {
    #[inline]
    pub const fn new(lt: Vec2, rt: Vec2, lb: Vec2, rb: Vec2) -> Self {
        Self { lt, rt, lb, rb }
    }

    #[inline]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(
            rect.top_left(),
            rect.top_right(),
            rect.bottom_left(),
            rect.bottom_right(),
        )
    }

    /// Axis-aligned quad with its top-left corner at the origin.
    #[inline]
    pub fn from_size(width: f32, height: f32) -> Self {
        Self::from_rect(Rect::new(0.0, 0.0, width, height))
    }

    /// Corners in storage order (`lt, rt, lb, rb`).
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        [self.lt, self.rt, self.lb, self.rb]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.corners().iter().all(|p| p.is_finite())
    }

    /// Arithmetic mean of the four corners.
    pub fn centroid(self) -> Vec2 {
        (self.lt + self.rt + self.lb + self.rb) / 4.0
    }

    pub fn distance_from_centroid(self, point: Vec2) -> f32 {
        self.centroid().distance(point)
    }

    /// Even-odd crossing test.
    ///
    /// Scanline convention is half-open (top edge inclusive): an edge counts
    /// as crossing when one endpoint is at or above `point.y` and the other
    /// strictly below.
    pub fn contains(self, point: Vec2) -> bool {
        // Walk edges in perimeter order, not storage order.
        const PERIMETER: [usize; 5] = [0, 1, 3, 2, 0];
        let mut inside = false;
        for i in 0..4 {
            let p0 = self[PERIMETER[i]];
            let p1 = self[PERIMETER[i + 1]];
            if (p0.y <= point.y && p1.y > point.y) || (p0.y > point.y && p1.y <= point.y) {
                // The crossing condition guarantees p1.y != p0.y here.
                let vt = (point.y - p0.y) / (p1.y - p0.y);
                if point.x < p0.x + vt * (p1.x - p0.x) {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Inverts the bilinear map of this quad, recovering the normalized
    /// `(s, t)` for a physical point.
    ///
    /// The forward map `P(s, t) = lt + s·AB + t·AD + s·t·(AC − AB − AD)` is
    /// quadratic in `s` once `t` is eliminated. Both roots are candidates:
    /// the `+` root is tried first, and if its `(s, t)` leaves the unit
    /// square the `-` root is taken, its `(s, t)` reported even when out of
    /// range. That tie-break resolves the map's two-fold ambiguity in favor
    /// of the root most likely to land inside the unit square; callers depend
    /// on the exact policy, so it must not change.
    ///
    /// `in_range` is false when the discriminant is negative (the point is
    /// unreachable for any real parametrization; `point` is then `(0, 0)`) or
    /// when neither root lands in `[0, 1]²`.
    pub fn normalized_position(self, point: Vec2) -> MapResult {
        let ab = self.rt - self.lt;
        let ac = self.rb - self.lt;
        let ad = self.lb - self.lt;
        let ap = point - self.lt;
        let cdb = ac - ad - ab;

        let calc_t = |s: f32| {
            let div = ad.y + s * cdb.y;
            if div == 0.0 { 0.0 } else { (ap.y - s * ab.y) / div }
        };
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);

        let a = ab.y * cdb.x - ab.x * cdb.y;
        let b = (ab.y * ad.x - ap.y * cdb.x) - (ab.x * ad.y - ap.x * cdb.y);
        let c = ap.x * ad.y - ap.y * ad.x;
        let d = b * b - 4.0 * a * c;
        if d < 0.0 {
            return MapResult {
                point: Vec2::zero(),
                in_range: false,
            };
        }
        if a == 0.0 {
            // Affine quad (parallelogram): the quadratic collapses to a
            // linear equation in s.
            let s = if b == 0.0 { 0.0 } else { -c / b };
            let t = calc_t(s);
            return MapResult {
                point: Vec2::new(s, t),
                in_range: in_unit(s) && in_unit(t),
            };
        }
        let sqrt_d = d.sqrt();
        let s = (-b + sqrt_d) / (2.0 * a);
        let t = calc_t(s);
        if in_unit(s) && in_unit(t) {
            return MapResult {
                point: Vec2::new(s, t),
                in_range: true,
            };
        }
        let s = (-b - sqrt_d) / (2.0 * a);
        let t = calc_t(s);
        MapResult {
            point: Vec2::new(s, t),
            in_range: in_unit(s) && in_unit(t),
        }
    }

    /// Forward bilinear evaluation at normalized `(s, t)`.
    ///
    /// No range check: `(s, t)` outside `[0, 1]²` extrapolates beyond the
    /// quad.
    pub fn position_at(self, st: Vec2) -> Vec2 {
        let ab = self.rt - self.lt;
        let ac = self.rb - self.lt;
        let ad = self.lb - self.lt;
        let (s, t) = (st.x, st.y);
        self.lt + ab * s + ad * t + (ac - ab - ad) * (s * t)
    }

    /// Remaps `point` from this quad's bilinear patch onto `dst`'s.
    ///
    /// The returned point is always the `dst` evaluation, even when the
    /// inverse step reports out-of-range; `in_range` carries that flag
    /// through.
    pub fn remap_to(self, dst: Quad, point: Vec2) -> MapResult {
        let n = self.normalized_position(point);
        MapResult {
            point: dst.position_at(n.point),
            in_range: n.in_range,
        }
    }

    /// Per-axis scale of all four corners about the origin.
    pub fn scaled(self, factor: Vec2) -> Quad {
        let mut ret = self;
        for i in 0..4 {
            ret[i] = ret[i] * factor;
        }
        ret
    }

    pub fn scale(&mut self, factor: Vec2) {
        *self = self.scaled(factor);
    }

    /// Translation of all four corners.
    pub fn translated(self, offset: Vec2) -> Quad {
        let mut ret = self;
        for i in 0..4 {
            ret[i] = ret[i] + offset;
        }
        ret
    }

    pub fn translate(&mut self, offset: Vec2) {
        *self = self.translated(offset);
    }
}

/// Intersection of the infinite lines through `a`–`b` and `c`–`d`.
///
/// Each line is expressed as `a1·x + b1·y = c1` and the 2×2 system solved by
/// determinant, in `f64` to limit cancellation. Parallel or coincident lines
/// have a zero determinant and no unique intersection; `a` is returned as a
/// fallback so downstream mesh assembly can proceed with it silently.
pub fn line_intersection(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Vec2 {
    let a1 = f64::from(b.y - a.y);
    let b1 = f64::from(a.x - b.x);
    let c1 = a1 * f64::from(a.x) + b1 * f64::from(a.y);

    let a2 = f64::from(d.y - c.y);
    let b2 = f64::from(c.x - d.x);
    let c2 = a2 * f64::from(c.x) + b2 * f64::from(c.y);

    let determinant = a1 * b2 - a2 * b1;
    if determinant == 0.0 {
        return a;
    }
    Vec2::new(
        ((b2 * c1 - b1 * c2) / determinant) as f32,
        ((a1 * c2 - a2 * c1) / determinant) as f32,
    )
}
