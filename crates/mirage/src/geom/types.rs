//! Segment and supporting-line types.

/// 2D point / direction.
pub type Vec2 = nalgebra::Vector2<f64>;

/// Infinite line through `p` with direction `d` (`d` need not be unit).
#[derive(Clone, Copy, Debug)]
pub struct Line {
    pub p: Vec2,
    pub d: Vec2,
}

/// Ordered segment `a → b`, `a ≠ b`.
///
/// Normal convention: rotating `b − a` by +90° yields the direction of the
/// reflective side. Everything downstream (surface sides, arrow hits,
/// bypass rules) leans on this one convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    #[inline]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn dir(&self) -> Vec2 {
        self.b - self.a
    }

    #[inline]
    pub fn len(&self) -> f64 {
        self.dir().norm()
    }

    #[inline]
    pub fn len2(&self) -> f64 {
        self.dir().norm_squared()
    }

    /// Supporting line.
    #[inline]
    pub fn line(&self) -> Line {
        Line {
            p: self.a,
            d: self.dir(),
        }
    }

    /// Unit normal on the reflective side (+90° from `dir`).
    #[inline]
    pub fn unit_normal(&self) -> Vec2 {
        let n = super::rot90(self.dir());
        n / n.norm()
    }

    /// Point at parameter `s` (0 = `a`, 1 = `b`).
    #[inline]
    pub fn point_at(&self, s: f64) -> Vec2 {
        self.a + self.dir() * s
    }

    /// Parameter of the orthogonal projection of `p` onto the supporting line.
    #[inline]
    pub fn project_param(&self, p: Vec2) -> f64 {
        let d = self.dir();
        (p - self.a).dot(&d) / d.norm_squared()
    }
}
