//! Angular sectors of rays, with cross-product predicates only.
//!
//! Purpose
//! - A cone of visibility is `{origin, right boundary, left boundary}`
//!   sweeping CCW from right to left. A full-plane cone is a flag, never an
//!   angle comparison, and no operation here calls `atan2`.
//!
//! Why
//! - atan2 wraps: two rays a hair apart across the branch cut compare as far
//!   apart. Signed crosses keep every predicate exact at the places the
//!   projection cares about (boundary membership, window orientation).
//!
//! Code cross-refs: `cone::project::Projector`, `cascade`

use crate::geom::{dir_cross, reflect_point, Line, Segment, Vec2};

/// CCW angular sector of rays out of `origin`.
#[derive(Clone, Copy, Debug)]
pub struct RaySector {
    pub origin: Vec2,
    right: Vec2,
    left: Vec2,
    full: bool,
}

/// Reflect a direction about a line's direction vector.
#[inline]
fn reflect_dir_about(v: Vec2, d: Vec2) -> Vec2 {
    let u = d / d.norm();
    u * (2.0 * v.dot(&u)) - v
}

/// Orient two window endpoints as seen from `origin`: returns
/// `(right_point, left_point)` so the CCW sweep right→left covers the
/// window, or `None` when the window is edge-on (collinear with `origin`).
pub fn orient_window(origin: Vec2, a: Vec2, b: Vec2) -> Option<(Vec2, Vec2)> {
    let da = a - origin;
    let db = b - origin;
    let c = dir_cross(da, db);
    if c > 0.0 {
        Some((a, b))
    } else if c < 0.0 {
        Some((b, a))
    } else {
        None
    }
}

impl RaySector {
    /// The full plane.
    #[inline]
    pub fn full(origin: Vec2) -> Self {
        Self {
            origin,
            right: Vec2::new(1.0, 0.0),
            left: Vec2::new(1.0, 0.0),
            full: true,
        }
    }

    /// Windowed sector through `right_point` then `left_point` (must already
    /// be oriented; see `orient_window`).
    pub fn window(origin: Vec2, right_point: Vec2, left_point: Vec2) -> Self {
        Self {
            origin,
            right: right_point - origin,
            left: left_point - origin,
            full: false,
        }
    }

    /// Sector from two boundary directions.
    pub fn from_dirs(origin: Vec2, right: Vec2, left: Vec2) -> Self {
        Self {
            origin,
            right,
            left,
            full: false,
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    #[inline]
    pub fn right_dir(&self) -> Vec2 {
        self.right
    }

    #[inline]
    pub fn left_dir(&self) -> Vec2 {
        self.left
    }

    /// Boundary-inclusive membership of a direction.
    pub fn contains_dir(&self, d: Vec2) -> bool {
        if self.full {
            return true;
        }
        let cr = dir_cross(self.right, self.left);
        if cr > 0.0 {
            dir_cross(self.right, d) >= 0.0 && dir_cross(d, self.left) >= 0.0
        } else if cr < 0.0 {
            // Reflex sector: complement of the convex wedge left→right.
            dir_cross(self.right, d) >= 0.0 || dir_cross(d, self.left) >= 0.0
        } else if self.right.dot(&self.left) > 0.0 {
            // Degenerate single ray.
            dir_cross(self.right, d) == 0.0 && self.right.dot(&d) > 0.0
        } else {
            // Half plane.
            dir_cross(self.right, d) >= 0.0
        }
    }

    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        self.contains_dir(p - self.origin)
    }

    /// Mirror the sector through a line. Boundaries swap because reflection
    /// reverses orientation.
    pub fn reflect(&self, line: &Line) -> RaySector {
        RaySector {
            origin: reflect_point(self.origin, line),
            right: reflect_dir_about(self.left, line.d),
            left: reflect_dir_about(self.right, line.d),
            full: self.full,
        }
    }

    /// Intersection with another sector sharing the same origin.
    ///
    /// Exact for sectors spanning at most a half plane (the only shapes the
    /// cascade builds); `None` when the sweeps do not overlap.
    pub fn intersect(&self, other: &RaySector) -> Option<RaySector> {
        if self.full {
            return Some(*other);
        }
        if other.full {
            return Some(*self);
        }
        let r = if other.contains_dir(self.right) {
            self.right
        } else if self.contains_dir(other.right) {
            other.right
        } else {
            return None;
        };
        let l = if other.contains_dir(self.left) {
            self.left
        } else if self.contains_dir(other.left) {
            other.left
        } else {
            return None;
        };
        Some(RaySector {
            origin: self.origin,
            right: r,
            left: l,
            full: false,
        })
    }

    /// Restrict to the wedge subtended by a segment.
    pub fn trim(&self, seg: &Segment) -> Option<RaySector> {
        let (rp, lp) = orient_window(self.origin, seg.a, seg.b)?;
        self.intersect(&RaySector::window(self.origin, rp, lp))
    }

    /// Does the sector cover every ray subtended by the segment?
    pub fn covers(&self, seg: &Segment) -> bool {
        if self.full {
            return true;
        }
        let Some((rp, lp)) = orient_window(self.origin, seg.a, seg.b) else {
            // Edge-on segment subtends a single ray.
            return self.contains_point(seg.a) && self.contains_point(seg.b);
        };
        let mid = (rp + lp) * 0.5;
        self.contains_point(rp) && self.contains_point(lp) && self.contains_point(mid)
    }

    /// Remove the wedge occluded by a segment; at most two sectors remain.
    pub fn block(&self, seg: &Segment) -> Vec<RaySector> {
        let Some((rp, lp)) = orient_window(self.origin, seg.a, seg.b) else {
            // Edge-on segment occludes nothing.
            return vec![*self];
        };
        let wedge = RaySector::window(self.origin, rp, lp);
        if self.full {
            // Complement: sweep from the wedge's left boundary back around
            // to its right boundary.
            return vec![RaySector {
                origin: self.origin,
                right: wedge.left,
                left: wedge.right,
                full: false,
            }];
        }
        let mut out = Vec::new();
        if !wedge.contains_dir(self.right) {
            // Piece between our right boundary and the wedge.
            let l = if self.contains_dir(wedge.right) {
                wedge.right
            } else {
                self.left
            };
            if dir_cross(self.right, l) > 0.0 || !self.contains_dir(wedge.right) {
                out.push(RaySector {
                    origin: self.origin,
                    right: self.right,
                    left: l,
                    full: false,
                });
            }
        }
        if !wedge.contains_dir(self.left) && self.contains_dir(wedge.left) {
            out.push(RaySector {
                origin: self.origin,
                right: wedge.left,
                left: self.left,
                full: false,
            });
        }
        out
    }
}
