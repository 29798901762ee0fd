//! Range-limit circle: clipping and arc terminations.

use crate::error::QueryError;
use crate::geom::{circle_segment_roots, Line, Segment, Vec2};
use crate::source::CircleId;

/// Circle capping visibility around a cone origin. Reflections carry the
/// circle along (center mirrors, orientation flips).
#[derive(Clone, Copy, Debug)]
pub struct RangeLimit {
    pub center: Vec2,
    pub radius: f64,
    /// Toggled per reflection; odd depth means the arc sweep runs mirrored.
    pub flipped: bool,
    pub circle: CircleId,
}

/// A segment against the circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Clip {
    /// Entirely outside (or the supporting line misses the circle).
    Outside,
    /// Entirely inside.
    Full,
    /// The sub-range `[s0, s1]` is inside; the flags say which end sits on
    /// the circle (an arc crossing) rather than on a segment endpoint.
    Partial {
        s0: f64,
        s1: f64,
        near_arc: bool,
        far_arc: bool,
    },
}

impl RangeLimit {
    pub fn new(center: Vec2, radius: f64) -> Self {
        Self {
            center,
            radius,
            flipped: false,
            circle: CircleId(0),
        }
    }

    /// The circle must be well-formed and contain the cone origin; each ray
    /// then leaves it exactly once.
    pub fn validate_for(&self, origin: Vec2) -> Result<(), QueryError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(QueryError::InvalidRangeLimit {
                reason: format!("radius {} must be positive and finite", self.radius),
            });
        }
        if (origin - self.center).norm() >= self.radius {
            return Err(QueryError::InvalidRangeLimit {
                reason: "cone origin lies outside the range circle".to_string(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        (p - self.center).norm_squared() <= self.radius * self.radius
    }

    /// Mirror through a line.
    pub fn reflect(&self, line: &Line) -> Self {
        Self {
            center: crate::geom::reflect_point(self.center, line),
            radius: self.radius,
            flipped: !self.flipped,
            circle: self.circle,
        }
    }

    /// Parameter where `origin + t·dir` leaves the circle (origin inside).
    pub fn ray_exit(&self, origin: Vec2, dir: Vec2) -> Option<f64> {
        let f = origin - self.center;
        let a = dir.norm_squared();
        if a == 0.0 {
            return None;
        }
        let b = 2.0 * f.dot(&dir);
        let c = f.norm_squared() - self.radius * self.radius;
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        Some((-b + disc.sqrt()) / (2.0 * a))
    }

    /// Clip a segment to the circle interior.
    pub fn clip(&self, seg: &Segment) -> Clip {
        let Some((r0, r1)) = circle_segment_roots(self.center, self.radius, seg) else {
            return Clip::Outside;
        };
        let s0 = r0.max(0.0);
        let s1 = r1.min(1.0);
        if s0 >= s1 {
            return Clip::Outside;
        }
        if r0 <= 0.0 && r1 >= 1.0 {
            return Clip::Full;
        }
        Clip::Partial {
            s0,
            s1,
            near_arc: r0 > 0.0,
            far_arc: r1 < 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_cases() {
        let r = RangeLimit::new(Vec2::new(0.0, 0.0), 10.0);
        // Fully inside.
        assert_eq!(
            r.clip(&Segment::new(Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0))),
            Clip::Full
        );
        // Fully outside.
        assert_eq!(
            r.clip(&Segment::new(Vec2::new(20.0, 20.0), Vec2::new(30.0, 20.0))),
            Clip::Outside
        );
        // Straddling one side.
        match r.clip(&Segment::new(Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0))) {
            Clip::Partial {
                s0,
                s1,
                near_arc,
                far_arc,
            } => {
                assert_eq!(s0, 0.0);
                assert!((s1 - 0.5).abs() < 1e-12);
                assert!(!near_arc);
                assert!(far_arc);
            }
            other => panic!("expected partial, got {other:?}"),
        }
        // Chord through the whole disk.
        match r.clip(&Segment::new(Vec2::new(-20.0, 5.0), Vec2::new(20.0, 5.0))) {
            Clip::Partial {
                near_arc, far_arc, ..
            } => {
                assert!(near_arc && far_arc);
            }
            other => panic!("expected partial, got {other:?}"),
        }
    }

    #[test]
    fn ray_exit_from_interior() {
        let r = RangeLimit::new(Vec2::new(5.0, 0.0), 10.0);
        let t = r.ray_exit(Vec2::new(5.0, 0.0), Vec2::new(2.0, 0.0)).unwrap();
        assert!((t - 5.0).abs() < 1e-12);
        assert!(r.validate_for(Vec2::new(5.0, 0.0)).is_ok());
        assert!(r.validate_for(Vec2::new(50.0, 0.0)).is_err());
        assert!(RangeLimit::new(Vec2::new(0.0, 0.0), -1.0)
            .validate_for(Vec2::new(0.0, 0.0))
            .is_err());
    }

    #[test]
    fn reflect_mirrors_center_and_flips() {
        let r = RangeLimit::new(Vec2::new(2.0, 3.0), 7.0);
        let line = Line {
            p: Vec2::new(0.0, 0.0),
            d: Vec2::new(0.0, 1.0),
        };
        let m = r.reflect(&line);
        assert!((m.center - Vec2::new(-2.0, 3.0)).norm() < 1e-12);
        assert_eq!(m.radius, 7.0);
        assert!(m.flipped);
        assert_eq!(m.circle, r.circle);
    }
}
