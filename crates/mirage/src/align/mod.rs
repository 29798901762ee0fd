//! Lock-step comparison of planned and actual paths.

use crate::geom::Vec2;
use crate::path::{Trace, TraceStatus};
use crate::scene::SurfaceId;

/// How far the actual path follows the plan, and where they part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Alignment {
    pub is_fully_aligned: bool,
    pub aligned_segment_count: usize,
    pub divergence_point: Option<Vec2>,
    pub divergence_surface: Option<SurfaceId>,
}

impl Alignment {
    /// Trivial alignment for a degenerate (single-waypoint) query.
    pub fn trivial() -> Self {
        Self {
            is_fully_aligned: true,
            aligned_segment_count: 0,
            divergence_point: None,
            divergence_surface: None,
        }
    }
}

/// Walk both paths segment by segment. Two segments match when their
/// endpoints agree within `tol` and the surface contact at the segment end
/// is the same.
pub fn compare(planned: &Trace, actual: &Trace, tol: f64) -> Alignment {
    let planned_segments = planned.points.len().saturating_sub(1);
    let actual_segments = actual.points.len().saturating_sub(1);
    let mut aligned = 0usize;

    for k in 0..planned_segments.min(actual_segments) {
        let ends_match = (planned.points[k] - actual.points[k]).norm() <= tol
            && (planned.points[k + 1] - actual.points[k + 1]).norm() <= tol;
        let planned_surface = planned.hits.get(k).map(|h| h.surface);
        let actual_surface = actual.hits.get(k).map(|h| h.surface);
        if ends_match && planned_surface == actual_surface {
            aligned += 1;
        } else {
            break;
        }
    }

    let full = aligned == planned_segments
        && planned_segments == actual_segments
        && planned.status == TraceStatus::ReachedCursor
        && actual.status == TraceStatus::ReachedCursor;

    if full {
        Alignment {
            is_fully_aligned: true,
            aligned_segment_count: aligned,
            divergence_point: None,
            divergence_surface: None,
        }
    } else {
        // The divergence is where the actual path first leaves the plan.
        let divergence_point = actual
            .points
            .get(aligned + 1)
            .or(actual.points.last())
            .copied();
        let divergence_surface = actual.hits.get(aligned).map(|h| h.surface);
        Alignment {
            is_fully_aligned: false,
            aligned_segment_count: aligned,
            divergence_point,
            divergence_surface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::HitRecord;

    fn trace(points: Vec<Vec2>, hits: Vec<HitRecord>, status: TraceStatus) -> Trace {
        Trace {
            points,
            hits,
            status,
            forward: Vec::new(),
        }
    }

    fn hit(chain: u32, point: Vec2) -> HitRecord {
        HitRecord {
            surface: SurfaceId { chain, edge: 0 },
            point,
            reflected: true,
            on_segment: true,
        }
    }

    #[test]
    fn identical_straight_paths_align() {
        let p = trace(
            vec![Vec2::new(100.0, 300.0), Vec2::new(500.0, 300.0)],
            vec![],
            TraceStatus::ReachedCursor,
        );
        let a = p.clone();
        let al = compare(&p, &a, 2.0);
        assert!(al.is_fully_aligned);
        assert_eq!(al.aligned_segment_count, 1);
        assert!(al.divergence_point.is_none());
    }

    #[test]
    fn blocked_first_segment_diverges_at_the_obstacle() {
        let planned = trace(
            vec![
                Vec2::new(345.0, 515.0),
                Vec2::new(552.9, 300.0),
                Vec2::new(581.0, 329.0),
            ],
            vec![hit(1, Vec2::new(552.9, 300.0))],
            TraceStatus::ReachedCursor,
        );
        let wall = SurfaceId { chain: 2, edge: 0 };
        let actual = Trace {
            points: vec![Vec2::new(345.0, 515.0), Vec2::new(407.9, 450.0)],
            hits: vec![HitRecord {
                surface: wall,
                point: Vec2::new(407.9, 450.0),
                reflected: false,
                on_segment: true,
            }],
            status: TraceStatus::BlockedByWall(wall),
            forward: Vec::new(),
        };
        let al = compare(&planned, &actual, 2.0);
        assert!(!al.is_fully_aligned);
        assert_eq!(al.aligned_segment_count, 0);
        assert_eq!(al.divergence_point, Some(Vec2::new(407.9, 450.0)));
        assert_eq!(al.divergence_surface, Some(wall));
    }

    #[test]
    fn same_shape_but_wrong_surface_diverges() {
        let p = trace(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(20.0, 5.0),
            ],
            vec![hit(1, Vec2::new(10.0, 0.0))],
            TraceStatus::ReachedCursor,
        );
        let a = trace(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(10.0, 0.0),
                Vec2::new(20.0, 5.0),
            ],
            vec![hit(9, Vec2::new(10.0, 0.0))],
            TraceStatus::ReachedCursor,
        );
        let al = compare(&p, &a, 2.0);
        assert!(!al.is_fully_aligned);
        assert_eq!(al.aligned_segment_count, 0);
    }

    #[test]
    fn tolerance_absorbs_small_offsets() {
        let p = trace(
            vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)],
            vec![],
            TraceStatus::ReachedCursor,
        );
        let a = trace(
            vec![Vec2::new(0.0, 0.0), Vec2::new(101.5, 0.5)],
            vec![],
            TraceStatus::ReachedCursor,
        );
        assert!(compare(&p, &a, 2.0).is_fully_aligned);
        assert!(!compare(&p, &a, 0.5).is_fully_aligned);
    }

    #[test]
    fn unreached_cursor_never_fully_aligns() {
        let p = trace(
            vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)],
            vec![],
            TraceStatus::ReachedCursor,
        );
        let mut a = p.clone();
        a.status = TraceStatus::MaxReflections;
        let al = compare(&p, &a, 2.0);
        assert!(!al.is_fully_aligned);
        // Geometry matched all the way; only the terminal status differs.
        assert_eq!(al.aligned_segment_count, 1);
    }
}
