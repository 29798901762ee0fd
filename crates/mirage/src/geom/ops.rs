//! Pure geometric operations.
//!
//! No operation here owns a tolerance; callers pass the slack they mean.
//! Collinear ray/segment pairs yield `None` from the intersectors — the
//! caller resolves those by provenance, never by an epsilon pick.

use super::types::{Line, Segment, Vec2};

/// 2D cross product of free vectors.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Alias used where both arguments are directions (reads better at call sites).
#[inline]
pub fn dir_cross(a: Vec2, b: Vec2) -> f64 {
    cross(a, b)
}

/// Signed cross of `(a − o) × (b − o)`.
#[inline]
pub fn signed_cross(o: Vec2, a: Vec2, b: Vec2) -> f64 {
    cross(a - o, b - o)
}

/// +90° rotation.
#[inline]
pub fn rot90(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Mirror `p` through `line`.
pub fn reflect_point(p: Vec2, line: &Line) -> Vec2 {
    let d2 = line.d.norm_squared();
    let w = p - line.p;
    let proj = line.d * (w.dot(&line.d) / d2);
    line.p + proj * 2.0 - w
}

/// Mirror a direction about a unit normal: `v − 2(v·n)n`.
#[inline]
pub fn reflect_direction(v: Vec2, n_unit: Vec2) -> Vec2 {
    v - n_unit * (2.0 * v.dot(&n_unit))
}

/// Signed perpendicular distance of `p` from the supporting line of `seg`
/// (positive on the reflective side).
#[inline]
pub fn perp_distance(seg: &Segment, p: Vec2) -> f64 {
    cross(seg.dir(), p - seg.a) / seg.len()
}

/// Intersect the ray `origin + t·dir` (t > 0) with `seg`.
///
/// Returns `(t, s)` with `s ∈ [0, 1]` on the segment, or `None` when the
/// ray is parallel (or collinear) to the segment within `eps_parallel`.
pub fn ray_segment_intersect(
    origin: Vec2,
    dir: Vec2,
    seg: &Segment,
    eps_parallel: f64,
) -> Option<(f64, f64)> {
    let e = seg.dir();
    let denom = cross(dir, e);
    if denom.abs() <= eps_parallel * dir.norm() * e.norm() {
        return None;
    }
    let w = seg.a - origin;
    let t = cross(w, e) / denom;
    let s = cross(w, dir) / denom;
    if t > 0.0 && (0.0..=1.0).contains(&s) {
        Some((t, s))
    } else {
        None
    }
}

/// Intersect the ray `origin + t·dir` with an infinite line.
///
/// Returns `t` (any sign), or `None` when parallel.
pub fn ray_line_intersect(origin: Vec2, dir: Vec2, line: &Line, eps_parallel: f64) -> Option<f64> {
    let denom = cross(dir, line.d);
    if denom.abs() <= eps_parallel * dir.norm() * line.d.norm() {
        return None;
    }
    Some(cross(line.p - origin, line.d) / denom)
}

/// Classify a point as on-segment when no provenance is available:
/// collinear within `|cross| < eps · len²`, with the matching relative
/// slack at the segment ends.
pub fn on_segment(p: Vec2, seg: &Segment, eps: f64) -> bool {
    let d = seg.dir();
    let len2 = d.norm_squared();
    if cross(d, p - seg.a).abs() >= eps * len2 {
        return false;
    }
    let s = (p - seg.a).dot(&d) / len2;
    (-eps..=1.0 + eps).contains(&s)
}

/// Shoelace signed area of a polygon (positive when CCW).
pub fn polygon_signed_area(pts: &[Vec2]) -> f64 {
    let mut a = 0.0;
    for i in 0..pts.len() {
        let p = pts[i];
        let q = pts[(i + 1) % pts.len()];
        a += p.x * q.y - q.x * p.y;
    }
    a / 2.0
}

/// Orientation check for delivered polygons.
#[inline]
pub fn polygon_is_ccw(pts: &[Vec2]) -> bool {
    polygon_signed_area(pts) > 0.0
}

/// Parameters `s` on `seg` where it meets the circle `|x − center| = radius`.
///
/// Roots are returned ascending and unclamped; the caller intersects with
/// `[0, 1]`. `None` when the supporting line misses the circle.
pub fn circle_segment_roots(center: Vec2, radius: f64, seg: &Segment) -> Option<(f64, f64)> {
    let d = seg.dir();
    let f = seg.a - center;
    let a = d.norm_squared();
    let b = 2.0 * f.dot(&d);
    let c = f.norm_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || a == 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let s0 = (-b - sq) / (2.0 * a);
    let s1 = (-b + sq) / (2.0 * a);
    Some((s0, s1))
}
