//! Surfaces: oriented segments with a reflectivity flag.

use crate::geom::{cross, ray_line_intersect, reflect_direction, reflect_point, Segment, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which end of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegEnd {
    Start,
    End,
}

/// Mirror or wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Reflectivity {
    Mirror,
    Wall,
}

/// Surface identifier: chain + edge index. Compact, hashable, exact.
/// Rendered as `c<chain>e<edge>` at the debug boundary only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceId {
    pub chain: u32,
    pub edge: u32,
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}e{}", self.chain, self.edge)
    }
}

/// Outcome of an arrow striking a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArrowHit {
    /// Mirror struck on its reflective side: the new direction.
    Reflect(Vec2),
    /// Wall, or mirror struck from behind.
    Absorb,
}

/// Immutable surface: id, segment, reflectivity.
///
/// The reflective side is the +90° rotation of `end − start` (see
/// `geom::Segment`); all side predicates are signed crosses against that
/// convention.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub id: SurfaceId,
    pub seg: Segment,
    pub reflectivity: Reflectivity,
}

impl Surface {
    #[inline]
    pub fn is_mirror(&self) -> bool {
        self.reflectivity == Reflectivity::Mirror
    }

    /// Only mirrors may appear in a plan.
    #[inline]
    pub fn is_plannable(&self) -> bool {
        self.is_mirror()
    }

    /// Unit normal on the reflective side.
    #[inline]
    pub fn normal(&self) -> Vec2 {
        self.seg.unit_normal()
    }

    /// Signed side value: positive on the reflective side, zero on the
    /// supporting line. Scaled by segment length; callers compare signs.
    #[inline]
    pub fn side_of(&self, p: Vec2) -> f64 {
        cross(self.seg.dir(), p - self.seg.a)
    }

    /// Strictly on the reflective side. Points on the supporting line are
    /// not; ambiguity resolves toward bypass.
    #[inline]
    pub fn is_on_reflective_side(&self, p: Vec2) -> bool {
        self.side_of(p) > 0.0
    }

    /// A mirror reflects an incident direction only when the ray arrives
    /// against the normal (from the reflective side).
    #[inline]
    pub fn can_reflect_from(&self, dir: Vec2) -> bool {
        self.is_mirror() && dir.dot(&self.normal()) < 0.0
    }

    /// Arrow-strike dispatch: reflect on the reflective face of a mirror,
    /// absorb everywhere else.
    pub fn on_arrow_hit(&self, dir: Vec2) -> ArrowHit {
        if self.can_reflect_from(dir) {
            ArrowHit::Reflect(reflect_direction(dir, self.normal()))
        } else {
            ArrowHit::Absorb
        }
    }

    /// Mirror a point through the supporting line.
    #[inline]
    pub fn reflect_point(&self, p: Vec2) -> Vec2 {
        reflect_point(p, &self.seg.line())
    }

    /// Mirror a direction about the surface normal.
    #[inline]
    pub fn reflect_dir(&self, v: Vec2) -> Vec2 {
        reflect_direction(v, self.normal())
    }

    /// Forward intersection of a ray with the supporting line.
    #[inline]
    pub fn line_hit(&self, origin: Vec2, dir: Vec2, eps_parallel: f64) -> Option<f64> {
        ray_line_intersect(origin, dir, &self.seg.line(), eps_parallel)
    }

    /// Endpoint by role.
    #[inline]
    pub fn endpoint(&self, end: SegEnd) -> Vec2 {
        match end {
            SegEnd::Start => self.seg.a,
            SegEnd::End => self.seg.b,
        }
    }
}
