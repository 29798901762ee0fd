//! Source points: polygon vertices that remember where they came from.
//!
//! Purpose
//! - Every vertex of a visibility polygon carries a *provenance key*
//!   computed purely from its construction history. Keys are the primary
//!   equality and ordering token; coordinates are derived on demand and are
//!   presentation-only.
//!
//! Why
//! - The projection meets many near-collinear rays and near-coincident
//!   vertices (wall/ceiling junctions, window boundaries). Coordinate
//!   equality is fragile under pixel-scale input motion; structural
//!   provenance equality is exact.
//!
//! Code cross-refs: `Key`, `SourcePoint`, `cone::order::PrecomputedPairs`

use crate::geom::Vec2;
use crate::scene::{Chain, Scene, SegEnd, Surface, SurfaceId};

/// Cone identifier, assigned per projection in cascade order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConeId(pub u32);

/// Range-limit circle identifier (one per query today; kept explicit so a
/// key never collides across future multi-circle queries).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircleId(pub u32);

/// Window boundary side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

/// Which root of a line/circle intersection, along the segment direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArcRoot {
    Near,
    Far,
}

/// Identity of the ray that ended on the range-limit arc: either the vertex
/// it passed through, or a synthetic anchor for candidate-free full cones.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArcRay {
    Source(Box<Key>),
    Anchor(u8),
}

/// Structural provenance key. Equality and hashing are exact and never
/// consult coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A surface's own endpoint.
    Endpoint { surface: SurfaceId, end: SegEnd },
    /// A vertex shared between two edges of a chain.
    Junction { chain: u32, vertex: u32 },
    /// A continuation ray (cast through `ray`) stopped by `surface`.
    Hit { ray: Box<Key>, surface: SurfaceId },
    /// A window-boundary endpoint of a windowed cone.
    Origin { cone: ConeId, side: Side },
    /// A surface crossing the range-limit circle.
    ArcCross {
        surface: SurfaceId,
        circle: CircleId,
        root: ArcRoot,
    },
    /// A boundary ray terminating on the range-limit arc.
    ArcHit { ray: ArcRay, circle: CircleId },
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Endpoint { surface, end } => {
                let e = match end {
                    SegEnd::Start => 's',
                    SegEnd::End => 'e',
                };
                write!(f, "ep:{surface}:{e}")
            }
            Key::Junction { chain, vertex } => write!(f, "junc:c{chain}:{vertex}"),
            Key::Hit { ray, surface } => write!(f, "hit:{ray}->{surface}"),
            Key::Origin { cone, side } => {
                let s = match side {
                    Side::Left => 'l',
                    Side::Right => 'r',
                };
                write!(f, "org:k{}:{s}", cone.0)
            }
            Key::ArcCross {
                surface,
                circle,
                root,
            } => {
                let r = match root {
                    ArcRoot::Near => "near",
                    ArcRoot::Far => "far",
                };
                write!(f, "arc:{surface}:r{}:{r}", circle.0)
            }
            Key::ArcHit { ray, circle } => match ray {
                ArcRay::Source(k) => write!(f, "arch:{k}:r{}", circle.0),
                ArcRay::Anchor(i) => write!(f, "arch:a{i}:r{}", circle.0),
            },
        }
    }
}

/// Does a (non-Origin) key denote a point lying on `sid`?
///
/// Origin keys are identity-only; their surface membership is resolved via
/// the point's `derived_from` root key, which is never itself an Origin.
pub fn key_on_surface(key: &Key, sid: SurfaceId, scene: &Scene) -> bool {
    match key {
        Key::Endpoint { surface, .. } => *surface == sid,
        Key::Junction { chain, vertex } => scene
            .chain(crate::scene::ChainId(*chain))
            .map(|c| {
                let (a, b) = c.edges_at_vertex(*vertex as usize);
                a.map(|e| c.surface(e).id == sid).unwrap_or(false)
                    || b.map(|e| c.surface(e).id == sid).unwrap_or(false)
            })
            .unwrap_or(false),
        Key::Hit { surface, .. } => *surface == sid,
        Key::ArcCross { surface, .. } => *surface == sid,
        Key::Origin { .. } | Key::ArcHit { .. } => false,
    }
}

/// A polygon vertex with provenance. Borrows the query-local scene; lives
/// only inside a single query.
#[derive(Clone, Debug)]
pub enum SourcePoint<'a> {
    Endpoint {
        surface: &'a Surface,
        end: SegEnd,
    },
    Junction {
        chain: &'a Chain,
        vertex: u32,
    },
    Hit {
        ray: Key,
        surface: &'a Surface,
        /// Parameter on the hit surface, in (0, 1).
        s: f64,
    },
    Origin {
        cone: ConeId,
        side: Side,
        at: Vec2,
        /// Root provenance of the window endpoint (never an Origin; the
        /// cascade flattens origin-of-origin to the original root).
        derived_from: Key,
    },
    ArcCross {
        surface: &'a Surface,
        circle: CircleId,
        root: ArcRoot,
        /// Parameter on the surface where it meets the circle.
        s: f64,
    },
    ArcHit {
        ray: ArcRay,
        circle: CircleId,
        at: Vec2,
    },
}

impl<'a> SourcePoint<'a> {
    /// Provenance key: the identity of this point.
    pub fn key(&self) -> Key {
        match self {
            SourcePoint::Endpoint { surface, end } => Key::Endpoint {
                surface: surface.id,
                end: *end,
            },
            SourcePoint::Junction { chain, vertex } => Key::Junction {
                chain: chain.id.0,
                vertex: *vertex,
            },
            SourcePoint::Hit { ray, surface, .. } => Key::Hit {
                ray: Box::new(ray.clone()),
                surface: surface.id,
            },
            SourcePoint::Origin { cone, side, .. } => Key::Origin {
                cone: *cone,
                side: *side,
            },
            SourcePoint::ArcCross {
                surface,
                circle,
                root,
                ..
            } => Key::ArcCross {
                surface: surface.id,
                circle: *circle,
                root: *root,
            },
            SourcePoint::ArcHit { ray, circle, .. } => Key::ArcHit {
                ray: ray.clone(),
                circle: *circle,
            },
        }
    }

    /// Coordinates, derived from the provenance inputs.
    pub fn xy(&self) -> Vec2 {
        match self {
            SourcePoint::Endpoint { surface, end } => surface.endpoint(*end),
            SourcePoint::Junction { chain, vertex } => chain.vertex(*vertex as usize),
            SourcePoint::Hit { surface, s, .. } => surface.seg.point_at(*s),
            SourcePoint::Origin { at, .. } => *at,
            SourcePoint::ArcCross { surface, s, .. } => surface.seg.point_at(*s),
            SourcePoint::ArcHit { at, .. } => *at,
        }
    }

    /// Whether this vertex lies on `sid` (window-run extraction predicate).
    /// Origin points resolve through their root provenance, which makes a
    /// window boundary sitting on a junction count for both edges.
    pub fn lies_on(&self, sid: SurfaceId, scene: &Scene) -> bool {
        match self {
            SourcePoint::Origin { derived_from, .. } => key_on_surface(derived_from, sid, scene),
            other => key_on_surface(&other.key(), sid, scene),
        }
    }

    /// Root provenance for window tagging: Origin points expose the key
    /// their boundary was derived from, everything else its own key.
    pub fn root_key(&self) -> Key {
        match self {
            SourcePoint::Origin { derived_from, .. } => derived_from.clone(),
            other => other.key(),
        }
    }

    /// Debug tag delivered next to presentation coordinates.
    pub fn debug_tag(&self) -> String {
        self.key().to_string()
    }
}
