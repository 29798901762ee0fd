//! Chains: vertex lists with per-edge reflectivity.
//!
//! A closed chain wraps its last→first edge, which makes every vertex a
//! junction; an open chain leaves its two end vertices on a single edge.

use crate::error::QueryError;
use crate::geom::{Segment, Vec2};

use super::surface::{Reflectivity, Surface, SurfaceId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Chain identifier (index into the scene's chain list).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainId(pub u32);

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Raw chain description as supplied by the host.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChainSpec {
    pub verts: Vec<Vec2>,
    /// One flag per edge: `verts.len() − 1` open, `verts.len()` closed.
    pub reflect: Vec<Reflectivity>,
    pub closed: bool,
}

impl ChainSpec {
    /// Open two-vertex chain: a single free-standing surface.
    pub fn single(a: Vec2, b: Vec2, reflectivity: Reflectivity) -> Self {
        Self {
            verts: vec![a, b],
            reflect: vec![reflectivity],
            closed: false,
        }
    }
}

/// Validated chain with its derived surfaces.
#[derive(Clone, Debug)]
pub struct Chain {
    pub id: ChainId,
    verts: Vec<Vec2>,
    closed: bool,
    surfaces: Vec<Surface>,
}

impl Chain {
    /// Validate and build. Rejects short chains, mismatched flag lists and
    /// zero-length edges.
    pub fn build(id: ChainId, spec: ChainSpec) -> Result<Self, QueryError> {
        let n = spec.verts.len();
        if n < 2 {
            return Err(QueryError::InvalidChain {
                chain: id.0,
                reason: format!("needs at least 2 vertices, got {n}"),
            });
        }
        if spec.closed && n < 3 {
            return Err(QueryError::InvalidChain {
                chain: id.0,
                reason: format!("closed chain needs at least 3 vertices, got {n}"),
            });
        }
        let edge_count = if spec.closed { n } else { n - 1 };
        if spec.reflect.len() != edge_count {
            return Err(QueryError::InvalidChain {
                chain: id.0,
                reason: format!(
                    "expected {edge_count} reflectivity flags, got {}",
                    spec.reflect.len()
                ),
            });
        }
        let mut surfaces = Vec::with_capacity(edge_count);
        for e in 0..edge_count {
            let a = spec.verts[e];
            let b = spec.verts[(e + 1) % n];
            if a == b {
                return Err(QueryError::InvalidChain {
                    chain: id.0,
                    reason: format!("edge {e} has zero length"),
                });
            }
            surfaces.push(Surface {
                id: SurfaceId {
                    chain: id.0,
                    edge: e as u32,
                },
                seg: Segment::new(a, b),
                reflectivity: spec.reflect[e],
            });
        }
        Ok(Self {
            id,
            verts: spec.verts,
            closed: spec.closed,
            surfaces,
        })
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.verts.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> Vec2 {
        self.verts[i]
    }

    #[inline]
    pub fn surface(&self, edge: usize) -> &Surface {
        &self.surfaces[edge]
    }

    #[inline]
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Edge indices incident to vertex `i` as `(ending_here, starting_here)`.
    ///
    /// Open-chain ends have exactly one incident edge; every other vertex
    /// (and every vertex of a closed chain) has two.
    pub fn edges_at_vertex(&self, i: usize) -> (Option<usize>, Option<usize>) {
        let n = self.verts.len();
        let ending = if i > 0 {
            Some(i - 1)
        } else if self.closed {
            Some(self.edge_count() - 1)
        } else {
            None
        };
        let starting = if i < n - 1 || self.closed {
            // Last vertex of a closed chain starts the wrapping edge only
            // when that edge exists (i < edge_count).
            if i < self.edge_count() {
                Some(i)
            } else {
                None
            }
        } else {
            None
        };
        (ending, starting)
    }

    /// Whether vertex `i` is shared between two edges.
    #[inline]
    pub fn is_junction(&self, i: usize) -> bool {
        let (a, b) = self.edges_at_vertex(i);
        a.is_some() && b.is_some()
    }

    /// The vertex index on the given end of an edge.
    #[inline]
    pub fn vertex_of_edge(&self, edge: usize, end: super::SegEnd) -> usize {
        match end {
            super::SegEnd::Start => edge,
            super::SegEnd::End => (edge + 1) % self.verts.len(),
        }
    }

    /// The neighboring junction vertex of `edge` on side `end`, if shared.
    pub fn junction_beside(&self, edge: usize, end: super::SegEnd) -> Option<usize> {
        let v = self.vertex_of_edge(edge, end);
        if self.is_junction(v) {
            Some(v)
        } else {
            None
        }
    }
}
