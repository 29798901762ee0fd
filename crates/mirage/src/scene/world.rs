//! The scene: validated chains plus the screen boundary.

use crate::error::QueryError;
use crate::geom::Vec2;

use super::chain::{Chain, ChainId, ChainSpec};
use super::surface::{Reflectivity, Surface, SurfaceId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned screen rectangle.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScreenBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl ScreenBounds {
    /// The implicit closed wall chain that seals the scene.
    pub fn to_chain_spec(&self) -> ChainSpec {
        ChainSpec {
            verts: vec![
                Vec2::new(self.min_x, self.min_y),
                Vec2::new(self.max_x, self.min_y),
                Vec2::new(self.max_x, self.max_y),
                Vec2::new(self.min_x, self.max_y),
            ],
            reflect: vec![Reflectivity::Wall; 4],
            closed: true,
        }
    }
}

/// Immutable, validated scene. Built once per query context; borrowed
/// read-only by everything downstream.
#[derive(Clone, Debug)]
pub struct Scene {
    chains: Vec<Chain>,
}

impl Scene {
    /// Validate chain specs; when `bounds` is given, append the screen
    /// boundary as a final closed wall chain.
    pub fn build(specs: Vec<ChainSpec>, bounds: Option<ScreenBounds>) -> Result<Self, QueryError> {
        let mut chains = Vec::with_capacity(specs.len() + 1);
        for (i, spec) in specs.into_iter().enumerate() {
            chains.push(Chain::build(ChainId(i as u32), spec)?);
        }
        if let Some(b) = bounds {
            let id = ChainId(chains.len() as u32);
            chains.push(Chain::build(id, b.to_chain_spec())?);
        }
        Ok(Self { chains })
    }

    #[inline]
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    #[inline]
    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id.0 as usize)
    }

    /// Resolve a surface id.
    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.chains
            .get(id.chain as usize)
            .and_then(|c| c.surfaces().get(id.edge as usize))
    }

    /// All surfaces of all chains, in chain/edge order.
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.chains.iter().flat_map(|c| c.surfaces().iter())
    }
}
