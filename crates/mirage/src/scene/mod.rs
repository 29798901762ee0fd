//! Scene model: surfaces, chains, screen bounds.
//!
//! Purpose
//! - Chains are the primary container (junction vertices are first-class);
//!   surfaces are derived per edge at build time and never mutated.
//! - Validation happens once in `Scene::build`; everything downstream
//!   borrows immutable references.
//!
//! Code cross-refs: `Surface`, `Chain`, `Scene`, `source::SourcePoint`

mod chain;
mod surface;
mod world;

pub use chain::{Chain, ChainId, ChainSpec};
pub use surface::{ArrowHit, Reflectivity, SegEnd, Surface, SurfaceId};
pub use world::{Scene, ScreenBounds};

#[cfg(test)]
mod tests;
