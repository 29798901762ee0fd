//! Deterministic scene and query sampling for tests and benches.
//!
//! Model
//! - A replay token `(seed, index)` is mixed SplitMix64-style into one RNG,
//!   so every draw is reproducible and indexable.
//! - Scenes are the standard room plus a configurable scatter of short
//!   free-standing surfaces; players and cursors land anywhere inside the
//!   room, including awkward near-collinear spots.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::Vec2;
use crate::scene::{ChainSpec, Reflectivity};

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Scatter configuration.
#[derive(Clone, Copy, Debug)]
pub struct ScatterCfg {
    /// Free-standing surfaces to scatter.
    pub surfaces: usize,
    /// Fraction of scattered surfaces that are mirrors.
    pub mirror_ratio: f64,
    /// Surface length bounds.
    pub min_len: f64,
    pub max_len: f64,
}

impl Default for ScatterCfg {
    fn default() -> Self {
        Self {
            surfaces: 6,
            mirror_ratio: 0.5,
            min_len: 60.0,
            max_len: 240.0,
        }
    }
}

/// The standard enclosing room: ceiling and left wall reflective.
pub fn standard_room() -> ChainSpec {
    ChainSpec {
        verts: vec![
            Vec2::new(20.0, 80.0),
            Vec2::new(1260.0, 80.0),
            Vec2::new(1260.0, 700.0),
            Vec2::new(20.0, 700.0),
        ],
        reflect: vec![
            Reflectivity::Wall,
            Reflectivity::Wall,
            Reflectivity::Mirror,
            Reflectivity::Mirror,
        ],
        closed: true,
    }
}

/// Draw a room-plus-scatter scene.
pub fn draw_scene(cfg: ScatterCfg, tok: ReplayToken) -> Vec<ChainSpec> {
    let mut rng = tok.to_std_rng();
    let mut specs = vec![standard_room()];
    for _ in 0..cfg.surfaces {
        let a = Vec2::new(rng.gen_range(60.0..1220.0), rng.gen_range(120.0..660.0));
        let len = rng.gen_range(cfg.min_len..cfg.max_len);
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let b = a + Vec2::new(angle.cos(), angle.sin()) * len;
        let b = Vec2::new(b.x.clamp(40.0, 1240.0), b.y.clamp(100.0, 680.0));
        if (b - a).norm() < 1.0 {
            continue;
        }
        let reflectivity = if rng.gen_bool(cfg.mirror_ratio.clamp(0.0, 1.0)) {
            Reflectivity::Mirror
        } else {
            Reflectivity::Wall
        };
        specs.push(ChainSpec::single(a, b, reflectivity));
    }
    specs
}

/// Draw a player/cursor pair inside the room.
pub fn draw_query_points(tok: ReplayToken) -> (Vec2, Vec2) {
    let mut rng = tok.to_std_rng();
    let player = Vec2::new(rng.gen_range(30.0..1250.0), rng.gen_range(90.0..690.0));
    let cursor = Vec2::new(rng.gen_range(30.0..1250.0), rng.gen_range(90.0..690.0));
    (player, cursor)
}
