//! CCW candidate ordering: recorded pairs first, cross products second,
//! distance third.
//!
//! Why
//! - A vertex and its continuation hit share a ray; the window's four
//!   boundary vertices share the two boundary rays; arc points can sit a
//!   rounding error apart in angle. For exactly these families the correct
//!   order is known at construction time, so it is recorded then and
//!   consulted before any floating-point comparison.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::geom::{dir_cross, Vec2};
use crate::source::Key;

/// Orders fixed at candidate-construction time, keyed by provenance pairs.
/// Entries override every numeric comparison.
#[derive(Debug, Default)]
pub struct PrecomputedPairs {
    map: HashMap<(Key, Key), Ordering>,
}

impl PrecomputedPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `first` precedes `second` in CCW order.
    pub fn record(&mut self, first: Key, second: Key) {
        self.map
            .insert((second.clone(), first.clone()), Ordering::Greater);
        self.map.insert((first, second), Ordering::Less);
    }

    /// Record a total order among a short sequence of keys.
    pub fn record_sequence(&mut self, keys: &[Key]) {
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                self.record(keys[i].clone(), keys[j].clone());
            }
        }
    }

    pub fn lookup(&self, a: &Key, b: &Key) -> Option<Ordering> {
        self.map.get(&(a.clone(), b.clone())).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// One sortable projection candidate: key + ray geometry from the origin.
#[derive(Clone, Debug)]
pub struct RayOrder {
    pub key: Key,
    pub dir: Vec2,
    pub dist2: f64,
}

/// CCW comparator around an origin with a reference boundary ray.
///
/// Directions split into two half-turns relative to `reference` so the
/// cross-product sign is decisive inside each; candidates on the reference
/// ray itself sort first.
pub struct CcwOrder<'p> {
    pub reference: Vec2,
    pub pairs: &'p PrecomputedPairs,
}

impl<'p> CcwOrder<'p> {
    #[inline]
    fn half(&self, d: Vec2) -> u8 {
        let c = dir_cross(self.reference, d);
        if c > 0.0 || (c == 0.0 && self.reference.dot(&d) > 0.0) {
            0
        } else {
            1
        }
    }

    /// Compare two candidates; `Err` carries the unordered coincident pair.
    pub fn compare(&self, a: &RayOrder, b: &RayOrder) -> Result<Ordering, (Key, Key)> {
        if a.key == b.key {
            return Ok(Ordering::Equal);
        }
        if let Some(o) = self.pairs.lookup(&a.key, &b.key) {
            return Ok(o);
        }
        let (ha, hb) = (self.half(a.dir), self.half(b.dir));
        if ha != hb {
            return Ok(ha.cmp(&hb));
        }
        let c = dir_cross(a.dir, b.dir);
        if c > 0.0 {
            return Ok(Ordering::Less);
        }
        if c < 0.0 {
            return Ok(Ordering::Greater);
        }
        // Same ray: the nearer candidate is the boundary vertex.
        if a.dist2 < b.dist2 {
            return Ok(Ordering::Less);
        }
        if a.dist2 > b.dist2 {
            return Ok(Ordering::Greater);
        }
        Err((a.key.clone(), b.key.clone()))
    }
}
