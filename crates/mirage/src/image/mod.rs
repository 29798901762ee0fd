//! Image chain: successive mirror images of player and cursor.
//!
//! Purpose
//! - For an ordered plan [S₀…Sₙ₋₁], cache the player reflected forward
//!   through S₀…Sᵢ₋₁ and the cursor reflected backward through Sₙ₋₁…Sᵢ, and
//!   derive each reflection point Rᵢ as the crossing of the straight
//!   segment between the two depth-i images with Sᵢ's supporting line. For
//!   n = 1 this is the classical aim-at-the-mirror-image rule.
//!
//! The chain is the only memoization in a query and dies with it.

use crate::cfg::Tolerances;
use crate::geom::{on_segment, ray_line_intersect, reflect_direction, Vec2};
use crate::scene::Surface;

/// Query-local reflection cache for one ordered plan.
#[derive(Clone, Debug)]
pub struct ImageChain<'a> {
    surfaces: Vec<&'a Surface>,
    player_images: Vec<Vec2>,
    cursor_images: Vec<Vec2>,
    /// Rᵢ on the supporting line; `None` when the image segment runs
    /// parallel to it (the bypass rules remove such surfaces).
    reflections: Vec<Option<Vec2>>,
    on_segment: Vec<bool>,
    player: Vec2,
    cursor: Vec2,
}

impl<'a> ImageChain<'a> {
    pub fn build(
        player: Vec2,
        cursor: Vec2,
        surfaces: &[&'a Surface],
        tol: &Tolerances,
    ) -> Self {
        let n = surfaces.len();
        let mut player_images = Vec::with_capacity(n + 1);
        player_images.push(player);
        for i in 0..n {
            let prev = player_images[i];
            player_images.push(surfaces[i].reflect_point(prev));
        }
        let mut cursor_images = vec![cursor; n + 1];
        for i in (0..n).rev() {
            cursor_images[i] = surfaces[i].reflect_point(cursor_images[i + 1]);
        }
        let mut reflections = Vec::with_capacity(n);
        let mut on_segment_flags = Vec::with_capacity(n);
        for i in 0..n {
            let from = player_images[i];
            let to = cursor_images[i];
            let dir = to - from;
            let r = ray_line_intersect(from, dir, &surfaces[i].seg.line(), tol.eps_parallel)
                .map(|t| from + dir * t);
            // Boundary classification carries the documented slack: a
            // rounding error past an endpoint must not invalidate the plan.
            let on = r
                .map(|p| on_segment(p, &surfaces[i].seg, tol.eps_on_segment))
                .unwrap_or(false);
            reflections.push(r);
            on_segment_flags.push(on);
        }
        Self {
            surfaces: surfaces.to_vec(),
            player_images,
            cursor_images,
            reflections,
            on_segment: on_segment_flags,
            player,
            cursor,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    #[inline]
    pub fn surface(&self, i: usize) -> &'a Surface {
        self.surfaces[i]
    }

    /// Player reflected through S₀…Sᵢ₋₁ (index 0 = the player).
    #[inline]
    pub fn player_image(&self, i: usize) -> Vec2 {
        self.player_images[i]
    }

    /// Cursor reflected through Sₙ₋₁…Sᵢ (index n = the cursor).
    #[inline]
    pub fn cursor_image(&self, i: usize) -> Vec2 {
        self.cursor_images[i]
    }

    #[inline]
    pub fn reflection_point(&self, i: usize) -> Option<Vec2> {
        self.reflections[i]
    }

    #[inline]
    pub fn is_reflection_on_segment(&self, i: usize) -> bool {
        self.on_segment[i]
    }

    /// All Rᵢ exist and sit within their segments.
    pub fn plan_valid(&self) -> bool {
        (0..self.len()).all(|i| self.reflections[i].is_some() && self.on_segment[i])
    }

    /// Planned waypoints [P, R₀, …, Rₙ₋₁, C]; `None` when some Rᵢ does not
    /// exist (parallel image segment).
    pub fn waypoints(&self) -> Option<Vec<Vec2>> {
        let mut w = Vec::with_capacity(self.len() + 2);
        w.push(self.player);
        for r in &self.reflections {
            w.push((*r)?);
        }
        w.push(self.cursor);
        Some(w)
    }

    /// Check the reflection law at Rᵢ: the outgoing waypoint direction must
    /// match the mirrored incoming direction within `tol` (absolute, on
    /// unit vectors).
    pub fn satisfies_reflection_law(&self, i: usize, tol: f64) -> bool {
        let Some(w) = self.waypoints() else {
            return false;
        };
        let incoming = w[i + 1] - w[i];
        let outgoing = w[i + 2] - w[i + 1];
        if incoming.norm() == 0.0 || outgoing.norm() == 0.0 {
            return false;
        }
        let bounced = reflect_direction(incoming, self.surfaces[i].normal());
        (bounced / bounced.norm() - outgoing / outgoing.norm()).norm() <= tol
    }
}

#[cfg(test)]
mod tests;
