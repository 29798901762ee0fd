//! Plan reduction: which planned surfaces actually participate.
//!
//! Rules run in order; every ambiguity (a point exactly on a supporting
//! line, a reflected ray exactly parallel to the next surface) resolves
//! toward bypassing. Obstruction by non-planned surfaces never bypasses
//! anything; that shows up later as path divergence.

use crate::cfg::Tolerances;
use crate::geom::Vec2;
use crate::image::ImageChain;
use crate::scene::Surface;

/// Why a planned surface was dropped from the active plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BypassReason {
    /// The player is on (or behind) the surface's non-reflective side.
    PlayerSide,
    /// The cursor is on (or behind) the non-reflective side of the last
    /// active surface.
    CursorSide,
    /// The previous reflection point lies on the non-reflective side.
    ChainSide,
    /// The reflected ray cannot reach the surface's half plane with
    /// forward travel (including the exactly-parallel case).
    DirectionAway,
}

/// Evaluation result: the surviving ordered plan plus the dropped tail.
#[derive(Clone, Debug)]
pub struct BypassReport<'a> {
    pub active: Vec<&'a Surface>,
    pub bypassed: Vec<(&'a Surface, BypassReason)>,
}

impl<'a> BypassReport<'a> {
    pub fn is_unchanged(&self) -> bool {
        self.bypassed.is_empty()
    }
}

/// Apply the bypass rules to an ordered plan.
pub fn evaluate<'a>(
    player: Vec2,
    cursor: Vec2,
    planned: &[&'a Surface],
    tol: &Tolerances,
) -> BypassReport<'a> {
    let mut active: Vec<&'a Surface> = planned.to_vec();
    let mut bypassed: Vec<(&'a Surface, BypassReason)> = Vec::new();

    // Rule 1: the player must face the first surface.
    while let Some(first) = active.first() {
        if first.is_on_reflective_side(player) {
            break;
        }
        bypassed.push((active.remove(0), BypassReason::PlayerSide));
    }

    // Rule 2: the cursor must face the last surface.
    while let Some(last) = active.last() {
        if last.is_on_reflective_side(cursor) {
            break;
        }
        let s = active.pop().expect("last exists");
        bypassed.push((s, BypassReason::CursorSide));
    }

    // Rules 3 and 4: consecutive surfaces must be chainable; restart after
    // every removal because the image chain changes shape.
    'restart: loop {
        let chain = ImageChain::build(player, cursor, &active, tol);
        for i in 0..active.len() {
            let Some(r_i) = chain.reflection_point(i) else {
                // The image segment runs parallel to Sᵢ itself; the surface
                // cannot host a reflection at all.
                let s = active.remove(i);
                bypassed.push((s, BypassReason::DirectionAway));
                continue 'restart;
            };
            if i + 1 >= active.len() {
                continue;
            }
            let next = active[i + 1];
            if !next.is_on_reflective_side(r_i) {
                let s = active.remove(i + 1);
                bypassed.push((s, BypassReason::ChainSide));
                continue 'restart;
            }
            // Rule 4: the physically reflected ray must move toward the
            // next supporting line.
            let prev = if i == 0 {
                player
            } else {
                chain.reflection_point(i - 1).unwrap_or(player)
            };
            let incident = r_i - prev;
            if incident.norm_squared() == 0.0 {
                continue;
            }
            let outgoing = active[i].reflect_dir(incident);
            match next.line_hit(r_i, outgoing, tol.eps_parallel) {
                Some(t) if t > 0.0 => {}
                _ => {
                    let s = active.remove(i + 1);
                    bypassed.push((s, BypassReason::DirectionAway));
                    continue 'restart;
                }
            }
        }
        break;
    }

    BypassReport { active, bypassed }
}

#[cfg(test)]
mod tests;
