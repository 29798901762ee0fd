use super::*;
use crate::cfg::Tolerances;
use crate::geom::{Segment, Vec2};
use crate::scene::{Reflectivity, Surface, SurfaceId};

fn mirror(chain: u32, a: Vec2, b: Vec2) -> Surface {
    Surface {
        id: SurfaceId { chain, edge: 0 },
        seg: Segment::new(a, b),
        reflectivity: Reflectivity::Mirror,
    }
}

#[test]
fn clean_plan_survives() {
    // Downward-facing mirror above both player and cursor.
    let m = mirror(1, Vec2::new(740.0, 300.0), Vec2::new(540.0, 300.0));
    let plan = [&m];
    let report = evaluate(
        Vec2::new(345.0, 215.0),
        Vec2::new(581.0, 129.0),
        &plan,
        &Tolerances::default(),
    );
    assert!(report.is_unchanged());
    assert_eq!(report.active.len(), 1);
}

#[test]
fn player_behind_first_surface_bypasses_it() {
    // Mirror reflective side is +y; player below it.
    let m = mirror(1, Vec2::new(540.0, 300.0), Vec2::new(740.0, 300.0));
    let plan = [&m];
    let report = evaluate(
        Vec2::new(600.0, 100.0),
        Vec2::new(600.0, 400.0),
        &plan,
        &Tolerances::default(),
    );
    assert!(report.active.is_empty());
    assert_eq!(report.bypassed, vec![(&m, BypassReason::PlayerSide)]);
}

#[test]
fn player_exactly_on_the_line_bypasses() {
    let m = mirror(1, Vec2::new(540.0, 300.0), Vec2::new(740.0, 300.0));
    let plan = [&m];
    let report = evaluate(
        Vec2::new(600.0, 300.0),
        Vec2::new(600.0, 400.0),
        &plan,
        &Tolerances::default(),
    );
    assert_eq!(report.bypassed, vec![(&m, BypassReason::PlayerSide)]);
}

#[test]
fn cursor_behind_last_surface_bypasses_from_the_tail() {
    let m0 = mirror(1, Vec2::new(540.0, 300.0), Vec2::new(740.0, 300.0));
    // Second mirror faces left: the +x side is non-reflective.
    let m1 = mirror(2, Vec2::new(900.0, 200.0), Vec2::new(900.0, 500.0));
    let plan = [&m0, &m1];
    // Cursor on the non-reflective side of m1.
    let report = evaluate(
        Vec2::new(345.0, 515.0),
        Vec2::new(1100.0, 400.0),
        &plan,
        &Tolerances::default(),
    );
    assert_eq!(report.active.len(), 1);
    assert_eq!(report.active[0].id, m0.id);
    assert_eq!(report.bypassed, vec![(&m1, BypassReason::CursorSide)]);
}

#[test]
fn reflection_point_behind_next_surface_bypasses_it() {
    // Plan [ceiling-like m0, m1]; R0 comes out on m1's non-reflective side.
    let m0 = mirror(1, Vec2::new(740.0, 300.0), Vec2::new(540.0, 300.0));
    // m1 faces right: reflective side +x… built with −y direction.
    let m1 = mirror(2, Vec2::new(400.0, 280.0), Vec2::new(400.0, 80.0));
    let plan = [&m0, &m1];
    // Player and cursor both right of m1 and below m0, so rules 1 and 2
    // pass; R0 sits near x≈500, on m1's reflective side only if +x is
    // reflective. Direction of m1 makes +x the reflective side, so use a
    // mirrored m1 to force the bypass.
    let m1_flipped = mirror(2, Vec2::new(400.0, 80.0), Vec2::new(400.0, 280.0));
    let plan_flipped = [&m0, &m1_flipped];
    let player = Vec2::new(450.0, 215.0);
    let cursor = Vec2::new(300.0, 150.0);

    // Flipped m1: cursor (x=300) is on its reflective side (−x), but R0
    // (x≈380..560 region, x>400) is not.
    let report = evaluate(player, cursor, &plan_flipped, &Tolerances::default());
    assert_eq!(
        report.bypassed,
        vec![(&m1_flipped, BypassReason::ChainSide)]
    );
    assert_eq!(report.active.len(), 1);

    // Original m1: the cursor sits behind it instead.
    let report = evaluate(player, cursor, &plan, &Tolerances::default());
    assert_eq!(report.bypassed, vec![(&m1, BypassReason::CursorSide)]);
}

#[test]
fn parallel_reflected_ray_bypasses_next() {
    // Three-surface plan where the ray reflected at R₀ runs exactly
    // parallel to the middle surface's supporting line: the player sits
    // directly under the unfolded cursor image, so the bounce off the
    // ceiling mirror goes straight down, parallel to the vertical mirror.
    let s0 = mirror(1, Vec2::new(700.0, 300.0), Vec2::new(200.0, 300.0));
    let s1 = mirror(2, Vec2::new(600.0, 100.0), Vec2::new(600.0, 280.0));
    let s2 = mirror(3, Vec2::new(500.0, 100.0), Vec2::new(800.0, 100.0));
    let plan = [&s0, &s1, &s2];
    let player = Vec2::new(300.0, 200.0);
    let cursor = Vec2::new(900.0, 150.0);

    let report = evaluate(player, cursor, &plan, &Tolerances::default());
    assert_eq!(report.bypassed, vec![(&s1, BypassReason::DirectionAway)]);
    assert_eq!(report.active.len(), 2);
    assert_eq!(report.active[0].id, s0.id);
    assert_eq!(report.active[1].id, s2.id);
}

#[test]
fn empty_plan_is_trivially_unchanged() {
    let report = evaluate(
        Vec2::new(100.0, 300.0),
        Vec2::new(500.0, 300.0),
        &[],
        &Tolerances::default(),
    );
    assert!(report.is_unchanged());
    assert!(report.active.is_empty());
}
