use super::*;
use crate::geom::Vec2;

fn room() -> ChainSpec {
    // Standard room: ceiling and left wall reflective, floor and right wall not.
    ChainSpec {
        verts: vec![
            Vec2::new(20.0, 80.0),
            Vec2::new(1260.0, 80.0),
            Vec2::new(1260.0, 700.0),
            Vec2::new(20.0, 700.0),
        ],
        reflect: vec![
            Reflectivity::Wall,   // floor
            Reflectivity::Wall,   // right wall
            Reflectivity::Mirror, // ceiling
            Reflectivity::Mirror, // left wall
        ],
        closed: true,
    }
}

#[test]
fn closed_chain_wraps_and_derives_surfaces() {
    let chain = Chain::build(ChainId(0), room()).unwrap();
    assert_eq!(chain.edge_count(), 4);
    assert_eq!(chain.vertex_count(), 4);
    let wrap = chain.surface(3);
    assert_eq!(wrap.seg.a, Vec2::new(20.0, 700.0));
    assert_eq!(wrap.seg.b, Vec2::new(20.0, 80.0));
    assert!(wrap.is_mirror());
    // Every vertex of a closed chain is a junction.
    for i in 0..4 {
        assert!(chain.is_junction(i));
    }
    assert_eq!(chain.edges_at_vertex(0), (Some(3), Some(0)));
    assert_eq!(chain.edges_at_vertex(3), (Some(2), Some(3)));
}

#[test]
fn open_chain_ends_are_not_junctions() {
    let spec = ChainSpec {
        verts: vec![
            Vec2::new(600.0, 100.0),
            Vec2::new(750.0, 250.0),
            Vec2::new(900.0, 100.0),
        ],
        reflect: vec![Reflectivity::Mirror, Reflectivity::Mirror],
        closed: false,
    };
    let chain = Chain::build(ChainId(2), spec).unwrap();
    assert_eq!(chain.edge_count(), 2);
    assert!(!chain.is_junction(0));
    assert!(chain.is_junction(1));
    assert!(!chain.is_junction(2));
    assert_eq!(chain.edges_at_vertex(0), (None, Some(0)));
    assert_eq!(chain.edges_at_vertex(1), (Some(0), Some(1)));
    assert_eq!(chain.edges_at_vertex(2), (Some(1), None));
    assert_eq!(chain.junction_beside(1, SegEnd::Start), Some(1));
    assert_eq!(chain.junction_beside(0, SegEnd::Start), None);
}

#[test]
fn chain_validation_rejects_bad_specs() {
    let err = Chain::build(
        ChainId(0),
        ChainSpec {
            verts: vec![Vec2::new(0.0, 0.0)],
            reflect: vec![],
            closed: false,
        },
    );
    assert!(err.is_err());

    let err = Chain::build(
        ChainId(0),
        ChainSpec {
            verts: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
            reflect: vec![Reflectivity::Wall, Reflectivity::Wall],
            closed: false,
        },
    );
    assert!(err.is_err(), "flag count mismatch must fail");

    let err = Chain::build(
        ChainId(0),
        ChainSpec {
            verts: vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.0)],
            reflect: vec![Reflectivity::Wall],
            closed: false,
        },
    );
    assert!(err.is_err(), "zero-length edge must fail");
}

#[test]
fn surface_sides_and_arrow_hits() {
    let chain = Chain::build(ChainId(0), room()).unwrap();
    let ceiling = chain.surface(2);
    // Ceiling runs right-to-left at y=700; reflective side is below.
    assert!(ceiling.is_on_reflective_side(Vec2::new(600.0, 300.0)));
    assert!(!ceiling.is_on_reflective_side(Vec2::new(600.0, 710.0)));
    // Upward arrow reflects off the ceiling.
    match ceiling.on_arrow_hit(Vec2::new(1.0, 1.0)) {
        ArrowHit::Reflect(d) => assert!((d - Vec2::new(1.0, -1.0)).norm() < 1e-12),
        ArrowHit::Absorb => panic!("ceiling must reflect an upward arrow"),
    }
    // From behind, a mirror absorbs.
    assert_eq!(
        ceiling.on_arrow_hit(Vec2::new(0.0, -1.0)),
        ArrowHit::Absorb
    );
    // Floor is a wall: always absorbs.
    let floor = chain.surface(0);
    assert_eq!(floor.on_arrow_hit(Vec2::new(0.0, -1.0)), ArrowHit::Absorb);
    assert!(!floor.is_plannable());
    assert!(ceiling.is_plannable());
}

#[test]
fn scene_lookup_and_bounds_chain() {
    let scene = Scene::build(
        vec![room()],
        Some(ScreenBounds {
            min_x: 0.0,
            max_x: 1280.0,
            min_y: 0.0,
            max_y: 720.0,
        }),
    )
    .unwrap();
    assert_eq!(scene.chains().len(), 2);
    let bounds_chain = &scene.chains()[1];
    assert!(bounds_chain.is_closed());
    assert!(bounds_chain.surfaces().iter().all(|s| !s.is_mirror()));
    let sid = SurfaceId { chain: 0, edge: 2 };
    assert!(scene.surface(sid).unwrap().is_mirror());
    assert!(scene
        .surface(SurfaceId { chain: 7, edge: 0 })
        .is_none());
    assert_eq!(scene.surfaces().count(), 8);
    assert_eq!(format!("{sid}"), "c0e2");
}
