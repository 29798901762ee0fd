use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mirage::cascade::run_cascade;
use mirage::cfg::EngineCfg;
use mirage::cone::{ConeInput, Projector};
use mirage::gen::{draw_scene, ReplayToken, ScatterCfg};
use mirage::geom::Vec2;
use mirage::scene::{ChainSpec, Reflectivity, Scene};
use mirage::source::ConeId;

fn scattered_scene(surfaces: usize) -> Scene {
    let cfg = ScatterCfg {
        surfaces,
        ..ScatterCfg::default()
    };
    let specs = draw_scene(cfg, ReplayToken { seed: 11, index: 3 });
    Scene::build(specs, None).expect("generated scene is valid")
}

fn bench_full_cone(c: &mut Criterion) {
    let cfg = EngineCfg::default();
    for n in [4usize, 16, 48] {
        let scene = scattered_scene(n);
        let projector = Projector::new(&scene, cfg);
        c.bench_function(&format!("full_cone_{n}_surfaces"), |b| {
            b.iter(|| {
                let input = ConeInput::full(ConeId(0), black_box(Vec2::new(345.0, 515.0)), None);
                projector.project(&input).unwrap()
            })
        });
    }
}

fn bench_cascade(c: &mut Criterion) {
    let cfg = EngineCfg::default();
    let s0 = ChainSpec::single(
        Vec2::new(560.0, 223.0),
        Vec2::new(450.0, 223.0),
        Reflectivity::Mirror,
    );
    let s1 = ChainSpec::single(
        Vec2::new(650.0, 123.0),
        Vec2::new(760.0, 123.0),
        Reflectivity::Mirror,
    );
    let s2 = ChainSpec::single(
        Vec2::new(890.0, 189.0),
        Vec2::new(780.0, 189.0),
        Reflectivity::Mirror,
    );
    let mut specs = draw_scene(
        ScatterCfg {
            surfaces: 10,
            mirror_ratio: 0.0,
            ..ScatterCfg::default()
        },
        ReplayToken { seed: 5, index: 0 },
    );
    specs.extend([s0, s1, s2]);
    let scene = Scene::build(specs, None).expect("scene");
    let chains = scene.chains();
    let m0 = chains[chains.len() - 3].surface(0);
    let m1 = chains[chains.len() - 2].surface(0);
    let m2 = chains[chains.len() - 1].surface(0);

    c.bench_function("three_stage_cascade", |b| {
        b.iter(|| {
            run_cascade(
                &scene,
                cfg,
                black_box(Vec2::new(345.0, 143.0)),
                &[m0, m1, m2],
                None,
            )
        })
    });
}

criterion_group!(benches, bench_full_cone, bench_cascade);
criterion_main!(benches);
