//! Visibility cascade: reflected cones through successive windows.
//!
//! Purpose
//! - Stage 0 is the full cone at the player. For each active planned
//!   surface in order, the visible runs of that surface are cut out of the
//!   current polygon; each run becomes a window, the origin reflects
//!   through the surface, and a windowed cone is projected with that
//!   surface excluded. Every window spawns an independent branch, explored
//!   depth-first in CCW order; the stage list is the depth-first
//!   flattening.
//!
//! A branch that finds no window terminates silently; that is a result,
//! not an error.
//!
//! Code cross-refs: `cone::project::Projector`, `source::SourcePoint::lies_on`

use tracing::debug;

use crate::cfg::EngineCfg;
use crate::cone::{ConeInput, Projector, RangeLimit, WindowBoundary};
use crate::error::QueryError;
use crate::geom::Vec2;
use crate::scene::{Scene, Surface, SurfaceId};
use crate::sector::{orient_window, RaySector};
use crate::source::{ConeId, SourcePoint};

/// One computed stage: the polygon plus how it was reached.
#[derive(Clone, Debug)]
pub struct CascadeStage<'a> {
    /// Reflection depth: 0 for the direct view.
    pub depth: u32,
    /// The surface whose window this cone looks through (`None` at depth 0).
    pub surface: Option<SurfaceId>,
    /// Window endpoints in scene coordinates (`None` at depth 0).
    pub window: Option<(Vec2, Vec2)>,
    pub polygon: Vec<SourcePoint<'a>>,
}

/// The full polygon series, one element per projected cone.
#[derive(Clone, Debug, Default)]
pub struct Cascade<'a> {
    pub stages: Vec<CascadeStage<'a>>,
}

impl<'a> Cascade<'a> {
    /// Polygons at a given depth, in branch order.
    pub fn at_depth(&self, depth: u32) -> impl Iterator<Item = &CascadeStage<'a>> {
        self.stages.iter().filter(move |s| s.depth == depth)
    }
}

/// Runs the cascade for one query.
pub struct CascadeRunner<'a, 'c> {
    projector: Projector<'a>,
    active: &'c [&'a Surface],
    stages: Vec<CascadeStage<'a>>,
    next_cone: u32,
}

/// Compute the cascade for `player` over the active plan.
pub fn run_cascade<'a>(
    scene: &'a Scene,
    cfg: EngineCfg,
    player: Vec2,
    active: &[&'a Surface],
    range: Option<RangeLimit>,
) -> Result<Cascade<'a>, QueryError> {
    let mut runner = CascadeRunner {
        projector: Projector::new(scene, cfg),
        active,
        stages: Vec::new(),
        next_cone: 0,
    };
    let cone = ConeId(runner.take_cone());
    let polygon = runner
        .projector
        .project(&ConeInput::full(cone, player, range))?;
    runner.stages.push(CascadeStage {
        depth: 0,
        surface: None,
        window: None,
        polygon,
    });
    let root = runner.stages[0].polygon.clone();
    runner.descend(0, player, range, &root)?;
    debug!(stages = runner.stages.len(), "cascade complete");
    Ok(Cascade {
        stages: runner.stages,
    })
}

impl<'a, 'c> CascadeRunner<'a, 'c> {
    fn take_cone(&mut self) -> u32 {
        let id = self.next_cone;
        self.next_cone += 1;
        id
    }

    /// Expand stage `depth` (looking at surface `active[depth]`) from
    /// `polygon`, recursing into every window.
    fn descend(
        &mut self,
        depth: usize,
        origin: Vec2,
        range: Option<RangeLimit>,
        polygon: &[SourcePoint<'a>],
    ) -> Result<(), QueryError> {
        if depth >= self.active.len() {
            return Ok(());
        }
        let surface = self.active[depth];
        let runs = extract_runs(polygon, surface.id, self.projector.scene);
        if runs.is_empty() {
            debug!(depth, surface = %surface.id, "no window; branch ends");
            return Ok(());
        }
        let line = surface.seg.line();
        let next_origin = crate::geom::reflect_point(origin, &line);
        let next_range = range.map(|r| r.reflect(&line));
        for run in runs {
            let first = &polygon[*run.first().expect("runs are non-empty")];
            let last = &polygon[*run.last().expect("runs are non-empty")];
            let (a, b) = (first.xy(), last.xy());
            let Some((rp, lp)) = orient_window(next_origin, a, b) else {
                continue; // zero-width or edge-on window
            };
            // Window boundaries inherit the provenance that ended the run.
            let (right_root, left_root) = if rp == a {
                (first.root_key(), last.root_key())
            } else {
                (last.root_key(), first.root_key())
            };
            let cone = ConeId(self.take_cone());
            let input = ConeInput {
                cone,
                sector: RaySector::window(next_origin, rp, lp),
                excluded: Some(surface.id),
                window: Some((
                    WindowBoundary {
                        at: rp,
                        derived_from: right_root,
                    },
                    WindowBoundary {
                        at: lp,
                        derived_from: left_root,
                    },
                )),
                range: next_range,
            };
            let next_polygon = self.projector.project(&input)?;
            self.stages.push(CascadeStage {
                depth: (depth + 1) as u32,
                surface: Some(surface.id),
                window: Some((rp, lp)),
                polygon: next_polygon.clone(),
            });
            self.descend(depth + 1, next_origin, next_range, &next_polygon)?;
        }
        Ok(())
    }
}

/// Maximal cyclic runs of consecutive polygon vertices lying on `sid`,
/// as index lists in CCW polygon order.
fn extract_runs(polygon: &[SourcePoint<'_>], sid: SurfaceId, scene: &Scene) -> Vec<Vec<usize>> {
    let n = polygon.len();
    if n == 0 {
        return Vec::new();
    }
    let on: Vec<bool> = polygon.iter().map(|sp| sp.lies_on(sid, scene)).collect();
    if on.iter().all(|&b| b) {
        return vec![(0..n).collect()];
    }
    let mut runs = Vec::new();
    // Start scanning just past a gap so cyclic runs stay contiguous.
    let start = on.iter().position(|&b| !b).expect("some vertex is off");
    let mut current: Vec<usize> = Vec::new();
    for k in 0..n {
        let i = (start + 1 + k) % n;
        if on[i] {
            current.push(i);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    // A window needs two distinct boundary points.
    runs.retain(|r| r.len() >= 2);
    runs
}
