//! Query façade: one call from scene + player + cursor + plan to the full
//! trajectory-and-visibility result.
//!
//! Code cross-refs: `bypass::evaluate`, `image::ImageChain`,
//! `cascade::run_cascade`, `path::Tracer`, `align::compare`

use tracing::debug;

use crate::align::{self, Alignment};
use crate::bypass::{self, BypassReport};
use crate::cascade::{run_cascade, Cascade};
use crate::cfg::EngineCfg;
use crate::cone::RangeLimit;
use crate::error::QueryError;
use crate::geom::{cross, Vec2};
use crate::image::ImageChain;
use crate::path::{Trace, TraceStatus, Tracer};
use crate::scene::{Scene, Surface, SurfaceId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Range-limit request: radius around `center` (default: the player).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeLimitSpec {
    pub radius: f64,
    pub center: Option<Vec2>,
}

/// One query: everything the host supplies per frame.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueryInput {
    pub player: Vec2,
    pub cursor: Vec2,
    pub plan: Vec<SurfaceId>,
    pub range: Option<RangeLimitSpec>,
}

/// The full result of one query. Borrows the scene; lives for one frame.
#[derive(Clone, Debug)]
pub struct EngineResult<'a> {
    pub planned_path: Trace,
    pub actual_path: Trace,
    pub alignment: Alignment,
    pub cascade: Cascade<'a>,
    pub bypass: BypassReport<'a>,
    /// All active reflection points sit on their segments.
    pub plan_valid: bool,
    /// Defined as `plan_valid ∧ is_fully_aligned`.
    pub cursor_lit: bool,
}

/// A polygon in presentation form: coordinates plus parallel provenance
/// tags. Consumers must never re-derive identity from the coordinates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonOut {
    pub points: Vec<[f64; 2]>,
    pub tags: Vec<String>,
}

impl PolygonOut {
    /// Shoelace signed area (positive when CCW).
    pub fn signed_area(&self) -> f64 {
        let pts: Vec<Vec2> = self.points.iter().map(|p| Vec2::new(p[0], p[1])).collect();
        crate::geom::polygon_signed_area(&pts)
    }

    /// Rasterizer sanity check: delivered polygons sweep CCW.
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }
}

/// Owned, host-friendly summary of an [`EngineResult`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineReport {
    pub planned_path: Vec<[f64; 2]>,
    pub actual_path: Vec<[f64; 2]>,
    pub arrow_waypoints: Vec<[f64; 2]>,
    pub actual_status: String,
    pub is_fully_aligned: bool,
    pub aligned_segment_count: usize,
    pub divergence_point: Option<[f64; 2]>,
    pub divergence_surface: Option<String>,
    pub active_surfaces: Vec<String>,
    pub bypassed_surfaces: Vec<(String, String)>,
    pub plan_valid: bool,
    pub cursor_lit: bool,
    pub polygons: Vec<PolygonOut>,
}

impl<'a> EngineResult<'a> {
    /// Waypoints for the arrow simulator.
    pub fn arrow_waypoints(&self) -> Vec<Vec2> {
        self.actual_path.arrow_waypoints()
    }

    /// All cascade polygons in presentation form.
    pub fn polygons(&self) -> Vec<PolygonOut> {
        self.cascade
            .stages
            .iter()
            .map(|stage| PolygonOut {
                points: stage
                    .polygon
                    .iter()
                    .map(|sp| {
                        let p = sp.xy();
                        [p.x, p.y]
                    })
                    .collect(),
                tags: stage.polygon.iter().map(|sp| sp.debug_tag()).collect(),
            })
            .collect()
    }

    pub fn report(&self) -> EngineReport {
        let pt = |p: &Vec2| [p.x, p.y];
        EngineReport {
            planned_path: self.planned_path.points.iter().map(pt).collect(),
            actual_path: self.actual_path.points.iter().map(pt).collect(),
            arrow_waypoints: self.arrow_waypoints().iter().map(pt).collect(),
            actual_status: format!("{:?}", self.actual_path.status),
            is_fully_aligned: self.alignment.is_fully_aligned,
            aligned_segment_count: self.alignment.aligned_segment_count,
            divergence_point: self.alignment.divergence_point.map(|p| [p.x, p.y]),
            divergence_surface: self.alignment.divergence_surface.map(|s| s.to_string()),
            active_surfaces: self.bypass.active.iter().map(|s| s.id.to_string()).collect(),
            bypassed_surfaces: self
                .bypass
                .bypassed
                .iter()
                .map(|(s, r)| (s.id.to_string(), format!("{r:?}")))
                .collect(),
            plan_valid: self.plan_valid,
            cursor_lit: self.cursor_lit,
            polygons: self.polygons(),
        }
    }
}

/// The trajectory engine over one immutable scene.
#[derive(Clone, Copy, Debug)]
pub struct Engine<'a> {
    scene: &'a Scene,
    cfg: EngineCfg,
}

impl<'a> Engine<'a> {
    pub fn new(scene: &'a Scene, cfg: EngineCfg) -> Self {
        Self { scene, cfg }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Evaluate one query to completion.
    pub fn query(&self, input: &QueryInput) -> Result<EngineResult<'a>, QueryError> {
        let planned = self.resolve_plan(&input.plan)?;
        let range = match input.range {
            Some(spec) => {
                let center = spec.center.unwrap_or(input.player);
                let limit = RangeLimit::new(center, spec.radius);
                limit.validate_for(input.player)?;
                Some(limit)
            }
            None => None,
        };

        if input.player == input.cursor {
            return self.trivial_query(input, planned, range);
        }

        let bypass = bypass::evaluate(input.player, input.cursor, &planned, &self.cfg.tol);
        let chain = ImageChain::build(input.player, input.cursor, &bypass.active, &self.cfg.tol);
        let tracer = Tracer::new(self.scene, self.cfg);
        let planned_path = tracer
            .trace_planned(&chain)
            .ok_or_else(|| QueryError::DegeneratePlan {
                reason: "active plan cannot host a reflection chain".to_string(),
            })?;

        let aim = planned_path
            .points
            .get(1)
            .copied()
            .filter(|p| *p != input.player)
            .unwrap_or(input.cursor);
        let actual_path =
            tracer.trace_physical(input.player, aim - input.player, Some(input.cursor), None);
        let alignment = align::compare(&planned_path, &actual_path, self.cfg.alignment_tolerance);
        let cascade = run_cascade(self.scene, self.cfg, input.player, &bypass.active, range)?;

        let plan_valid = chain.plan_valid();
        let cursor_lit = plan_valid && alignment.is_fully_aligned;
        debug!(
            active = bypass.active.len(),
            bypassed = bypass.bypassed.len(),
            plan_valid,
            cursor_lit,
            "query evaluated"
        );
        Ok(EngineResult {
            planned_path,
            actual_path,
            alignment,
            cascade,
            bypass,
            plan_valid,
            cursor_lit,
        })
    }

    /// Cursor exactly on the player: single-waypoint paths, trivially lit.
    fn trivial_query(
        &self,
        input: &QueryInput,
        planned: Vec<&'a Surface>,
        range: Option<RangeLimit>,
    ) -> Result<EngineResult<'a>, QueryError> {
        let bypass = bypass::evaluate(input.player, input.cursor, &planned, &self.cfg.tol);
        let cascade = run_cascade(self.scene, self.cfg, input.player, &bypass.active, range)?;
        let trivial_trace = Trace {
            points: vec![input.player],
            hits: Vec::new(),
            status: TraceStatus::ReachedCursor,
            forward: Vec::new(),
        };
        Ok(EngineResult {
            planned_path: trivial_trace.clone(),
            actual_path: trivial_trace,
            alignment: Alignment::trivial(),
            cascade,
            bypass,
            plan_valid: true,
            cursor_lit: true,
        })
    }

    /// Resolve plan ids and reject degenerate plans.
    fn resolve_plan(&self, plan: &[SurfaceId]) -> Result<Vec<&'a Surface>, QueryError> {
        let mut out = Vec::with_capacity(plan.len());
        for id in plan {
            let surface = self
                .scene
                .surface(*id)
                .ok_or_else(|| QueryError::DegeneratePlan {
                    reason: format!("unknown surface {id}"),
                })?;
            if !surface.is_plannable() {
                return Err(QueryError::DegeneratePlan {
                    reason: format!("surface {id} is not reflective"),
                });
            }
            out.push(surface);
        }
        for pair in out.windows(2) {
            if same_oriented_line(pair[0], pair[1], self.cfg.tol.eps_parallel) {
                return Err(QueryError::DegeneratePlan {
                    reason: format!(
                        "consecutive surfaces {} and {} share a supporting line",
                        pair[0].id, pair[1].id
                    ),
                });
            }
        }
        Ok(out)
    }
}

/// Same supporting line with matching orientation.
fn same_oriented_line(a: &Surface, b: &Surface, eps_parallel: f64) -> bool {
    let da = a.seg.dir();
    let db = b.seg.dir();
    if cross(da, db).abs() > eps_parallel * da.norm() * db.norm() {
        return false;
    }
    if da.dot(&db) <= 0.0 {
        return false;
    }
    cross(da, b.seg.a - a.seg.a).abs() <= eps_parallel * da.norm() * (b.seg.a - a.seg.a).norm().max(1.0)
}
