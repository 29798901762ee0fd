//! Ray propagation: planned, physical, and merged path strategies.
//!
//! Purpose
//! - The physical strategy marches a ray through the real scene: nearest
//!   hit wins, mirrors bounce (from their reflective face), walls absorb,
//!   a reflection cap ends runaway ping-pong.
//! - The planned strategy walks the image-chain waypoints, hitting only
//!   each planned surface's supporting line in turn.
//! - The merged strategy follows the plan until physics first disagrees,
//!   then continues physically from the divergence.
//!
//! Code cross-refs: `image::ImageChain`, `align::compare`

use crate::cfg::EngineCfg;
use crate::geom::{cross, ray_segment_intersect, Vec2};
use crate::image::ImageChain;
use crate::scene::{ArrowHit, Scene, Surface, SurfaceId};

/// Why a trace ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceStatus {
    ReachedCursor,
    BlockedByWall(SurfaceId),
    MaxReflections,
    Escaped,
}

/// One surface contact along a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    pub surface: SurfaceId,
    pub point: Vec2,
    /// Whether the ray actually bounced here.
    pub reflected: bool,
    /// Whether the contact lies within the surface's segment.
    pub on_segment: bool,
}

/// A traced path: waypoints, per-hit metadata, terminal status, and the
/// forward projection past the cursor.
#[derive(Clone, Debug)]
pub struct Trace {
    pub points: Vec<Vec2>,
    pub hits: Vec<HitRecord>,
    pub status: TraceStatus,
    pub forward: Vec<Vec2>,
}

impl Trace {
    pub fn reached_cursor(&self) -> bool {
        self.status == TraceStatus::ReachedCursor
    }

    /// Waypoints for the arrow simulator: path plus forward projection.
    pub fn arrow_waypoints(&self) -> Vec<Vec2> {
        let mut w = self.points.clone();
        w.extend(self.forward.iter().copied());
        w
    }
}

/// Where the merged strategy left the plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Divergence {
    /// Index of the first planned segment that physics disagrees with.
    pub segment: usize,
    pub point: Vec2,
    pub surface: Option<SurfaceId>,
}

/// Is `p` on the segment `a → b`, within an absolute distance bound?
/// Cross-product collinearity plus axis-aligned range checks.
pub fn point_on_segment(p: Vec2, a: Vec2, b: Vec2, tol: f64) -> bool {
    let d = b - a;
    let len = d.norm();
    if len == 0.0 {
        return (p - a).norm() <= tol;
    }
    if cross(d, p - a).abs() / len > tol {
        return false;
    }
    p.x >= a.x.min(b.x) - tol
        && p.x <= a.x.max(b.x) + tol
        && p.y >= a.y.min(b.y) - tol
        && p.y <= a.y.max(b.y) + tol
}

/// Path tracer over one scene and configuration.
#[derive(Clone, Copy, Debug)]
pub struct Tracer<'a> {
    pub scene: &'a Scene,
    pub cfg: EngineCfg,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, cfg: EngineCfg) -> Self {
        Self { scene, cfg }
    }

    /// Nearest physical hit of a ray, skipping the surface just bounced off.
    fn nearest_hit(
        &self,
        origin: Vec2,
        dir: Vec2,
        skip: Option<SurfaceId>,
    ) -> Option<(f64, Vec2, &'a Surface)> {
        let tol = &self.cfg.tol;
        let mut best: Option<(f64, Vec2, &'a Surface)> = None;
        for surface in self.scene.surfaces() {
            if Some(surface.id) == skip {
                continue;
            }
            let Some((t, s)) = ray_segment_intersect(origin, dir, &surface.seg, tol.eps_parallel)
            else {
                continue;
            };
            if t <= tol.eps_param {
                continue;
            }
            if best.map(|(bt, _, _)| t < bt).unwrap_or(true) {
                best = Some((t, surface.seg.point_at(s), surface));
            }
        }
        best
    }

    /// Physical strategy from `start` along `dir`, with an optional cursor
    /// to stop at and an optional just-reflected surface to skip first.
    pub fn trace_physical(
        &self,
        start: Vec2,
        dir: Vec2,
        cursor: Option<Vec2>,
        skip_first: Option<SurfaceId>,
    ) -> Trace {
        let mut points = vec![start];
        let mut hits = Vec::new();
        let mut current = start;
        let mut dir = dir;
        let mut skip = skip_first;
        let mut reflections = 0u32;
        let tol = self.cfg.cursor_tolerance;

        loop {
            let hit = self.nearest_hit(current, dir, skip);
            // Stop-at-cursor beats the surface contact when the cursor sits
            // on the segment about to be traversed.
            if let Some(c) = cursor {
                let end = hit.map(|(_, p, _)| p).unwrap_or(current + dir * 1e6);
                if point_on_segment(c, current, end, tol) {
                    points.push(c);
                    let forward =
                        self.forward_projection(c, dir, skip, self.cfg.max_reflections - reflections);
                    return Trace {
                        points,
                        hits,
                        status: TraceStatus::ReachedCursor,
                        forward,
                    };
                }
            }
            let Some((_, point, surface)) = hit else {
                return Trace {
                    points,
                    hits,
                    status: TraceStatus::Escaped,
                    forward: Vec::new(),
                };
            };
            points.push(point);
            match surface.on_arrow_hit(dir) {
                ArrowHit::Absorb => {
                    hits.push(HitRecord {
                        surface: surface.id,
                        point,
                        reflected: false,
                        on_segment: true,
                    });
                    return Trace {
                        points,
                        hits,
                        status: TraceStatus::BlockedByWall(surface.id),
                        forward: Vec::new(),
                    };
                }
                ArrowHit::Reflect(next_dir) => {
                    hits.push(HitRecord {
                        surface: surface.id,
                        point,
                        reflected: true,
                        on_segment: true,
                    });
                    reflections += 1;
                    if reflections >= self.cfg.max_reflections {
                        return Trace {
                            points,
                            hits,
                            status: TraceStatus::MaxReflections,
                            forward: Vec::new(),
                        };
                    }
                    current = point;
                    dir = next_dir;
                    skip = Some(surface.id);
                }
            }
        }
    }

    /// Physical continuation past the cursor, up to the remaining cap.
    fn forward_projection(
        &self,
        from: Vec2,
        dir: Vec2,
        skip: Option<SurfaceId>,
        budget: u32,
    ) -> Vec<Vec2> {
        let mut out = Vec::new();
        let mut current = from;
        let mut dir = dir;
        let mut skip = skip;
        for _ in 0..=budget {
            let Some((_, point, surface)) = self.nearest_hit(current, dir, skip) else {
                break;
            };
            out.push(point);
            match surface.on_arrow_hit(dir) {
                ArrowHit::Absorb => break,
                ArrowHit::Reflect(next_dir) => {
                    current = point;
                    dir = next_dir;
                    skip = Some(surface.id);
                }
            }
        }
        out
    }

    /// Ordered-planned strategy: the image-chain waypoints with per-hit
    /// metadata; every non-planned surface is transparent.
    pub fn trace_planned(&self, chain: &ImageChain<'a>) -> Option<Trace> {
        let points = chain.waypoints()?;
        let mut hits = Vec::with_capacity(chain.len());
        for i in 0..chain.len() {
            let r = chain.reflection_point(i)?;
            hits.push(HitRecord {
                surface: chain.surface(i).id,
                point: r,
                reflected: chain.satisfies_reflection_law(i, self.cfg.tol.eps_direction),
                on_segment: chain.is_reflection_on_segment(i),
            });
        }
        Some(Trace {
            points,
            hits,
            status: TraceStatus::ReachedCursor,
            forward: Vec::new(),
        })
    }

    /// Merged strategy: planned until physics disagrees, physical after.
    ///
    /// The planned target matches when the physical nearest hit lands on
    /// the same surface within the alignment tolerance.
    pub fn trace_merged(&self, chain: &ImageChain<'a>) -> (Trace, Option<Divergence>) {
        let Some(waypoints) = chain.waypoints() else {
            // No plannable waypoints at all: pure physical toward the cursor.
            return (
                Trace {
                    points: Vec::new(),
                    hits: Vec::new(),
                    status: TraceStatus::Escaped,
                    forward: Vec::new(),
                },
                None,
            );
        };
        let cursor = *waypoints.last().expect("waypoints never empty");
        let mut points = vec![waypoints[0]];
        let mut hits: Vec<HitRecord> = Vec::new();
        let mut skip: Option<SurfaceId> = None;

        for i in 0..chain.len() {
            let target = waypoints[i + 1];
            let current = points[i];
            let dir = target - current;
            if dir.norm_squared() == 0.0 {
                continue;
            }
            let planned_surface = chain.surface(i);
            let phys = self.nearest_hit(current, dir, skip);
            let agrees = phys
                .map(|(_, p, s)| {
                    s.id == planned_surface.id
                        && (p - target).norm() <= self.cfg.alignment_tolerance
                        && s.can_reflect_from(dir)
                })
                .unwrap_or(false);
            if !agrees {
                let div = phys.map(|(_, p, s)| (p, Some(s.id))).unwrap_or((target, None));
                let divergence = Divergence {
                    segment: i,
                    point: div.0,
                    surface: div.1,
                };
                // Continue physically from the divergence position.
                let tail = self.trace_physical(current, dir, Some(cursor), skip);
                let mut merged_points = points;
                merged_points.extend(tail.points.into_iter().skip(1));
                let mut merged_hits = hits;
                merged_hits.extend(tail.hits);
                return (
                    Trace {
                        points: merged_points,
                        hits: merged_hits,
                        status: tail.status,
                        forward: tail.forward,
                    },
                    Some(divergence),
                );
            }
            points.push(target);
            hits.push(HitRecord {
                surface: planned_surface.id,
                point: target,
                reflected: true,
                on_segment: chain.is_reflection_on_segment(i),
            });
            skip = Some(planned_surface.id);
        }

        // Final leg toward the cursor.
        let current = *points.last().expect("at least the player");
        let dir = cursor - current;
        if dir.norm_squared() == 0.0 {
            return (
                Trace {
                    points,
                    hits,
                    status: TraceStatus::ReachedCursor,
                    forward: Vec::new(),
                },
                None,
            );
        }
        let tail = self.trace_physical(current, dir, Some(cursor), skip);
        let diverged = !tail.reached_cursor();
        let divergence = if diverged {
            Some(Divergence {
                segment: chain.len(),
                point: *tail.points.last().expect("tail has points"),
                surface: tail.hits.last().map(|h| h.surface),
            })
        } else {
            None
        };
        let mut merged_points = points;
        merged_points.extend(tail.points.into_iter().skip(1));
        let mut merged_hits = hits;
        merged_hits.extend(tail.hits);
        (
            Trace {
                points: merged_points,
                hits: merged_hits,
                status: tail.status,
                forward: tail.forward,
            },
            divergence,
        )
    }
}
