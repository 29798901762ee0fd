//! Cone projection: the visibility polygon as ordered source points.
//!
//! Purpose
//! - Given a cone (full or windowed), the scene's chains, an optional
//!   excluded window surface and an optional range circle, produce the CCW
//!   boundary of the visible region as provenance-carrying source points.
//!
//! Shape of the algorithm
//! - Gather candidates: chain vertices inside the cone, their continuation
//!   hits past silhouettes, window boundary points and their hits, and arc
//!   points where the range circle caps a ray or crosses a surface.
//! - Record pair orders for every same-ray family while building them.
//! - Deduplicate by key, sort CCW with `CcwOrder`, fail loudly on
//!   coincident candidates that no recorded pair separates.
//!
//! Windowed cones see only the half plane beyond the window surface: light
//! that reflects off a mirror never revisits the near side, so obstacles
//! and vertices behind the supporting line are clipped out before anything
//! is cast.
//!
//! Code cross-refs: `order::{PrecomputedPairs, CcwOrder}`, `range::RangeLimit`,
//! `cascade::CascadeRunner`

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::cfg::EngineCfg;
use crate::error::QueryError;
use crate::geom::{dir_cross, ray_segment_intersect, rot90, Vec2};
use crate::scene::{Chain, Scene, SegEnd, Surface, SurfaceId};
use crate::sector::RaySector;
use crate::source::{ArcRay, ArcRoot, ConeId, Key, Side, SourcePoint};

use super::order::{CcwOrder, PrecomputedPairs, RayOrder};
use super::range::{Clip, RangeLimit};

/// One window endpoint handed down by the cascade: its position and the
/// provenance it was derived from in the previous polygon.
#[derive(Clone, Debug)]
pub struct WindowBoundary {
    pub at: Vec2,
    pub derived_from: Key,
}

/// A projection request.
#[derive(Clone, Debug)]
pub struct ConeInput {
    pub cone: ConeId,
    pub sector: RaySector,
    /// The surface the window is cut into; its own vertices are suppressed
    /// and geometry behind its supporting line is invisible.
    pub excluded: Option<SurfaceId>,
    /// `(right, left)` boundaries for a windowed cone.
    pub window: Option<(WindowBoundary, WindowBoundary)>,
    pub range: Option<RangeLimit>,
}

impl ConeInput {
    /// Full-plane cone at `origin`.
    pub fn full(cone: ConeId, origin: Vec2, range: Option<RangeLimit>) -> Self {
        Self {
            cone,
            sector: RaySector::full(origin),
            excluded: None,
            window: None,
            range,
        }
    }
}

/// An obstacle segment, pre-clipped to the range circle and to the far side
/// of the excluded surface. `s_lo/s_hi` are parameters on the original
/// segment, so hit provenance stays in the surface's own frame.
#[derive(Clone, Copy, Debug)]
struct Obstacle<'a> {
    surface: &'a Surface,
    s_lo: f64,
    s_hi: f64,
    near_arc: bool,
    far_arc: bool,
}

struct Candidate<'a> {
    sp: SourcePoint<'a>,
    ord: RayOrder,
}

/// Projection engine over one scene and configuration.
#[derive(Clone, Copy, Debug)]
pub struct Projector<'a> {
    pub scene: &'a Scene,
    pub cfg: EngineCfg,
}

impl<'a> Projector<'a> {
    pub fn new(scene: &'a Scene, cfg: EngineCfg) -> Self {
        Self { scene, cfg }
    }

    /// Project a cone onto the scene. Returns the CCW polygon boundary.
    pub fn project(&self, input: &ConeInput) -> Result<Vec<SourcePoint<'a>>, QueryError> {
        let origin = input.sector.origin;
        if let Some(range) = &input.range {
            range.validate_for(origin)?;
        }
        let excluded = input.excluded.and_then(|id| self.scene.surface(id));
        let obstacles = self.collect_obstacles(input, excluded);

        let mut pairs = PrecomputedPairs::new();
        let mut cands: Vec<Candidate<'a>> = Vec::new();

        self.gather_arc_crossings(input, &obstacles, &mut cands);
        self.gather_vertices(input, excluded, &obstacles, &mut pairs, &mut cands);
        self.gather_window(input, &obstacles, &mut pairs, &mut cands);
        self.record_arc_order(input, &mut pairs, &cands);

        if cands.is_empty() {
            if let (None, Some(range)) = (&input.window, &input.range) {
                self.push_arc_anchors(origin, range, &mut cands);
            }
        }

        // Provenance-keyed dedup; never by coordinate proximity.
        let mut seen: HashSet<Key> = HashSet::with_capacity(cands.len());
        cands.retain(|c| seen.insert(c.ord.key.clone()));

        let reference = if input.sector.is_full() {
            Vec2::new(1.0, 0.0)
        } else {
            input.sector.right_dir()
        };
        let order = CcwOrder {
            reference,
            pairs: &pairs,
        };
        // Binary-search insertion in CCW order (polygons are small). The
        // comparator is exact thanks to the recorded pairs; an unresolved
        // coincidence aborts the query instead of picking an order by fiat.
        let mut sorted: Vec<Candidate<'a>> = Vec::with_capacity(cands.len());
        for cand in cands {
            let mut lo = 0usize;
            let mut hi = sorted.len();
            while lo < hi {
                let mid = (lo + hi) / 2;
                let cmp = match order.compare(&sorted[mid].ord, &cand.ord) {
                    Ok(o) => o,
                    Err((a, b)) => {
                        if self.cfg.provenance_strict {
                            return Err(QueryError::CollinearWithoutProvenance {
                                cone: input.cone.0,
                                a: a.to_string(),
                                b: b.to_string(),
                            });
                        }
                        Ordering::Equal
                    }
                };
                if cmp == Ordering::Greater {
                    hi = mid;
                } else {
                    lo = mid + 1;
                }
            }
            sorted.insert(lo, cand);
        }
        let cands = sorted;

        debug!(
            cone = input.cone.0,
            vertices = cands.len(),
            recorded_pairs = pairs.len(),
            "cone projected"
        );
        Ok(cands.into_iter().map(|c| c.sp).collect())
    }

    /// All obstacle segments for this cone, clipped to the range circle and
    /// to the far half plane of the excluded surface.
    fn collect_obstacles(
        &self,
        input: &ConeInput,
        excluded: Option<&'a Surface>,
    ) -> Vec<Obstacle<'a>> {
        let mut out = Vec::new();
        for surface in self.scene.surfaces() {
            if Some(surface.id) == input.excluded {
                continue;
            }
            let (mut lo, mut hi, mut near_arc, mut far_arc) = match &input.range {
                None => (0.0, 1.0, false, false),
                Some(range) => match range.clip(&surface.seg) {
                    Clip::Outside => continue,
                    Clip::Full => (0.0, 1.0, false, false),
                    Clip::Partial {
                        s0,
                        s1,
                        near_arc,
                        far_arc,
                    } => (s0, s1, near_arc, far_arc),
                },
            };
            if let Some(ex) = excluded {
                let va = ex.side_of(surface.seg.a);
                let vb = ex.side_of(surface.seg.b);
                if va < 0.0 && vb < 0.0 {
                    continue;
                }
                if va < 0.0 || vb < 0.0 {
                    let sc = va / (va - vb);
                    if va < 0.0 {
                        if sc > lo {
                            lo = sc;
                            near_arc = false;
                        }
                    } else if sc < hi {
                        hi = sc;
                        far_arc = false;
                    }
                }
            }
            if lo >= hi {
                continue;
            }
            out.push(Obstacle {
                surface,
                s_lo: lo,
                s_hi: hi,
                near_arc,
                far_arc,
            });
        }
        out
    }

    /// Nearest forward hit along `origin + t·dir` with `t > t_min`,
    /// ignoring surfaces in `skip`.
    fn nearest_hit(
        &self,
        origin: Vec2,
        dir: Vec2,
        t_min: f64,
        skip: &[SurfaceId],
        obstacles: &[Obstacle<'a>],
    ) -> Option<(f64, f64, &'a Surface)> {
        let eps_parallel = self.cfg.tol.eps_parallel;
        let mut best: Option<(f64, f64, &'a Surface)> = None;
        for ob in obstacles {
            if skip.contains(&ob.surface.id) {
                continue;
            }
            let Some((t, s)) = ray_segment_intersect(origin, dir, &ob.surface.seg, eps_parallel)
            else {
                continue;
            };
            if t <= t_min || s < ob.s_lo || s > ob.s_hi {
                continue;
            }
            if best.map(|(bt, _, _)| t < bt).unwrap_or(true) {
                best = Some((t, s, ob.surface));
            }
        }
        best
    }

    fn gather_arc_crossings(
        &self,
        input: &ConeInput,
        obstacles: &[Obstacle<'a>],
        cands: &mut Vec<Candidate<'a>>,
    ) {
        let Some(range) = &input.range else {
            return;
        };
        let origin = input.sector.origin;
        for ob in obstacles {
            for (flag, s, root) in [
                (ob.near_arc, ob.s_lo, ArcRoot::Near),
                (ob.far_arc, ob.s_hi, ArcRoot::Far),
            ] {
                if !flag {
                    continue;
                }
                let pos = ob.surface.seg.point_at(s);
                let dir = pos - origin;
                if dir.norm_squared() == 0.0 || !input.sector.contains_dir(dir) {
                    continue;
                }
                cands.push(Candidate {
                    sp: SourcePoint::ArcCross {
                        surface: ob.surface,
                        circle: range.circle,
                        root,
                        s,
                    },
                    ord: RayOrder {
                        key: Key::ArcCross {
                            surface: ob.surface.id,
                            circle: range.circle,
                            root,
                        },
                        dir,
                        dist2: dir.norm_squared(),
                    },
                });
            }
        }
    }

    fn gather_vertices(
        &self,
        input: &ConeInput,
        excluded: Option<&'a Surface>,
        obstacles: &[Obstacle<'a>],
        pairs: &mut PrecomputedPairs,
        cands: &mut Vec<Candidate<'a>>,
    ) {
        let origin = input.sector.origin;
        let eps = self.cfg.tol.eps_param;
        for chain in self.scene.chains() {
            for v in 0..chain.vertex_count() {
                let (e_end, e_start) = chain.edges_at_vertex(v);
                let incident: Vec<usize> = e_end.into_iter().chain(e_start).collect();
                if incident
                    .iter()
                    .any(|&e| Some(chain.surface(e).id) == input.excluded)
                {
                    // Window-surface vertices are represented by the
                    // supplied origin points, never by themselves.
                    continue;
                }
                let pos = chain.vertex(v);
                let dir = pos - origin;
                if dir.norm_squared() == 0.0 || !input.sector.contains_dir(dir) {
                    continue;
                }
                if let Some(range) = &input.range {
                    if !range.contains(pos) {
                        continue;
                    }
                }
                if let Some(ex) = excluded {
                    if ex.side_of(pos) < 0.0 {
                        continue;
                    }
                }
                let skip: Vec<SurfaceId> =
                    incident.iter().map(|&e| chain.surface(e).id).collect();
                if let Some((t, _, _)) = self.nearest_hit(origin, dir, eps, &skip, obstacles) {
                    if t < 1.0 - eps {
                        continue; // occluded
                    }
                }
                let (sp, vkey) = vertex_source(chain, v, e_end, e_start);
                cands.push(Candidate {
                    sp,
                    ord: RayOrder {
                        key: vkey.clone(),
                        dir,
                        dist2: dir.norm_squared(),
                    },
                });

                // Silhouette test: edges straddling the ray block it; edges
                // on one side let it continue into a shadow extension.
                let crs: Vec<f64> = incident
                    .iter()
                    .map(|&e| {
                        let other = chain.vertex(other_vertex(chain, e, v));
                        dir_cross(dir, other - origin)
                    })
                    .collect();
                if crs.len() == 2 && crs[0] * crs[1] < 0.0 {
                    continue;
                }
                let side_sum: f64 = crs.iter().sum();
                if side_sum == 0.0 {
                    continue;
                }
                self.push_continuation(
                    input, origin, dir, &skip, obstacles, vkey, side_sum, pairs, cands,
                );
            }
        }
    }

    /// Cast the continuation of a boundary ray past its vertex and record
    /// the pair order between vertex and hit.
    #[allow(clippy::too_many_arguments)]
    fn push_continuation(
        &self,
        input: &ConeInput,
        origin: Vec2,
        dir: Vec2,
        skip: &[SurfaceId],
        obstacles: &[Obstacle<'a>],
        vkey: Key,
        side_sum: f64,
        pairs: &mut PrecomputedPairs,
        cands: &mut Vec<Candidate<'a>>,
    ) {
        let eps = self.cfg.tol.eps_param;
        let (hit_key, sp, dist2) =
            if let Some((t, s, surf)) = self.nearest_hit(origin, dir, 1.0 + eps, skip, obstacles) {
                let key = Key::Hit {
                    ray: Box::new(vkey.clone()),
                    surface: surf.id,
                };
                (
                    key.clone(),
                    SourcePoint::Hit {
                        ray: vkey.clone(),
                        surface: surf,
                        s,
                    },
                    dir.norm_squared() * t * t,
                )
            } else if let Some(range) = &input.range {
                let Some(t) = range.ray_exit(origin, dir) else {
                    return;
                };
                let key = Key::ArcHit {
                    ray: ArcRay::Source(Box::new(vkey.clone())),
                    circle: range.circle,
                };
                (
                    key.clone(),
                    SourcePoint::ArcHit {
                        ray: ArcRay::Source(Box::new(vkey.clone())),
                        circle: range.circle,
                        at: origin + dir * t,
                    },
                    dir.norm_squared() * t * t,
                )
            } else {
                return;
            };
        // Obstacle on the left of the ray: the far hit precedes the vertex
        // in CCW order; on the right it follows.
        if side_sum > 0.0 {
            pairs.record(hit_key.clone(), vkey);
        } else {
            pairs.record(vkey, hit_key.clone());
        }
        cands.push(Candidate {
            sp,
            ord: RayOrder {
                key: hit_key,
                dir,
                dist2,
            },
        });
    }

    fn gather_window(
        &self,
        input: &ConeInput,
        obstacles: &[Obstacle<'a>],
        pairs: &mut PrecomputedPairs,
        cands: &mut Vec<Candidate<'a>>,
    ) {
        let Some((right, left)) = &input.window else {
            return;
        };
        let origin = input.sector.origin;
        let eps = self.cfg.tol.eps_param;
        let mut quad: Vec<Key> = Vec::with_capacity(4);
        let mut boundary = |wb: &WindowBoundary, side: Side, quad: &mut Vec<Key>,
                            cands: &mut Vec<Candidate<'a>>| {
            let okey = Key::Origin {
                cone: input.cone,
                side,
            };
            let dir = wb.at - origin;
            let org_entry = (
                okey.clone(),
                Candidate {
                    sp: SourcePoint::Origin {
                        cone: input.cone,
                        side,
                        at: wb.at,
                        derived_from: wb.derived_from.clone(),
                    },
                    ord: RayOrder {
                        key: okey.clone(),
                        dir,
                        dist2: dir.norm_squared(),
                    },
                },
            );
            // Rule for junction-sitting boundaries: the adjacent surface is
            // no obstacle for a ray aimed at its own shared vertex, but if
            // it bends into the cone it seals the boundary and there is no
            // shadow extension at all.
            let skip = root_incident_surfaces(self.scene, &wb.derived_from);
            let sealed =
                self.boundary_sealed(&wb.derived_from, side, dir, origin, input.excluded);
            let hit_entry = if sealed {
                None
            } else if let Some((t, s, surf)) =
                self.nearest_hit(origin, dir, 1.0 + eps, &skip, obstacles)
            {
                let key = Key::Hit {
                    ray: Box::new(okey.clone()),
                    surface: surf.id,
                };
                Some((
                    key.clone(),
                    Candidate {
                        sp: SourcePoint::Hit {
                            ray: okey.clone(),
                            surface: surf,
                            s,
                        },
                        ord: RayOrder {
                            key,
                            dir,
                            dist2: dir.norm_squared() * t * t,
                        },
                    },
                ))
            } else if let Some(range) = &input.range {
                range.ray_exit(origin, dir).map(|t| {
                    let key = Key::ArcHit {
                        ray: ArcRay::Source(Box::new(okey.clone())),
                        circle: range.circle,
                    };
                    (
                        key.clone(),
                        Candidate {
                            sp: SourcePoint::ArcHit {
                                ray: ArcRay::Source(Box::new(okey.clone())),
                                circle: range.circle,
                                at: origin + dir * t,
                            },
                            ord: RayOrder {
                                key,
                                dir,
                                dist2: dir.norm_squared() * t * t,
                            },
                        },
                    )
                })
            } else {
                None
            };
            // Fixed (partial) quadrilateral order: rightOrigin → rightHit →
            // … → leftHit → leftOrigin.
            match side {
                Side::Right => {
                    quad.push(org_entry.0.clone());
                    cands.push(org_entry.1);
                    if let Some((k, c)) = hit_entry {
                        quad.push(k);
                        cands.push(c);
                    }
                }
                Side::Left => {
                    if let Some((k, c)) = hit_entry {
                        quad.push(k);
                        cands.push(c);
                    }
                    quad.push(org_entry.0.clone());
                    cands.push(org_entry.1);
                }
            }
        };
        boundary(right, Side::Right, &mut quad, cands);
        boundary(left, Side::Left, &mut quad, cands);
        pairs.record_sequence(&quad);
    }

    /// A junction-sitting window boundary is sealed when the junction's
    /// other surface bends into the cone: the region ends at the boundary
    /// origin and the boundary ray has no shadow extension.
    fn boundary_sealed(
        &self,
        root: &Key,
        side: Side,
        dir: Vec2,
        origin: Vec2,
        excluded: Option<SurfaceId>,
    ) -> bool {
        let Key::Junction { chain, vertex } = root else {
            return false;
        };
        let Some(chain) = self.scene.chain(crate::scene::ChainId(*chain)) else {
            return false;
        };
        let v = *vertex as usize;
        let (a, b) = chain.edges_at_vertex(v);
        for e in a.into_iter().chain(b) {
            if Some(chain.surface(e).id) == excluded {
                continue;
            }
            let w = chain.vertex(other_vertex(chain, e, v));
            let c = dir_cross(dir, w - origin);
            let into_cone = match side {
                Side::Right => c > 0.0,
                Side::Left => c < 0.0,
            };
            // Collinear counts as sealed: a surface lying along the
            // boundary ray leaves no open sliver either.
            if into_cone || c == 0.0 {
                return true;
            }
        }
        false
    }

    /// Total order for arc points: their sweep around the circle, measured
    /// once against the cone's reference direction.
    fn record_arc_order(
        &self,
        input: &ConeInput,
        pairs: &mut PrecomputedPairs,
        cands: &[Candidate<'a>],
    ) {
        if input.range.is_none() {
            return;
        }
        let origin = input.sector.origin;
        let reference = if input.sector.is_full() {
            Vec2::new(1.0, 0.0)
        } else {
            input.sector.right_dir()
        };
        let mut arcs: Vec<(f64, Key)> = cands
            .iter()
            .filter(|c| {
                matches!(
                    c.ord.key,
                    Key::ArcCross { .. } | Key::ArcHit { .. }
                )
            })
            .map(|c| {
                // Sweep angle around the origin (the circle contains it, so
                // this ranks arc points exactly as the polygon sweeps them);
                // computed once, only to rank arc points among themselves,
                // and cut at the same reference ray as the CCW sort.
                let rel = c.sp.xy() - origin;
                let ang = dir_cross(reference, rel).atan2(reference.dot(&rel));
                let ang = if ang < 0.0 {
                    ang + std::f64::consts::TAU
                } else {
                    ang
                };
                (ang, c.ord.key.clone())
            })
            .collect();
        if arcs.len() < 2 {
            return;
        }
        arcs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        let keys: Vec<Key> = arcs.into_iter().map(|(_, k)| k).collect();
        pairs.record_sequence(&keys);
    }

    /// Candidate-free full cone inside a range circle: the polygon is the
    /// whole disk, approximated by four anchored arc points so the
    /// rasterizer has something to sweep between.
    fn push_arc_anchors(&self, origin: Vec2, range: &RangeLimit, cands: &mut Vec<Candidate<'a>>) {
        let mut d = Vec2::new(1.0, 0.0);
        for i in 0..4u8 {
            if let Some(t) = range.ray_exit(origin, d) {
                let key = Key::ArcHit {
                    ray: ArcRay::Anchor(i),
                    circle: range.circle,
                };
                cands.push(Candidate {
                    sp: SourcePoint::ArcHit {
                        ray: ArcRay::Anchor(i),
                        circle: range.circle,
                        at: origin + d * t,
                    },
                    ord: RayOrder {
                        key,
                        dir: d,
                        dist2: t * t,
                    },
                });
            }
            d = rot90(d);
        }
    }
}

/// The source point for a chain vertex: a junction when two edges share it,
/// otherwise the endpoint of its single edge.
fn vertex_source<'a>(
    chain: &'a Chain,
    v: usize,
    e_end: Option<usize>,
    e_start: Option<usize>,
) -> (SourcePoint<'a>, Key) {
    match (e_end, e_start) {
        (Some(_), Some(_)) => (
            SourcePoint::Junction {
                chain,
                vertex: v as u32,
            },
            Key::Junction {
                chain: chain.id.0,
                vertex: v as u32,
            },
        ),
        (None, Some(e)) => {
            let surface = chain.surface(e);
            (
                SourcePoint::Endpoint {
                    surface,
                    end: SegEnd::Start,
                },
                Key::Endpoint {
                    surface: surface.id,
                    end: SegEnd::Start,
                },
            )
        }
        (Some(e), None) => {
            let surface = chain.surface(e);
            (
                SourcePoint::Endpoint {
                    surface,
                    end: SegEnd::End,
                },
                Key::Endpoint {
                    surface: surface.id,
                    end: SegEnd::End,
                },
            )
        }
        (None, None) => unreachable!("chain vertices touch at least one edge"),
    }
}

/// The other vertex of edge `e` relative to vertex `v`.
fn other_vertex(chain: &Chain, e: usize, v: usize) -> usize {
    let start = e;
    let end = (e + 1) % chain.vertex_count();
    if start == v {
        end
    } else {
        start
    }
}

/// Surfaces incident to the vertex a window boundary was derived from.
fn root_incident_surfaces(scene: &Scene, root: &Key) -> Vec<SurfaceId> {
    match root {
        Key::Junction { chain, vertex } => scene
            .chain(crate::scene::ChainId(*chain))
            .map(|c| {
                let (a, b) = c.edges_at_vertex(*vertex as usize);
                a.into_iter()
                    .chain(b)
                    .map(|e| c.surface(e).id)
                    .collect()
            })
            .unwrap_or_default(),
        Key::Endpoint { surface, .. }
        | Key::Hit { surface, .. }
        | Key::ArcCross { surface, .. } => vec![*surface],
        Key::Origin { .. } | Key::ArcHit { .. } => Vec::new(),
    }
}
