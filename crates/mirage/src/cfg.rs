//! Centralized tolerances and engine configuration.
//!
//! - `Tolerances`: every numeric slack used by geometric predicates lives
//!   here; comparators never carry their own literals.
//! - `EngineCfg`: query-level knobs (reflection cap, cursor/alignment slack,
//!   provenance-strict mode).

/// Geometry tolerances.
///
/// Ordering decisions never use these; they exist only for classification
/// (on-segment, parallel, self-hit) where no provenance is available.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    /// Denominator threshold below which two directions count as parallel.
    pub eps_parallel: f64,
    /// Relative on-segment slack: a point is on a segment when
    /// `|cross| < eps_on_segment * len²`.
    pub eps_on_segment: f64,
    /// Ray-parameter slack used to separate a vertex from its own
    /// continuation and to avoid re-hitting the surface just reflected off.
    pub eps_param: f64,
    /// Unit-direction slack for reflection-law checks.
    pub eps_direction: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            eps_parallel: 1e-12,
            eps_on_segment: 1e-8,
            eps_param: 1e-9,
            eps_direction: 1e-9,
        }
    }
}

/// Engine configuration for a query.
#[derive(Clone, Copy, Debug)]
pub struct EngineCfg {
    pub tol: Tolerances,
    /// Physical-trace reflection cap.
    pub max_reflections: u32,
    /// Absolute distance within which a ray segment counts as passing
    /// through the cursor.
    pub cursor_tolerance: f64,
    /// Absolute distance within which planned and actual waypoints match.
    pub alignment_tolerance: f64,
    /// When set, coincident candidates without a recorded pair order fail
    /// the query instead of being ordered by fiat.
    pub provenance_strict: bool,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            tol: Tolerances::default(),
            max_reflections: 10,
            cursor_tolerance: 2.0,
            alignment_tolerance: 2.0,
            provenance_strict: true,
        }
    }
}
