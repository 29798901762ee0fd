//! Query-boundary errors.
//!
//! Expected terminations (bypass decisions, windowless cascade branches,
//! reflection caps) are values, never errors; only numerical ambiguity and
//! violated preconditions surface here.

use thiserror::Error;

/// Fatal conditions for a single query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Two distinct projection candidates share coordinates (or a
    /// sign-indeterminate cross product) and no pair order was recorded.
    /// Guessing an order is forbidden; the cone and both debug-rendered
    /// provenance keys are attached for diagnosis.
    #[error("collinear candidates without provenance in cone {cone}: {a} vs {b}")]
    CollinearWithoutProvenance { cone: u32, a: String, b: String },

    /// The planned surface list cannot support an image chain.
    #[error("degenerate plan: {reason}")]
    DegeneratePlan { reason: String },

    /// A chain failed validation at scene build time.
    #[error("invalid chain {chain}: {reason}")]
    InvalidChain { chain: u32, reason: String },

    /// Range limit circle is unusable (non-positive radius, or the cone
    /// origin falls outside the circle).
    #[error("invalid range limit: {reason}")]
    InvalidRangeLimit { reason: String },
}
