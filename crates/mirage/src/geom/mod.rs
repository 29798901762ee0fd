//! 2D geometry primitives.
//!
//! Purpose
//! - Points are `nalgebra::Vector2<f64>` (re-exported as `Vec2`); segments
//!   carry the normal convention used by every reflectivity decision.
//! - All primitives are pure; tolerances come from the caller
//!   (`cfg::Tolerances`), never from literals inside predicates.
//!
//! Code cross-refs: `Segment`, `Line`, `ops::{ray_segment_intersect, reflect_point}`

mod ops;
mod types;

pub use ops::{
    circle_segment_roots, cross, dir_cross, on_segment, perp_distance, polygon_is_ccw,
    polygon_signed_area, ray_line_intersect, ray_segment_intersect, reflect_direction,
    reflect_point, rot90, signed_cross,
};
pub use types::{Line, Segment, Vec2};
