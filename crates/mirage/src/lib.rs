//! Mirror-reflective visibility and trajectory geometry for 2D scenes.
//!
//! Given a player, a cursor, and chains of reflective and non-reflective
//! segments, the engine derives the planned mirror path, the physical path,
//! their alignment and divergence, and the cascade of visibility polygons
//! through each planned mirror. Polygon vertices carry provenance keys so
//! ordering and identity survive pixel-scale input motion.

pub mod align;
pub mod bypass;
pub mod cascade;
pub mod cfg;
pub mod cone;
pub mod engine;
pub mod error;
pub mod gen;
pub mod geom;
pub mod image;
pub mod path;
pub mod scene;
pub mod sector;
pub mod source;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::align::Alignment;
    pub use crate::bypass::{BypassReason, BypassReport};
    pub use crate::cascade::{Cascade, CascadeStage};
    pub use crate::cfg::{EngineCfg, Tolerances};
    pub use crate::cone::{ConeInput, Projector, RangeLimit};
    pub use crate::engine::{Engine, EngineReport, EngineResult, PolygonOut, QueryInput, RangeLimitSpec};
    pub use crate::error::QueryError;
    pub use crate::geom::{polygon_is_ccw, polygon_signed_area, Line, Segment, Vec2};
    pub use crate::image::ImageChain;
    pub use crate::path::{Trace, TraceStatus, Tracer};
    pub use crate::scene::{
        Chain, ChainId, ChainSpec, Reflectivity, Scene, ScreenBounds, Surface, SurfaceId,
    };
    pub use crate::sector::RaySector;
    pub use crate::source::{Key, SourcePoint};
}
