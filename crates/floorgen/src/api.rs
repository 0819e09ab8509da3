//! Curated re-exports across the crate.
//!
//! Important
//! - Convenience surface for binaries, benches and experiments. Breaking
//!   changes follow the modules they re-export.

// Geometry kernel
pub use crate::geom::{
    overlap, overlap_area, touch, touch_with_min_length, Direction, GridPoint, GridRectangle,
    OrthogonalLine, Point, Polygon, Transformation,
};
// Doors and map input
pub use crate::doors::{DoorLine, DoorMode};
pub use crate::map::{MapDescription, MapGraphs, RoomTemplate};
// Precomputation
pub use crate::chains::{BreadthFirstChains, Chain, ChainDecomposition, TwoStageChains};
pub use crate::cspace::{ConfigurationSpace, ConfigurationSpaces, ShapeId, SpaceKind};
// Layouts and search
pub use crate::layout::{
    Configuration, EnergyData, Layout, LayoutConstraint, LayoutOps, MaxExtent, ValidityVector,
};
pub use crate::search::{
    AnnealCfg, CancelToken, Door, GenerationObserver, GenerationReport, GeneratorCfg,
    LayoutGenerator, MapLayout, NoopObserver, Room,
};
