//! Chain-based procedural floor-plan generation.
//!
//! Rooms are orthogonal polygons with door rules; passages say which rooms
//! must share a door. The generator precomputes where every pair of room
//! shapes may sit relative to each other, splits the room graph into chains,
//! and lays the chains out one by one with simulated annealing.
//!
//! API Policy
//! - `api` and `prelude` are the intended entry points; module paths may move.

pub mod api;
pub mod chains;
pub mod cspace;
pub mod doors;
pub mod error;
pub mod geom;
pub mod graph;
pub mod layout;
pub mod map;
pub mod search;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{LayoutError, Result};

/// Everything needed to describe a map and generate layouts for it.
pub mod prelude {
    pub use crate::doors::DoorMode;
    pub use crate::error::{LayoutError, Result};
    pub use crate::geom::{OrthogonalLine, Point, Polygon, Transformation};
    pub use crate::layout::{LayoutConstraint, MaxExtent};
    pub use crate::map::{MapDescription, RoomTemplate};
    pub use crate::search::{
        AnnealCfg, CancelToken, Door, GenerationObserver, GenerationReport, GeneratorCfg,
        LayoutGenerator, MapLayout, NoopObserver, Room,
    };
}
