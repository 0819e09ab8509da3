//! Configuration spaces: where one room may sit relative to another.
//!
//! Purpose
//! - Precompute, for every ordered pair of room template instances, the exact
//!   set of translations at which the two rooms share a full door without
//!   overlapping.
//!
//! Why this design
//! - Instances get dense `ShapeId`s so spaces live in plain nested vectors.
//! - Each space is a list of orthogonal lines with every translation covered
//!   once, which makes uniform sampling a matter of counting points.
//! - Corridor maps add a second, gapped table where the two rooms keep a
//!   corridor-sized distance instead of touching.
//!
//! Split
//! - `types.rs` (data), `build.rs` (instances and per-pair spaces),
//!   `query.rs` (lookups, maximum intersection, sampling).

mod build;
mod query;
mod types;

pub use build::{configuration_space, room_template_instances};
pub use query::ConfigurationSpaces;
pub use types::{
    ConfigurationSpace, MaxIntersection, PlacedNeighbour, ReverseDoor, RoomTemplateInstance,
    ShapeId, SpaceKind, WeightedShape,
};
