//! Data types for configuration spaces.

use crate::doors::DoorLine;
use crate::geom::{OrthogonalLine, Polygon, Transformation};

/// Dense index of a room template instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub usize);

/// One symmetry-distinct realization of a registered template.
#[derive(Clone, Debug)]
pub struct RoomTemplateInstance {
    /// Index into `MapDescription::templates`.
    pub template: usize,
    /// Normalized outline (bounding box at the origin).
    pub shape: Polygon,
    pub doors: Vec<DoorLine>,
    /// Every transformation of the template that yields this instance.
    pub transformations: Vec<Transformation>,
}

/// Door pair behind one candidate line of a configuration space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReverseDoor {
    /// The line before overlap clipping.
    pub line: OrthogonalLine,
    pub moving: DoorLine,
    pub fixed: DoorLine,
}

/// Translations of a moving instance relative to a fixed one that align an
/// equal-length door pair without overlap. `lines` cover each translation once.
#[derive(Clone, Debug, Default)]
pub struct ConfigurationSpace {
    pub lines: Vec<OrthogonalLine>,
    pub reverse_doors: Vec<ReverseDoor>,
}

/// Which table to read for a pair of nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpaceKind {
    /// Doors touch directly.
    Direct,
    /// Doors face each other across a corridor offset.
    Gapped,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightedShape {
    pub shape: ShapeId,
    pub weight: f64,
}

/// Result of a maximum-intersection query.
#[derive(Clone, Debug)]
pub struct MaxIntersection {
    pub lines: Vec<OrthogonalLine>,
    /// How many neighbour constraints the lines satisfy jointly.
    pub satisfied: usize,
}

/// A placed neighbour as seen by a maximum-intersection query.
#[derive(Clone, Copy, Debug)]
pub struct PlacedNeighbour {
    pub shape: ShapeId,
    pub position: crate::geom::Point,
    pub kind: SpaceKind,
}
