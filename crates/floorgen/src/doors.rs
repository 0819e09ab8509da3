//! Door modes and door lines.
//!
//! A `DoorLine` is the set of admissible door *start* points on one polygon
//! side: a door starting at `p` occupies the segment `[p, p + length * dir]`,
//! where `dir` is the direction of the side in clockwise traversal.

use std::collections::BTreeMap;

use crate::error::{LayoutError, Result};
use crate::geom::{merge_lines, Direction, GridPoint, OrthogonalLine, Point, Polygon, Transformation};

/// How doors are placed on a room outline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DoorMode {
    /// Doors of `door_length` anywhere along a side, at least
    /// `corner_distance` away from both corners of that side.
    Overlap {
        door_length: i32,
        corner_distance: i32,
    },
    /// Exactly the listed door segments; each must lie on a polygon side.
    Specific { doors: Vec<OrthogonalLine> },
}

impl DoorMode {
    pub fn overlap(door_length: i32, corner_distance: i32) -> Result<Self> {
        if door_length <= 0 {
            return Err(LayoutError::input(format!(
                "door length must be positive, got {door_length}"
            )));
        }
        if corner_distance < 0 {
            return Err(LayoutError::input(format!(
                "corner distance must not be negative, got {corner_distance}"
            )));
        }
        Ok(Self::Overlap {
            door_length,
            corner_distance,
        })
    }

    pub fn specific(doors: Vec<OrthogonalLine>) -> Self {
        Self::Specific { doors }
    }

    /// Door lines of `polygon` under this mode.
    pub fn door_lines(&self, polygon: &Polygon) -> Result<Vec<DoorLine>> {
        match self {
            Self::Overlap {
                door_length,
                corner_distance,
            } => {
                if *door_length <= 0 || *corner_distance < 0 {
                    return Err(LayoutError::input(
                        "overlap door mode needs a positive length and a non-negative corner distance",
                    ));
                }
                Ok(overlap_door_lines(polygon, *door_length, *corner_distance))
            }
            Self::Specific { doors } => specific_door_lines(polygon, doors),
        }
    }
}

/// Start points of doors of a fixed `length` along one polygon side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DoorLine {
    pub line: OrthogonalLine,
    pub length: i32,
}

impl DoorLine {
    pub fn new(line: OrthogonalLine, length: i32) -> Self {
        Self { line, length }
    }

    pub fn direction(&self) -> Direction {
        self.line.direction
    }

    /// The door segment that starts at `start`.
    pub fn door_at(&self, start: Point) -> OrthogonalLine {
        OrthogonalLine::new(
            start,
            start + self.line.direction_vector() * self.length,
            self.line.direction,
        )
    }

    pub fn shift(&self, v: Point) -> Self {
        Self::new(self.line.shift(v), self.length)
    }

    /// Image under a grid symmetry. Reflections reverse the traversal of the
    /// polygon, so the line is re-anchored at the other end of each door.
    pub fn transform(&self, t: Transformation) -> Self {
        if !t.is_mirror() {
            return Self::new(self.line.transform(t), self.length);
        }
        let d = self.line.direction_vector().transform(t) * self.length;
        let from = self.line.to.transform(t) + d;
        let to = self.line.from.transform(t) + d;
        let direction = self.line.direction.transform(t).opposite();
        Self::new(OrthogonalLine::new(from, to, direction), self.length)
    }

    fn key(&self) -> (i32, i32, i32, i32, Direction, i32) {
        let l = &self.line;
        (l.from.x, l.from.y, l.to.x, l.to.y, l.direction, self.length)
    }
}

/// Order-independent equality of two door-line sets.
pub fn door_sets_equal(a: &[DoorLine], b: &[DoorLine]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut ka: Vec<_> = a.iter().map(DoorLine::key).collect();
    let mut kb: Vec<_> = b.iter().map(DoorLine::key).collect();
    ka.sort_unstable();
    kb.sort_unstable();
    ka == kb
}

/// Merges collinear door lines with the same direction and door length whose
/// start ranges overlap or are adjacent.
pub fn merge_door_lines(lines: &[DoorLine]) -> Vec<DoorLine> {
    let mut groups: BTreeMap<(Direction, i32), Vec<OrthogonalLine>> = BTreeMap::new();
    for dl in lines {
        groups
            .entry((dl.direction(), dl.length))
            .or_default()
            .push(dl.line);
    }

    let mut out = Vec::with_capacity(lines.len());
    for ((direction, length), group) in groups {
        for line in merge_lines(&group) {
            let line = if line.direction == direction {
                line
            } else {
                line.reversed()
            };
            out.push(DoorLine::new(line, length));
        }
    }
    out
}

fn overlap_door_lines(polygon: &Polygon, length: i32, corner: i32) -> Vec<DoorLine> {
    polygon
        .lines()
        .into_iter()
        .filter_map(|edge| {
            let n = edge.length();
            if n - 2 * corner - length < 0 {
                return None;
            }
            let line = OrthogonalLine::new(
                edge.nth_point(corner),
                edge.nth_point(n - corner - length),
                edge.direction,
            );
            Some(DoorLine::new(line, length))
        })
        .collect()
}

fn specific_door_lines(polygon: &Polygon, doors: &[OrthogonalLine]) -> Result<Vec<DoorLine>> {
    let edges = polygon.lines();
    doors
        .iter()
        .map(|door| {
            let length = door.length();
            if length == 0 {
                return Err(LayoutError::input("a door must have a positive length"));
            }
            edges
                .iter()
                .find_map(|edge| {
                    let i = edge.contains(door.from)?;
                    let j = edge.contains(door.to)?;
                    let start = edge.nth_point(i.min(j));
                    Some(DoorLine::new(
                        OrthogonalLine::point(start, edge.direction),
                        length,
                    ))
                })
                .ok_or_else(|| {
                    LayoutError::input(format!(
                        "door ({}, {})-({}, {}) does not lie on a side of the polygon",
                        door.from.x, door.from.y, door.to.x, door.to.y
                    ))
                })
        })
        .collect()
}
