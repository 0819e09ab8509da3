//! Integer orthogonal geometry: points, lines, polygons and overlap queries.
//!
//! Purpose
//! - Exact lattice arithmetic for room outlines. Nothing here uses floats
//!   except `GridPoint::euclidean`.
//!
//! Why this design
//! - Polygons are immutable and validated once; transformed copies are new
//!   polygons. A cached rectangle partition keeps overlap queries simple and
//!   symmetric by construction.
//! - Line sets are plain `Vec<OrthogonalLine>` read as point sets; the helpers
//!   in `lines` merge, de-duplicate and intersect them.
//!
//! Split
//! - `point.rs` (points and the 8 grid symmetries), `line.rs` (segments),
//!   `polygon.rs` (polygons and rectangles), `overlap.rs` (pairwise queries),
//!   `lines.rs` (line-set utilities).

mod line;
mod lines;
mod overlap;
mod point;
mod polygon;

pub use line::{Direction, OrthogonalLine};
pub use lines::{intersect_sets, merge_lines, point_count, remove_intersections, set_contains};
pub use overlap::{overlap, overlap_along_line, overlap_area, touch, touch_with_min_length};
pub use point::{GridPoint, Point, Transformation};
pub use polygon::{GridRectangle, Polygon};

#[cfg(test)]
mod tests;
