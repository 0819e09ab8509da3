//! Immutable clockwise orthogonal polygons.
//!
//! Purpose
//! - Room outlines. All area and overlap queries go through a cached partition
//!   into vertical slabs, so the overlap kernel only ever compares rectangles.
//!
//! Invariants (checked by `Polygon::new`)
//! - at least 4 points, consecutive points differ;
//! - every edge is axis-aligned, no two consecutive edges share an axis;
//! - clockwise order (`sum (x_i - x_{i-1}) * (y_i + y_{i-1}) > 0`).

use std::hash::{Hash, Hasher};

use super::line::OrthogonalLine;
use super::point::{GridPoint, Point, Transformation};
use crate::error::{LayoutError, Result};

/// Closed axis-aligned rectangle with min corner `a` and max corner `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridRectangle {
    pub a: Point,
    pub b: Point,
}

impl GridRectangle {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.b.x - self.a.x
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.b.y - self.a.y
    }

    #[inline]
    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.height())
    }

    /// Integer midpoint `(a + b) / 2`.
    #[inline]
    pub fn center(&self) -> Point {
        (self.a + self.b) / 2
    }

    #[inline]
    pub fn shift(&self, v: Point) -> Self {
        Self::new(self.a + v, self.b + v)
    }

    /// Closed intersection; may be degenerate (a segment or a point).
    pub fn intersection(&self, other: &GridRectangle) -> Option<GridRectangle> {
        let a = Point::new(self.a.x.max(other.a.x), self.a.y.max(other.a.y));
        let b = Point::new(self.b.x.min(other.b.x), self.b.y.min(other.b.y));
        (a.x <= b.x && a.y <= b.y).then(|| GridRectangle::new(a, b))
    }

    /// Area of the interior intersection.
    #[inline]
    pub fn overlap_area(&self, other: &GridRectangle) -> i64 {
        self.intersection(other).map_or(0, |r| r.area())
    }
}

/// Orthogonal simple polygon with clockwise integer vertices.
#[derive(Clone, Debug)]
pub struct Polygon {
    points: Vec<Point>,
    bounds: GridRectangle,
    rects: Vec<GridRectangle>,
    hash: i32,
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl Eq for Polygon {}

impl Hash for Polygon {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash);
    }
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Result<Self> {
        check_integrity(&points)?;
        let bounds = bounding_rectangle(&points);
        let rects = partition(&points);
        let hash = hash_points(&points);
        Ok(Self {
            points,
            bounds,
            rects,
            hash,
        })
    }

    pub fn rectangle(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(LayoutError::polygon(format!(
                "rectangle sides must be positive, got {width}x{height}"
            )));
        }
        Self::new(vec![
            Point::new(0, 0),
            Point::new(0, height),
            Point::new(width, height),
            Point::new(width, 0),
        ])
    }

    pub fn square(side: i32) -> Result<Self> {
        Self::rectangle(side, side)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn bounding_rectangle(&self) -> GridRectangle {
        self.bounds
    }

    /// Disjoint-interior rectangles covering the polygon.
    pub fn rectangles(&self) -> &[GridRectangle] {
        &self.rects
    }

    pub fn area(&self) -> i64 {
        self.rects.iter().map(GridRectangle::area).sum()
    }

    pub fn hash_value(&self) -> i32 {
        self.hash
    }

    /// Edges in traversal order, starting with the closing edge `last -> first`.
    pub fn lines(&self) -> Vec<OrthogonalLine> {
        let n = self.points.len();
        (0..n)
            .filter_map(|i| {
                let prev = self.points[(i + n - 1) % n];
                OrthogonalLine::between(prev, self.points[i]).ok()
            })
            .collect()
    }

    pub fn translate(&self, v: Point) -> Self {
        let points: Vec<Point> = self.points.iter().map(|p| p + v).collect();
        Self {
            hash: hash_points(&points),
            points,
            bounds: self.bounds.shift(v),
            rects: self.rects.iter().map(|r| r.shift(v)).collect(),
        }
    }

    pub fn scale(&self, factor: Point) -> Result<Self> {
        if factor.x <= 0 || factor.y <= 0 {
            return Err(LayoutError::polygon(
                "both components of a scale factor must be positive",
            ));
        }
        Self::new(self.points.iter().map(|p| p.elementwise(&factor)).collect())
    }

    /// Clockwise rotation by a multiple of 90 degrees.
    pub fn rotate(&self, degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(LayoutError::polygon(format!(
                "rotation must be a multiple of 90 degrees, got {degrees}"
            )));
        }
        self.transform(Transformation::from_degrees(degrees)?)
    }

    /// Applies a grid symmetry. Reflections keep the first point and reverse
    /// the rest so the result stays clockwise.
    pub fn transform(&self, t: Transformation) -> Result<Self> {
        let mut pts: Vec<Point> = self.points.iter().map(|p| p.transform(t)).collect();
        if t.is_mirror() {
            pts[1..].reverse();
        }
        Self::new(pts)
    }

    /// Translated so the bounding box starts at the origin, and rotated in
    /// point order so the first point is the lowest of the leftmost points.
    pub fn normalized(&self) -> Self {
        let moved = self.translate(-self.bounds.a);
        let start = moved
            .points
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| (p.x, p.y))
            .map_or(0, |(i, _)| i);
        if start == 0 {
            return moved;
        }
        let mut pts = moved.points.clone();
        pts.rotate_left(start);
        Self::new(pts).unwrap_or(moved)
    }
}

fn check_integrity(points: &[Point]) -> Result<()> {
    let n = points.len();
    if n < 4 {
        return Err(LayoutError::polygon("a polygon must have at least 4 points"));
    }
    let mut prev = points[n - 1];
    for &p in points {
        if p == prev {
            return Err(LayoutError::polygon("consecutive points must differ"));
        }
        if p.x != prev.x && p.y != prev.y {
            return Err(LayoutError::polygon(
                "all edges must be parallel to one of the axes",
            ));
        }
        prev = p;
    }
    for i in 0..n {
        let (p1, p2, p3) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
        if (p1.x == p2.x && p2.x == p3.x) || (p1.y == p2.y && p2.y == p3.y) {
            return Err(LayoutError::polygon(
                "no two adjacent edges can be both horizontal or both vertical",
            ));
        }
    }
    let mut prev = points[n - 1];
    let mut sum = 0i64;
    for &p in points {
        sum += i64::from(p.x - prev.x) * i64::from(p.y + prev.y);
        prev = p;
    }
    if sum <= 0 {
        return Err(LayoutError::polygon("points must be in clockwise order"));
    }
    Ok(())
}

fn hash_points(points: &[Point]) -> i32 {
    points.iter().fold(17i32, |h, p| {
        h.wrapping_mul(23).wrapping_add(p.x).wrapping_add(p.y)
    })
}

fn bounding_rectangle(points: &[Point]) -> GridRectangle {
    let (mut a, mut b) = (points[0], points[0]);
    for p in points {
        a = Point::new(a.x.min(p.x), a.y.min(p.y));
        b = Point::new(b.x.max(p.x), b.y.max(p.y));
    }
    GridRectangle::new(a, b)
}

/// Vertical-slab decomposition: between consecutive distinct x coordinates the
/// horizontal edges crossing the slab alternate between entering and leaving
/// the polygon (even-odd rule).
fn partition(points: &[Point]) -> Vec<GridRectangle> {
    let n = points.len();
    let mut xs: Vec<i32> = points.iter().map(|p| p.x).collect();
    xs.sort_unstable();
    xs.dedup();

    let horizontals: Vec<(i32, i32, i32)> = (0..n)
        .filter_map(|i| {
            let (p, q) = (points[i], points[(i + 1) % n]);
            (p.y == q.y).then(|| (p.y, p.x.min(q.x), p.x.max(q.x)))
        })
        .collect();

    let mut rects = Vec::new();
    for w in xs.windows(2) {
        let (x0, x1) = (w[0], w[1]);
        let mut ys: Vec<i32> = horizontals
            .iter()
            .filter(|(_, lo, hi)| *lo <= x0 && x1 <= *hi)
            .map(|(y, _, _)| *y)
            .collect();
        ys.sort_unstable();
        for pair in ys.chunks_exact(2) {
            rects.push(GridRectangle::new(
                Point::new(x0, pair[0]),
                Point::new(x1, pair[1]),
            ));
        }
    }
    rects
}
