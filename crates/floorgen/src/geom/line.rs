//! Axis-aligned lattice segments.

use super::point::{GridPoint, Point, Transformation};
use crate::error::{LayoutError, Result};

/// One of the four axis directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
    ];

    pub fn vector(self) -> Point {
        match self {
            Self::Top => Point::new(0, 1),
            Self::Right => Point::new(1, 0),
            Self::Bottom => Point::new(0, -1),
            Self::Left => Point::new(-1, 0),
        }
    }

    /// Direction of a non-zero axis-aligned vector.
    pub fn of(v: Point) -> Option<Self> {
        match (v.x.signum(), v.y.signum()) {
            (0, 1) => Some(Self::Top),
            (1, 0) => Some(Self::Right),
            (0, -1) => Some(Self::Bottom),
            (-1, 0) => Some(Self::Left),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }

    /// Normal pointing to the left of the direction. For an edge of a clockwise
    /// polygon this is the outward normal.
    pub fn outward_normal(self) -> Point {
        let v = self.vector();
        Point::new(-v.y, v.x)
    }

    pub fn transform(self, t: Transformation) -> Self {
        // Unit vectors map to unit vectors, so `of` always succeeds.
        Self::of(self.vector().transform(t)).unwrap_or(self)
    }
}

/// Closed lattice segment from `from` to `to` heading `direction`.
///
/// Degenerate (single point) lines keep an explicit direction so they still
/// know which polygon side they belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrthogonalLine {
    pub from: Point,
    pub to: Point,
    pub direction: Direction,
}

impl OrthogonalLine {
    /// Segment between two distinct axis-aligned points.
    pub fn between(from: Point, to: Point) -> Result<Self> {
        let direction = Direction::of(to - from).ok_or_else(|| {
            LayoutError::input(format!(
                "points ({}, {}) and ({}, {}) do not form an axis-aligned segment",
                from.x, from.y, to.x, to.y
            ))
        })?;
        Ok(Self {
            from,
            to,
            direction,
        })
    }

    /// Segment with a known direction; `to - from` must be a non-negative
    /// multiple of the direction vector.
    pub fn new(from: Point, to: Point, direction: Direction) -> Self {
        debug_assert!(from == to || Direction::of(to - from) == Some(direction));
        Self {
            from,
            to,
            direction,
        }
    }

    pub fn point(p: Point, direction: Direction) -> Self {
        Self::new(p, p, direction)
    }

    /// Number of unit steps; a degenerate line has length 0.
    #[inline]
    pub fn length(&self) -> i32 {
        self.from.manhattan(&self.to)
    }

    #[inline]
    pub fn direction_vector(&self) -> Point {
        self.direction.vector()
    }

    #[inline]
    pub fn nth_point(&self, n: i32) -> Point {
        self.from + self.direction_vector() * n
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..=self.length()).map(move |i| self.nth_point(i))
    }

    /// Index of `p` on the line, if it lies on it.
    pub fn contains(&self, p: Point) -> Option<i32> {
        let d = self.direction_vector();
        let off = p - self.from;
        let along = off.dot(&d);
        if off != d * along || along < 0 || along > self.length() {
            return None;
        }
        Some(along)
    }

    pub fn shift(&self, v: Point) -> Self {
        Self::new(self.from + v, self.to + v, self.direction)
    }

    pub fn transform(&self, t: Transformation) -> Self {
        Self::new(
            self.from.transform(t),
            self.to.transform(t),
            self.direction.transform(t),
        )
    }

    /// Clockwise rotation by a multiple of 90 degrees.
    pub fn rotate(&self, degrees: i32) -> Result<Self> {
        Ok(self.transform(Transformation::from_degrees(degrees)?))
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.to, self.from, self.direction.opposite())
    }

    /// Same point set with direction `Right` or `Top`.
    pub fn normalized(&self) -> Self {
        match self.direction {
            Direction::Left | Direction::Bottom => self.reversed(),
            _ => *self,
        }
    }

    /// Fixed coordinate and the inclusive range of the varying one.
    pub(crate) fn span(&self) -> (i32, i32, i32) {
        let n = self.normalized();
        if self.direction.is_horizontal() {
            (n.from.y, n.from.x, n.to.x)
        } else {
            (n.from.x, n.from.y, n.to.y)
        }
    }

    /// Common points of two lines: a collinear overlap or a single crossing.
    pub fn intersection(&self, other: &OrthogonalLine) -> Option<OrthogonalLine> {
        let (c1, lo1, hi1) = self.span();
        let (c2, lo2, hi2) = other.span();
        if self.direction.is_horizontal() == other.direction.is_horizontal() {
            if c1 != c2 {
                return None;
            }
            let (lo, hi) = (lo1.max(lo2), hi1.min(hi2));
            if lo > hi {
                return None;
            }
            let (from, to, dir) = if self.direction.is_horizontal() {
                (Point::new(lo, c1), Point::new(hi, c1), Direction::Right)
            } else {
                (Point::new(c1, lo), Point::new(c1, hi), Direction::Top)
            };
            return Some(Self::new(from, to, dir));
        }
        // c2 is the fixed coordinate of the other line, so it varies along ours.
        if (lo1..=hi1).contains(&c2) && (lo2..=hi2).contains(&c1) {
            let p = if self.direction.is_horizontal() {
                Point::new(c2, c1)
            } else {
                Point::new(c1, c2)
            };
            return Some(Self::point(p, self.normalized().direction));
        }
        None
    }
}
