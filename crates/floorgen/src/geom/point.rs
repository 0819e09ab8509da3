//! Integer lattice points and the eight grid symmetries.

use nalgebra::{Matrix2, Vector2};

use crate::error::{LayoutError, Result};

/// Lattice point / translation vector.
pub type Point = Vector2<i32>;

/// The eight symmetries of the square grid (four rotations, four reflections).
///
/// Rotations are clockwise, matching `GridPoint::rotate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transformation {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    MirrorX,
    MirrorY,
    Diagonal13,
    Diagonal24,
}

impl Transformation {
    pub const ALL: [Transformation; 8] = [
        Transformation::Identity,
        Transformation::Rotate90,
        Transformation::Rotate180,
        Transformation::Rotate270,
        Transformation::MirrorX,
        Transformation::MirrorY,
        Transformation::Diagonal13,
        Transformation::Diagonal24,
    ];

    pub const ROTATIONS: [Transformation; 4] = [
        Transformation::Identity,
        Transformation::Rotate90,
        Transformation::Rotate180,
        Transformation::Rotate270,
    ];

    /// Matrix acting on column vectors.
    pub fn matrix(self) -> Matrix2<i32> {
        match self {
            Self::Identity => Matrix2::new(1, 0, 0, 1),
            Self::Rotate90 => Matrix2::new(0, 1, -1, 0),
            Self::Rotate180 => Matrix2::new(-1, 0, 0, -1),
            Self::Rotate270 => Matrix2::new(0, -1, 1, 0),
            Self::MirrorX => Matrix2::new(1, 0, 0, -1),
            Self::MirrorY => Matrix2::new(-1, 0, 0, 1),
            Self::Diagonal13 => Matrix2::new(0, 1, 1, 0),
            Self::Diagonal24 => Matrix2::new(0, -1, -1, 0),
        }
    }

    /// Reflections flip orientation, so polygons must reverse their point order.
    pub fn is_mirror(self) -> bool {
        matches!(
            self,
            Self::MirrorX | Self::MirrorY | Self::Diagonal13 | Self::Diagonal24
        )
    }

    /// Clockwise rotation by a multiple of 90 degrees.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(LayoutError::input(format!(
                "rotation must be a multiple of 90 degrees, got {degrees}"
            )));
        }
        Ok(Self::ROTATIONS[(degrees / 90).rem_euclid(4) as usize])
    }
}

/// Grid helpers on `Point`.
pub trait GridPoint {
    fn transform(&self, t: Transformation) -> Point;
    /// Clockwise rotation about the origin by `quarter_turns * 90` degrees.
    fn rotate(&self, quarter_turns: i32) -> Point;
    fn manhattan(&self, other: &Point) -> i32;
    fn euclidean(&self, other: &Point) -> f64;
    fn chebyshev(&self, other: &Point) -> i32;
    fn elementwise(&self, other: &Point) -> Point;
}

impl GridPoint for Point {
    #[inline]
    fn transform(&self, t: Transformation) -> Point {
        t.matrix() * self
    }

    #[inline]
    fn rotate(&self, quarter_turns: i32) -> Point {
        self.transform(Transformation::ROTATIONS[quarter_turns.rem_euclid(4) as usize])
    }

    #[inline]
    fn manhattan(&self, other: &Point) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    #[inline]
    fn euclidean(&self, other: &Point) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    fn chebyshev(&self, other: &Point) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    #[inline]
    fn elementwise(&self, other: &Point) -> Point {
        self.component_mul(other)
    }
}
