use std::fmt;

use super::ops::LayoutOps;
use super::types::Layout;
use crate::geom::GridRectangle;

/// Extra energy term over a whole layout, added on top of the node energies.
///
/// Must be non-negative; zero means the layout satisfies the constraint.
/// Evaluated from scratch for every proposal, so keep it cheap.
pub trait LayoutConstraint: fmt::Debug + Send + Sync {
    fn energy(&self, layout: &Layout, ops: &LayoutOps<'_>) -> f64;
}

/// Keeps the bounding box of all placed rooms within `width` x `height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaxExtent {
    pub width: i32,
    pub height: i32,
}

impl MaxExtent {
    /// Bounding box of every placed room, `None` for an empty layout.
    pub fn bounds(layout: &Layout, ops: &LayoutOps<'_>) -> Option<GridRectangle> {
        layout
            .placed()
            .map(|(_, c)| {
                ops.spaces()
                    .shape(c.shape)
                    .bounding_rectangle()
                    .shift(c.position)
            })
            .reduce(|acc, r| GridRectangle::new(acc.a.inf(&r.a), acc.b.sup(&r.b)))
    }
}

impl LayoutConstraint for MaxExtent {
    /// Excess width plus excess height, scaled like a move distance.
    fn energy(&self, layout: &Layout, ops: &LayoutOps<'_>) -> f64 {
        let Some(bounds) = Self::bounds(layout, ops) else {
            return 0.0;
        };
        let excess = (bounds.width() - self.width).max(0) + (bounds.height() - self.height).max(0);
        ops.energy(0, i64::from(excess))
    }
}
