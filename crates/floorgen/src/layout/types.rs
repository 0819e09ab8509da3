use crate::cspace::ShapeId;
use crate::geom::Point;

/// Bit `i` set: the `i`-th constraint neighbour sits at an invalid offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ValidityVector(u32);

impl ValidityVector {
    pub const EMPTY: ValidityVector = ValidityVector(0);

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn get(self, i: usize) -> bool {
        self.0 & (1 << i) != 0
    }

    #[inline]
    pub fn set(&mut self, i: usize, invalid: bool) {
        if invalid {
            self.0 |= 1 << i;
        } else {
            self.0 &= !(1 << i);
        }
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Per-node energy bookkeeping.
///
/// `overlap` and `move_distance` are integer totals over all other placed
/// nodes; `energy` is derived from them, so an incremental and a full
/// recompute agree exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnergyData {
    pub energy: f64,
    pub overlap: i64,
    pub move_distance: i64,
    pub validity: ValidityVector,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Configuration {
    pub shape: ShapeId,
    pub position: Point,
    pub energy: EnergyData,
}

impl Configuration {
    pub fn new(shape: ShapeId, position: Point) -> Self {
        Self {
            shape,
            position,
            energy: EnergyData::default(),
        }
    }
}

/// Partial or full placement of the constraint graph's nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    nodes: Vec<Option<Configuration>>,
}

impl Layout {
    pub fn new(node_count: usize) -> Self {
        Self {
            nodes: vec![None; node_count],
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn get(&self, node: usize) -> Option<&Configuration> {
        self.nodes[node].as_ref()
    }

    #[inline]
    pub fn is_placed(&self, node: usize) -> bool {
        self.nodes[node].is_some()
    }

    pub fn set(&mut self, node: usize, configuration: Configuration) {
        self.nodes[node] = Some(configuration);
    }

    pub(crate) fn get_mut(&mut self, node: usize) -> Option<&mut Configuration> {
        self.nodes[node].as_mut()
    }

    /// `(node, configuration)` for every placed node, in node order.
    pub fn placed(&self) -> impl Iterator<Item = (usize, &Configuration)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (i, c)))
    }

    pub fn placed_count(&self) -> usize {
        self.nodes.iter().filter(|c| c.is_some()).count()
    }

    /// Sum of node energies.
    pub fn energy(&self) -> f64 {
        self.placed().map(|(_, c)| c.energy.energy).sum()
    }
}
