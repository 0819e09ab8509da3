use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use std::sync::Arc;

use super::constraints::LayoutConstraint;
use super::types::{Configuration, EnergyData, Layout, ValidityVector};
use crate::cspace::{ConfigurationSpaces, PlacedNeighbour, ShapeId, SpaceKind};
use crate::error::{LayoutError, Result};
use crate::geom::{overlap_area, GridPoint, OrthogonalLine, Point};
use crate::map::MapGraphs;

/// Positions tried per intersection line during greedy placement.
const MAX_POINTS_PER_LINE: i32 = 20;

const OVERLAP_SCALE: f64 = 625.0;
const DISTANCE_SCALE: f64 = 50.0;

/// Contribution of one other placed node to a node's energy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct PairTerm {
    overlap: i64,
    distance: i64,
    invalid: bool,
}

/// Perturbation, greedy placement and energy bookkeeping over layouts of one
/// map.
///
/// Energies are indexed by the constraint graph: bit `i` of a node's validity
/// vector refers to `graphs.constraints.neighbours(node)[i]`.
#[derive(Clone, Copy, Debug)]
pub struct LayoutOps<'a> {
    spaces: &'a ConfigurationSpaces,
    graphs: &'a MapGraphs,
    sigma: f64,
    constraints: &'a [Arc<dyn LayoutConstraint>],
}

impl<'a> LayoutOps<'a> {
    /// `sigma` defaults to the average room size of `spaces`.
    pub fn new(spaces: &'a ConfigurationSpaces, graphs: &'a MapGraphs, sigma: Option<f64>) -> Self {
        let sigma = sigma.unwrap_or_else(|| spaces.average_size()).max(f64::MIN_POSITIVE);
        Self {
            spaces,
            graphs,
            sigma,
            constraints: &[],
        }
    }

    /// Adds layout-wide energy terms to `layout_energy` and validity.
    pub fn with_constraints(mut self, constraints: &'a [Arc<dyn LayoutConstraint>]) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn spaces(&self) -> &'a ConfigurationSpaces {
        self.spaces
    }

    pub fn graphs(&self) -> &'a MapGraphs {
        self.graphs
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Zero exactly when both terms are zero.
    #[inline]
    pub fn energy(&self, overlap: i64, distance: i64) -> f64 {
        (overlap as f64 / (self.sigma * OVERLAP_SCALE)).exp()
            * (distance as f64 / (self.sigma * DISTANCE_SCALE)).exp()
            - 1.0
    }

    #[inline]
    fn kind(&self, node: usize, neighbour_index: usize) -> SpaceKind {
        if self.graphs.is_gapped(node, neighbour_index) {
            SpaceKind::Gapped
        } else {
            SpaceKind::Direct
        }
    }

    /// Bounding-box centre of a placed configuration.
    fn center(&self, c: &Configuration) -> Point {
        self.spaces.shape(c.shape).bounding_rectangle().center() + c.position
    }

    /// Term of `other` in the energy of `node`; `neighbour_index` is the
    /// position of `other` in the constraint neighbours of `node`.
    fn pair_term(
        &self,
        node: usize,
        c: &Configuration,
        neighbour_index: Option<usize>,
        other: &Configuration,
    ) -> PairTerm {
        let overlap = overlap_area(
            self.spaces.shape(c.shape),
            c.position,
            self.spaces.shape(other.shape),
            other.position,
        );
        let Some(i) = neighbour_index else {
            return PairTerm {
                overlap,
                ..PairTerm::default()
            };
        };
        let valid = self.spaces.have_valid_position(
            c.shape,
            c.position,
            other.shape,
            other.position,
            self.kind(node, i),
        );
        let distance = if overlap == 0 && !valid {
            i64::from(self.center(c).manhattan(&self.center(other)))
        } else {
            0
        };
        PairTerm {
            overlap,
            distance,
            invalid: !valid,
        }
    }

    /// Energy data of `node` placed as `c`, computed from scratch against every
    /// other placed node of `layout`.
    pub fn energy_data(&self, layout: &Layout, node: usize, c: &Configuration) -> EnergyData {
        let neighbours = self.graphs.constraints.neighbours(node);
        let mut data = EnergyData::default();
        for (other, oc) in layout.placed().filter(|&(v, _)| v != node) {
            let index = neighbours.iter().position(|&u| u == other);
            let term = self.pair_term(node, c, index, oc);
            data.overlap += term.overlap;
            data.move_distance += term.distance;
            if let Some(i) = index {
                data.validity.set(i, term.invalid);
            }
        }
        data.energy = self.energy(data.overlap, data.move_distance);
        data
    }

    /// Full recompute of every placed node's validity vector.
    pub fn recompute_validity_vectors(&self, layout: &mut Layout) {
        let fresh: Vec<(usize, ValidityVector)> = layout
            .placed()
            .map(|(v, c)| (v, self.energy_data(layout, v, c).validity))
            .collect();
        for (v, validity) in fresh {
            if let Some(c) = layout.get_mut(v) {
                c.energy.validity = validity;
            }
        }
    }

    /// Full recompute of every placed node's energy totals.
    pub fn recompute_energies(&self, layout: &mut Layout) {
        let fresh: Vec<(usize, EnergyData)> = layout
            .placed()
            .map(|(v, c)| (v, self.energy_data(layout, v, c)))
            .collect();
        for (v, data) in fresh {
            if let Some(c) = layout.get_mut(v) {
                c.energy.energy = data.energy;
                c.energy.overlap = data.overlap;
                c.energy.move_distance = data.move_distance;
            }
        }
    }

    /// Validity vectors and energies of all nodes, recomputed from scratch.
    pub fn recompute(&self, layout: &mut Layout) {
        self.recompute_validity_vectors(layout);
        self.recompute_energies(layout);
    }

    /// Places `node` at `shape`/`position` and updates every affected energy.
    ///
    /// All energies of `layout` must be current. Neighbour pairs that are
    /// valid both before and after the move contribute nothing either way and
    /// are skipped.
    pub fn update_layout(&self, layout: &mut Layout, node: usize, shape: ShapeId, position: Point) {
        let old = layout.get(node).copied();
        let mut new = Configuration::new(shape, position);
        let neighbours = self.graphs.constraints.neighbours(node);

        let others: Vec<usize> = layout.placed().map(|(v, _)| v).filter(|&v| v != node).collect();
        for other in others {
            let Some(oc) = layout.get(other).copied() else {
                continue;
            };
            let index = neighbours.iter().position(|&u| u == other);
            if let Some(i) = index {
                let valid_old = old.map_or(true, |c| !c.energy.validity.get(i));
                let valid_new = self.spaces.have_valid_position(
                    shape,
                    position,
                    oc.shape,
                    oc.position,
                    self.kind(node, i),
                );
                if valid_old && valid_new {
                    continue;
                }
            }

            let before = old.map_or(PairTerm::default(), |c| self.pair_term(node, &c, index, &oc));
            let after = self.pair_term(node, &new, index, &oc);
            new.energy.overlap += after.overlap;
            new.energy.move_distance += after.distance;
            if let Some(i) = index {
                new.energy.validity.set(i, after.invalid);
            }
            if before == after {
                continue;
            }

            let Some(target) = layout.get_mut(other) else {
                continue;
            };
            let e = &mut target.energy;
            e.overlap += after.overlap - before.overlap;
            e.move_distance += after.distance - before.distance;
            if let Some(j) = self.graphs.constraints.neighbour_index(other, node) {
                e.validity.set(j, after.invalid);
            }
            e.energy = self.energy(e.overlap, e.move_distance);
        }

        new.energy.energy = self.energy(new.energy.overlap, new.energy.move_distance);
        layout.set(node, new);
    }

    /// Copy of `layout` with `node` moved to `shape`/`position`; energies are
    /// only maintained when `update_energies` is set.
    fn with_node(
        &self,
        layout: &Layout,
        node: usize,
        shape: ShapeId,
        position: Point,
        update_energies: bool,
    ) -> Layout {
        let mut out = layout.clone();
        if update_energies {
            self.update_layout(&mut out, node, shape, position);
        } else {
            let energy = layout.get(node).map(|c| c.energy).unwrap_or_default();
            out.set(
                node,
                Configuration {
                    shape,
                    position,
                    energy,
                },
            );
        }
        out
    }

    /// Swaps the shape of `node` for a different weighted-random one. Unplaced
    /// nodes and nodes with a single shape yield an unchanged copy.
    pub fn perturb_shape<R: Rng + ?Sized>(
        &self,
        layout: &Layout,
        node: usize,
        update_energies: bool,
        rng: &mut R,
    ) -> Layout {
        let Some(current) = layout.get(node).copied() else {
            return layout.clone();
        };
        if !self.spaces.can_perturb_shape(node) {
            return layout.clone();
        }
        match self.spaces.random_shape(node, Some(current.shape), rng) {
            Some(shape) => self.with_node(layout, node, shape, current.position, update_energies),
            None => layout.clone(),
        }
    }

    /// Moves `node` to a random point of the maximum intersection of its
    /// placed neighbours' spaces. Without placed neighbours the copy is
    /// unchanged.
    pub fn perturb_position<R: Rng + ?Sized>(
        &self,
        layout: &Layout,
        node: usize,
        update_energies: bool,
        rng: &mut R,
    ) -> Layout {
        let Some(current) = layout.get(node).copied() else {
            return layout.clone();
        };
        let neighbours = self.placed_neighbours(layout, node);
        let point = self
            .spaces
            .maximum_intersection(current.shape, &neighbours)
            .and_then(|mi| ConfigurationSpaces::random_point(&mi.lines, rng));
        match point {
            Some(position) => self.with_node(layout, node, current.shape, position, update_energies),
            None => layout.clone(),
        }
    }

    /// One annealing proposal restricted to the chain's ordinary rooms.
    pub fn perturb_layout<R: Rng + ?Sized>(
        &self,
        layout: &Layout,
        chain: &[usize],
        shape_chance: f64,
        rng: &mut R,
    ) -> Layout {
        let rooms: Vec<usize> = chain
            .iter()
            .copied()
            .filter(|&v| !self.graphs.is_corridor[v])
            .collect();
        if rng.gen::<f64>() < shape_chance {
            let perturbable: Vec<usize> = rooms
                .iter()
                .copied()
                .filter(|&v| self.spaces.can_perturb_shape(v))
                .collect();
            match perturbable.choose(rng) {
                Some(&v) => self.perturb_shape(layout, v, true, rng),
                None => layout.clone(),
            }
        } else {
            match rooms.choose(rng) {
                Some(&v) => self.perturb_position(layout, v, true, rng),
                None => layout.clone(),
            }
        }
    }

    fn placed_neighbours(&self, layout: &Layout, node: usize) -> Vec<PlacedNeighbour> {
        self.graphs
            .constraints
            .neighbours(node)
            .iter()
            .enumerate()
            .filter_map(|(i, &u)| {
                layout.get(u).map(|c| PlacedNeighbour {
                    shape: c.shape,
                    position: c.position,
                    kind: self.kind(node, i),
                })
            })
            .collect()
    }

    /// Positions of `line` tried during greedy placement: all points in random
    /// order for short lines, an evenly spaced sample plus the end otherwise.
    fn sample_positions<R: Rng + ?Sized>(line: &OrthogonalLine, rng: &mut R) -> Vec<Point> {
        let len = line.length();
        if len <= MAX_POINTS_PER_LINE {
            let mut points: Vec<Point> = line.points().collect();
            points.shuffle(rng);
            return points;
        }
        let stride = (len / (MAX_POINTS_PER_LINE - 1)).max(1);
        (0..MAX_POINTS_PER_LINE - 1)
            .map(|i| line.nth_point(i * stride))
            .chain(std::iter::once(line.to))
            .collect()
    }

    /// Places `node` at the lowest-energy sampled position against its placed
    /// neighbours, stopping at the first zero-energy one. Energies of the
    /// layout are left untouched.
    pub fn add_node_greedily<R: Rng + ?Sized>(
        &self,
        layout: &mut Layout,
        node: usize,
        rng: &mut R,
    ) -> Result<()> {
        let neighbours = self.placed_neighbours(layout, node);
        if neighbours.is_empty() {
            let shape = self
                .spaces
                .random_shape(node, None, rng)
                .ok_or(LayoutError::Ungenerable { node })?;
            layout.set(node, Configuration::new(shape, Point::zeros()));
            return Ok(());
        }

        let mut shapes: Vec<ShapeId> = self
            .spaces
            .shapes_for_node(node)
            .iter()
            .map(|w| w.shape)
            .collect();
        shapes.shuffle(rng);

        let mut best: Option<(f64, ShapeId, Point)> = None;
        'shapes: for shape in shapes {
            let Some(mut mi) = self.spaces.maximum_intersection(shape, &neighbours) else {
                continue;
            };
            mi.lines.shuffle(rng);
            for line in &mi.lines {
                for position in Self::sample_positions(line, rng) {
                    let energy = self
                        .energy_data(layout, node, &Configuration::new(shape, position))
                        .energy;
                    if best.map_or(true, |(e, _, _)| energy < e) {
                        best = Some((energy, shape, position));
                    }
                    if energy <= 0.0 {
                        break 'shapes;
                    }
                }
            }
        }

        let (energy, shape, position) = best.ok_or(LayoutError::Ungenerable { node })?;
        trace!(node, energy, x = position.x, y = position.y, "greedy placement");
        layout.set(node, Configuration::new(shape, position));
        Ok(())
    }

    /// Places a corridor at the first sampled position that satisfies every
    /// placed neighbour without overlap. Returns `false` when none exists.
    fn add_corridor_greedily<R: Rng + ?Sized>(
        &self,
        layout: &mut Layout,
        node: usize,
        rng: &mut R,
    ) -> bool {
        let neighbours = self.placed_neighbours(layout, node);
        if neighbours.is_empty() {
            return false;
        }
        let mut shapes: Vec<ShapeId> = self
            .spaces
            .shapes_for_node(node)
            .iter()
            .map(|w| w.shape)
            .collect();
        shapes.shuffle(rng);

        for shape in shapes {
            let Some(mut mi) = self.spaces.maximum_intersection(shape, &neighbours) else {
                continue;
            };
            if mi.satisfied != neighbours.len() {
                continue;
            }
            mi.lines.shuffle(rng);
            for line in &mi.lines {
                for position in Self::sample_positions(line, rng) {
                    let c = Configuration::new(shape, position);
                    let data = self.energy_data(layout, node, &c);
                    if data.validity.is_empty() && data.energy <= 0.0 {
                        trace!(node, x = position.x, y = position.y, "corridor placed");
                        layout.set(node, c);
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Greedily adds the chain's ordinary rooms, then recomputes everything.
    pub fn add_chain<R: Rng + ?Sized>(
        &self,
        layout: &Layout,
        chain: &[usize],
        rng: &mut R,
    ) -> Result<Layout> {
        let mut out = layout.clone();
        for &v in chain.iter().filter(|&&v| !self.graphs.is_corridor[v]) {
            self.add_node_greedily(&mut out, v, rng)?;
        }
        self.recompute(&mut out);
        Ok(out)
    }

    /// Adds the chain's corridors. `None` if some corridor cannot be placed
    /// validly.
    pub fn try_complete_chain<R: Rng + ?Sized>(
        &self,
        layout: &Layout,
        chain: &[usize],
        rng: &mut R,
    ) -> Option<Layout> {
        let mut out = layout.clone();
        for &v in chain.iter().filter(|&&v| self.graphs.is_corridor[v]) {
            if !self.add_corridor_greedily(&mut out, v, rng) {
                return None;
            }
        }
        self.recompute(&mut out);
        Some(out)
    }

    /// Sum of node energies plus every layout constraint's energy.
    pub fn layout_energy(&self, layout: &Layout) -> f64 {
        layout.energy() + self.constraint_energy(layout)
    }

    fn constraint_energy(&self, layout: &Layout) -> f64 {
        self.constraints.iter().map(|c| c.energy(layout, self)).sum()
    }

    /// Every placed node has all neighbours at valid offsets and zero energy,
    /// and no layout constraint is violated.
    pub fn is_layout_valid(&self, layout: &Layout) -> bool {
        layout
            .placed()
            .all(|(_, c)| c.energy.validity.is_empty() && c.energy.energy <= 0.0)
            && self.constraint_energy(layout) <= 0.0
    }

    /// Sum over `nodes` (all nodes when `None`) of squared centre distances,
    /// times four where the shapes differ. Nodes missing from either layout
    /// are skipped.
    pub fn difference(&self, a: &Layout, b: &Layout, nodes: Option<&[usize]>) -> f64 {
        let term = |v: usize| -> f64 {
            let (Some(ca), Some(cb)) = (a.get(v), b.get(v)) else {
                return 0.0;
            };
            let d = f64::from(self.center(ca).manhattan(&self.center(cb)));
            let factor = if ca.shape == cb.shape { 1.0 } else { 4.0 };
            d * d * factor
        };
        match nodes {
            Some(nodes) => nodes.iter().map(|&v| term(v)).sum(),
            None => (0..a.node_count().min(b.node_count())).map(term).sum(),
        }
    }

    /// Compares the stored energy data against a full recompute.
    pub fn check_consistency(&self, layout: &Layout) -> Result<()> {
        for (v, c) in layout.placed() {
            let fresh = self.energy_data(layout, v, c);
            let stored = c.energy;
            let reason = if fresh.validity != stored.validity {
                Some(format!(
                    "validity {:#b} != {:#b}",
                    stored.validity.bits(),
                    fresh.validity.bits()
                ))
            } else if fresh.overlap != stored.overlap {
                Some(format!("overlap {} != {}", stored.overlap, fresh.overlap))
            } else if fresh.move_distance != stored.move_distance {
                Some(format!(
                    "move distance {} != {}",
                    stored.move_distance, fresh.move_distance
                ))
            } else if fresh.energy != stored.energy {
                Some(format!("energy {} != {}", stored.energy, fresh.energy))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(LayoutError::IncrementalDrift { node: v, reason });
            }
        }
        Ok(())
    }
}
