//! Lookups and sampling over generated configuration spaces.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use super::types::{
    ConfigurationSpace, MaxIntersection, PlacedNeighbour, RoomTemplateInstance, ShapeId, SpaceKind,
    WeightedShape,
};
use crate::geom::{intersect_sets, point_count, set_contains, OrthogonalLine, Point, Polygon};

/// Instance table plus the direct (and optionally gapped) pairwise spaces.
///
/// `direct[m][f]` holds the translations of instance `m` relative to instance
/// `f` at which a door of `m` touches a door of `f`.
#[derive(Clone, Debug)]
pub struct ConfigurationSpaces {
    pub(super) instances: Vec<RoomTemplateInstance>,
    pub(super) direct: Vec<Vec<ConfigurationSpace>>,
    pub(super) gapped: Option<Vec<Vec<ConfigurationSpace>>>,
    pub(super) shapes_for_nodes: Vec<Vec<WeightedShape>>,
    pub(super) average_size: f64,
}

impl ConfigurationSpaces {
    #[inline]
    pub fn instance(&self, shape: ShapeId) -> &RoomTemplateInstance {
        &self.instances[shape.0]
    }

    #[inline]
    pub fn shape(&self, shape: ShapeId) -> &Polygon {
        &self.instances[shape.0].shape
    }

    pub fn instances(&self) -> &[RoomTemplateInstance] {
        &self.instances
    }

    /// Space of `moving` around `fixed`. Maps without corridor offsets have no
    /// gapped table; `Gapped` then reads the direct one.
    pub fn space(&self, moving: ShapeId, fixed: ShapeId, kind: SpaceKind) -> &ConfigurationSpace {
        match (kind, &self.gapped) {
            (SpaceKind::Gapped, Some(gapped)) => &gapped[moving.0][fixed.0],
            _ => &self.direct[moving.0][fixed.0],
        }
    }

    pub fn shapes_for_node(&self, node: usize) -> &[WeightedShape] {
        &self.shapes_for_nodes[node]
    }

    pub fn can_perturb_shape(&self, node: usize) -> bool {
        self.shapes_for_nodes[node].len() >= 2
    }

    /// Weighted draw among the node's shapes, skipping `except` if given.
    pub fn random_shape<R: Rng + ?Sized>(
        &self,
        node: usize,
        except: Option<ShapeId>,
        rng: &mut R,
    ) -> Option<ShapeId> {
        let candidates: Vec<&WeightedShape> = self.shapes_for_nodes[node]
            .iter()
            .filter(|w| Some(w.shape) != except)
            .collect();
        let dist = WeightedIndex::new(candidates.iter().map(|w| w.weight)).ok()?;
        Some(candidates[dist.sample(rng)].shape)
    }

    /// Whether `moving` at `moving_pos` sits on the space around `fixed` at `fixed_pos`.
    pub fn have_valid_position(
        &self,
        moving: ShapeId,
        moving_pos: Point,
        fixed: ShapeId,
        fixed_pos: Point,
        kind: SpaceKind,
    ) -> bool {
        set_contains(&self.space(moving, fixed, kind).lines, moving_pos - fixed_pos)
    }

    /// Positions of `shape` satisfying as many placed neighbours as possible.
    ///
    /// Subsets are tried from all neighbours down to single ones; the first
    /// non-empty intersection wins. `None` only when every single space is
    /// empty (or there are no neighbours).
    pub fn maximum_intersection(
        &self,
        shape: ShapeId,
        neighbours: &[PlacedNeighbour],
    ) -> Option<MaxIntersection> {
        let shifted: Vec<Vec<OrthogonalLine>> = neighbours
            .iter()
            .map(|n| {
                self.space(shape, n.shape, n.kind)
                    .lines
                    .iter()
                    .map(|l| l.shift(n.position))
                    .collect()
            })
            .collect();

        for size in (1..=shifted.len()).rev() {
            for subset in Combinations::new(shifted.len(), size) {
                let mut acc: Option<Vec<OrthogonalLine>> = None;
                for &i in &subset {
                    let next = match acc {
                        None => shifted[i].clone(),
                        Some(prev) => intersect_sets(&prev, &shifted[i]),
                    };
                    let empty = next.is_empty();
                    acc = Some(next);
                    if empty {
                        break;
                    }
                }
                if let Some(lines) = acc.filter(|l| !l.is_empty()) {
                    return Some(MaxIntersection {
                        lines,
                        satisfied: size,
                    });
                }
            }
        }
        None
    }

    /// Uniform point over every lattice point of `lines`.
    pub fn random_point<R: Rng + ?Sized>(lines: &[OrthogonalLine], rng: &mut R) -> Option<Point> {
        let total = point_count(lines);
        if total == 0 {
            return None;
        }
        let mut k = rng.gen_range(0..total);
        for line in lines {
            let n = i64::from(line.length()) + 1;
            if k < n {
                return Some(line.nth_point(k as i32));
            }
            k -= n;
        }
        None
    }

    /// Mean of `(width + height) / 2` over all instance bounding boxes.
    pub fn average_size(&self) -> f64 {
        self.average_size
    }
}

/// Lexicographic `k`-subsets of `0..n`.
struct Combinations {
    n: usize,
    idx: Vec<usize>,
    done: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            idx: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let out = self.idx.clone();
        let k = self.idx.len();
        // Rightmost index that can still move.
        match (0..k).rev().find(|&i| self.idx[i] < self.n - k + i) {
            Some(i) => {
                self.idx[i] += 1;
                for j in i + 1..k {
                    self.idx[j] = self.idx[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::Combinations;

    #[test]
    fn combinations_enumerate_in_order() {
        let all: Vec<Vec<usize>> = Combinations::new(4, 2).collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(Combinations::new(3, 3).count(), 1);
        assert_eq!(Combinations::new(2, 3).count(), 0);
    }
}
