//! Chain decomposition: the order in which rooms are laid out.
//!
//! A chain is a list of node indices placed together. Every node of a chain
//! has a neighbour that is covered by an earlier chain or appears earlier in
//! the same chain (except the very first node), so greedy placement always
//! has something to attach to.
//!
//! `BreadthFirstChains` prefers short cycles: it starts with the shortest
//! fundamental cycle of a BFS spanning tree and then repeatedly extends the
//! covered region by the cycle needing the fewest new rooms, falling back to
//! bounded breadth-first tree chains. `TwoStageChains` runs a base
//! decomposition on the rooms and appends each corridor to the first chain
//! after which both of its rooms are covered.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::{LayoutError, Result};
use crate::graph::Graph;
use crate::map::MapGraphs;

pub type Chain = Vec<usize>;

/// Ordered partition of the active vertices of a graph into chains.
pub trait ChainDecomposition {
    fn decompose(&self, graph: &Graph, active: &[bool]) -> Result<Vec<Chain>>;
}

#[derive(Clone, Copy, Debug)]
pub struct BreadthFirstChains {
    /// Upper bound on the length of a chain that is not a cycle.
    pub max_tree_chain: usize,
}

impl Default for BreadthFirstChains {
    fn default() -> Self {
        Self { max_tree_chain: 8 }
    }
}

impl ChainDecomposition for BreadthFirstChains {
    fn decompose(&self, graph: &Graph, active: &[bool]) -> Result<Vec<Chain>> {
        let n = graph.vertex_count();
        if active.len() != n {
            return Err(LayoutError::input(format!(
                "active mask has {} entries for {n} vertices",
                active.len()
            )));
        }
        let Some(root) = (0..n).find(|&v| active[v]) else {
            return Ok(Vec::new());
        };
        let total = active.iter().filter(|&&a| a).count();
        if graph.bfs_order(root, |v| active[v]).len() != total {
            return Err(LayoutError::input("the graph to decompose must be connected"));
        }

        let cycles = fundamental_cycles(graph, active, root);
        let mut on_cycle = vec![false; n];
        for &v in cycles.iter().flatten() {
            on_cycle[v] = true;
        }

        let mut covered = vec![false; n];
        let first = match cycles.iter().min_by_key(|c| c.len()) {
            Some(c) => c.clone(),
            None => self.tree_chain(graph, active, &covered, &on_cycle, vec![root]),
        };
        let mut remaining = total - cover(&first, &mut covered);
        let mut chains: Vec<Chain> = vec![first];

        while remaining > 0 {
            let touching = cycles
                .iter()
                .filter(|c| c.iter().any(|&v| covered[v]) && c.iter().any(|&v| !covered[v]))
                .min_by_key(|c| c.iter().filter(|&&v| !covered[v]).count());
            let chain = match touching {
                Some(cycle) => cycle_chain(cycle, &covered),
                None => {
                    let seeds = frontier(graph, active, &covered);
                    self.tree_chain(graph, active, &covered, &on_cycle, seeds)
                }
            };
            if chain.is_empty() {
                return Err(LayoutError::input("chain decomposition made no progress"));
            }
            remaining -= cover(&chain, &mut covered);
            chains.push(chain);
        }
        Ok(chains)
    }
}

impl BreadthFirstChains {
    /// Breadth-first walk over uncovered active vertices from `seeds`, cut
    /// after `max_tree_chain` vertices or right after entering a cycle.
    fn tree_chain(
        &self,
        graph: &Graph,
        active: &[bool],
        covered: &[bool],
        on_cycle: &[bool],
        seeds: Vec<usize>,
    ) -> Chain {
        let mut seen = covered.to_vec();
        for &s in &seeds {
            seen[s] = true;
        }
        let mut queue = VecDeque::from(seeds);
        let mut chain = Vec::new();
        let limit = self.max_tree_chain.max(1);
        while let Some(v) = queue.pop_front() {
            chain.push(v);
            if chain.len() >= limit || on_cycle[v] {
                break;
            }
            for &u in graph.neighbours(v) {
                if active[u] && !seen[u] {
                    seen[u] = true;
                    queue.push_back(u);
                }
            }
        }
        chain
    }
}

/// Marks `chain` as covered and returns its length.
fn cover(chain: &[usize], covered: &mut [bool]) -> usize {
    for &v in chain {
        covered[v] = true;
    }
    chain.len()
}

/// Uncovered active vertices adjacent to the covered region, in discovery order.
fn frontier(graph: &Graph, active: &[bool], covered: &[bool]) -> Vec<usize> {
    let mut seen = vec![false; covered.len()];
    let mut out = Vec::new();
    for v in (0..covered.len()).filter(|&v| covered[v]) {
        for &u in graph.neighbours(v) {
            if active[u] && !covered[u] && !seen[u] {
                seen[u] = true;
                out.push(u);
            }
        }
    }
    out
}

/// Uncovered vertices of `cycle` in cycle order, walking from its first
/// covered vertex.
fn cycle_chain(cycle: &[usize], covered: &[bool]) -> Chain {
    let len = cycle.len();
    let start = cycle.iter().position(|&v| covered[v]).unwrap_or(0);
    (1..=len)
        .map(|i| cycle[(start + i) % len])
        .filter(|&v| !covered[v])
        .collect()
}

/// One cycle per non-tree edge of a BFS spanning tree rooted at `root`,
/// listed as `a, .., lca, .., b` for the edge `(a, b)`.
fn fundamental_cycles(graph: &Graph, active: &[bool], root: usize) -> Vec<Vec<usize>> {
    let n = graph.vertex_count();
    let mut parent = vec![usize::MAX; n];
    let mut depth = vec![0usize; n];
    parent[root] = root;
    let mut queue = VecDeque::from([root]);
    while let Some(v) = queue.pop_front() {
        for &u in graph.neighbours(v) {
            if active[u] && parent[u] == usize::MAX {
                parent[u] = v;
                depth[u] = depth[v] + 1;
                queue.push_back(u);
            }
        }
    }

    let mut cycles = Vec::new();
    for (a, b) in graph.edges() {
        if !active[a] || !active[b] || parent[a] == b || parent[b] == a {
            continue;
        }
        let (mut x, mut y) = (a, b);
        let (mut left, mut right) = (Vec::new(), Vec::new());
        while depth[x] > depth[y] {
            left.push(x);
            x = parent[x];
        }
        while depth[y] > depth[x] {
            right.push(y);
            y = parent[y];
        }
        while x != y {
            left.push(x);
            right.push(y);
            x = parent[x];
            y = parent[y];
        }
        left.push(x);
        left.extend(right.into_iter().rev());
        cycles.push(left);
    }
    cycles
}

/// Base decomposition of the rooms, with corridors appended where their
/// rooms become covered.
#[derive(Clone, Copy, Debug, Default)]
pub struct TwoStageChains<D> {
    base: D,
}

impl<D: ChainDecomposition> TwoStageChains<D> {
    pub fn new(base: D) -> Self {
        Self { base }
    }

    pub fn decompose(&self, graphs: &MapGraphs) -> Result<Vec<Chain>> {
        self.decompose_parts(&graphs.full, &graphs.stage_one, &graphs.is_corridor)
    }

    /// `stage_one` drives the base decomposition over non-corridor vertices;
    /// corridor coverage is judged on `full`.
    pub fn decompose_parts(
        &self,
        full: &Graph,
        stage_one: &Graph,
        is_corridor: &[bool],
    ) -> Result<Vec<Chain>> {
        let active: Vec<bool> = is_corridor.iter().map(|&c| !c).collect();
        let mut chains = self.base.decompose(stage_one, &active)?;

        let mut pending: Vec<usize> = (0..is_corridor.len()).filter(|&v| is_corridor[v]).collect();
        let mut used = vec![false; is_corridor.len()];
        for chain in &mut chains {
            for &v in chain.iter() {
                used[v] = true;
            }
            let (ready, rest): (Vec<usize>, Vec<usize>) = pending
                .into_iter()
                .partition(|&c| full.neighbours(c).iter().all(|&u| used[u]));
            chain.extend(ready);
            pending = rest;
        }
        if let Some(&c) = pending.first() {
            return Err(LayoutError::input(format!(
                "corridor node {c} is not covered by any chain"
            )));
        }
        debug!(
            chains = chains.len(),
            sizes = ?chains.iter().map(Vec::len).collect::<Vec<_>>(),
            "chain decomposition"
        );
        Ok(chains)
    }
}
