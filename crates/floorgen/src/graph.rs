//! Fixed-size undirected graph over node indices `0..n`.
//!
//! Adjacency lists keep insertion order; the position of a neighbour in a
//! list is its bit in the owner's validity vector, hence the degree cap.

use std::collections::VecDeque;

use crate::error::{LayoutError, Result};

/// Maximum number of neighbours per vertex.
pub const MAX_NEIGHBOURS: usize = 32;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    adj: Vec<Vec<usize>>,
}

impl Graph {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adj: vec![Vec::new(); vertex_count],
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn add_edge(&mut self, a: usize, b: usize) -> Result<()> {
        let n = self.vertex_count();
        if a >= n || b >= n {
            return Err(LayoutError::input(format!(
                "edge ({a}, {b}) references a vertex outside 0..{n}"
            )));
        }
        if a == b {
            return Err(LayoutError::input(format!("self-loop on vertex {a}")));
        }
        if self.has_edge(a, b) {
            return Err(LayoutError::input(format!("edge ({a}, {b}) added twice")));
        }
        if self.adj[a].len() >= MAX_NEIGHBOURS || self.adj[b].len() >= MAX_NEIGHBOURS {
            return Err(LayoutError::input(format!(
                "edge ({a}, {b}) exceeds the limit of {MAX_NEIGHBOURS} neighbours"
            )));
        }
        self.adj[a].push(b);
        self.adj[b].push(a);
        Ok(())
    }

    #[inline]
    pub fn neighbours(&self, v: usize) -> &[usize] {
        &self.adj[v]
    }

    #[inline]
    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adj[a].contains(&b)
    }

    /// Position of `neighbour` in the adjacency list of `vertex`.
    #[inline]
    pub fn neighbour_index(&self, vertex: usize, neighbour: usize) -> Option<usize> {
        self.adj[vertex].iter().position(|&u| u == neighbour)
    }

    /// Edges `(a, b)` with `a < b`, ordered by `a` then insertion.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adj
            .iter()
            .enumerate()
            .flat_map(|(a, ns)| ns.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
    }

    /// Breadth-first order from `start`, restricted to vertices where `keep` holds.
    pub fn bfs_order(&self, start: usize, keep: impl Fn(usize) -> bool) -> Vec<usize> {
        let mut seen = vec![false; self.vertex_count()];
        let mut order = Vec::new();
        let mut queue = VecDeque::from([start]);
        seen[start] = true;
        while let Some(v) = queue.pop_front() {
            order.push(v);
            for &u in &self.adj[v] {
                if !seen[u] && keep(u) {
                    seen[u] = true;
                    queue.push_back(u);
                }
            }
        }
        order
    }

    pub fn is_connected(&self) -> bool {
        self.vertex_count() <= 1 || self.bfs_order(0, |_| true).len() == self.vertex_count()
    }

    /// Exact planarity test.
    ///
    /// Each biconnected block is embedded face by face (Demoucron, Malgrange
    /// and Pertuiset); a graph is planar iff all of its blocks are.
    pub fn is_planar(&self) -> bool {
        blocks(&self.adj).iter().all(|edges| {
            let (adj, n) = local_adjacency(edges);
            let m = edges.len();
            if n < 5 {
                return true;
            }
            // Euler bound rejects dense blocks without embedding them.
            if m > 3 * n - 6 {
                return false;
            }
            block_is_planar(&adj, m)
        })
    }
}

/// Edge sets of the biconnected blocks (Tarjan, edge stack).
fn blocks(adj: &[Vec<usize>]) -> Vec<Vec<(usize, usize)>> {
    const UNSEEN: usize = usize::MAX;
    let n = adj.len();
    let mut disc = vec![UNSEEN; n];
    let mut low = vec![0; n];
    let mut parent = vec![UNSEEN; n];
    let mut edge_stack: Vec<(usize, usize)> = Vec::new();
    let mut out = Vec::new();
    let mut time = 0;

    for root in 0..n {
        if disc[root] != UNSEEN {
            continue;
        }
        disc[root] = time;
        low[root] = time;
        time += 1;
        // (vertex, next adjacency position)
        let mut stack = vec![(root, 0usize)];
        while let Some(top) = stack.last_mut() {
            let u = top.0;
            if top.1 < adj[u].len() {
                let v = adj[u][top.1];
                top.1 += 1;
                if disc[v] == UNSEEN {
                    parent[v] = u;
                    disc[v] = time;
                    low[v] = time;
                    time += 1;
                    edge_stack.push((u, v));
                    stack.push((v, 0));
                } else if v != parent[u] && disc[v] < disc[u] {
                    edge_stack.push((u, v));
                    low[u] = low[u].min(disc[v]);
                }
                continue;
            }
            stack.pop();
            let p = parent[u];
            if p == UNSEEN {
                continue;
            }
            low[p] = low[p].min(low[u]);
            if low[u] >= disc[p] {
                let mut block = Vec::new();
                while let Some(e) = edge_stack.pop() {
                    block.push(e);
                    if e == (p, u) {
                        break;
                    }
                }
                out.push(block);
            }
        }
    }
    out
}

/// Adjacency lists of an edge set over dense local indices.
fn local_adjacency(edges: &[(usize, usize)]) -> (Vec<Vec<usize>>, usize) {
    let mut index: Vec<usize> = edges.iter().flat_map(|&(a, b)| [a, b]).collect();
    index.sort_unstable();
    index.dedup();
    let local = |v: usize| index.binary_search(&v).unwrap_or_default();
    let mut adj = vec![Vec::new(); index.len()];
    for &(a, b) in edges {
        let (la, lb) = (local(a), local(b));
        adj[la].push(lb);
        adj[lb].push(la);
    }
    (adj, index.len())
}

/// Some cycle of a graph that has one, as a vertex sequence.
fn find_cycle(adj: &[Vec<usize>]) -> Vec<usize> {
    const OFF: usize = usize::MAX;
    let n = adj.len();
    let mut pos = vec![OFF; n];
    let mut done = vec![false; n];
    for root in 0..n {
        if done[root] {
            continue;
        }
        let mut path = vec![root];
        let mut next = vec![0usize];
        pos[root] = 0;
        while let Some(&u) = path.last() {
            let k = path.len() - 1;
            if next[k] < adj[u].len() {
                let w = adj[u][next[k]];
                next[k] += 1;
                if done[w] || (k > 0 && w == path[k - 1]) {
                    continue;
                }
                if pos[w] != OFF {
                    return path[pos[w]..].to_vec();
                }
                pos[w] = path.len();
                path.push(w);
                next.push(0);
            } else {
                pos[u] = OFF;
                done[u] = true;
                path.pop();
                next.pop();
            }
        }
    }
    Vec::new()
}

/// Part of a block not yet embedded: a single chord between embedded
/// vertices, or a component of unembedded vertices with its edges.
struct Fragment {
    attachments: Vec<usize>,
    component: Option<usize>,
}

/// Fragments plus the component label of every unembedded vertex.
fn fragments(
    adj: &[Vec<usize>],
    embedded: &[bool],
    edge_embedded: &[Vec<bool>],
) -> (Vec<Fragment>, Vec<Option<usize>>) {
    let n = adj.len();
    let mut component: Vec<Option<usize>> = vec![None; n];
    let mut out = Vec::new();

    for start in 0..n {
        if embedded[start] || component[start].is_some() {
            continue;
        }
        let id = out.len();
        component[start] = Some(id);
        let mut queue = VecDeque::from([start]);
        let mut attachments = Vec::new();
        while let Some(v) = queue.pop_front() {
            for &u in &adj[v] {
                if embedded[u] {
                    attachments.push(u);
                } else if component[u].is_none() {
                    component[u] = Some(id);
                    queue.push_back(u);
                }
            }
        }
        attachments.sort_unstable();
        attachments.dedup();
        out.push(Fragment {
            attachments,
            component: Some(id),
        });
    }
    for a in (0..n).filter(|&a| embedded[a]) {
        for &b in &adj[a] {
            if a < b && embedded[b] && !edge_embedded[a][b] {
                out.push(Fragment {
                    attachments: vec![a, b],
                    component: None,
                });
            }
        }
    }
    (out, component)
}

/// Path through `fragment` between two distinct attachments.
fn fragment_path(
    adj: &[Vec<usize>],
    embedded: &[bool],
    labels: &[Option<usize>],
    fragment: &Fragment,
) -> Vec<usize> {
    let Some(id) = fragment.component else {
        return fragment.attachments.clone();
    };
    let from = fragment.attachments[0];
    let mut parent = vec![usize::MAX; adj.len()];
    let mut queue = VecDeque::new();
    for &u in &adj[from] {
        if labels[u] == Some(id) && parent[u] == usize::MAX {
            parent[u] = from;
            queue.push_back(u);
        }
    }
    while let Some(v) = queue.pop_front() {
        for &u in &adj[v] {
            if embedded[u] && u != from {
                let mut path = vec![u, v];
                let mut x = v;
                while parent[x] != from {
                    x = parent[x];
                    path.push(x);
                }
                path.push(from);
                path.reverse();
                return path;
            }
            if labels[u] == Some(id) && parent[u] == usize::MAX {
                parent[u] = v;
                queue.push_back(u);
            }
        }
    }
    Vec::new()
}

/// Splits `face` along `path`, whose ends lie on the face.
fn split_face(face: &[usize], path: &[usize]) -> Option<(Vec<usize>, Vec<usize>)> {
    let (&first, &last) = (path.first()?, path.last()?);
    let i = face.iter().position(|&v| v == first)?;
    let j = face.iter().position(|&v| v == last)?;
    let k = face.len();
    let walk = |from: usize, to: usize| -> Vec<usize> {
        let mut out = vec![face[from]];
        let mut x = from;
        while x != to {
            x = (x + 1) % k;
            out.push(face[x]);
        }
        out
    };
    let inner = &path[1..path.len() - 1];
    let mut one = walk(i, j);
    one.extend(inner.iter().rev());
    let mut two = walk(j, i);
    two.extend(inner.iter());
    Some((one, two))
}

fn block_is_planar(adj: &[Vec<usize>], edge_count: usize) -> bool {
    let n = adj.len();
    let cycle = find_cycle(adj);
    if cycle.is_empty() {
        return true;
    }
    let mut embedded = vec![false; n];
    let mut edge_embedded = vec![vec![false; n]; n];
    for (idx, &v) in cycle.iter().enumerate() {
        let w = cycle[(idx + 1) % cycle.len()];
        embedded[v] = true;
        edge_embedded[v][w] = true;
        edge_embedded[w][v] = true;
    }
    let mut embedded_edges = cycle.len();
    let mut faces = vec![cycle.clone(), cycle];

    while embedded_edges < edge_count {
        let (frags, labels) = fragments(adj, &embedded, &edge_embedded);
        let mut choice: Option<(usize, usize)> = None;
        for (fi, frag) in frags.iter().enumerate() {
            let admissible: Vec<usize> = (0..faces.len())
                .filter(|&f| frag.attachments.iter().all(|a| faces[f].contains(a)))
                .collect();
            match admissible.as_slice() {
                [] => return false,
                [only] => {
                    choice = Some((fi, *only));
                    break;
                }
                [first, ..] => {
                    choice.get_or_insert((fi, *first));
                }
            }
        }
        let Some((fi, face)) = choice else {
            return true;
        };
        let path = fragment_path(adj, &embedded, &labels, &frags[fi]);
        let Some((one, two)) = split_face(&faces[face], &path) else {
            return false;
        };
        faces[face] = one;
        faces.push(two);
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            embedded[a] = true;
            embedded[b] = true;
            edge_embedded[a][b] = true;
            edge_embedded[b][a] = true;
        }
        embedded_edges += path.len() - 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle(n: usize) -> Graph {
        let mut g = Graph::new(n);
        for i in 0..n {
            g.add_edge(i, (i + 1) % n).unwrap();
        }
        g
    }

    #[test]
    fn add_edge_rejects_duplicates_and_loops() {
        let mut g = Graph::new(3);
        g.add_edge(0, 1).unwrap();
        assert!(g.add_edge(1, 0).is_err());
        assert!(g.add_edge(2, 2).is_err());
        assert!(g.add_edge(0, 3).is_err());
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn degree_is_capped() {
        let mut g = Graph::new(MAX_NEIGHBOURS + 2);
        for v in 1..=MAX_NEIGHBOURS {
            g.add_edge(0, v).unwrap();
        }
        assert!(g.add_edge(0, MAX_NEIGHBOURS + 1).is_err());
    }

    #[test]
    fn neighbour_index_follows_insertion_order() {
        let mut g = Graph::new(4);
        g.add_edge(2, 0).unwrap();
        g.add_edge(2, 3).unwrap();
        g.add_edge(1, 2).unwrap();
        assert_eq!(g.neighbours(2), &[0, 3, 1]);
        assert_eq!(g.neighbour_index(2, 1), Some(2));
        assert_eq!(g.neighbour_index(1, 2), Some(0));
        assert_eq!(g.neighbour_index(0, 3), None);
    }

    fn complete(n: usize) -> Graph {
        let mut g = Graph::new(n);
        for a in 0..n {
            for b in a + 1..n {
                g.add_edge(a, b).unwrap();
            }
        }
        g
    }

    fn k33() -> Graph {
        let mut g = Graph::new(6);
        for a in 0..3 {
            for b in 3..6 {
                g.add_edge(a, b).unwrap();
            }
        }
        g
    }

    #[test]
    fn connectivity_and_planarity() {
        let g = cycle(4);
        assert!(g.is_connected());
        assert!(g.is_planar());
        assert_eq!(g.edges().collect::<Vec<_>>(), vec![(0, 1), (0, 3), (1, 2), (2, 3)]);

        let mut split = Graph::new(4);
        split.add_edge(0, 1).unwrap();
        split.add_edge(2, 3).unwrap();
        assert!(!split.is_connected());
        assert!(split.is_planar());

        assert!(complete(4).is_planar());
        assert!(!complete(5).is_planar());
    }

    #[test]
    fn sparse_kuratowski_graphs_are_not_planar() {
        // K3,3 passes the edge-count bound (9 <= 12).
        let g = k33();
        assert!(g.edge_count() <= 3 * g.vertex_count() - 6);
        assert!(!g.is_planar());

        // Subdivided K3,3 hanging off a path; only one block is non-planar.
        let mut h = Graph::new(10);
        for (a, b) in [(0, 3), (0, 4), (0, 6), (1, 3), (1, 4), (1, 5), (2, 3), (2, 4), (2, 5)] {
            h.add_edge(a, b).unwrap();
        }
        h.add_edge(6, 5).unwrap();
        h.add_edge(7, 0).unwrap();
        h.add_edge(8, 7).unwrap();
        h.add_edge(9, 8).unwrap();
        assert!(h.is_connected());
        assert!(!h.is_planar());

        // Petersen graph contains a K3,3 subdivision.
        let mut p = Graph::new(10);
        for i in 0..5 {
            p.add_edge(i, (i + 1) % 5).unwrap();
            p.add_edge(i, i + 5).unwrap();
            p.add_edge(i + 5, (i + 2) % 5 + 5).unwrap();
        }
        assert!(!p.is_planar());
    }

    #[test]
    fn dense_planar_graphs_are_accepted() {
        // Octahedron: 6 vertices, 12 edges, planar.
        let mut oct = Graph::new(6);
        for (a, b) in complete(6).edges() {
            if ![(0, 1), (2, 3), (4, 5)].contains(&(a, b)) {
                oct.add_edge(a, b).unwrap();
            }
        }
        assert_eq!(oct.edge_count(), 12);
        assert!(oct.is_planar());

        // 4x4 grid with one diagonal per cell, a triangulation.
        let mut grid = Graph::new(16);
        for r in 0..4 {
            for c in 0..4 {
                let v = r * 4 + c;
                if c < 3 {
                    grid.add_edge(v, v + 1).unwrap();
                }
                if r < 3 {
                    grid.add_edge(v, v + 4).unwrap();
                }
                if r < 3 && c < 3 {
                    grid.add_edge(v, v + 5).unwrap();
                }
            }
        }
        assert!(grid.is_planar());

        // Two K4 blocks sharing a cut vertex.
        let mut twin = Graph::new(7);
        for (a, b) in complete(4).edges() {
            twin.add_edge(a, b).unwrap();
            twin.add_edge(a + 3, b + 3).unwrap();
        }
        assert!(twin.is_planar());
    }

    #[test]
    fn wheel_with_crossing_rim_chords() {
        // W6 is 3-connected, so rim chords must share the outer face and two
        // interleaved chords cross.
        let mut w = Graph::new(7);
        for i in 0..6 {
            w.add_edge(6, i).unwrap();
            w.add_edge(i, (i + 1) % 6).unwrap();
        }
        assert!(w.is_planar());
        w.add_edge(0, 3).unwrap();
        assert!(w.is_planar());
        w.add_edge(1, 4).unwrap();
        assert!(!w.is_planar());
    }
}
