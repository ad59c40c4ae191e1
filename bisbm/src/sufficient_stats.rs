//! Sufficient statistics for the bipartite stochastic block model.
//!
//! Tracks the `k_a × k_b` inter-community edge count matrix, the total
//! degree of every community, and the membership vector.
//!
//! Communities `0..k_a` hold side-A vertices and `k_a..k_a+k_b` hold side-B
//! vertices. Since every edge joins an A vertex to a B vertex, the matrix
//! is stored once, A-community rows by B-community columns.
//!
//! Supports O(degree) incremental updates when a single vertex moves,
//! plus full recomputation for consistency checks.

use graph_util::Side;
use rand::Rng;
use std::ops::Range;

/// Sufficient statistics for the bipartite SBM.
///
/// Fields are private: the only mutation path after construction is
/// [`BipartiteStats::apply_swap`], which keeps every aggregate consistent
/// with the membership.
#[derive(Debug, Clone, PartialEq)]
pub struct BipartiteStats {
    n: usize,
    k_a: usize,
    k_b: usize,
    /// `k_a × k_b` edge counts, row-major: `edge_counts[r * k_b + (s - k_a)]`
    edge_counts: Vec<usize>,
    /// Sum of vertex degrees per community, indexed `0..k_a+k_b`
    community_degree: Vec<f64>,
    /// vertex -> community
    membership: Vec<usize>,
    vertex_degree: Vec<f64>,
    sides: Vec<Side>,
}

impl BipartiteStats {
    /// Build sufficient statistics from an adjacency list and initial labels.
    ///
    /// * `adj_list` - `adj_list[v]` = neighbors of `v` (each edge listed at both ends)
    /// * `sides` - side of every vertex; every edge must join side A to side B
    /// * `k_a` - number of side-A communities
    /// * `k_b` - number of side-B communities
    /// * `labels` - initial community of each vertex, within its side's range
    pub fn from_adjacency(
        adj_list: &[Vec<usize>],
        sides: &[Side],
        k_a: usize,
        k_b: usize,
        labels: &[usize],
    ) -> Self {
        let n = adj_list.len();
        assert_eq!(sides.len(), n);
        assert_eq!(labels.len(), n);

        let mut stats = BipartiteStats {
            n,
            k_a,
            k_b,
            edge_counts: vec![0; k_a * k_b],
            community_degree: vec![0.0; k_a + k_b],
            membership: labels.to_vec(),
            vertex_degree: adj_list.iter().map(|nbrs| nbrs.len() as f64).collect(),
            sides: sides.to_vec(),
        };

        debug_assert!((0..n).all(|v| stats.community_range(sides[v]).contains(&labels[v])));
        stats.recompute(adj_list);
        stats
    }

    /// Draw a membership vector uniformly at random within each side's range.
    pub fn random_membership<R: Rng>(sides: &[Side], k_a: usize, k_b: usize, rng: &mut R) -> Vec<usize> {
        sides
            .iter()
            .map(|side| match side {
                Side::A => rng.random_range(0..k_a),
                Side::B => rng.random_range(k_a..k_a + k_b),
            })
            .collect()
    }

    /// Full recomputation of the aggregates from the membership vector.
    ///
    /// Every undirected edge is visited once (from its lower-index end).
    pub fn recompute(&mut self, adj_list: &[Vec<usize>]) {
        self.edge_counts.iter_mut().for_each(|x| *x = 0);
        self.community_degree.iter_mut().for_each(|x| *x = 0.0);

        for v in 0..self.n {
            self.community_degree[self.membership[v]] += self.vertex_degree[v];
        }

        for (u, nbrs) in adj_list.iter().enumerate() {
            for &v in nbrs {
                if v > u {
                    let cell = self.cell_index(self.membership[u], self.membership[v]);
                    self.edge_counts[cell] += 1;
                }
            }
        }
    }

    /// Move `vertex` to community `dest`, updating all aggregates.
    ///
    /// A no-op when `dest` is the current community. `dest` must lie in the
    /// vertex's side range.
    ///
    /// * `vertex` - the vertex being moved
    /// * `dest` - destination community
    /// * `neighbors` - neighbors of `vertex`
    pub fn apply_swap(&mut self, vertex: usize, dest: usize, neighbors: &[usize]) {
        let from = self.membership[vertex];
        if from == dest {
            return;
        }
        debug_assert!(self.community_range(self.sides[vertex]).contains(&dest));

        let deg = self.vertex_degree[vertex];
        self.community_degree[from] -= deg;
        self.community_degree[dest] += deg;

        for &nbr in neighbors {
            let nc = self.membership[nbr];
            let old_cell = self.cell_index(from, nc);
            self.edge_counts[old_cell] -= 1;
            let new_cell = self.cell_index(dest, nc);
            self.edge_counts[new_cell] += 1;
        }

        self.membership[vertex] = dest;
    }

    /// Flat index of the matrix cell pairing communities `c1` and `c2`,
    /// one from each side, in either order.
    #[inline]
    fn cell_index(&self, c1: usize, c2: usize) -> usize {
        let (r, s) = if c1 < self.k_a { (c1, c2) } else { (c2, c1) };
        debug_assert!(r < self.k_a && s >= self.k_a && s < self.k_a + self.k_b);
        r * self.k_b + (s - self.k_a)
    }

    /// Edges between A-community `r` and B-community `s` (`k_a <= s < k_a + k_b`).
    #[inline]
    pub fn edge_stat(&self, r: usize, s: usize) -> usize {
        self.edge_counts[r * self.k_b + (s - self.k_a)]
    }

    /// Edges between two communities on opposite sides, in either order.
    #[inline]
    pub fn edge_stat_between(&self, c1: usize, c2: usize) -> usize {
        self.edge_counts[self.cell_index(c1, c2)]
    }

    /// Total degree of community `c`
    #[inline]
    pub fn community_degree(&self, c: usize) -> f64 {
        self.community_degree[c]
    }

    /// Community indices available to vertices of `side`
    pub fn community_range(&self, side: Side) -> Range<usize> {
        match side {
            Side::A => 0..self.k_a,
            Side::B => self.k_a..self.k_a + self.k_b,
        }
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.n
    }

    /// Number of side-A communities
    pub fn k_a(&self) -> usize {
        self.k_a
    }

    /// Number of side-B communities
    pub fn k_b(&self) -> usize {
        self.k_b
    }

    /// Side of vertex `v`
    #[inline]
    pub fn side(&self, v: usize) -> Side {
        self.sides[v]
    }

    /// Degree of vertex `v`
    #[inline]
    pub fn vertex_degree(&self, v: usize) -> f64 {
        self.vertex_degree[v]
    }

    /// Current membership, `membership()[v]` = community of `v`
    pub fn membership(&self) -> &[usize] {
        &self.membership
    }

    /// Consume the statistics, keeping only the membership
    pub fn into_membership(self) -> Vec<usize> {
        self.membership
    }

    /// Flattened `k_a × k_b` edge count matrix (row-major)
    pub fn edge_counts(&self) -> &[usize] {
        &self.edge_counts
    }

    /// Per-community total degree, indexed `0..k_a+k_b`
    pub fn community_degrees(&self) -> &[f64] {
        &self.community_degree
    }

    /// Number of communities without any vertex
    pub fn count_empty_communities(&self) -> usize {
        let mut size = vec![0usize; self.k_a + self.k_b];
        for &c in &self.membership {
            size[c] += 1;
        }
        size.iter().filter(|&&s| s == 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// A = {0, 1, 2}, B = {3, 4, 5, 6}
    fn simple_graph() -> (Vec<Vec<usize>>, Vec<Side>) {
        let edges = [(0, 3), (0, 4), (1, 4), (1, 5), (2, 5), (2, 6), (3, 2)];
        let mut adj = vec![Vec::new(); 7];
        for &(u, v) in &edges {
            adj[u].push(v);
            adj[v].push(u);
        }
        let sides = vec![Side::A, Side::A, Side::A, Side::B, Side::B, Side::B, Side::B];
        (adj, sides)
    }

    #[test]
    fn test_from_adjacency() {
        let (adj, sides) = simple_graph();
        // k_a = 2, k_b = 2
        let labels = vec![0, 0, 1, 2, 2, 3, 3];
        let stats = BipartiteStats::from_adjacency(&adj, &sides, 2, 2, &labels);

        // edges: 0-3 (0,2) 0-4 (0,2) 1-4 (0,2) 1-5 (0,3) 2-5 (1,3) 2-6 (1,3) 3-2 (1,2)
        assert_eq!(stats.edge_stat(0, 2), 3);
        assert_eq!(stats.edge_stat(0, 3), 1);
        assert_eq!(stats.edge_stat(1, 2), 1);
        assert_eq!(stats.edge_stat(1, 3), 2);
        assert_eq!(stats.edge_stat_between(3, 1), 2);

        assert_eq!(stats.community_degree(0), 4.0);
        assert_eq!(stats.community_degree(1), 3.0);
        assert_eq!(stats.community_degree(2), 4.0);
        assert_eq!(stats.community_degree(3), 3.0);

        let total: usize = stats.edge_counts().iter().sum();
        assert_eq!(total, 7);
    }

    #[test]
    fn test_lower_index_on_side_b() {
        // vertex 0 on side B, vertex 1 on side A: the cell must still be (A-row, B-col)
        let adj = vec![vec![1], vec![0]];
        let sides = vec![Side::B, Side::A];
        let stats = BipartiteStats::from_adjacency(&adj, &sides, 1, 1, &[1, 0]);
        assert_eq!(stats.edge_stat(0, 1), 1);
    }

    #[test]
    fn test_apply_swap_consistency() {
        let (adj, sides) = simple_graph();
        let labels = vec![0, 0, 1, 2, 2, 3, 3];
        let mut stats = BipartiteStats::from_adjacency(&adj, &sides, 2, 2, &labels);

        let moves = [(1, 1), (4, 3), (0, 1), (3, 3), (1, 0), (4, 2)];
        for &(v, dest) in &moves {
            stats.apply_swap(v, dest, &adj[v]);

            let fresh =
                BipartiteStats::from_adjacency(&adj, &sides, 2, 2, stats.membership());
            assert_eq!(stats, fresh, "mismatch after moving {} to {}", v, dest);
        }
    }

    #[test]
    fn test_apply_swap_noop() {
        let (adj, sides) = simple_graph();
        let labels = vec![0, 0, 1, 2, 2, 3, 3];
        let mut stats = BipartiteStats::from_adjacency(&adj, &sides, 2, 2, &labels);
        let before = stats.clone();
        stats.apply_swap(5, 3, &adj[5]);
        assert_eq!(stats, before);
    }

    #[test]
    fn test_swap_and_back_is_identity() {
        let (adj, sides) = simple_graph();
        let labels = vec![0, 1, 1, 2, 3, 3, 2];
        let mut stats = BipartiteStats::from_adjacency(&adj, &sides, 2, 2, &labels);
        let before = stats.clone();
        stats.apply_swap(2, 0, &adj[2]);
        stats.apply_swap(2, 1, &adj[2]);
        assert_eq!(stats, before);
    }

    #[test]
    fn test_random_membership_respects_sides() {
        let (_, sides) = simple_graph();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..20 {
            let labels = BipartiteStats::random_membership(&sides, 3, 2, &mut rng);
            for (v, &c) in labels.iter().enumerate() {
                match sides[v] {
                    Side::A => assert!(c < 3),
                    Side::B => assert!((3..5).contains(&c)),
                }
            }
        }
    }

    #[test]
    fn test_count_empty_communities() {
        let (adj, sides) = simple_graph();
        let labels = vec![0, 0, 0, 2, 2, 2, 2];
        let stats = BipartiteStats::from_adjacency(&adj, &sides, 2, 2, &labels);
        assert_eq!(stats.count_empty_communities(), 2);
    }
}
