//! Undirected graph held as per-vertex neighbor lists.

/// An undirected edge between two dense vertex indices
pub type Edge = (usize, usize);

/// Vertex class of a bipartite graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// First class (communities `0..k_a`)
    A,
    /// Second class (communities `k_a..k_a+k_b`)
    B,
}

impl Side {
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Undirected multigraph with dense vertex indices `0..n`.
///
/// Each edge `(u, v)` appears in both `neighbors(u)` and `neighbors(v)`;
/// parallel edges are kept, so a vertex's degree is the length of its
/// neighbor list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    adj_list: Vec<Vec<usize>>,
    num_edges: usize,
}

impl Graph {
    /// Build a graph on `n` vertices from an edge list.
    ///
    /// * `n` - number of vertices (endpoints must be `< n`)
    /// * `edges` - undirected edges, each given once
    pub fn from_edges(n: usize, edges: &[Edge]) -> Self {
        let mut adj_list = vec![Vec::new(); n];
        for &(u, v) in edges {
            adj_list[u].push(v);
            if u != v {
                adj_list[v].push(u);
            }
        }
        Graph {
            adj_list,
            num_edges: edges.len(),
        }
    }

    /// Number of vertices
    pub fn num_vertices(&self) -> usize {
        self.adj_list.len()
    }

    /// Number of undirected edges
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Neighbors of vertex `v`
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adj_list[v]
    }

    /// Degree of vertex `v`
    pub fn degree(&self, v: usize) -> usize {
        self.adj_list[v].len()
    }

    /// Full adjacency list, `adj_list()[v]` = neighbors of `v`
    pub fn adj_list(&self) -> &[Vec<usize>] {
        &self.adj_list
    }

    /// Each undirected edge once, as `(u, v)` with `u <= v`.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.num_edges);
        for (u, nbrs) in self.adj_list.iter().enumerate() {
            for &v in nbrs {
                if u <= v {
                    edges.push((u, v));
                }
            }
        }
        edges
    }
}

/// A graph together with a valid side labelling.
#[derive(Debug, Clone)]
pub struct BipartiteGraph {
    /// Underlying undirected graph
    pub graph: Graph,
    /// `sides[v]` = class of vertex `v`
    pub sides: Vec<Side>,
}

impl BipartiteGraph {
    /// Number of vertices on side `side`
    pub fn count_side(&self, side: Side) -> usize {
        self.sides.iter().filter(|&&s| s == side).count()
    }
}
