pub mod bipartite; // two-colouring of an undirected graph
pub mod common_io; // gzip-aware buffered readers and writers
pub mod edgelist;
pub mod error;
pub mod format; // dispatch on graph file type
pub mod gml;
pub mod graph;
pub mod graphml;
pub mod membership;

pub use error::{GraphError, Result};
pub use format::{read_bipartite_graph, read_graph, GraphFormat};
pub use graph::{BipartiteGraph, Edge, Graph, Side};
