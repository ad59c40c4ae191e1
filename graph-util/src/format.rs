use crate::bipartite::into_bipartite;
use crate::common_io::read_to_string;
use crate::edgelist::parse_edgelist;
use crate::error::{GraphError, Result};
use crate::gml::parse_gml;
use crate::graph::{BipartiteGraph, Graph};
use crate::graphml::parse_graphml;
use log::info;
use std::str::FromStr;

/// Supported graph file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    /// Graph Modelling Language (`graph [ node [..] edge [..] ]`)
    Gml,
    /// GraphML XML
    GraphMl,
    /// Whitespace-separated vertex id pairs
    EdgeList,
}

impl GraphFormat {
    /// Lower-case name, as accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            GraphFormat::Gml => "gml",
            GraphFormat::GraphMl => "graphml",
            GraphFormat::EdgeList => "edgelist",
        }
    }
}

impl FromStr for GraphFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gml" => Ok(GraphFormat::Gml),
            "graphml" => Ok(GraphFormat::GraphMl),
            "edgelist" => Ok(GraphFormat::EdgeList),
            _ => Err(GraphError::UnsupportedFormat(s.to_string())),
        }
    }
}

///
/// Read a graph file of the given format
///
/// * `format` - file format
/// * `file` - file name--either gzipped or not
///
pub fn read_graph(format: GraphFormat, file: &str) -> Result<Graph> {
    let unreadable = |source: std::io::Error| GraphError::Unreadable {
        path: file.to_string(),
        source,
    };

    info!("Attempting to read in {} file {}...", format.name(), file);

    let graph = match format {
        GraphFormat::EdgeList => {
            parse_edgelist(read_to_string(file).map_err(unreadable)?.as_bytes())?
        }
        GraphFormat::Gml => parse_gml(&read_to_string(file).map_err(unreadable)?)?,
        GraphFormat::GraphMl => parse_graphml(&read_to_string(file).map_err(unreadable)?)?,
    };

    info!(
        "Graph with {} vertices and {} edges read successfully.",
        graph.num_vertices(),
        graph.num_edges()
    );
    Ok(graph)
}

/// Read a graph file and label its two sides.
pub fn read_bipartite_graph(format: GraphFormat, file: &str) -> Result<BipartiteGraph> {
    into_bipartite(read_graph(format, file)?)
}
