//! Plain edge lists: one `source target` pair of 0-based ids per line.

use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph};
use std::io::BufRead;

const FORMAT: &str = "edgelist";

fn is_comment_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('%')
}

/// Parse an edge list from a buffered reader.
///
/// Tokens are whitespace separated and paired up in order, so an edge may
/// not be split across lines. The vertex count is `max id + 1`.
pub fn parse_edgelist<R: BufRead>(reader: R) -> Result<Graph> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut max_id: Option<usize> = None;

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| GraphError::parse(FORMAT, Some(lineno + 1), e.to_string()))?;
        let line = line.trim();
        if line.is_empty() || is_comment_line(line) {
            continue;
        }

        let ids = line
            .split_whitespace()
            .map(|tok| {
                tok.parse::<usize>().map_err(|_| {
                    GraphError::parse(FORMAT, Some(lineno + 1), format!("invalid vertex id '{tok}'"))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        if ids.len() % 2 != 0 {
            return Err(GraphError::parse(
                FORMAT,
                Some(lineno + 1),
                "odd number of vertex ids",
            ));
        }

        for pair in ids.chunks_exact(2) {
            let (u, v) = (pair[0], pair[1]);
            max_id = Some(max_id.map_or(u.max(v), |m| m.max(u).max(v)));
            edges.push((u, v));
        }
    }

    let n = max_id.map_or(0, |m| m + 1);
    Ok(Graph::from_edges(n, &edges))
}
