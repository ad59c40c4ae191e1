//! GraphML reader.
//!
//! Reads `<node id=..>` and `<edge source=.. target=..>` elements in
//! document order. Keys, data elements and nested graphs are skipped.

use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph};
use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

const FORMAT: &str = "graphml";

fn line_of(content: &str, offset: usize) -> usize {
    let offset = offset.min(content.len());
    content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}

fn attribute(content: &str, offset: usize, e: &BytesStart, name: &str) -> Result<Option<String>> {
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| GraphError::parse(FORMAT, Some(line_of(content, offset)), err.to_string()))?;
    match attr {
        Some(a) => {
            let v = a
                .unescape_value()
                .map_err(|err| GraphError::parse(FORMAT, Some(line_of(content, offset)), err.to_string()))?;
            Ok(Some(v.into_owned()))
        }
        None => Ok(None),
    }
}

/// Parse a GraphML document into a [`Graph`].
///
/// Node ids (strings) are remapped to dense indices in order of appearance.
pub fn parse_graphml(content: &str) -> Result<Graph> {
    let mut reader = Reader::from_str(content);

    let mut id_to_index: HashMap<String, usize> = HashMap::new();
    let mut raw_edges: Vec<(String, String, usize)> = Vec::new();
    let mut saw_graph = false;

    loop {
        let offset = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|err| GraphError::parse(FORMAT, Some(line_of(content, offset)), err.to_string()))?;

        match event {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"graph" => {
                    saw_graph = true;
                    if attribute(content, offset, &e, "edgedefault")?.as_deref() == Some("directed") {
                        warn!("directed GraphML graph will be treated as undirected");
                    }
                }
                b"node" => {
                    let id = attribute(content, offset, &e, "id")?.ok_or_else(|| {
                        GraphError::parse(FORMAT, Some(line_of(content, offset)), "node without id")
                    })?;
                    let next = id_to_index.len();
                    if id_to_index.insert(id.clone(), next).is_some() {
                        return Err(GraphError::parse(
                            FORMAT,
                            Some(line_of(content, offset)),
                            format!("duplicate node id '{id}'"),
                        ));
                    }
                }
                b"edge" => {
                    let line = line_of(content, offset);
                    let source = attribute(content, offset, &e, "source")?
                        .ok_or_else(|| GraphError::parse(FORMAT, Some(line), "edge without source"))?;
                    let target = attribute(content, offset, &e, "target")?
                        .ok_or_else(|| GraphError::parse(FORMAT, Some(line), "edge without target"))?;
                    raw_edges.push((source, target, line));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_graph {
        return Err(GraphError::parse(FORMAT, None, "missing <graph> element"));
    }

    let mut edges: Vec<Edge> = Vec::with_capacity(raw_edges.len());
    for (source, target, line) in raw_edges {
        let resolve = |id: &str| {
            id_to_index.get(id).copied().ok_or_else(|| {
                GraphError::parse(FORMAT, Some(line), format!("edge endpoint '{id}' is not a node"))
            })
        };
        edges.push((resolve(&source)?, resolve(&target)?));
    }

    Ok(Graph::from_edges(id_to_index.len(), &edges))
}
