//! Graph Modelling Language (GML) reader.
//!
//! A GML document is a sequence of `key value` pairs where a value is an
//! integer, a real, a quoted string, or a bracketed list of further pairs.
//! Only `graph [ node [ id .. ] edge [ source .. target .. ] ]` is
//! interpreted; every other attribute is parsed and ignored.

use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph};
use log::warn;
use nom::branch::alt;
use nom::bytes::complete::{take_till, take_while};
use nom::character::complete::{char, multispace1, satisfy};
use nom::combinator::{all_consuming, map, map_res, recognize, value};
use nom::multi::many0;
use nom::number::complete::recognize_float;
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;
use std::collections::HashMap;

const FORMAT: &str = "gml";

/// A parsed GML value
#[derive(Debug, Clone, PartialEq)]
pub enum GmlValue {
    /// Integer literal
    Int(i64),
    /// Real literal
    Real(f64),
    /// Quoted string (quotes stripped)
    Str(String),
    /// Bracketed list of key-value pairs
    List(Vec<(String, GmlValue)>),
}

impl GmlValue {
    fn as_list(&self) -> Option<&[(String, GmlValue)]> {
        match self {
            GmlValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            GmlValue::Int(x) => Some(*x),
            _ => None,
        }
    }
}

/// whitespace and `#` comments
fn sp(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(char('#'), take_till(|c: char| c == '\n'))),
        ))),
    )(input)
}

fn key(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn number(input: &str) -> IResult<&str, GmlValue> {
    map_res(recognize_float, |s: &str| {
        if let Ok(x) = s.parse::<i64>() {
            Ok(GmlValue::Int(x))
        } else {
            s.parse::<f64>().map(GmlValue::Real)
        }
    })(input)
}

fn string(input: &str) -> IResult<&str, GmlValue> {
    map(
        delimited(char('"'), take_till(|c: char| c == '"'), char('"')),
        |s: &str| GmlValue::Str(s.to_string()),
    )(input)
}

fn list(input: &str) -> IResult<&str, GmlValue> {
    map(
        delimited(char('['), many0(preceded(sp, key_value)), preceded(sp, char(']'))),
        GmlValue::List,
    )(input)
}

fn gml_value(input: &str) -> IResult<&str, GmlValue> {
    alt((list, string, number))(input)
}

fn key_value(input: &str) -> IResult<&str, (String, GmlValue)> {
    map(pair(key, preceded(sp, gml_value)), |(k, v)| {
        (k.to_string(), v)
    })(input)
}

fn document(input: &str) -> IResult<&str, Vec<(String, GmlValue)>> {
    all_consuming(delimited(sp, many0(terminated(key_value, sp)), sp))(input)
}

/// Parse a GML document into its top-level key-value pairs.
pub fn parse_gml_document(content: &str) -> Result<Vec<(String, GmlValue)>> {
    match document(content) {
        Ok((_, items)) => Ok(items),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = content.len() - e.input.len();
            let line = content[..offset].matches('\n').count() + 1;
            let near: String = e.input.chars().take(20).collect();
            Err(GraphError::parse(FORMAT, Some(line), format!("unexpected input near '{near}'")))
        }
        Err(nom::Err::Incomplete(_)) => Err(GraphError::parse(FORMAT, None, "unexpected end of input")),
    }
}

/// Parse a GML document into a [`Graph`].
///
/// Node ids are remapped to dense indices in order of appearance. Directed
/// graphs are read as undirected.
pub fn parse_gml(content: &str) -> Result<Graph> {
    let items = parse_gml_document(content)?;

    let graph_items = items
        .iter()
        .find(|(k, _)| k == "graph")
        .and_then(|(_, v)| v.as_list())
        .ok_or_else(|| GraphError::parse(FORMAT, None, "missing 'graph [ ... ]' block"))?;

    let mut id_to_index: HashMap<i64, usize> = HashMap::new();

    for (k, v) in graph_items {
        match k.as_str() {
            "node" => {
                let id = v
                    .as_list()
                    .and_then(|attrs| lookup_int(attrs, "id"))
                    .ok_or_else(|| GraphError::parse(FORMAT, None, "node without integer id"))?;
                let next = id_to_index.len();
                if id_to_index.insert(id, next).is_some() {
                    return Err(GraphError::parse(FORMAT, None, format!("duplicate node id {id}")));
                }
            }
            "directed" if v.as_int() == Some(1) => {
                warn!("directed GML graph will be treated as undirected");
            }
            _ => {}
        }
    }

    let mut edges: Vec<Edge> = Vec::new();
    for (k, v) in graph_items {
        if k != "edge" {
            continue;
        }
        let attrs = v
            .as_list()
            .ok_or_else(|| GraphError::parse(FORMAT, None, "edge is not a list"))?;
        let endpoint = |name: &str| -> Result<usize> {
            let id = lookup_int(attrs, name).ok_or_else(|| {
                GraphError::parse(FORMAT, None, format!("edge without integer {name}"))
            })?;
            id_to_index
                .get(&id)
                .copied()
                .ok_or_else(|| GraphError::parse(FORMAT, None, format!("edge {name} {id} is not a node")))
        };
        edges.push((endpoint("source")?, endpoint("target")?));
    }

    Ok(Graph::from_edges(id_to_index.len(), &edges))
}

fn lookup_int(attrs: &[(String, GmlValue)], name: &str) -> Option<i64> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .and_then(|(_, v)| v.as_int())
}
