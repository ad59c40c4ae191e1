use core::fmt;

/// Result alias for graph loading.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while loading a graph and labelling its sides.
///
/// Format problems and structural problems are kept apart: a file that
/// parses fine but has an odd cycle is `NotBipartite`, never `Parse`.
#[derive(Debug)]
pub enum GraphError {
    /// The file could not be opened or read.
    Unreadable {
        /// Path given by the caller.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Unknown graph type name.
    UnsupportedFormat(String),

    /// The file was read but its content is malformed.
    Parse {
        /// Format being parsed (`gml`, `graphml`, `edgelist`).
        format: &'static str,
        /// Line number (1-based) when known.
        line: Option<usize>,
        /// What went wrong.
        message: String,
    },

    /// The edge `(u, v)` joins two vertices of the same side.
    NotBipartite {
        /// One endpoint.
        u: usize,
        /// The other endpoint.
        v: usize,
    },
}

impl GraphError {
    pub(crate) fn parse(format: &'static str, line: Option<usize>, message: impl Into<String>) -> Self {
        GraphError::Parse {
            format,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::Unreadable { path, source } => {
                write!(f, "could not read file {path}: {source}")
            }
            GraphError::UnsupportedFormat(name) => {
                write!(f, "unknown graph type '{name}' (expected gml, graphml or edgelist)")
            }
            GraphError::Parse {
                format,
                line: Some(line),
                message,
            } => write!(f, "failed to parse {format} input at line {line}: {message}"),
            GraphError::Parse {
                format,
                line: None,
                message,
            } => write!(f, "failed to parse {format} input: {message}"),
            GraphError::NotBipartite { u, v } => {
                write!(f, "input graph is not bipartite (edge {u} -- {v} closes an odd cycle)")
            }
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}
