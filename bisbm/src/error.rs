use core::fmt;

/// Result alias for `bisbm`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned before any fitting work starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The graph has no vertices.
    EmptyInput,

    /// Two per-vertex inputs disagree in length.
    DimensionMismatch {
        /// Expected length (number of vertices).
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
        }
    }
}

impl std::error::Error for Error {}
