use thiserror::Error;

/// Errors raised by the skeleton datastructure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatastructureError {
    #[error("invalid {0} handle")]
    InvalidHandle(&'static str),
    #[error("{category} index {index} out of bounds")]
    IndexOutOfBounds {
        category: &'static str,
        index: usize,
    },
    #[error("property \"{0}\" already exists")]
    DuplicateProperty(String),
    #[error("no property named \"{0}\"")]
    UnknownProperty(String),
    #[error("no property at position {0}")]
    UnknownPropertyPosition(usize),
    #[error("property \"{name}\" does not store values of type {requested}")]
    PropertyTypeMismatch {
        name: String,
        requested: &'static str,
    },
    #[error("degenerate {0}: an atom is used more than once")]
    DegenerateElement(&'static str),
}

pub type DatastructureResult<T> = Result<T, DatastructureError>;
