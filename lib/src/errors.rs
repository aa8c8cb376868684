// Errors raised by the quad store and its term encoder

use crate::concise::Role;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuadTreeError {
    /// The operation is declared on the dataset surface but has no implementation.
    #[error("{0} is not implemented for linked quad trees")]
    NotImplemented(&'static str),
    /// The key does not follow the concise term grammar.
    #[error("malformed concise term key: {0:?}")]
    InvalidKey(String),
    /// A prefixed name refers to a prefix missing from the prefix table.
    #[error("no namespace registered for prefix {prefix:?} (key {key:?})")]
    UnknownPrefix { prefix: String, key: String },
    /// The key is well formed but names a term that cannot occupy this position.
    #[error("concise term key {key:?} cannot be used as a {role}")]
    InvalidRole { key: String, role: Role },
}

/// Crate-level result type.
pub type Result<T> = std::result::Result<T, QuadTreeError>;
