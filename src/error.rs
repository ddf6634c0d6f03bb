//! Error types for membership operations.

use thiserror::Error;

/// Errors surfaced by the collision engine and its spatial index.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollisionError {
    /// The entity handle could not be inspected, typically because its lock
    /// is already held by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
