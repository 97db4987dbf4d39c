//! Error types for path tree operations.

use thiserror::Error;

/// Errors that can occur while writing to a path tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// An intermediate segment of the path holds a leaf value.
    #[error("cannot set {path}: {segment} is a leaf")]
    LeafInPath { path: String, segment: String },

    /// The path has no segments.
    #[error("empty path")]
    EmptyPath,
}

/// Convenience type alias for path tree operations.
pub type PathResult<T> = std::result::Result<T, PathError>;
