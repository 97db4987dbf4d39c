//! Path tree for dictkit.
//!
//! A [`PathTree`] is a nested mapping whose slots are addressed by paths,
//! written either as a slash-delimited string (`"path/to/leaf"`) or as an
//! explicit sequence of segments (`["path", "to", "leaf"]`). Intermediate
//! nodes are created on write; a write can never descend through a leaf.
//!
//! Sub-trees can be grafted in at any path. Later writes beneath a grafted
//! tree extend it in place.

pub mod error;
pub mod path;
pub mod tree;

pub use error::{PathError, PathResult};
pub use path::TreePath;
pub use tree::{Node, PathTree};
