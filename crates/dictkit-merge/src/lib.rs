//! Merge engine for dictkit.
//!
//! Implements a recursive structural merge of two [`Mapping`]s. Keys missing
//! from the primary mapping are inserted, nested mappings are merged
//! recursively, sequences are concatenated, sets are unioned, and any other
//! collision is settled by the `update` flag.
//!
//! [`Mapping`]: dictkit_types::Mapping

pub mod merge;

pub use merge::{merge, merge_all, merge_into, merge_values, merged, MergeOptions, Merged};
