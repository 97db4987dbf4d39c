//! Foundation types for dictkit.
//!
//! This crate provides the dynamic value model used by the containers that
//! operate on loosely-typed documents (the merge engine and the path tree).
//!
//! # Key Types
//!
//! - [`Value`] — A dynamically typed, totally ordered value
//! - [`Mapping`] — An ordered string-keyed map of values

pub mod convert;
pub mod value;

pub use value::{Mapping, Value};
