//! Class registry for dictkit.
//!
//! A [`ClassRegistry`] files values under a `(family, variant)` pair of
//! lower-cased names. The family comes from the key a value is registered
//! under; the variant comes from the value's own name. Lookups are
//! case-insensitive and either side of a pair may be left open as a
//! wildcard, in which case exactly one registered entry must match.
//!
//! # Modules
//!
//! - [`error`] — Error types for registry operations
//! - [`name`] — The [`Named`] name-provider trait and [`Class`] type identities
//! - [`key`] — The [`RegistryKey`] lookup forms
//! - [`registry`] — The [`ClassRegistry`] container

pub mod error;
pub mod key;
pub mod name;
pub mod registry;

pub use error::{RegistryError, RegistryResult};
pub use key::RegistryKey;
pub use name::{Class, Named, Symbol};
pub use registry::ClassRegistry;
