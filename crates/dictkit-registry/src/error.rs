//! Error types for registry operations.

use thiserror::Error;

/// Errors that can occur during registry lookups and removals.
///
/// Every variant is a not-found outcome. Ambiguous wildcard matches get
/// their own variant so callers can tell them apart from plain absence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No variant is registered under the family.
    #[error("family not found: {family}")]
    FamilyNotFound { family: String },

    /// The variant is not registered (under any family when `family` is `None`).
    #[error("variant not found: {}/{variant}", .family.as_deref().unwrap_or("*"))]
    VariantNotFound {
        family: Option<String>,
        variant: String,
    },

    /// A wildcard key matched more than one entry.
    #[error("ambiguous key {pattern}: {candidates} entries match")]
    Ambiguous { pattern: String, candidates: usize },

    /// Neither family nor variant was given where one is required.
    #[error("key names neither a family nor a variant")]
    EmptyKey,
}

impl RegistryError {
    /// Returns `true` if a wildcard matched several entries.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, RegistryError::Ambiguous { .. })
    }
}

/// Convenience type alias for registry operations.
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
