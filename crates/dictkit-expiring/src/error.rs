//! Error types for the expiring cache.

/// Errors returned by strict cache reads.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheError {
    /// The key was never written, was removed, or its entry has expired.
    #[error("key expired or missing: {key}")]
    ExpiredOrMissing { key: String },
}

/// Convenience alias for cache results.
pub type CacheResult<T> = Result<T, CacheError>;
