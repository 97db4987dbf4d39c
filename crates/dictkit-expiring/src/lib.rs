//! Expiring cache for dictkit.
//!
//! [`ExpiringCache`] is an ordered mapping whose entries expire a fixed
//! `max_age` after they were last written. Expired entries are hidden from
//! every read and iteration but are only dropped lazily (or on an explicit
//! [`ExpiringCache::purge_expired`]).
//!
//! The cache reads time through a [`Clock`]. Locking the cache pins the
//! effective time to the clock reading at the moment of the lock, so nothing
//! ages until it is unlocked again.
//!
//! # Key Types
//!
//! - [`ExpiringCache`] -- The cache itself (BTreeMap-backed)
//! - [`ExpiringConfig`] -- `max_age` and iteration order
//! - [`Clock`] -- Time source; [`SystemClock`] for wall time, [`ManualClock`] for tests

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;

pub use cache::{ExpiringCache, Iter};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ExpiringConfig;
pub use error::{CacheError, CacheResult};
