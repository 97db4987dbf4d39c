//! The expiring cache.
//!
//! Entries live in a `BTreeMap<K, Entry<V>>` alongside the time of their last
//! write. Liveness is decided on every read against the effective time:
//! the clock's reading while running, or the reading captured by
//! [`ExpiringCache::lock`] while locked.
//!
//! # Invariants
//!
//! - An entry is live iff `effective_now - inserted_at < max_age`.
//! - Every write stamps the entry with the effective time and a fresh
//!   sequence number, even when the value is unchanged.
//! - Reads never remove entries.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::ExpiringConfig;
use crate::error::{CacheError, CacheResult};

#[derive(Clone, Debug)]
struct Entry<V> {
    value: V,
    inserted_at: SystemTime,
    /// Write sequence, breaks ties between equal timestamps.
    seq: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClockState {
    Running,
    Pinned(SystemTime),
}

/// A mapping whose entries expire `max_age` after their last write.
///
/// Not internally synchronized; callers sharing a cache across threads must
/// serialize access themselves.
#[derive(Clone)]
pub struct ExpiringCache<K, V, C = SystemClock> {
    entries: BTreeMap<K, Entry<V>>,
    config: ExpiringConfig,
    clock: C,
    state: ClockState,
    next_seq: u64,
}

impl<K: Ord, V> ExpiringCache<K, V, SystemClock> {
    /// An empty cache with the default configuration (entries never expire).
    pub fn new() -> Self {
        Self::with_config(ExpiringConfig::default())
    }

    /// An empty cache reading the wall clock.
    pub fn with_config(config: ExpiringConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// A cache pre-filled with `entries`, all stamped with the current time.
    pub fn from_entries<I>(entries: I, config: ExpiringConfig) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut cache = Self::with_config(config);
        cache.extend(entries);
        cache
    }
}

impl<K: Ord, V> Default for ExpiringCache<K, V, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V, C: Clock> ExpiringCache<K, V, C> {
    /// An empty cache reading time from `clock`.
    pub fn with_clock(config: ExpiringConfig, clock: C) -> Self {
        Self {
            entries: BTreeMap::new(),
            config,
            clock,
            state: ClockState::Running,
            next_seq: 0,
        }
    }

    pub fn config(&self) -> &ExpiringConfig {
        &self.config
    }

    pub fn max_age(&self) -> Duration {
        self.config.max_age
    }

    /// Change the time-to-live. Applies to existing entries too.
    pub fn set_max_age(&mut self, max_age: Duration) {
        self.config.max_age = max_age;
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ---------------------------------------------------------------
    // Clock control
    // ---------------------------------------------------------------

    /// The time liveness is currently judged against.
    pub fn effective_now(&self) -> SystemTime {
        match self.state {
            ClockState::Running => self.clock.now(),
            ClockState::Pinned(at) => at,
        }
    }

    /// Pin the effective time to the current clock reading.
    ///
    /// Locking an already locked cache re-pins it to the current reading.
    pub fn lock(&mut self) {
        let at = self.clock.now();
        self.state = ClockState::Pinned(at);
        debug!(live = self.len(), "expiring cache locked");
    }

    /// Resume tracking the clock. Entries whose real age already exceeds
    /// `max_age` are expired from here on.
    pub fn unlock(&mut self) {
        self.state = ClockState::Running;
        debug!(live = self.len(), "expiring cache unlocked");
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, ClockState::Pinned(_))
    }

    // ---------------------------------------------------------------
    // Mapping operations
    // ---------------------------------------------------------------

    /// Insert or overwrite `key`, restarting its time-to-live.
    ///
    /// Returns the previous value if it was still live.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let now = self.effective_now();
        let seq = self.next_seq;
        self.next_seq += 1;
        let max_age = self.config.max_age;

        let previous = self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: now,
                seq,
            },
        )?;
        is_live(&previous, now, max_age).then_some(previous.value)
    }

    /// The live value for `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let now = self.effective_now();
        self.entries
            .get(key)
            .filter(|entry| is_live(entry, now, self.config.max_age))
            .map(|entry| &entry.value)
    }

    /// The live value for `key`, or `default`.
    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    /// The live value for `key`, failing if it is missing or expired.
    pub fn try_get<Q>(&self, key: &Q) -> CacheResult<&V>
    where
        K: Borrow<Q>,
        Q: Ord + fmt::Debug + ?Sized,
    {
        self.get(key).ok_or_else(|| CacheError::ExpiredOrMissing {
            key: format!("{key:?}"),
        })
    }

    /// Mutable access to the live value for `key`. Does not refresh its age.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let now = self.effective_now();
        let max_age = self.config.max_age;
        self.entries
            .get_mut(key)
            .filter(|entry| is_live(entry, now, max_age))
            .map(|entry| &mut entry.value)
    }

    /// Returns `true` if `key` has a live entry.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Remove `key`, returning its value if it was live.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let now = self.effective_now();
        let entry = self.entries.remove(key)?;
        is_live(&entry, now, self.config.max_age).then_some(entry.value)
    }

    /// How long ago the live entry for `key` was last written.
    pub fn age<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let now = self.effective_now();
        self.entries
            .get(key)
            .filter(|entry| is_live(entry, now, self.config.max_age))
            .map(|entry| age_of(entry, now))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.effective_now();
        self.entries
            .values()
            .filter(|entry| is_live(entry, now, self.config.max_age))
            .count()
    }

    /// Returns `true` if no entry is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of stored entries, expired ones included.
    pub fn stored_len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.effective_now();
        let max_age = self.config.max_age;
        let before = self.entries.len();
        self.entries.retain(|_, entry| is_live(entry, now, max_age));
        let purged = before - self.entries.len();
        debug!(purged, remaining = self.entries.len(), "purged expired entries");
        purged
    }

    /// Remove everything, live or not.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // ---------------------------------------------------------------
    // Iteration
    // ---------------------------------------------------------------

    /// Live entries, oldest write first when `sort_by_time` is set and in
    /// ascending key order otherwise.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let now = self.effective_now();
        let max_age = self.config.max_age;
        let mut live: Vec<(&K, &Entry<V>)> = self
            .entries
            .iter()
            .filter(|(_, entry)| is_live(entry, now, max_age))
            .collect();
        if self.config.sort_by_time {
            live.sort_by_key(|(_, entry)| (entry.inserted_at, entry.seq));
        }
        Iter {
            inner: live.into_iter(),
        }
    }

    /// Live keys, in iteration order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Live values, in iteration order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

fn age_of<V>(entry: &Entry<V>, now: SystemTime) -> Duration {
    // A clock that went backwards makes the entry brand new, not expired.
    now.duration_since(entry.inserted_at).unwrap_or_default()
}

fn is_live<V>(entry: &Entry<V>, now: SystemTime, max_age: Duration) -> bool {
    age_of(entry, now) < max_age
}

/// Iterator over live `(key, value)` pairs.
pub struct Iter<'a, K, V> {
    inner: std::vec::IntoIter<(&'a K, &'a Entry<V>)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, entry)| (k, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K: Ord, V, C: Clock> IntoIterator for &'a ExpiringCache<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K: Ord, V, C: Clock> Extend<(K, V)> for ExpiringCache<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for ExpiringCache<K, V, SystemClock> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter, ExpiringConfig::default())
    }
}

/// Renders the live entries as a mapping literal, e.g. `{"test": "test"}`.
impl<K, V, C> fmt::Display for ExpiringCache<K, V, C>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> fmt::Debug for ExpiringCache<K, V, C>
where
    K: Ord + fmt::Debug,
    V: fmt::Debug,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Live<'a, K, V, C>(&'a ExpiringCache<K, V, C>);

        impl<K: Ord + fmt::Debug, V: fmt::Debug, C: Clock> fmt::Debug for Live<'_, K, V, C> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_map().entries(self.0.iter()).finish()
            }
        }

        f.debug_struct("ExpiringCache")
            .field("entries", &Live(self))
            .field("max_age", &self.config.max_age)
            .field("sort_by_time", &self.config.sort_by_time)
            .field("locked", &self.is_locked())
            .finish()
    }
}
