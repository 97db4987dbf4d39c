use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A source of the current time.
pub trait Clock {
    fn now(&self) -> SystemTime;
}

/// The wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the cache under test.
#[derive(Clone, Debug)]
pub struct ManualClock {
    /// Nanoseconds since the UNIX epoch.
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock reading one day past the UNIX epoch.
    pub fn new() -> Self {
        Self::at(UNIX_EPOCH + Duration::from_secs(86_400))
    }

    /// A clock reading `time`. Times before the epoch read as the epoch.
    pub fn at(time: SystemTime) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(to_nanos(time))),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        // fetch_update never fails with a closure that always returns Some.
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by))
            });
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, time: SystemTime) {
        self.nanos.store(to_nanos(time), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

fn to_nanos(time: SystemTime) -> u64 {
    let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    u64::try_from(since_epoch.as_nanos()).unwrap_or(u64::MAX)
}
