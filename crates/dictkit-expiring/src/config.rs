use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for an [`ExpiringCache`](crate::ExpiringCache).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringConfig {
    /// How long an entry stays live after its last write.
    pub max_age: Duration,
    /// Iterate oldest write first when `true`, by ascending key otherwise.
    pub sort_by_time: bool,
}

impl Default for ExpiringConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::MAX,
            sort_by_time: true,
        }
    }
}

impl ExpiringConfig {
    /// Default ordering with the given time-to-live.
    pub fn with_max_age(max_age: Duration) -> Self {
        Self {
            max_age,
            ..Default::default()
        }
    }

    /// Iterate in ascending key order instead of chronological order.
    pub fn sorted_by_key(self) -> Self {
        Self {
            sort_by_time: false,
            ..self
        }
    }
}
