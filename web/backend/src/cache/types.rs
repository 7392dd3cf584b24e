use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A value and the wall-clock millisecond it was computed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamped<T> {
    pub value: T,
    pub computed_at: i64,
}

impl<T> Stamped<T> {
    pub fn new(value: T, computed_at: i64) -> Self {
        Self { value, computed_at }
    }

    pub fn is_fresh(&self, now: i64, ttl: Duration) -> bool {
        let ttl = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(self.computed_at) < ttl
    }
}
