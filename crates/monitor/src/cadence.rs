//! Per-member check cadence.
//!
//! Tracks when each username was last checked by the loop. Entries live
//! only in memory; after a restart every member is due immediately.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Last-check instants keyed by username.
#[derive(Debug)]
pub struct CheckCadence {
    interval: Duration,
    last_checked: HashMap<String, Instant>,
}

impl CheckCadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_checked: HashMap::new(),
        }
    }

    /// Due if never checked or at least one interval has passed.
    pub fn is_due(&self, username: &str, now: Instant) -> bool {
        match self.last_checked.get(username) {
            Some(last) => now.saturating_duration_since(*last) >= self.interval,
            None => true,
        }
    }

    pub fn mark(&mut self, username: &str, now: Instant) {
        self.last_checked.insert(username.to_string(), now);
    }

    /// Time until the earliest tracked member becomes due, `None` if no
    /// member has been checked yet.
    pub fn until_next_due(&self, now: Instant) -> Option<Duration> {
        self.last_checked
            .values()
            .map(|last| (*last + self.interval).saturating_duration_since(now))
            .min()
    }

    /// Drop entries for usernames no longer on the roster.
    pub fn retain<'a>(&mut self, usernames: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = usernames.into_iter().collect();
        self.last_checked.retain(|name, _| keep.contains(name.as_str()));
    }

    pub fn len(&self) -> usize {
        self.last_checked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_checked.is_empty()
    }
}
