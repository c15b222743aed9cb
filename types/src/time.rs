//! Timestamp type used throughout the ledger.
//!
//! Timestamps are Unix epoch seconds (UTC). The ledger never reads the wall
//! clock: "now" is always the head block time, so replays are deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SECONDS_PER_MINUTE: u64 = 60;
pub const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    /// The "never" sentinel: a schedule that will not fire, or a comment
    /// that is no longer eligible for payout.
    pub const MAX: Self = Self(u64::MAX);

    pub const fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn is_max(&self) -> bool {
        self.0 == u64::MAX
    }

    /// This timestamp moved forward by `secs`, saturating at [`Timestamp::MAX`].
    pub fn plus(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// This timestamp moved back by `secs`, saturating at the epoch.
    pub fn minus(&self, secs: u64) -> Self {
        Self(self.0.saturating_sub(secs))
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Whether this timestamp + duration has passed relative to `now`.
    pub fn has_expired(&self, duration_secs: u64, now: Timestamp) -> bool {
        now.0 >= self.0.saturating_add(duration_secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            return f.write_str("never");
        }
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_saturates_at_max() {
        assert_eq!(Timestamp::MAX.plus(10), Timestamp::MAX);
        assert_eq!(Timestamp::new(5).plus(10), Timestamp::new(15));
        assert_eq!(Timestamp::new(5).minus(10), Timestamp::EPOCH);
    }

    #[test]
    fn elapsed_and_expiry() {
        let start = Timestamp::new(100);
        assert_eq!(start.elapsed_since(Timestamp::new(160)), 60);
        assert_eq!(start.elapsed_since(Timestamp::new(50)), 0);
        assert!(start.has_expired(60, Timestamp::new(160)));
        assert!(!start.has_expired(61, Timestamp::new(160)));
    }

    #[test]
    fn max_displays_as_never() {
        assert_eq!(Timestamp::MAX.to_string(), "never");
        assert_eq!(Timestamp::new(3).to_string(), "3s");
    }
}
