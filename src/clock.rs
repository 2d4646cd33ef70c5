//! Time sources for record timestamps.

use chrono::{DateTime, SubsecRound, Utc};

/// Supplies "now" whenever a record timestamp is refreshed.
///
/// Timestamps are always taken at the call site through this trait, so tests
/// can pin time with [`FixedClock`].
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, truncated to whole seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Creates a clock pinned to `secs` seconds after the Unix epoch.
    ///
    /// Out-of-range values fall back to the epoch itself.
    #[must_use]
    pub fn from_epoch_secs(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
