use chrono::{NaiveDateTime, Utc};

use crate::time::clock::Clock;

/// A [`Clock`] backed by the system clock, reporting UTC.
///
/// Timestamps are stored without a zone; keeping them in UTC leaves any
/// local-time presentation to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}
