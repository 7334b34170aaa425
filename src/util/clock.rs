use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
///
/// The rename throttler and other time-driven components take the clock as a
/// dependency so tests can drive them deterministically with a manual clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
