//! Time source for ids and note timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that returns a fixed instant, advancing by `step_ms` per reading.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
    step_ms: i64,
}

impl FixedClock {
    pub fn at_millis(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
            step_ms: 0,
        }
    }

    pub fn stepping(millis: i64, step_ms: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
            step_ms,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.fetch_add(self.step_ms, Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default()
    }
}

/// Issues epoch-millisecond ids that never repeat within a session.
#[derive(Debug, Default)]
pub struct IdSource {
    last: i64,
}

impl IdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id at or after `at`, strictly greater than any id issued before
    /// and not rejected by `taken`.
    pub fn next(&mut self, at: &DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
        let mut candidate = at.timestamp_millis().max(self.last + 1);
        while taken(&candidate.to_string()) {
            candidate += 1;
        }
        self.last = candidate;
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_strictly_increasing_under_a_frozen_clock() {
        let clock = FixedClock::at_millis(1_700_000_000_000);
        let mut ids = IdSource::new();
        let a = ids.next(&clock.now(), |_| false);
        let b = ids.next(&clock.now(), |_| false);
        assert_eq!(a, "1700000000000");
        assert_eq!(b, "1700000000001");
    }

    #[test]
    fn ids_skip_taken_values() {
        let clock = FixedClock::at_millis(100);
        let mut ids = IdSource::new();
        let id = ids.next(&clock.now(), |candidate| candidate == "100" || candidate == "101");
        assert_eq!(id, "102");
    }

    #[test]
    fn stepping_clock_advances() {
        let clock = FixedClock::stepping(0, 1000);
        assert_eq!(clock.now().timestamp_millis(), 0);
        assert_eq!(clock.now().timestamp_millis(), 1000);
    }
}
