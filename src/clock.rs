use chrono::{Local, NaiveDateTime};

/// Source of "now" for the status engine, the query resolver and the
/// reminder poller.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the process's local timezone.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant. Used by tests and by `FIXED_NOW`.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    pub fn parse(value: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M")
            .ok()
            .map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
