use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Source of audit timestamps for healing events.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock that never goes backwards: if the system time steps back,
/// the last issued instant is repeated.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_micros: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let current = Utc::now().timestamp_micros();
        let previous = self.last_micros.fetch_max(current, Ordering::SeqCst);
        let issued = previous.max(current);
        DateTime::<Utc>::from_timestamp_micros(issued).unwrap_or_else(Utc::now)
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
