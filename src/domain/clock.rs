use std::sync::{Arc, RwLock};
use chrono::{DateTime, Duration, Utc};

const FIXED_CLOCK_POISONED_MSG: &str = "FixedClock lock was poisoned";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Copy, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock. Clones share the same time.
#[derive(Clone)]
pub struct FixedClock {
    time: Arc<RwLock<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self { time: Arc::new(RwLock::new(time)) }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        *self.time.write().expect(FIXED_CLOCK_POISONED_MSG) = time;
    }

    pub fn advance(&self, by: Duration) {
        let mut time = self.time.write().expect(FIXED_CLOCK_POISONED_MSG);
        *time += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.time.read().expect(FIXED_CLOCK_POISONED_MSG)
    }
}
