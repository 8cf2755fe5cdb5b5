use chrono::{Local, NaiveDateTime};

/// Source of "now" for the hook. Slurm prints and accepts timestamps in the
/// controller's local time, so the clock hands out naive local datetimes.
pub trait SystemClock: std::fmt::Debug + Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl SystemClock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub time: NaiveDateTime,
}

impl FixedClock {
    pub fn new(time: NaiveDateTime) -> FixedClock {
        FixedClock { time }
    }
}

impl SystemClock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.time
    }
}
