use chrono::{DateTime, Duration, DurationRound, Utc};

/// Source of wall-clock instants. Swappable so tests can freeze time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hands out strictly increasing instants at microsecond resolution.
///
/// Readings are truncated to whole microseconds so they survive the
/// epoch-seconds wire encoding unchanged. When the source has not moved past
/// the last issued instant, the next instant is the last one plus 1µs.
///
/// Not synchronised on its own: callers must serialise `tick` (the registry
/// calls it under its write lock).
pub struct MonotonicClock {
    source: Box<dyn Clock>,
    last: Option<DateTime<Utc>>,
}

impl MonotonicClock {
    pub fn new(source: Box<dyn Clock>) -> Self {
        Self { source, last: None }
    }

    pub fn tick(&mut self) -> DateTime<Utc> {
        let step = Duration::microseconds(1);
        let reading = self.source.now();
        let reading = reading.duration_trunc(step).unwrap_or(reading);
        let next = match self.last {
            Some(last) if reading <= last => last + step,
            _ => reading,
        };
        self.last = Some(next);
        next
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new(Box::new(SystemClock))
    }
}
