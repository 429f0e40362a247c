//! Time and pacing abstraction. The sweep and training loops never call
//! the runtime clock or sleep directly; they go through this trait so
//! tests can drive time synthetically instead of waiting in real time.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Mutex;
use std::time::Duration;

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    async fn pause(&self, duration: Duration);
}

/// Production clock: wall time and tokio sleeps.
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Deterministic clock for tests: pauses return immediately, advance the
/// reported time by the requested amount, and are recorded for assertions.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    pauses: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            pauses: Mutex::new(Vec::new()),
        }
    }

    /// Every pause requested so far, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().expect("clock lock poisoned").clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock poisoned")
    }

    async fn pause(&self, duration: Duration) {
        self.pauses
            .lock()
            .expect("clock lock poisoned")
            .push(duration);
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += ChronoDuration::from_std(duration).unwrap_or_else(|_| ChronoDuration::zero());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manual_clock_records_pauses_and_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.pause(Duration::from_secs(5)).await;
        clock.pause(Duration::from_secs(10)).await;
        assert_eq!(
            clock.pauses(),
            vec![Duration::from_secs(5), Duration::from_secs(10)]
        );
        assert_eq!(clock.now() - start, ChronoDuration::seconds(15));
    }
}
