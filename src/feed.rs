//! Bounded, newest-first alert feed and per-symbol last-alert bookkeeping.
//!
//! Single writer (the sweep task), many readers. A std RwLock guards only
//! the brief mutation; readers take cloned snapshots and never observe a
//! partially written record.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use crate::data::NewsSignal;
use crate::universe::Symbol;

/// Maximum number of alerts retained in the feed.
pub const FEED_CAPACITY: usize = 500;

/// Default number of alerts returned to consumers.
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// One detected move, enriched with news sentiment. Immutable after
/// creation; only ever evicted by capacity overflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub symbol: Symbol,
    pub percent_change: f64,
    pub headline: String,
    pub sentiment: f64,
    pub time: DateTime<Utc>,
}

impl AlertRecord {
    pub fn new(symbol: Symbol, percent_change: f64, signal: NewsSignal, at: DateTime<Utc>) -> Self {
        Self {
            symbol,
            percent_change,
            headline: signal.headline.unwrap_or_default(),
            sentiment: signal.sentiment,
            time: truncate_to_minute(at),
        }
    }

    /// Wall-clock minute the alert fired, rendered as HH:MM.
    pub fn clock_time(&self) -> String {
        self.time.format("%H:%M").to_string()
    }
}

fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// Fixed-capacity, newest-first alert sequence.
pub struct AlertFeed {
    capacity: usize,
    entries: RwLock<VecDeque<AlertRecord>>,
}

impl AlertFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Insert at the head, evicting the oldest entry at capacity.
    pub fn push_front(&self, record: AlertRecord) {
        let mut entries = self.entries.write().expect("alert feed lock poisoned");
        if entries.len() == self.capacity {
            entries.pop_back();
        }
        entries.push_front(record);
    }

    /// Snapshot of up to `limit` most-recent alerts, newest-first.
    pub fn latest(&self, limit: usize) -> Vec<AlertRecord> {
        let entries = self.entries.read().expect("alert feed lock poisoned");
        entries.iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("alert feed lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AlertFeed {
    fn default() -> Self {
        Self::new(FEED_CAPACITY)
    }
}

/// Per-symbol timestamp of the most recent alert. Written on every alert;
/// read back only through the accessor. No cooldown suppression is applied
/// to it anywhere.
#[derive(Default)]
pub struct LastAlertTimes {
    inner: RwLock<HashMap<Symbol, DateTime<Utc>>>,
}

impl LastAlertTimes {
    pub fn record(&self, symbol: Symbol, at: DateTime<Utc>) {
        self.inner
            .write()
            .expect("last-alert lock poisoned")
            .insert(symbol, at);
    }

    pub fn get(&self, symbol: &Symbol) -> Option<DateTime<Utc>> {
        self.inner
            .read()
            .expect("last-alert lock poisoned")
            .get(symbol)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(n: usize) -> AlertRecord {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 42).unwrap();
        AlertRecord::new(
            Symbol::new(&format!("SYM{n}")),
            n as f64 / 10.0,
            NewsSignal {
                headline: Some(format!("headline {n}")),
                sentiment: 0.25,
            },
            at,
        )
    }

    #[test]
    fn timestamp_is_truncated_to_the_minute() {
        let rec = record(1);
        assert_eq!(rec.time.second(), 0);
        assert_eq!(rec.time.nanosecond(), 0);
        assert_eq!(rec.clock_time(), "10:15");
    }

    #[test]
    fn missing_headline_becomes_empty_string() {
        let rec = AlertRecord::new(Symbol::new("TCS.NS"), 2.0, NewsSignal::none(), Utc::now());
        assert_eq!(rec.headline, "");
        assert_eq!(rec.sentiment, 0.0);
    }

    #[test]
    fn push_then_latest_round_trips() {
        let feed = AlertFeed::default();
        let rec = record(7);
        feed.push_front(rec.clone());
        assert_eq!(feed.latest(1), vec![rec]);
    }

    #[test]
    fn latest_is_newest_first_and_length_clamped() {
        let feed = AlertFeed::default();
        for n in 0..10 {
            feed.push_front(record(n));
        }
        let latest = feed.latest(4);
        assert_eq!(latest.len(), 4);
        assert_eq!(latest[0].symbol, Symbol::new("SYM9"));
        assert_eq!(latest[3].symbol, Symbol::new("SYM6"));
        assert_eq!(feed.latest(50).len(), 10);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let feed = AlertFeed::new(FEED_CAPACITY);
        for n in 1..=FEED_CAPACITY + 1 {
            feed.push_front(record(n));
        }
        assert_eq!(feed.len(), FEED_CAPACITY);
        let all = feed.latest(FEED_CAPACITY);
        assert_eq!(all[0].symbol, Symbol::new("SYM501"));
        assert!(all.iter().all(|r| r.symbol != Symbol::new("SYM1")));
    }

    #[test]
    fn last_alert_times_record_and_read_back() {
        let times = LastAlertTimes::default();
        let sym = Symbol::new("TCS.NS");
        assert!(times.get(&sym).is_none());
        let at = Utc::now();
        times.record(sym.clone(), at);
        assert_eq!(times.get(&sym), Some(at));
    }
}
