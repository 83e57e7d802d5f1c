//! Wall-clock abstraction.
//!
//! # Responsibility
//! - Give services a single, injectable notion of "now" and "today".
//!
//! # Invariants
//! - `now_ms` is Unix epoch milliseconds.
//! - `today` is the calendar date the dashboard treats as the last day of
//!   every window.

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::cell::Cell;

/// Source of the current instant and calendar date.
pub trait Clock {
    /// Current instant in Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
    /// Current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Production clock: system time, local calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Hand-driven clock for tests and replays.
///
/// `today` is the UTC date of the current instant, so results never depend on
/// the host time zone.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
        }
    }

    /// Starts the clock at noon UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .map(|value| value.and_utc().timestamp_millis())
            .unwrap_or_default();
        Self::new(noon)
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.advance_ms(minutes * 60 * 1000);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }

    fn today(&self) -> NaiveDate {
        DateTime::from_timestamp_millis(self.now_ms.get())
            .map(|instant| instant.date_naive())
            .unwrap_or_default()
    }
}
