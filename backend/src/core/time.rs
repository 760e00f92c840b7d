//! Time management for the simulation
//!
//! Transfers are stamped relative to a fixed start instant. The clock also
//! tracks the latest stamp handed out (`finish`), which bounds the window
//! decoy traffic is spread over.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Simulation start and the latest timestamp generated so far
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use kleptosyn_core::SimulationClock;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let mut clock = SimulationClock::new(start);
///
/// let ts = clock.stamp_after_days(3.0).unwrap();
/// assert_eq!(ts, NaiveDate::from_ymd_opt(2025, 1, 4).unwrap().and_hms_opt(0, 0, 0).unwrap());
/// assert_eq!(clock.finish(), ts);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationClock {
    start: NaiveDateTime,

    /// Latest timestamp handed out
    finish: NaiveDateTime,
}

impl SimulationClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start, finish: start }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn finish(&self) -> NaiveDateTime {
        self.finish
    }

    /// Seconds between start and finish
    pub fn span_seconds(&self) -> i64 {
        (self.finish - self.start).num_seconds()
    }

    /// Timestamp `days` after start (fractional days allowed); advances `finish`
    ///
    /// Returns `None` when the offset falls outside the representable range.
    pub fn stamp_after_days(&mut self, days: f64) -> Option<NaiveDateTime> {
        let seconds = (days * SECONDS_PER_DAY).round() as i64;
        let ts = self.at_offset(seconds)?;
        self.observe(ts);
        Some(ts)
    }

    /// Timestamp `seconds` after start, without moving `finish`
    pub fn at_offset(&self, seconds: i64) -> Option<NaiveDateTime> {
        let offset = Duration::try_seconds(seconds)?;
        self.start.checked_add_signed(offset)
    }

    /// Extend `finish` to cover `ts`
    pub fn observe(&mut self, ts: NaiveDateTime) {
        if ts > self.finish {
            self.finish = ts;
        }
    }
}
