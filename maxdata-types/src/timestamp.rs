//! Strictly increasing creation timestamps.
//!
//! Wall-clock reads can repeat or go backwards when many records are
//! created in the same tick or across threads. The issuer remembers the
//! last tick it handed out and bumps past it whenever the clock has not
//! moved forward.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};

/// Issues creation timestamps that are unique and strictly increasing
/// across every caller sharing the issuer.
///
/// Ticks are nanoseconds since the Unix epoch.
#[derive(Debug, Default)]
pub struct TimestampIssuer {
    last_tick: Mutex<i64>,
}

impl TimestampIssuer {
    /// Creates an issuer that has not handed out any tick yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next timestamp, based on the current wall clock.
    pub fn issue(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        DateTime::from_timestamp_nanos(self.next_tick(wall))
    }

    /// Returns the next tick given a wall-clock reading.
    ///
    /// If `wall` is not strictly greater than the last issued tick the
    /// result is `last + 1`.
    pub fn next_tick(&self, wall: i64) -> i64 {
        let mut last = self.last_tick.lock().unwrap_or_else(PoisonError::into_inner);
        let tick = if wall > *last {
            wall
        } else {
            last.saturating_add(1)
        };
        *last = tick;
        tick
    }

    /// Returns the most recently issued tick (0 when nothing was issued).
    pub fn last_tick(&self) -> i64 {
        *self.last_tick.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
