//! Timestamp-driven pacing.
//!
//! The first paced record fixes the shift between recorded and wall-clock
//! time:
//!
//! ```text
//! offset = now - ts₀ - buffer_period
//! ```
//!
//! Every record is then due at `ts + offset` and leaves with its RTTFC
//! timestamp rewritten to `ts + offset - historic`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::rttfc::fields;

/// Pacing parameters, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pacing {
    /// How far behind wall-clock time records are replayed
    pub buffer_period: f64,
    /// Extra age subtracted from forwarded timestamps
    pub historic: f64,
}

/// When to send a record and with which timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Time to wait before sending
    pub wait: Duration,
    /// Timestamp to put in the record
    pub timestamp: f64,
}

/// Maps recorded timestamps onto wall-clock time.
#[derive(Debug, Clone)]
pub struct ReplayClock {
    pacing: Pacing,
    offset: Option<f64>,
}

impl ReplayClock {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            offset: None,
        }
    }

    /// Offset in seconds, once the first record has been scheduled.
    pub fn offset(&self) -> Option<f64> {
        self.offset
    }

    /// Forget the offset; the next record fixes a new one.
    pub fn reset(&mut self) {
        self.offset = None;
    }

    /// Schedule a record recorded at `ts`, with `now` the current Unix time.
    ///
    /// Returns `None` if the record is due further ahead than a
    /// [`Duration`] can express.
    pub fn schedule(&mut self, ts: f64, now: f64) -> Option<Slot> {
        let buffer_period = self.pacing.buffer_period;
        let offset = *self.offset.get_or_insert(now - ts - buffer_period);

        let due = ts + offset;
        let wait = if due > now {
            Duration::try_from_secs_f64(due - now).ok()?
        } else {
            Duration::ZERO
        };

        Some(Slot {
            wait,
            timestamp: due - self.pacing.historic,
        })
    }
}

/// Current time as fractional Unix seconds.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Timestamp column of an RTTFC line, if present and numeric.
pub fn record_timestamp(line: &str) -> Option<f64> {
    let value: f64 = line.split(',').nth(fields::TIMESTAMP)?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Replace the timestamp column of a line; `None` if the line has no such column.
pub fn rewrite_timestamp(line: &str, timestamp: f64) -> Option<String> {
    let formatted = timestamp.to_string();
    let mut cols: Vec<&str> = line.split(',').collect();
    if cols.len() <= fields::TIMESTAMP {
        return None;
    }
    cols[fields::TIMESTAMP] = &formatted;
    Some(cols.join(","))
}
