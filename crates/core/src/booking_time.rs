//! Booking search time-range bounds
//!
//! The booking search form picks a date and a time-of-day separately. The
//! backend expects each bound as a single epoch-millisecond timestamp.

use chrono::{Local, NaiveDate, NaiveTime, TimeZone, Timelike};

/// Date and time-of-day pickers of the booking search form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRangeInput {
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
}

/// Resolved bounds in epoch milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRangeBounds {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeRangeInput {
    /// Resolve the bounds in the local time zone
    pub fn resolve(&self) -> TimeRangeBounds {
        self.resolve_in(&Local)
    }

    /// Resolve the bounds in `tz`.
    ///
    /// The start bound only needs a date; a missing time means midnight. The
    /// end bound needs both date and time. Times are truncated to the minute.
    pub fn resolve_in<Tz: TimeZone>(&self, tz: &Tz) -> TimeRangeBounds {
        let start = self.start_date.and_then(|date| {
            let time = self.start_time.or_else(|| NaiveTime::from_hms_opt(0, 0, 0))?;
            epoch_millis(tz, date, time)
        });

        let end = match (self.end_date, self.end_time) {
            (Some(date), Some(time)) => epoch_millis(tz, date, time),
            _ => None,
        };

        TimeRangeBounds { start, end }
    }
}

/// Combine a date and a time-of-day into epoch milliseconds.
///
/// Ambiguous local times resolve to the earlier instant; nonexistent ones
/// (inside a DST gap) yield `None`.
pub fn epoch_millis<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<i64> {
    let time = time.with_second(0)?.with_nanosecond(0)?;
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.timestamp_millis())
}
