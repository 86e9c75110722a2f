//! Shift windows.
//!
//! A shift repeats the same clock window on each occurrence day. When
//! `end_time <= start_time` the window crosses midnight and ends on the
//! following day, so `end_date` itself is not an occurrence.

use crate::errors::{AppError, AppResult};
use crate::models::shift::Shift;
use crate::utils::date::days_between;
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// The end instant (end_date + end_time) must be strictly after the start instant.
pub fn validate_bounds(
    start_date: NaiveDate,
    end_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
) -> AppResult<()> {
    let start = start_date.and_time(start_time);
    let end = end_date.and_time(end_time);
    if end <= start {
        return Err(AppError::validation(format!(
            "shift must end after it starts ({} → {})",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        )));
    }
    Ok(())
}

pub fn occurrence_dates(shift: &Shift) -> Vec<NaiveDate> {
    let last = if shift.is_overnight() {
        shift.end_date.checked_sub_days(Days::new(1))
    } else {
        Some(shift.end_date)
    };

    match last {
        Some(last) if last >= shift.start_date => days_between(shift.start_date, last),
        _ => Vec::new(),
    }
}

pub fn is_occurrence(shift: &Shift, date: NaiveDate) -> bool {
    occurrence_dates(shift).contains(&date)
}

/// Expected start / end for one occurrence day.
pub fn window_for(shift: &Shift, occurrence: NaiveDate) -> Window {
    let start = occurrence.and_time(shift.start_time);
    let end_day = if shift.is_overnight() {
        occurrence.checked_add_days(Days::new(1)).unwrap_or(occurrence)
    } else {
        occurrence
    };

    Window {
        start,
        end: end_day.and_time(shift.end_time),
    }
}

/// When the last occurrence of the shift ends.
pub fn last_window_end(shift: &Shift) -> NaiveDateTime {
    occurrence_dates(shift)
        .last()
        .map(|d| window_for(shift, *d).end)
        .unwrap_or_else(|| shift.end_instant())
}
