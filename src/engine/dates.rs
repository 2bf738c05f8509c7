//! Calendar-day arithmetic.
//!
//! Everything here works on `chrono::NaiveDate`, so a calendar day can never
//! pick up a stray time-of-day or timezone component; two callers holding the
//! same calendar date always get identical counts.

use chrono::{Datelike, Duration, NaiveDate};

use crate::model::leave_request::LeaveType;

/// Days covered by a leave request: half-day requests are 0.5, everything
/// else is the inclusive calendar-day count.
pub fn number_of_days(start: NaiveDate, end: NaiveDate, is_half_day: bool) -> f64 {
    if is_half_day {
        return 0.5;
    }
    (end.signed_duration_since(start).num_days() + 1) as f64
}

/// Effective end date of a request. Work-from-home and half-day requests are
/// always single-day; other types default to the start date when the caller
/// gave no explicit end.
pub fn adjust_end_date(
    leave_type: LeaveType,
    start: NaiveDate,
    end: Option<NaiveDate>,
    is_half_day: bool,
) -> NaiveDate {
    if is_half_day || leave_type == LeaveType::Wfh {
        return start;
    }
    end.unwrap_or(start)
}

/// Sunday that starts the calendar week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

/// First and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (year, month) = (date.year(), date.month());
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("first of month");
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("first of following month");
    (first, next_first - Duration::days(1))
}
