// Date utility functions
// All arithmetic is calendar-date based; time-of-day is ignored unless noted.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};

pub fn is_same_day(date1: DateTime<Local>, date2: DateTime<Local>) -> bool {
    date1.date_naive() == date2.date_naive()
}

pub fn start_of_day(date: DateTime<Local>) -> DateTime<Local> {
    date.date_naive()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_local_timezone(date.timezone())
        .unwrap()
}

pub fn end_of_day(date: DateTime<Local>) -> DateTime<Local> {
    date.date_naive()
        .and_hms_opt(23, 59, 59)
        .unwrap()
        .and_local_timezone(date.timezone())
        .unwrap()
}

/// Local midnight of the given calendar date.
pub fn date_at_midnight(date: NaiveDate) -> DateTime<Local> {
    Local
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .unwrap()
}

/// Local 23:59:59 of the given calendar date.
pub fn date_at_day_end(date: NaiveDate) -> DateTime<Local> {
    Local
        .from_local_datetime(&date.and_hms_opt(23, 59, 59).unwrap())
        .unwrap()
}

/// Whole calendar days from `start` to `end`, ignoring time of day.
/// Negative when `end` is on an earlier date than `start`.
pub fn days_between(start: DateTime<Local>, end: DateTime<Local>) -> i64 {
    days_between_dates(start.date_naive(), end.date_naive())
}

pub fn days_between_dates(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Weekday index with Sunday = 0 .. Saturday = 6.
pub fn weekday_from_sunday(date: NaiveDate) -> i64 {
    date.weekday().num_days_from_sunday() as i64
}

/// Start of the week containing `date`, where the week begins on
/// `first_day_of_week` (Sunday = 0 .. Saturday = 6).
pub fn week_start(date: NaiveDate, first_day_of_week: i64) -> NaiveDate {
    let offset = (weekday_from_sunday(date) - first_day_of_week + 7) % 7;
    date - Duration::days(offset)
}

/// Signed minutes from the midnight of `day` to `instant`. Exceeds 24 * 60
/// when `instant` falls past the end of `day`.
pub fn minutes_from_day_start(day: NaiveDate, instant: DateTime<Local>) -> i64 {
    (instant - date_at_midnight(day)).num_minutes()
}
