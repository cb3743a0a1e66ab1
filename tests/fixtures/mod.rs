// Test fixtures - reusable test data
// Provides consistent test data across all test files

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use week_grid::Event;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn timed_event(id: &str, start: DateTime<Local>, end: DateTime<Local>) -> Event {
    Event::new(id, format!("event {id}"), start, end).unwrap()
}

/// The event set used by the end-to-end scenarios: a normal meeting, two
/// overlapping calls, a multi-day offsite, and an all-day holiday, all in
/// the week of 2019-05-23.
pub fn sample_week_events() -> Vec<Event> {
    vec![
        timed_event("standup", at(2019, 5, 23, 9, 0), at(2019, 5, 23, 9, 30)),
        timed_event("call-a", at(2019, 5, 23, 14, 0), at(2019, 5, 23, 15, 30)),
        timed_event("call-b", at(2019, 5, 23, 14, 30), at(2019, 5, 23, 16, 0)),
        timed_event("offsite", at(2019, 5, 24, 18, 0), at(2019, 5, 26, 11, 0)),
        Event::builder()
            .id("holiday")
            .title("Spring Holiday")
            .start(at(2019, 5, 25, 0, 0))
            .end(at(2019, 5, 25, 23, 59))
            .all_day(true)
            .build()
            .unwrap(),
    ]
}
