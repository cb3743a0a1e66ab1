// Event fragmentation
// Splits possibly multi-day events into per-day "intra" fragments keyed by
// calendar date. Originals are never touched; every fragment is a clone.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use super::Event;
use crate::utils::date::{date_at_day_end, date_at_midnight, days_between};

/// Per-day index of single-day event fragments, ordered by date.
pub type EventsByDate = BTreeMap<NaiveDate, Vec<Event>>;

/// Split `events` into single-day fragments keyed by calendar date.
///
/// A one-day event yields one fragment with its original bounds. An event
/// spanning N calendar days (date difference, time of day ignored) yields
/// N + 1 fragments: the first clipped to 23:59:59, interior days covering
/// the full day, the last running from midnight to the original end. An
/// event ending exactly at midnight therefore produces a zero-length
/// fragment on its final day.
///
/// All-day events are skipped here; see [`index_all_day_events`].
pub fn fragment_events(events: &[Event]) -> EventsByDate {
    let mut by_date = EventsByDate::new();

    for event in events.iter().filter(|e| !e.all_day) {
        let days = days_between(event.start, event.end);
        debug_assert!(days >= 0, "event {} ends before it starts", event.id);

        if days <= 0 {
            let mut fragment = event.clone();
            fragment.intra_start = event.start;
            fragment.intra_end = event.end;
            by_date
                .entry(event.start.date_naive())
                .or_default()
                .push(fragment);
            continue;
        }

        let first_day = event.start.date_naive();
        for offset in 0..=days {
            let day = first_day + Duration::days(offset);
            let mut fragment = event.clone();
            fragment.intra_start = if offset == 0 {
                event.start
            } else {
                date_at_midnight(day)
            };
            fragment.intra_end = if offset == days {
                event.end
            } else {
                date_at_day_end(day)
            };
            by_date.entry(day).or_default().push(fragment);
        }
    }

    for fragments in by_date.values_mut() {
        fragments.sort_by(|a, b| {
            a.intra_start
                .cmp(&b.intra_start)
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    log::debug!(
        "fragmented {} events into {} day buckets",
        events.len(),
        by_date.len()
    );
    by_date
}

/// Index all-day events by every date they span.
///
/// Unlike timed events these are not clipped; each day's list holds clones
/// of the original so the host can render the ribbon row per column.
pub fn index_all_day_events(events: &[Event]) -> EventsByDate {
    let mut by_date = EventsByDate::new();

    for event in events.iter().filter(|e| e.all_day) {
        let days = days_between(event.start, event.end).max(0);
        let first_day = event.start.date_naive();
        for offset in 0..=days {
            let day = first_day + Duration::days(offset);
            by_date.entry(day).or_default().push(event.clone());
        }
    }

    for list in by_date.values_mut() {
        list.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
    }
    by_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: &str, start: DateTime<Local>, end: DateTime<Local>) -> Event {
        Event::new(id, format!("event {id}"), start, end).unwrap()
    }

    #[test]
    fn test_single_day_event_yields_one_fragment() {
        let e = event("a", at(2019, 5, 23, 9, 0, 0), at(2019, 5, 23, 10, 30, 0));
        let by_date = fragment_events(&[e.clone()]);

        assert_eq!(by_date.len(), 1);
        let fragments = &by_date[&date(2019, 5, 23)];
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].intra_start, e.start);
        assert_eq!(fragments[0].intra_end, e.end);
    }

    #[test]
    fn test_three_day_event_is_clipped_per_day() {
        let e = event("a", at(2019, 5, 23, 18, 0, 0), at(2019, 5, 25, 8, 30, 0));
        let by_date = fragment_events(&[e.clone()]);

        assert_eq!(by_date.len(), 3);

        let first = &by_date[&date(2019, 5, 23)][0];
        assert_eq!(first.intra_start, at(2019, 5, 23, 18, 0, 0));
        assert_eq!(first.intra_end, at(2019, 5, 23, 23, 59, 59));

        let middle = &by_date[&date(2019, 5, 24)][0];
        assert_eq!(middle.intra_start, at(2019, 5, 24, 0, 0, 0));
        assert_eq!(middle.intra_end, at(2019, 5, 24, 23, 59, 59));

        let last = &by_date[&date(2019, 5, 25)][0];
        assert_eq!(last.intra_start, at(2019, 5, 25, 0, 0, 0));
        assert_eq!(last.intra_end, at(2019, 5, 25, 8, 30, 0));

        // Fragments carry the original full-event bounds
        for day in [date(2019, 5, 23), date(2019, 5, 24), date(2019, 5, 25)] {
            assert_eq!(by_date[&day][0].start, e.start);
            assert_eq!(by_date[&day][0].end, e.end);
        }
    }

    #[test]
    fn test_originals_are_never_mutated() {
        let events = vec![event("a", at(2019, 5, 23, 18, 0, 0), at(2019, 5, 25, 8, 0, 0))];
        let snapshot = events.clone();
        let _ = fragment_events(&events);
        assert_eq!(events, snapshot);
    }

    #[test]
    fn test_event_ending_at_midnight_gets_zero_length_tail() {
        // Date-based day diff: ends at 00:00 of the next day -> two fragments,
        // the second spanning zero seconds at that midnight.
        let e = event("a", at(2019, 5, 23, 22, 0, 0), at(2019, 5, 24, 0, 0, 0));
        let by_date = fragment_events(&[e]);

        assert_eq!(by_date.len(), 2);
        let tail = &by_date[&date(2019, 5, 24)][0];
        assert_eq!(tail.intra_start, at(2019, 5, 24, 0, 0, 0));
        assert_eq!(tail.intra_end, at(2019, 5, 24, 0, 0, 0));
    }

    #[test]
    fn test_zero_duration_midnight_event_stays_single_fragment() {
        let e = event("a", at(2019, 5, 24, 0, 0, 0), at(2019, 5, 24, 0, 0, 0));
        let by_date = fragment_events(&[e]);
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[&date(2019, 5, 24)].len(), 1);
    }

    #[test]
    fn test_fragments_sorted_by_intra_start_then_id() {
        let later = event("z", at(2019, 5, 23, 9, 0, 0), at(2019, 5, 23, 10, 0, 0));
        let earlier = event("b", at(2019, 5, 23, 8, 0, 0), at(2019, 5, 23, 9, 0, 0));
        let tied = event("a", at(2019, 5, 23, 9, 0, 0), at(2019, 5, 23, 11, 0, 0));

        let by_date = fragment_events(&[later, earlier, tied]);
        let ids: Vec<&str> = by_date[&date(2019, 5, 23)]
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "a", "z"]);
    }

    #[test]
    fn test_all_day_events_are_excluded_from_time_grid() {
        let mut e = event("a", at(2019, 5, 23, 0, 0, 0), at(2019, 5, 23, 23, 59, 59));
        e.all_day = true;
        assert!(fragment_events(&[e]).is_empty());
    }

    #[test]
    fn test_index_all_day_events_spans_every_day() {
        let mut e = event("a", at(2019, 5, 23, 0, 0, 0), at(2019, 5, 25, 23, 59, 59));
        e.all_day = true;
        let by_date = index_all_day_events(&[e]);

        assert_eq!(by_date.len(), 3);
        for day in [date(2019, 5, 23), date(2019, 5, 24), date(2019, 5, 25)] {
            assert_eq!(by_date[&day].len(), 1);
        }
    }

    #[test]
    fn test_intra_invariant_holds_for_all_fragments() {
        let events = vec![
            event("a", at(2019, 5, 20, 23, 30, 0), at(2019, 5, 21, 0, 30, 0)),
            event("b", at(2019, 5, 21, 9, 0, 0), at(2019, 5, 23, 17, 0, 0)),
            event("c", at(2019, 5, 22, 12, 0, 0), at(2019, 5, 22, 12, 0, 0)),
        ];
        for (day, fragments) in fragment_events(&events) {
            for f in fragments {
                assert!(f.intra_start <= f.intra_end);
                assert_eq!(f.intra_start.date_naive(), day);
                assert_eq!(f.intra_end.date_naive(), day);
                assert!(f.start <= f.intra_start && f.intra_end <= f.end);
            }
        }
    }
}
