// Long-press start-time snapping

use chrono::{DateTime, Duration, Local, NaiveDate, Timelike};

use crate::utils::date::{date_at_midnight, days_between_dates};

/// Resolve the start time reported for a long-press drag.
///
/// `pointed` is the raw instant under the finger (it may spill one day past
/// the column when the finger is above or below the grid); `column_date` is
/// the day of the column being pointed at. A pointed time one day after the
/// column snaps to that following day's midnight; one day before snaps to
/// the column's own midnight; otherwise the minute rounds down to the
/// nearest multiple of `min_interval` (1..=60).
pub fn long_press_start_date(
    pointed: DateTime<Local>,
    column_date: NaiveDate,
    min_interval: u32,
) -> DateTime<Local> {
    debug_assert!((1..=60).contains(&min_interval));
    match days_between_dates(column_date, pointed.date_naive()) {
        1 => date_at_midnight(pointed.date_naive()),
        -1 => date_at_midnight(column_date),
        _ => {
            let snapped_minute = pointed.minute() - pointed.minute() % min_interval;
            date_at_midnight(pointed.date_naive())
                + Duration::minutes(pointed.hour() as i64 * 60 + snapped_minute as i64)
        }
    }
}
