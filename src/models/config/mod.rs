// Layout and scroll configuration
// Serializable so hosts can persist view settings alongside their own.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sub-hour gridline spacing. `None` draws hour lines only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HourGridDivision {
    #[default]
    None,
    Minutes5,
    Minutes10,
    Minutes15,
    Minutes20,
    Minutes30,
}

impl HourGridDivision {
    /// Division interval in minutes; 0 when disabled.
    pub fn minutes(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Minutes5 => 5,
            Self::Minutes10 => 10,
            Self::Minutes15 => 15,
            Self::Minutes20 => 20,
            Self::Minutes30 => 30,
        }
    }
}

/// How horizontal scrolling commits: whole pages or whole day sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScrollType {
    #[default]
    PageScroll,
    SectionScroll,
}

/// Inclusive clamp on how far the day window may travel. Either side may be
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScrollableRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ScrollableRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Geometry and interaction constants for the week grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowLayoutConfig {
    /// Pixel height of one hour row.
    pub hour_height: f32,
    /// Width of the time-label column on the left.
    pub row_header_width: f32,
    /// Height of the date header strip along the top.
    pub column_header_height: f32,
    /// Extra band below the column headers for all-day events (0 disables).
    pub all_day_header_height: f32,
    pub hour_grid_division: HourGridDivision,
    /// Minute granularity for long-press start-time snapping (1..=60).
    pub move_time_min_interval: u32,
    /// Default duration of a drag-created event, in minutes.
    pub add_new_duration_mins: i64,
}

impl Default for FlowLayoutConfig {
    fn default() -> Self {
        Self {
            hour_height: 50.0,
            row_header_width: 42.0,
            column_header_height: 44.0,
            all_day_header_height: 0.0,
            hour_grid_division: HourGridDivision::None,
            move_time_min_interval: 15,
            add_new_duration_mins: 120,
        }
    }
}

impl FlowLayoutConfig {
    /// Pixel height of one minute.
    pub fn minute_height(&self) -> f32 {
        self.hour_height / 60.0
    }

    /// Clamp out-of-range values to documented defaults, logging each fix.
    pub fn sanitized(mut self) -> Self {
        if self.move_time_min_interval == 0 || self.move_time_min_interval > 60 {
            log::warn!(
                "move_time_min_interval {} outside 1..=60, falling back to 15",
                self.move_time_min_interval
            );
            self.move_time_min_interval = 15;
        }
        if self.hour_height <= 0.0 {
            log::warn!("hour_height {} is not positive, falling back to 50", self.hour_height);
            self.hour_height = 50.0;
        }
        self
    }
}
