// Paging controller
// Owns the 3-page day-section window: which dates are materialized, the
// horizontal/vertical content offset, drag direction locking, page and
// section scroll commits, and clamping against an optional scrollable range.

use chrono::{DateTime, Duration, Local, NaiveDate, Weekday};
use egui::{Pos2, Vec2};

use crate::layout::LayoutDataSource;
use crate::models::config::{ScrollType, ScrollableRange};
use crate::models::event::{fragment_events, index_all_day_events, Event, EventsByDate};
use crate::utils::date::{days_between_dates, week_start, weekday_from_sunday};

/// The window always holds exactly this many pages.
pub const PAGES: usize = 3;

// Page-flip commit thresholds: fraction of the viewport width dragged, or
// horizontal fling velocity.
const PAGE_FLIP_FRACTION: f32 = 1.0 / 5.0;
const PAGE_FLIP_VELOCITY: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

/// Axis a gesture is locked to once its intent is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    start_point: Pos2,
    start_offset: Vec2,
    axis: Option<ScrollAxis>,
}

/// Result of a paging operation, merged upward by the façade.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PagingOutput {
    /// The window moved; section 0 now has this date.
    pub init_date_changed: Option<NaiveDate>,
    /// Layout caches must be dropped wholesale.
    pub needs_invalidate: bool,
    pub needs_repaint: bool,
}

impl PagingOutput {
    pub fn merge(&mut self, other: PagingOutput) {
        if other.init_date_changed.is_some() {
            self.init_date_changed = other.init_date_changed;
        }
        self.needs_invalidate |= other.needs_invalidate;
        self.needs_repaint |= other.needs_repaint;
    }
}

pub struct PagingController {
    init_date: NaiveDate,
    num_of_days: usize,
    scroll_type: ScrollType,
    first_day_of_week: Weekday,
    scrollable_range: ScrollableRange,
    events_by_date: EventsByDate,
    all_day_by_date: EventsByDate,
    // Content offset; x is in [0, 2 * page_width] except at clamped range
    // edges. page_width is the boundary between previous and current page.
    offset: Vec2,
    viewport: Vec2,
    section_width: f32,
    content_height: f32,
    drag: Option<DragState>,
    is_scrolling: bool,
    pending_target: Option<f32>,
}

impl PagingController {
    pub fn new() -> Self {
        Self {
            init_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            num_of_days: 1,
            scroll_type: ScrollType::default(),
            first_day_of_week: Weekday::Sun,
            scrollable_range: ScrollableRange::unbounded(),
            events_by_date: EventsByDate::new(),
            all_day_by_date: EventsByDate::new(),
            offset: Vec2::ZERO,
            viewport: Vec2::ZERO,
            section_width: 0.0,
            content_height: 0.0,
            drag: None,
            is_scrolling: false,
            pending_target: None,
        }
    }

    // --- window state ---

    pub fn init_date(&self) -> NaiveDate {
        self.init_date
    }

    pub fn num_of_days(&self) -> usize {
        self.num_of_days
    }

    pub fn scroll_type(&self) -> ScrollType {
        self.scroll_type
    }

    pub fn first_day_of_week(&self) -> Weekday {
        self.first_day_of_week
    }

    pub fn num_sections(&self) -> usize {
        PAGES * self.num_of_days
    }

    pub fn date_for_section(&self, section: usize) -> NaiveDate {
        self.init_date + Duration::days(section as i64)
    }

    /// First date of the middle (current) page.
    pub fn current_page_first_date(&self) -> NaiveDate {
        self.date_for_section(self.num_of_days)
    }

    pub fn scrollable_range(&self) -> ScrollableRange {
        self.scrollable_range
    }

    pub fn set_scrollable_range(&mut self, range: ScrollableRange) {
        self.scrollable_range = range;
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn fragment_at(&self, section: usize, item: usize) -> Option<&Event> {
        self.events_by_date
            .get(&self.date_for_section(section))
            .and_then(|fragments| fragments.get(item))
    }

    /// All-day events spanning `date` (supplemental ribbon data).
    pub fn all_day_events(&self, date: NaiveDate) -> &[Event] {
        self.all_day_by_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // --- setup / reload ---

    /// Initialize the window around `anchor`. For 7-day views the current
    /// page starts on `first_day_of_week` on/before the anchor; a missing
    /// weekday falls back to Sunday.
    pub fn setup(
        &mut self,
        num_of_days: usize,
        anchor: NaiveDate,
        events: Vec<Event>,
        scroll_type: ScrollType,
        first_day_of_week: Option<Weekday>,
    ) -> PagingOutput {
        debug_assert!(num_of_days > 0);
        self.num_of_days = num_of_days.max(1);
        self.scroll_type = scroll_type;
        if self.num_of_days == 7 {
            self.first_day_of_week = first_day_of_week.unwrap_or_else(|| {
                log::warn!("7-day setup without a first day of week, defaulting to Sunday");
                Weekday::Sun
            });
        } else if let Some(day) = first_day_of_week {
            self.first_day_of_week = day;
        }
        self.init_date = self.init_date_for_anchor(anchor);

        let mut output = self.reload(Some(events));
        output.init_date_changed = Some(self.init_date);
        output
    }

    fn init_date_for_anchor(&self, anchor: NaiveDate) -> NaiveDate {
        if self.num_of_days == 7 {
            let page_start = week_start(anchor, self.first_day_of_week.num_days_from_sunday() as i64);
            page_start - Duration::days(self.num_of_days as i64)
        } else {
            anchor - Duration::days(self.num_of_days as i64)
        }
    }

    /// Rebuild the event indexes (when given) and recenter the horizontal
    /// offset on the previous/current page boundary.
    pub fn reload(&mut self, events: Option<Vec<Event>>) -> PagingOutput {
        if let Some(events) = events {
            self.events_by_date = fragment_events(&events);
            self.all_day_by_date = index_all_day_events(&events);
            log::info!(
                "reloaded {} events into {} day buckets",
                events.len(),
                self.events_by_date.len()
            );
        }
        self.offset.x = self.page_width();
        self.drag = None;
        self.pending_target = None;
        self.is_scrolling = false;
        PagingOutput {
            init_date_changed: None,
            needs_invalidate: true,
            needs_repaint: true,
        }
    }

    /// Move the window so `date` starts the current page. No animation.
    pub fn update_to(&mut self, date: NaiveDate) -> PagingOutput {
        let new_init = self.init_date_for_anchor(date);
        let changed = new_init != self.init_date;
        self.init_date = new_init;
        let mut output = self.reload(None);
        if changed {
            output.init_date_changed = Some(self.init_date);
        }
        output
    }

    /// Shift the window a whole page. Refused at a scrollable-range edge.
    pub fn load_adjacent_page(&mut self, direction: PageDirection) -> PagingOutput {
        let page_start = self.current_page_first_date();
        let page_days = self.num_of_days as i64;
        let permitted = match direction {
            PageDirection::Previous => self
                .scrollable_range
                .start
                .map_or(true, |start| start < page_start),
            PageDirection::Next => self
                .scrollable_range
                .end
                .map_or(true, |end| end > page_start + Duration::days(page_days - 1)),
        };
        if !permitted {
            log::debug!("page load {direction:?} refused at scrollable range edge");
            return PagingOutput::default();
        }

        let delta = match direction {
            PageDirection::Previous => -page_days,
            PageDirection::Next => page_days,
        };
        self.init_date += Duration::days(delta);
        let mut output = self.reload(None);
        output.init_date_changed = Some(self.init_date);
        output
    }

    /// Realign a 7-day window so its pages begin on `day`.
    pub fn update_first_day_of_week(&mut self, date: NaiveDate, day: Weekday) -> PagingOutput {
        if self.num_of_days != 7 {
            log::warn!("update_first_day_of_week ignored: window is not 7 days");
            return PagingOutput::default();
        }
        self.first_day_of_week = day;
        let mut diff = weekday_from_sunday(date) - day.num_days_from_sunday() as i64;
        if diff < 0 {
            diff += 7;
        }
        self.init_date = date - Duration::days(self.num_of_days as i64 + diff);
        let mut output = self.reload(None);
        output.init_date_changed = Some(self.init_date);
        output
    }

    // --- metrics ---

    pub fn set_metrics(&mut self, section_width: f32, viewport: Vec2, content_height: f32) {
        self.section_width = section_width;
        self.viewport = viewport;
        self.content_height = content_height;
    }

    pub fn section_width(&self) -> f32 {
        self.section_width
    }

    pub fn page_width(&self) -> f32 {
        self.section_width * self.num_of_days as f32
    }

    /// Horizontal offsets of the scrollable-range limits: the offset where
    /// the range start is the leftmost visible day, and where the range end
    /// is the rightmost. Unbounded sides fall back to the window edges.
    pub fn scroll_edges(&self) -> (f32, f32) {
        let page_width = self.page_width();
        let mut left = 0.0_f32;
        let mut right = 2.0 * page_width;

        if let Some(start) = self.scrollable_range.start {
            let edge = days_between_dates(self.init_date, start) as f32 * self.section_width;
            left = left.max(edge);
        }
        if let Some(end) = self.scrollable_range.end {
            let edge = (days_between_dates(self.init_date, end) - self.num_of_days as i64 + 1)
                as f32
                * self.section_width;
            right = right.min(edge);
        }
        if left > right {
            // Degenerate range: freeze on the current page boundary.
            (page_width, page_width)
        } else {
            (left, right)
        }
    }

    fn clamp_horizontal(&self, x: f32) -> f32 {
        let (left, right) = self.scroll_edges();
        x.clamp(left.min(right), right.max(left))
    }

    fn clamp_vertical(&self, y: f32) -> f32 {
        let max = (self.content_height - self.viewport.y).max(0.0);
        y.clamp(0.0, max)
    }

    // --- drag handling ---

    /// Begin a scroll gesture. Returns false (and ignores the gesture)
    /// while a committed scroll is still animating.
    pub fn begin_drag(&mut self, point: Pos2) -> bool {
        if self.is_scrolling {
            log::debug!("drag ignored: scroll animation in flight");
            return false;
        }
        self.drag = Some(DragState {
            start_point: point,
            start_offset: self.offset,
            axis: None,
        });
        true
    }

    /// Follow the finger. The first movement classifies the gesture as
    /// horizontal or vertical and the offset then only moves on that axis.
    pub fn drag_moved(&mut self, point: Pos2) {
        let Some(mut drag) = self.drag else {
            return;
        };
        let delta = point - drag.start_point;
        if drag.axis.is_none() && delta != Vec2::ZERO {
            drag.axis = Some(if delta.x.abs() >= delta.y.abs() {
                ScrollAxis::Horizontal
            } else {
                ScrollAxis::Vertical
            });
        }
        match drag.axis {
            Some(ScrollAxis::Horizontal) => {
                self.offset.x = self.clamp_horizontal(drag.start_offset.x - delta.x);
            }
            Some(ScrollAxis::Vertical) => {
                self.offset.y = self.clamp_vertical(drag.start_offset.y - delta.y);
            }
            None => {}
        }
        self.drag = Some(drag);
    }

    /// Locked axis of the in-flight gesture, once classified.
    pub fn drag_axis(&self) -> Option<ScrollAxis> {
        self.drag.and_then(|d| d.axis)
    }

    /// Release the gesture. A horizontal gesture commits a snap target
    /// (page flip, section snap, or spring-back) that takes effect in
    /// [`finish_scroll_animation`].
    pub fn end_drag(&mut self, velocity: Vec2) -> PagingOutput {
        let Some(drag) = self.drag.take() else {
            return PagingOutput::default();
        };
        if drag.axis != Some(ScrollAxis::Horizontal) {
            return PagingOutput {
                needs_repaint: true,
                ..Default::default()
            };
        }

        let dragged = self.offset.x - drag.start_offset.x;
        let target = match self.scroll_type {
            ScrollType::PageScroll => {
                let commit = dragged.abs() > self.viewport.x * PAGE_FLIP_FRACTION
                    || velocity.x.abs() > PAGE_FLIP_VELOCITY;
                if commit {
                    let direction = if dragged != 0.0 {
                        dragged.signum()
                    } else {
                        -velocity.x.signum()
                    };
                    drag.start_offset.x + direction * self.page_width()
                } else {
                    drag.start_offset.x
                }
            }
            ScrollType::SectionScroll => {
                let sections = ((drag.start_offset.x - self.offset.x) / self.section_width).round();
                drag.start_offset.x - sections * self.section_width
            }
        };

        self.pending_target = Some(self.clamp_horizontal(target));
        self.is_scrolling = true;
        PagingOutput {
            needs_repaint: true,
            ..Default::default()
        }
    }

    /// Called by the host once the snap animation lands. Applies the date
    /// shift implied by the committed offset and recenters the window.
    pub fn finish_scroll_animation(&mut self) -> PagingOutput {
        self.is_scrolling = false;
        let Some(target) = self.pending_target.take() else {
            return PagingOutput::default();
        };
        self.offset.x = target;

        if self.section_width <= 0.0 {
            return PagingOutput::default();
        }
        let travelled = (target - self.page_width()) / self.section_width;
        let shift_days = travelled.round();
        // Offsets clamped to a mid-section range edge are not day aligned;
        // the window stays where it is in that case.
        if shift_days == 0.0 || (travelled - shift_days).abs() > f32::EPSILON * 100.0 {
            return PagingOutput {
                needs_repaint: true,
                ..Default::default()
            };
        }

        self.init_date += Duration::days(shift_days as i64);
        log::debug!("window shifted {shift_days} days to init date {}", self.init_date);
        let mut output = self.reload(None);
        output.init_date_changed = Some(self.init_date);
        output
    }

    // --- auto-scroll (long-press drags near the edges) ---

    /// Scroll vertically by a fixed increment while dragging near the top
    /// or bottom edge.
    pub fn auto_scroll_vertical(&mut self, dy: f32) {
        self.offset.y = self.clamp_vertical(self.offset.y + dy);
    }

    /// Kick a one-section (or one-page) horizontal scroll while dragging
    /// near a side edge. Guarded so overlapping triggers are dropped.
    pub fn auto_scroll_horizontal(&mut self, direction: PageDirection) -> bool {
        if self.is_scrolling {
            return false;
        }
        let step = match self.scroll_type {
            ScrollType::PageScroll => self.page_width(),
            ScrollType::SectionScroll => self.section_width,
        };
        let signed = match direction {
            PageDirection::Previous => -step,
            PageDirection::Next => step,
        };
        let target = self.clamp_horizontal(self.offset.x + signed);
        if (target - self.offset.x).abs() < f32::EPSILON {
            return false;
        }
        self.pending_target = Some(target);
        self.is_scrolling = true;
        true
    }
}

impl Default for PagingController {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutDataSource for PagingController {
    fn number_of_sections(&self) -> usize {
        self.num_sections()
    }

    fn number_of_items(&self, section: usize) -> usize {
        self.events_by_date
            .get(&self.date_for_section(section))
            .map_or(0, Vec::len)
    }

    fn date_for_section(&self, section: usize) -> NaiveDate {
        PagingController::date_for_section(self, section)
    }

    fn start_time_for_item(&self, section: usize, item: usize) -> Option<DateTime<Local>> {
        self.fragment_at(section, item).map(|e| e.intra_start)
    }

    fn end_time_for_item(&self, section: usize, item: usize) -> Option<DateTime<Local>> {
        self.fragment_at(section, item).map(|e| e.intra_end)
    }
}
