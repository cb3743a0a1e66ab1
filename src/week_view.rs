// Week view façade
// The host-facing surface: wires the flow layout, the paging controller and
// the long-press handler together, and reports everything that happened in
// a mutating call through a single mergeable output struct.

use chrono::{DateTime, Local, NaiveDate, Weekday};
use egui::{Pos2, Vec2};

use crate::interaction::{DragPreview, LongPressHandler, LongPressKind, LongPressOutput};
use crate::layout::{ItemFrame, WeekViewFlowLayout};
use crate::models::config::{FlowLayoutConfig, ScrollType, ScrollableRange};
use crate::models::event::Event;
use crate::paging::{PagingController, PagingOutput};
use crate::utils::clock::{Clock, SystemClock};

/// Everything a mutating call produced for the host to act on.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WeekViewOutput {
    /// The window moved; section 0 now starts on this date.
    pub init_date_changed: Option<NaiveDate>,
    /// A drag-create gesture finished at this snapped start time.
    pub did_end_add_new: Option<DateTime<Local>>,
    /// A drag-move gesture finished: the moved fragment and its new start.
    pub did_end_move: Option<(Event, DateTime<Local>)>,
    /// A gesture was cancelled, with its kind and last resolved start.
    pub did_cancel: Option<(LongPressKind, DateTime<Local>)>,
    pub needs_repaint: bool,
}

impl WeekViewOutput {
    pub fn merge(&mut self, other: WeekViewOutput) {
        if other.init_date_changed.is_some() {
            self.init_date_changed = other.init_date_changed;
        }
        if other.did_end_add_new.is_some() {
            self.did_end_add_new = other.did_end_add_new;
        }
        if other.did_end_move.is_some() {
            self.did_end_move = other.did_end_move;
        }
        if other.did_cancel.is_some() {
            self.did_cancel = other.did_cancel;
        }
        self.needs_repaint |= other.needs_repaint;
    }

    pub fn has_actions(&self) -> bool {
        self.init_date_changed.is_some()
            || self.did_end_add_new.is_some()
            || self.did_end_move.is_some()
            || self.did_cancel.is_some()
    }
}

pub struct WeekView {
    layout: WeekViewFlowLayout,
    paging: PagingController,
    long_press: LongPressHandler,
    clock: Box<dyn Clock>,
}

impl WeekView {
    pub fn new(config: FlowLayoutConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: FlowLayoutConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            layout: WeekViewFlowLayout::new(config),
            paging: PagingController::new(),
            long_press: LongPressHandler::new(),
            clock,
        }
    }

    // --- inbound API ---

    /// Initialize the calendar around `date`. See
    /// [`PagingController::setup`] for the window placement rules.
    pub fn setup_calendar(
        &mut self,
        num_of_days: usize,
        date: NaiveDate,
        events: Vec<Event>,
        scroll_type: ScrollType,
        first_day_of_week: Option<Weekday>,
    ) -> WeekViewOutput {
        self.layout.set_num_of_days(num_of_days.max(1));
        // Metrics must be current before setup recenters the offset.
        self.sync_metrics();
        let output = self
            .paging
            .setup(num_of_days, date, events, scroll_type, first_day_of_week);
        self.apply(output)
    }

    /// Re-run layout, optionally with a new event set.
    pub fn force_reload(&mut self, events: Option<Vec<Event>>) -> WeekViewOutput {
        let output = self.paging.reload(events);
        self.apply(output)
    }

    /// Jump the current page to start on (the page containing) `date`.
    pub fn update_week_view(&mut self, date: NaiveDate) -> WeekViewOutput {
        let output = self.paging.update_to(date);
        self.apply(output)
    }

    /// Realign a 7-day window so its pages begin on `day`.
    pub fn update_first_day_of_week(&mut self, date: NaiveDate, day: Weekday) -> WeekViewOutput {
        let output = self.paging.update_first_day_of_week(date, day);
        self.apply(output)
    }

    /// Replace the geometry constants. Drops every cached frame and
    /// recenters the scroll position on the current page.
    pub fn update_flow_layout(&mut self, config: FlowLayoutConfig) -> WeekViewOutput {
        self.layout.set_config(config);
        self.sync_metrics();
        let output = self.paging.reload(None);
        self.apply(output)
    }

    /// The hosting view changed size. Geometry is recomputed from the new
    /// viewport and the scroll position recenters on the current page.
    pub fn viewport_changed(&mut self, size: Vec2) -> WeekViewOutput {
        self.layout.set_viewport(size);
        self.sync_metrics();
        let output = self.paging.reload(None);
        self.apply(output)
    }

    pub fn set_scrollable_range(&mut self, range: ScrollableRange) {
        self.paging.set_scrollable_range(range);
    }

    /// Enable or disable the drag-create / drag-move gesture kinds.
    pub fn set_long_press_types(&mut self, add_new: bool, moving: bool) {
        self.long_press.set_enabled(add_new, moving);
    }

    /// Host's one-minute timer tick: the current-time indicator is derived
    /// from the clock on demand, so this only schedules a repaint.
    pub fn minute_tick(&mut self) -> WeekViewOutput {
        WeekViewOutput {
            needs_repaint: true,
            ..Default::default()
        }
    }

    // --- scroll gestures (viewport-space points) ---

    pub fn scroll_began(&mut self, point: Pos2) -> bool {
        self.paging.begin_drag(point)
    }

    pub fn scroll_changed(&mut self, point: Pos2) -> WeekViewOutput {
        self.paging.drag_moved(point);
        WeekViewOutput {
            needs_repaint: true,
            ..Default::default()
        }
    }

    pub fn scroll_ended(&mut self, velocity: Vec2) -> WeekViewOutput {
        let output = self.paging.end_drag(velocity);
        self.apply(output)
    }

    /// The host's snap animation landed; commit the scroll.
    pub fn scroll_animation_finished(&mut self) -> WeekViewOutput {
        let output = self.paging.finish_scroll_animation();
        self.apply(output)
    }

    // --- long-press gestures (viewport-space points) ---

    pub fn long_press_began(&mut self, point: Pos2) -> WeekViewOutput {
        let output = self.long_press.began(point, &mut self.layout, &self.paging);
        self.apply_long_press(output)
    }

    pub fn long_press_changed(&mut self, point: Pos2) -> WeekViewOutput {
        let output = self
            .long_press
            .changed(point, &mut self.layout, &mut self.paging);
        self.apply_long_press(output)
    }

    pub fn long_press_ended(&mut self, point: Pos2) -> WeekViewOutput {
        let output = self.long_press.ended(point, &mut self.layout, &self.paging);
        self.apply_long_press(output)
    }

    pub fn long_press_cancelled(&mut self) -> WeekViewOutput {
        let output = self.long_press.cancelled();
        self.apply_long_press(output)
    }

    // --- render queries ---

    pub fn init_date(&self) -> NaiveDate {
        self.paging.init_date()
    }

    pub fn num_sections(&self) -> usize {
        self.paging.num_sections()
    }

    pub fn date_for_section(&self, section: usize) -> NaiveDate {
        self.paging.date_for_section(section)
    }

    pub fn current_page_first_date(&self) -> NaiveDate {
        self.paging.current_page_first_date()
    }

    pub fn offset(&self) -> Vec2 {
        self.paging.offset()
    }

    pub fn layout(&mut self) -> &mut WeekViewFlowLayout {
        &mut self.layout
    }

    pub fn config(&self) -> &FlowLayoutConfig {
        self.layout.config()
    }

    /// Overlap-resolved frames for every event fragment in `section`.
    pub fn item_frames_in_section(&mut self, section: usize) -> Vec<ItemFrame> {
        self.layout.item_frames_in_section(&self.paging, section)
    }

    /// The fragment behind an item index, for the host's cell content.
    pub fn fragment_at(&self, section: usize, item: usize) -> Option<&Event> {
        self.paging.fragment_at(section, item)
    }

    /// All-day events spanning `date`, for the ribbon band.
    pub fn all_day_events(&self, date: NaiveDate) -> &[Event] {
        self.paging.all_day_events(date)
    }

    /// The "now" line, present only while today is inside the window.
    pub fn current_time_indicator(&self) -> Option<ItemFrame> {
        self.layout
            .current_time_indicator(&self.paging, self.clock.as_ref())
    }

    /// Preview rect for an in-flight long-press drag.
    pub fn drag_preview(&self) -> Option<&DragPreview> {
        self.long_press.drag_preview()
    }

    /// Cell hidden while it is being moved, if any.
    pub fn hidden_item(&self) -> Option<(usize, usize)> {
        self.long_press.hidden_item()
    }

    pub fn is_scrolling(&self) -> bool {
        self.paging.is_scrolling()
    }

    // --- plumbing ---

    fn sync_metrics(&mut self) {
        self.paging.set_metrics(
            self.layout.section_width(),
            self.layout.viewport(),
            self.layout.content_height(),
        );
    }

    fn apply(&mut self, output: PagingOutput) -> WeekViewOutput {
        if output.needs_invalidate {
            self.layout.invalidate();
        }
        WeekViewOutput {
            init_date_changed: output.init_date_changed,
            needs_repaint: output.needs_repaint,
            ..Default::default()
        }
    }

    fn apply_long_press(&mut self, output: LongPressOutput) -> WeekViewOutput {
        WeekViewOutput {
            did_end_add_new: output.did_end_add_new,
            did_end_move: output.did_end_move,
            did_cancel: output.did_cancel,
            needs_repaint: output.needs_repaint,
            ..Default::default()
        }
    }
}
