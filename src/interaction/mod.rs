// Long-press interaction state machine
// Interprets a continuous press-and-drag into add-new / move intents,
// producing a drag preview the host renders and a snapped start time.
// Gesture points arrive in viewport space; frames are in content space.

use chrono::{DateTime, Duration, Local};
use egui::{pos2, vec2, Pos2, Rect};

use crate::layout::WeekViewFlowLayout;
use crate::models::event::Event;
use crate::paging::{PageDirection, PagingController};
use crate::utils::date::date_at_midnight;

pub mod snap;

pub use snap::long_press_start_date;

// Edge proximity that triggers auto-scroll while dragging, and the fixed
// vertical step per trigger.
const AUTO_SCROLL_MARGIN: f32 = 20.0;
const VERTICAL_SCROLL_STEP: f32 = 50.0;

// Time label placement margins around the preview.
const TIME_LABEL_FLIP_MARGIN: f32 = 15.0;
const TIME_LABEL_ALIGN_MARGIN: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongPressKind {
    AddNew,
    Move,
}

/// Preview geometry for the in-flight drag, in content space.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPreview {
    pub rect: Rect,
    /// Snapped start time under the preview.
    pub start: DateTime<Local>,
    /// Render the time label below the preview (it is close to the top).
    pub label_below: bool,
    /// Right-align the time label (the preview is close to the row header).
    pub label_on_right: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum LongPressState {
    Idle,
    Pressing {
        kind: LongPressKind,
        /// Fragment being moved; `None` for add-new.
        event: Option<Event>,
        /// Cell hidden for the duration of a move gesture.
        hidden_item: Option<(usize, usize)>,
        preview: DragPreview,
    },
}

/// Result of a long-press callback, merged upward by the façade.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LongPressOutput {
    pub did_end_add_new: Option<DateTime<Local>>,
    pub did_end_move: Option<(Event, DateTime<Local>)>,
    pub did_cancel: Option<(LongPressKind, DateTime<Local>)>,
    pub needs_repaint: bool,
}

impl LongPressOutput {
    pub fn merge(&mut self, other: LongPressOutput) {
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
}

pub struct LongPressHandler {
    allow_add_new: bool,
    allow_move: bool,
    state: LongPressState,
}

impl LongPressHandler {
    pub fn new() -> Self {
        Self {
            allow_add_new: false,
            allow_move: false,
            state: LongPressState::Idle,
        }
    }

    pub fn set_enabled(&mut self, add_new: bool, moving: bool) {
        self.allow_add_new = add_new;
        self.allow_move = moving;
    }

    pub fn is_pressing(&self) -> bool {
        !matches!(self.state, LongPressState::Idle)
    }

    pub fn kind(&self) -> Option<LongPressKind> {
        match &self.state {
            LongPressState::Idle => None,
            LongPressState::Pressing { kind, .. } => Some(*kind),
        }
    }

    /// Preview the host should render while a gesture is active.
    pub fn drag_preview(&self) -> Option<&DragPreview> {
        match &self.state {
            LongPressState::Idle => None,
            LongPressState::Pressing { preview, .. } => Some(preview),
        }
    }

    /// Cell the host must not draw while it is being moved.
    pub fn hidden_item(&self) -> Option<(usize, usize)> {
        match &self.state {
            LongPressState::Idle => None,
            LongPressState::Pressing { hidden_item, .. } => *hidden_item,
        }
    }

    /// Press recognized at a viewport-space point.
    pub fn began(
        &mut self,
        point: Pos2,
        layout: &mut WeekViewFlowLayout,
        paging: &PagingController,
    ) -> LongPressOutput {
        if self.is_pressing() {
            return LongPressOutput::default();
        }
        // Presses on the header chrome never start a gesture.
        if point.x < layout.config().row_header_width || point.y < layout.content_min_y() {
            return LongPressOutput::default();
        }

        let content_point = point + paging.offset();
        let hit = layout.item_at_point(paging, content_point);

        if let (Some((section, item)), true) = (hit, self.allow_move) {
            let event = paging
                .fragment_at(section, item)
                .cloned()
                .expect("hit-tested fragment must exist");
            let rect = layout.item_frame(paging, section, item).rect;
            let start = self
                .resolved_start(content_point, layout, paging)
                .unwrap_or(event.intra_start);
            self.state = LongPressState::Pressing {
                kind: LongPressKind::Move,
                event: Some(event),
                hidden_item: Some((section, item)),
                preview: self.preview_at(rect, point.x, paging.offset().y, start, layout),
            };
            return LongPressOutput {
                needs_repaint: true,
                ..Default::default()
            };
        }

        if self.allow_add_new {
            let Some(section) = layout.section_at_x(content_point.x, paging.num_sections()) else {
                return LongPressOutput::default();
            };
            let height =
                layout.config().add_new_duration_mins as f32 * layout.config().minute_height();
            let rect = Rect::from_min_size(
                pos2(layout.x_for_section(section), content_point.y - height / 2.0),
                vec2(layout.section_width(), height),
            );
            let start = self
                .resolved_start(content_point, layout, paging)
                .unwrap_or_else(|| date_at_midnight(paging.date_for_section(section)));
            self.state = LongPressState::Pressing {
                kind: LongPressKind::AddNew,
                event: None,
                hidden_item: None,
                preview: self.preview_at(rect, point.x, paging.offset().y, start, layout),
            };
            return LongPressOutput {
                needs_repaint: true,
                ..Default::default()
            };
        }

        LongPressOutput::default()
    }

    /// Finger moved. Updates the preview and fires auto-scroll near edges.
    pub fn changed(
        &mut self,
        point: Pos2,
        layout: &mut WeekViewFlowLayout,
        paging: &mut PagingController,
    ) -> LongPressOutput {
        let LongPressState::Pressing { preview, .. } = &self.state else {
            return LongPressOutput::default();
        };
        let size = preview.rect.size();

        let content_point = point + paging.offset();
        let start = self
            .resolved_start(content_point, layout, paging)
            .unwrap_or_else(|| {
                self.drag_preview()
                    .map(|p| p.start)
                    .expect("pressing state has a preview")
            });
        let rect = Rect::from_min_size(
            pos2(
                content_point.x - size.x / 2.0,
                content_point.y - size.y / 2.0,
            ),
            size,
        );
        let updated = self.preview_at(rect, point.x, paging.offset().y, start, layout);
        if let LongPressState::Pressing { preview, .. } = &mut self.state {
            *preview = updated;
        }

        self.auto_scroll_near_edges(point, layout, paging);

        LongPressOutput {
            needs_repaint: true,
            ..Default::default()
        }
    }

    /// Press released: report the resolved start time.
    pub fn ended(
        &mut self,
        point: Pos2,
        layout: &mut WeekViewFlowLayout,
        paging: &PagingController,
    ) -> LongPressOutput {
        let LongPressState::Pressing { kind, event, preview, .. } =
            std::mem::replace(&mut self.state, LongPressState::Idle)
        else {
            return LongPressOutput::default();
        };

        let content_point = point + paging.offset();
        let start = self
            .resolved_start(content_point, layout, paging)
            .unwrap_or(preview.start);

        match kind {
            LongPressKind::AddNew => LongPressOutput {
                did_end_add_new: Some(start),
                needs_repaint: true,
                ..Default::default()
            },
            LongPressKind::Move => LongPressOutput {
                did_end_move: event.map(|e| (e, start)),
                needs_repaint: true,
                ..Default::default()
            },
        }
    }

    /// Gesture cancelled by the system: notify with the last known start.
    pub fn cancelled(&mut self) -> LongPressOutput {
        let LongPressState::Pressing { kind, preview, .. } =
            std::mem::replace(&mut self.state, LongPressState::Idle)
        else {
            return LongPressOutput::default();
        };
        LongPressOutput {
            did_cancel: Some((kind, preview.start)),
            needs_repaint: true,
            ..Default::default()
        }
    }

    /// Raw instant under a content-space point, unclamped so a finger above
    /// or below the grid maps into the neighboring day, then snapped.
    fn resolved_start(
        &self,
        content_point: Pos2,
        layout: &WeekViewFlowLayout,
        paging: &PagingController,
    ) -> Option<DateTime<Local>> {
        let section = layout.section_at_x(content_point.x, paging.num_sections())?;
        let column_date = paging.date_for_section(section);
        let minutes =
            ((content_point.y - layout.content_min_y()) / layout.config().minute_height()).floor();
        let pointed = date_at_midnight(column_date) + Duration::minutes(minutes as i64);
        Some(long_press_start_date(
            pointed,
            column_date,
            layout.config().move_time_min_interval,
        ))
    }

    /// Build the preview for a content-space rect. Proximity checks for the
    /// clamp and the time-label placement happen in viewport space, which
    /// is where the header chrome lives.
    fn preview_at(
        &self,
        rect: Rect,
        viewport_x: f32,
        offset_y: f32,
        start: DateTime<Local>,
        layout: &WeekViewFlowLayout,
    ) -> DragPreview {
        // The preview top never rises above the top content margin.
        let min_top = layout.content_min_y() + offset_y;
        let rect = if rect.min.y < min_top {
            Rect::from_min_size(pos2(rect.min.x, min_top), rect.size())
        } else {
            rect
        };
        DragPreview {
            rect,
            start,
            label_below: rect.min.y - offset_y - layout.content_min_y() < TIME_LABEL_FLIP_MARGIN,
            label_on_right: viewport_x - layout.config().row_header_width
                < TIME_LABEL_ALIGN_MARGIN,
        }
    }

    fn auto_scroll_near_edges(
        &self,
        viewport_point: Pos2,
        layout: &WeekViewFlowLayout,
        paging: &mut PagingController,
    ) {
        if paging.is_scrolling() {
            return;
        }
        let viewport = layout.viewport();
        let config = layout.config();

        if viewport_point.y < layout.content_min_y() + AUTO_SCROLL_MARGIN {
            paging.auto_scroll_vertical(-VERTICAL_SCROLL_STEP);
        } else if viewport_point.y > viewport.y - AUTO_SCROLL_MARGIN {
            paging.auto_scroll_vertical(VERTICAL_SCROLL_STEP);
        }

        if viewport_point.x < config.row_header_width + AUTO_SCROLL_MARGIN {
            paging.auto_scroll_horizontal(PageDirection::Previous);
        } else if viewport_point.x > viewport.x - AUTO_SCROLL_MARGIN {
            paging.auto_scroll_horizontal(PageDirection::Next);
        }
    }
}

impl Default for LongPressHandler {
    fn default() -> Self {
        Self::new()
    }
}
