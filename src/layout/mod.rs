// Week view flow layout
// Turns the section window plus per-day event fragments into absolute pixel
// frames: headers, gridlines, the current-time indicator, and event cells.
// All coordinates are in the scrolled content space; converting from the
// viewport is `viewport_point + content_offset`.

use chrono::{DateTime, Duration, Local, NaiveDate};
use egui::{pos2, vec2, Pos2, Rect, Vec2};

use crate::models::config::FlowLayoutConfig;
use crate::utils::clock::Clock;
use crate::utils::date::{date_at_midnight, minutes_from_day_start};

mod cache;
mod overlap;

use cache::LayoutCache;
pub use cache::{CacheKey, SupplementaryKind};

pub const HOURS_PER_DAY: u32 = 24;
pub const MINUTES_PER_DAY: i64 = 24 * 60;

// Z layering: gridlines under everything, event cells from 0 upward in
// placement order, chrome above the cells.
pub const Z_DIVISION_LINE: i32 = -3;
pub const Z_GRIDLINE: i32 = -2;
pub const Z_CURRENT_TIME_INDICATOR: i32 = 998;
pub const Z_HEADER: i32 = 1000;
pub const Z_CORNER_HEADER: i32 = 1001;

/// An absolutely positioned frame plus its stacking order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemFrame {
    pub rect: Rect,
    pub z_index: i32,
}

/// The layout engine's view of the section window and its events.
///
/// Returning `None` from the time queries for an index the engine is
/// actively measuring is a contract violation and aborts: the data source
/// and the section window are inconsistent, which is a programmer error,
/// not a recoverable runtime condition.
pub trait LayoutDataSource {
    fn number_of_sections(&self) -> usize;
    fn number_of_items(&self, section: usize) -> usize;
    fn date_for_section(&self, section: usize) -> NaiveDate;
    fn start_time_for_item(&self, section: usize, item: usize) -> Option<DateTime<Local>>;
    fn end_time_for_item(&self, section: usize, item: usize) -> Option<DateTime<Local>>;
}

pub struct WeekViewFlowLayout {
    config: FlowLayoutConfig,
    viewport: Vec2,
    num_of_days: usize,
    cache: LayoutCache,
}

impl WeekViewFlowLayout {
    pub fn new(config: FlowLayoutConfig) -> Self {
        Self {
            config: config.sanitized(),
            viewport: Vec2::ZERO,
            num_of_days: 1,
            cache: LayoutCache::new(),
        }
    }

    pub fn config(&self) -> &FlowLayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn num_of_days(&self) -> usize {
        self.num_of_days
    }

    pub fn set_config(&mut self, config: FlowLayoutConfig) {
        self.config = config.sanitized();
        self.invalidate();
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        if self.viewport != viewport {
            self.viewport = viewport;
            self.invalidate();
        }
    }

    pub fn set_num_of_days(&mut self, num_of_days: usize) {
        debug_assert!(num_of_days > 0);
        self.num_of_days = num_of_days.max(1);
        self.invalidate();
    }

    /// Drop every cached frame. There is no partial invalidation.
    pub fn invalidate(&mut self) {
        self.cache.invalidate_all();
    }

    // --- metrics ---

    pub fn section_width(&self) -> f32 {
        ((self.viewport.x - self.config.row_header_width) / self.num_of_days as f32).max(0.0)
    }

    /// Width of one page (`num_of_days` sections).
    pub fn page_width(&self) -> f32 {
        self.section_width() * self.num_of_days as f32
    }

    /// Top of the hour grid: below the column headers and the all-day band.
    pub fn content_min_y(&self) -> f32 {
        self.config.column_header_height + self.config.all_day_header_height
    }

    pub fn content_height(&self) -> f32 {
        self.content_min_y() + HOURS_PER_DAY as f32 * self.config.hour_height
    }

    /// Full scrollable width: row header plus three pages of sections.
    pub fn content_width(&self) -> f32 {
        self.config.row_header_width + 3.0 * self.page_width()
    }

    // --- coordinate mapping ---

    /// Content X of the left edge of `section`.
    pub fn x_for_section(&self, section: usize) -> f32 {
        self.config.row_header_width + section as f32 * self.section_width()
    }

    /// Section whose column covers content coordinate `x`.
    pub fn section_at_x(&self, x: f32, num_sections: usize) -> Option<usize> {
        let width = self.section_width();
        if width <= 0.0 || x < self.config.row_header_width {
            return None;
        }
        let section = ((x - self.config.row_header_width) / width) as usize;
        (section < num_sections).then_some(section)
    }

    /// Content Y of `instant` within the column for `day`. Instants past
    /// the end of `day` extend beyond 24 hours of grid (day-crossing
    /// fragments are handled, not clipped).
    pub fn time_to_y(&self, day: NaiveDate, instant: DateTime<Local>) -> f32 {
        self.content_min_y()
            + minutes_from_day_start(day, instant) as f32 * self.config.minute_height()
    }

    /// Inverse of [`time_to_y`]: `(hour, minute)` at content coordinate
    /// `y`, clamped to the 24-hour grid.
    pub fn time_at_y(&self, y: f32) -> (u32, u32) {
        let minutes = ((y - self.content_min_y()) / self.config.minute_height()) as i64;
        let minutes = minutes.clamp(0, MINUTES_PER_DAY - 1);
        ((minutes / 60) as u32, (minutes % 60) as u32)
    }

    /// Full timestamp under a content-space point, along with its section.
    pub fn date_time_at_point(
        &self,
        data_source: &dyn LayoutDataSource,
        point: Pos2,
    ) -> Option<(usize, DateTime<Local>)> {
        let section = self.section_at_x(point.x, data_source.number_of_sections())?;
        let date = data_source.date_for_section(section);
        let (hour, minute) = self.time_at_y(point.y);
        let instant =
            date_at_midnight(date) + Duration::minutes(hour as i64 * 60 + minute as i64);
        Some((section, instant))
    }

    // --- supplementary frames ---

    pub fn corner_header_frame(&mut self) -> ItemFrame {
        let key = CacheKey::Supplementary {
            kind: SupplementaryKind::CornerHeader,
            index: 0,
        };
        if let Some(frame) = self.cache.get(key) {
            return frame;
        }
        let frame = ItemFrame {
            rect: Rect::from_min_size(
                pos2(0.0, 0.0),
                vec2(self.config.row_header_width, self.content_min_y()),
            ),
            z_index: Z_CORNER_HEADER,
        };
        self.cache.insert(key, frame);
        frame
    }

    pub fn column_header_frame(&mut self, section: usize) -> ItemFrame {
        let key = CacheKey::Supplementary {
            kind: SupplementaryKind::ColumnHeader,
            index: section,
        };
        if let Some(frame) = self.cache.get(key) {
            return frame;
        }
        let frame = ItemFrame {
            rect: Rect::from_min_size(
                pos2(self.x_for_section(section), 0.0),
                vec2(self.section_width(), self.config.column_header_height),
            ),
            z_index: Z_HEADER,
        };
        self.cache.insert(key, frame);
        frame
    }

    /// All-day band for a section; `None` unless a band height is
    /// configured.
    pub fn all_day_header_frame(&mut self, section: usize) -> Option<ItemFrame> {
        if self.config.all_day_header_height <= 0.0 {
            return None;
        }
        let key = CacheKey::Supplementary {
            kind: SupplementaryKind::AllDayHeader,
            index: section,
        };
        if let Some(frame) = self.cache.get(key) {
            return Some(frame);
        }
        let frame = ItemFrame {
            rect: Rect::from_min_size(
                pos2(self.x_for_section(section), self.config.column_header_height),
                vec2(self.section_width(), self.config.all_day_header_height),
            ),
            z_index: Z_HEADER,
        };
        self.cache.insert(key, frame);
        Some(frame)
    }

    /// Time label cell for `hour` (0..24), anchored at the hour gridline.
    pub fn row_header_frame(&mut self, hour: u32) -> ItemFrame {
        debug_assert!(hour < HOURS_PER_DAY);
        let key = CacheKey::Supplementary {
            kind: SupplementaryKind::RowHeader,
            index: hour as usize,
        };
        if let Some(frame) = self.cache.get(key) {
            return frame;
        }
        let frame = ItemFrame {
            rect: Rect::from_min_size(
                pos2(0.0, self.content_min_y() + hour as f32 * self.config.hour_height),
                vec2(self.config.row_header_width, self.config.hour_height),
            ),
            z_index: Z_HEADER,
        };
        self.cache.insert(key, frame);
        frame
    }

    /// Vertical gridline at a section boundary (0..=num_sections).
    pub fn vertical_gridline_frame(&mut self, boundary: usize) -> ItemFrame {
        let key = CacheKey::Supplementary {
            kind: SupplementaryKind::VerticalGridline,
            index: boundary,
        };
        if let Some(frame) = self.cache.get(key) {
            return frame;
        }
        let frame = ItemFrame {
            rect: Rect::from_min_size(
                pos2(self.x_for_section(boundary), self.content_min_y()),
                vec2(1.0, HOURS_PER_DAY as f32 * self.config.hour_height),
            ),
            z_index: Z_GRIDLINE,
        };
        self.cache.insert(key, frame);
        frame
    }

    /// Horizontal gridline at the top of `hour`, spanning all three pages.
    pub fn horizontal_gridline_frame(&mut self, hour: u32) -> ItemFrame {
        debug_assert!(hour < HOURS_PER_DAY);
        let key = CacheKey::Supplementary {
            kind: SupplementaryKind::HorizontalGridline,
            index: hour as usize,
        };
        if let Some(frame) = self.cache.get(key) {
            return frame;
        }
        let frame = ItemFrame {
            rect: Rect::from_min_size(
                pos2(
                    self.config.row_header_width,
                    self.content_min_y() + hour as f32 * self.config.hour_height,
                ),
                vec2(3.0 * self.page_width(), 1.0),
            ),
            z_index: Z_GRIDLINE,
        };
        self.cache.insert(key, frame);
        frame
    }

    /// Sub-hour division lines within `hour`; empty when the division is
    /// disabled. The hour line itself is not repeated.
    pub fn hour_division_frames(&self, hour: u32) -> Vec<ItemFrame> {
        let interval = self.config.hour_grid_division.minutes();
        if interval == 0 {
            return Vec::new();
        }
        let hour_top = self.content_min_y() + hour as f32 * self.config.hour_height;
        (1..60 / interval)
            .map(|step| ItemFrame {
                rect: Rect::from_min_size(
                    pos2(
                        self.config.row_header_width,
                        hour_top + (step * interval) as f32 * self.config.minute_height(),
                    ),
                    vec2(3.0 * self.page_width(), 1.0),
                ),
                z_index: Z_DIVISION_LINE,
            })
            .collect()
    }

    /// Line marking the clock's "now" in the section whose date is today.
    /// `None` when today is outside the window. Recomputed on every call;
    /// the host's minute tick only needs to repaint.
    pub fn current_time_indicator(
        &self,
        data_source: &dyn LayoutDataSource,
        clock: &dyn Clock,
    ) -> Option<ItemFrame> {
        let now = clock.now();
        let today = now.date_naive();
        let section =
            (0..data_source.number_of_sections()).find(|&s| data_source.date_for_section(s) == today)?;
        Some(ItemFrame {
            rect: Rect::from_min_size(
                pos2(self.x_for_section(section), self.time_to_y(today, now)),
                vec2(self.section_width(), 1.0),
            ),
            z_index: Z_CURRENT_TIME_INDICATOR,
        })
    }

    // --- event cell frames ---

    /// Final frames for every event fragment in `section`, overlap-resolved
    /// and in item order.
    pub fn item_frames_in_section(
        &mut self,
        data_source: &dyn LayoutDataSource,
        section: usize,
    ) -> Vec<ItemFrame> {
        let count = data_source.number_of_items(section);
        if count == 0 {
            return Vec::new();
        }

        let cached: Vec<Option<ItemFrame>> = (0..count)
            .map(|item| self.cache.get(CacheKey::Item { section, item }))
            .collect();
        if cached.iter().all(|f| f.is_some()) {
            return cached.into_iter().map(|f| f.unwrap()).collect();
        }

        let date = data_source.date_for_section(section);
        let section_min_x = self.x_for_section(section);
        let section_width = self.section_width();

        let raw: Vec<Rect> = (0..count)
            .map(|item| {
                let start = data_source.start_time_for_item(section, item).unwrap_or_else(|| {
                    panic!("layout data source has no start time for section {section} item {item}")
                });
                let end = data_source.end_time_for_item(section, item).unwrap_or_else(|| {
                    panic!("layout data source has no end time for section {section} item {item}")
                });
                Rect::from_min_max(
                    pos2(section_min_x, self.time_to_y(date, start)),
                    pos2(section_min_x + section_width, self.time_to_y(date, end)),
                )
            })
            .collect();

        let frames = overlap::resolve_overlaps(&raw, section_min_x, section_width);
        for (item, frame) in frames.iter().enumerate() {
            self.cache.insert(CacheKey::Item { section, item }, *frame);
        }
        frames
    }

    /// Frame of one event fragment. Panics when `item` is out of range for
    /// the section (programmer error).
    pub fn item_frame(
        &mut self,
        data_source: &dyn LayoutDataSource,
        section: usize,
        item: usize,
    ) -> ItemFrame {
        let frames = self.item_frames_in_section(data_source, section);
        *frames.get(item).unwrap_or_else(|| {
            panic!(
                "item {item} out of range for section {section} ({} items)",
                frames.len()
            )
        })
    }

    /// Topmost event fragment under a content-space point, if any.
    pub fn item_at_point(
        &mut self,
        data_source: &dyn LayoutDataSource,
        point: Pos2,
    ) -> Option<(usize, usize)> {
        let section = self.section_at_x(point.x, data_source.number_of_sections())?;
        let frames = self.item_frames_in_section(data_source, section);
        frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| frame.rect.contains(point))
            .max_by_key(|(_, frame)| frame.z_index)
            .map(|(item, _)| (section, item))
    }
}

#[cfg(test)]
mod tests {
    use super::overlap::rects_overlap;
    use super::*;
    use crate::utils::clock::FixedClock;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    struct StubDataSource {
        init_date: NaiveDate,
        num_sections: usize,
        // (section, start, end) triples
        items: Vec<(usize, DateTime<Local>, DateTime<Local>)>,
    }

    impl StubDataSource {
        fn new(init_date: NaiveDate, num_sections: usize) -> Self {
            Self {
                init_date,
                num_sections,
                items: Vec::new(),
            }
        }

        fn with_item(mut self, section: usize, start: DateTime<Local>, end: DateTime<Local>) -> Self {
            self.items.push((section, start, end));
            self
        }

        fn section_items(&self, section: usize) -> Vec<&(usize, DateTime<Local>, DateTime<Local>)> {
            self.items.iter().filter(|(s, _, _)| *s == section).collect()
        }
    }

    impl LayoutDataSource for StubDataSource {
        fn number_of_sections(&self) -> usize {
            self.num_sections
        }

        fn number_of_items(&self, section: usize) -> usize {
            self.section_items(section).len()
        }

        fn date_for_section(&self, section: usize) -> NaiveDate {
            self.init_date + Duration::days(section as i64)
        }

        fn start_time_for_item(&self, section: usize, item: usize) -> Option<DateTime<Local>> {
            self.section_items(section).get(item).map(|(_, s, _)| *s)
        }

        fn end_time_for_item(&self, section: usize, item: usize) -> Option<DateTime<Local>> {
            self.section_items(section).get(item).map(|(_, _, e)| *e)
        }
    }

    fn layout_with_viewport() -> WeekViewFlowLayout {
        let mut layout = WeekViewFlowLayout::new(FlowLayoutConfig::default());
        layout.set_num_of_days(3);
        layout.set_viewport(vec2(342.0, 600.0)); // section width (342-42)/3 = 100
        layout
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_section_width_and_page_width() {
        let layout = layout_with_viewport();
        assert_eq!(layout.section_width(), 100.0);
        assert_eq!(layout.page_width(), 300.0);
        assert_eq!(layout.content_width(), 42.0 + 900.0);
    }

    #[test]
    fn test_time_to_y_mapping() {
        let layout = layout_with_viewport();
        let day = date(2019, 5, 23);
        // content_min_y = 44, hour height 50
        assert_eq!(layout.time_to_y(day, at(2019, 5, 23, 0, 0)), 44.0);
        assert_eq!(layout.time_to_y(day, at(2019, 5, 23, 9, 30)), 44.0 + 9.5 * 50.0);
        // Day-crossing fragment extends past the 24h mark
        assert!(layout.time_to_y(day, at(2019, 5, 24, 1, 0)) > 44.0 + 24.0 * 50.0);
    }

    #[test]
    fn test_time_at_y_round_trip() {
        let layout = layout_with_viewport();
        let day = date(2019, 5, 23);
        for (hour, minute) in [(0u32, 0u32), (9, 30), (13, 59), (23, 59)] {
            let instant = date_at_midnight(day)
                + Duration::minutes(hour as i64 * 60 + minute as i64);
            let y = layout.time_to_y(day, instant);
            assert_eq!(layout.time_at_y(y), (hour, minute));
        }
    }

    #[test]
    fn test_time_at_y_clamps_to_grid() {
        let layout = layout_with_viewport();
        assert_eq!(layout.time_at_y(-100.0), (0, 0));
        assert_eq!(layout.time_at_y(1e6), (23, 59));
    }

    #[test]
    fn test_x_for_section_and_inverse() {
        let layout = layout_with_viewport();
        assert_eq!(layout.x_for_section(0), 42.0);
        assert_eq!(layout.x_for_section(4), 42.0 + 400.0);
        assert_eq!(layout.section_at_x(41.0, 9), None);
        assert_eq!(layout.section_at_x(42.0, 9), Some(0));
        assert_eq!(layout.section_at_x(341.9, 9), Some(2));
        assert_eq!(layout.section_at_x(342.0, 9), Some(3));
        assert_eq!(layout.section_at_x(42.0 + 9.0 * 100.0, 9), None);
    }

    #[test]
    fn test_supplementary_frames() {
        let mut layout = layout_with_viewport();
        assert_eq!(
            layout.corner_header_frame().rect,
            Rect::from_min_size(pos2(0.0, 0.0), vec2(42.0, 44.0))
        );
        assert_eq!(
            layout.column_header_frame(1).rect,
            Rect::from_min_size(pos2(142.0, 0.0), vec2(100.0, 44.0))
        );
        assert_eq!(
            layout.row_header_frame(10).rect,
            Rect::from_min_size(pos2(0.0, 44.0 + 500.0), vec2(42.0, 50.0))
        );
        let vline = layout.vertical_gridline_frame(2);
        assert_eq!(vline.rect.min, pos2(242.0, 44.0));
        assert_eq!(vline.rect.height(), 1200.0);
        let hline = layout.horizontal_gridline_frame(1);
        assert_eq!(hline.rect.min, pos2(42.0, 94.0));
        assert_eq!(hline.rect.width(), 900.0);
    }

    #[test]
    fn test_all_day_header_only_when_configured() {
        let mut layout = layout_with_viewport();
        assert_eq!(layout.all_day_header_frame(0), None);

        let config = FlowLayoutConfig {
            all_day_header_height: 24.0,
            ..Default::default()
        };
        layout.set_config(config);
        let frame = layout.all_day_header_frame(0).unwrap();
        assert_eq!(frame.rect, Rect::from_min_size(pos2(42.0, 44.0), vec2(100.0, 24.0)));
        // Hour grid starts below the band now
        assert_eq!(layout.content_min_y(), 68.0);
    }

    #[test]
    fn test_hour_division_frames() {
        let mut layout = layout_with_viewport();
        assert!(layout.hour_division_frames(9).is_empty());

        layout.set_config(FlowLayoutConfig {
            hour_grid_division: crate::models::config::HourGridDivision::Minutes15,
            ..Default::default()
        });
        let frames = layout.hour_division_frames(9);
        assert_eq!(frames.len(), 3); // 15/30/45 past the hour
        let hour_top = 44.0 + 9.0 * 50.0;
        assert_eq!(frames[0].rect.min.y, hour_top + 12.5);
        assert_eq!(frames[2].rect.min.y, hour_top + 37.5);
    }

    #[test]
    fn test_current_time_indicator_only_for_today() {
        let layout = layout_with_viewport();
        let ds = StubDataSource::new(date(2019, 5, 20), 9);

        let inside = FixedClock(at(2019, 5, 23, 10, 30));
        let frame = layout.current_time_indicator(&ds, &inside).unwrap();
        // 2019-05-23 is section 3
        assert_eq!(frame.rect.min.x, layout.x_for_section(3));
        assert_eq!(frame.rect.min.y, layout.time_to_y(date(2019, 5, 23), inside.0));

        let outside = FixedClock(at(2019, 6, 23, 10, 30));
        assert_eq!(layout.current_time_indicator(&ds, &outside), None);
    }

    #[test]
    fn test_item_frames_resolve_overlaps_per_section() {
        let mut layout = layout_with_viewport();
        let ds = StubDataSource::new(date(2019, 5, 20), 9)
            .with_item(3, at(2019, 5, 23, 9, 0), at(2019, 5, 23, 11, 0))
            .with_item(3, at(2019, 5, 23, 10, 0), at(2019, 5, 23, 12, 0))
            .with_item(4, at(2019, 5, 24, 9, 0), at(2019, 5, 24, 10, 0));

        let frames = layout.item_frames_in_section(&ds, 3);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].rect.width(), 50.0);
        assert_eq!(frames[1].rect.width(), 50.0);
        assert!(!rects_overlap(frames[0].rect, frames[1].rect));

        // The lone event next door keeps its full column
        let lone = layout.item_frames_in_section(&ds, 4);
        assert_eq!(lone[0].rect.width(), 100.0);
        assert_eq!(lone[0].rect.min.x, layout.x_for_section(4));
    }

    #[test]
    fn test_item_frames_are_cached_until_invalidated() {
        let mut layout = layout_with_viewport();
        let ds = StubDataSource::new(date(2019, 5, 20), 9).with_item(
            0,
            at(2019, 5, 20, 9, 0),
            at(2019, 5, 20, 10, 0),
        );

        let first = layout.item_frame(&ds, 0, 0);
        let again = layout.item_frame(&ds, 0, 0);
        assert_eq!(first, again);

        layout.set_viewport(vec2(642.0, 600.0)); // wider sections
        let after = layout.item_frame(&ds, 0, 0);
        assert_eq!(after.rect.width(), 200.0);
    }

    #[test]
    fn test_item_at_point_picks_topmost() {
        let mut layout = layout_with_viewport();
        let ds = StubDataSource::new(date(2019, 5, 20), 9)
            .with_item(3, at(2019, 5, 23, 9, 0), at(2019, 5, 23, 11, 0))
            .with_item(3, at(2019, 5, 23, 9, 0), at(2019, 5, 23, 11, 0));

        let frames = layout.item_frames_in_section(&ds, 3);
        let inside_second = frames[1].rect.center();
        assert_eq!(layout.item_at_point(&ds, inside_second), Some((3, 1)));

        let empty_column = pos2(layout.x_for_section(5) + 10.0, 500.0);
        assert_eq!(layout.item_at_point(&ds, empty_column), None);
    }

    #[test]
    #[should_panic(expected = "no start time")]
    fn test_missing_start_time_is_fatal() {
        struct BrokenDataSource;
        impl LayoutDataSource for BrokenDataSource {
            fn number_of_sections(&self) -> usize {
                1
            }
            fn number_of_items(&self, _section: usize) -> usize {
                1
            }
            fn date_for_section(&self, _section: usize) -> NaiveDate {
                NaiveDate::from_ymd_opt(2019, 5, 23).unwrap()
            }
            fn start_time_for_item(&self, _s: usize, _i: usize) -> Option<DateTime<Local>> {
                None
            }
            fn end_time_for_item(&self, _s: usize, _i: usize) -> Option<DateTime<Local>> {
                None
            }
        }

        let mut layout = layout_with_viewport();
        layout.item_frames_in_section(&BrokenDataSource, 0);
    }
}
