// Event module
// Calendar event model for the week grid. Multi-day events are split into
// per-day fragments (see `fragment`) before the layout engine sees them.

use chrono::{DateTime, Local};
use thiserror::Error;

pub mod fragment;

pub use fragment::{fragment_events, index_all_day_events, EventsByDate};

/// Validation errors for events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event id cannot be empty")]
    EmptyId,
    #[error("event title cannot be empty")]
    EmptyTitle,
    #[error("event start time is required")]
    MissingStart,
    #[error("event end time is required")]
    MissingEnd,
    #[error("event end time cannot be before start time")]
    EndBeforeStart,
    #[error("color must be in hex format (#RRGGBB or #RGB)")]
    InvalidColor,
}

/// A calendar event.
///
/// `intra_start`/`intra_end` are the bounds clipped to a single calendar day.
/// On a freshly built event they equal `start`/`end`; fragmentation rewrites
/// them on the per-day copies it emits, never on the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub all_day: bool,
    pub color: Option<String>,
    pub intra_start: DateTime<Local>,
    pub intra_end: DateTime<Local>,
}

impl Event {
    /// Create a new event with required fields.
    ///
    /// Zero-duration events are legal; `end` before `start` is not.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Self, EventError> {
        Self::builder().id(id).title(title).start(start).end(end).build()
    }

    /// Create a builder for constructing events with optional fields.
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Validate the event fields.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.id.trim().is_empty() {
            return Err(EventError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(EventError::EmptyTitle);
        }
        if self.end < self.start {
            return Err(EventError::EndBeforeStart);
        }
        if let Some(ref color) = self.color {
            if !is_valid_hex_color(color) {
                return Err(EventError::InvalidColor);
            }
        }
        Ok(())
    }

    /// Duration of the full event (not of a single-day fragment).
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Duration of the single-day portion.
    pub fn intra_duration(&self) -> chrono::Duration {
        self.intra_end - self.intra_start
    }
}

fn is_valid_hex_color(color: &str) -> bool {
    let color = color.trim();
    if !color.starts_with('#') {
        return false;
    }
    let hex = &color[1..];
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Builder for creating events with optional fields.
pub struct EventBuilder {
    id: Option<String>,
    title: Option<String>,
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    all_day: bool,
    color: Option<String>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            title: None,
            start: None,
            end: None,
            all_day: false,
            color: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn start(mut self, start: DateTime<Local>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Local>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Set the event color (hex format, e.g. `#3B82F6`).
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn build(self) -> Result<Event, EventError> {
        let id = self.id.ok_or(EventError::EmptyId)?;
        let title = self.title.ok_or(EventError::EmptyTitle)?;
        let start = self.start.ok_or(EventError::MissingStart)?;
        let end = self.end.ok_or(EventError::MissingEnd)?;

        let event = Event {
            id,
            title,
            start,
            end,
            all_day: self.all_day,
            color: self.color,
            intra_start: start,
            intra_end: end,
        };
        event.validate()?;
        Ok(event)
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}
