// Week Grid Library
// Exports all modules for testing and reuse

pub mod interaction;
pub mod layout;
pub mod models;
pub mod paging;
pub mod utils;
pub mod week_view;

pub use interaction::{DragPreview, LongPressHandler, LongPressKind, LongPressOutput};
pub use layout::{ItemFrame, LayoutDataSource, SupplementaryKind, WeekViewFlowLayout};
pub use models::config::{FlowLayoutConfig, HourGridDivision, ScrollType, ScrollableRange};
pub use models::event::{fragment_events, Event, EventBuilder, EventError, EventsByDate};
pub use paging::{PageDirection, PagingController, ScrollAxis};
pub use utils::clock::{Clock, FixedClock, SystemClock};
pub use week_view::{WeekView, WeekViewOutput};
