//! Layer 1 domain types: time resolution and the working calendar.
//!
//! # Modules
//!
//! - **`resolution`**: [`TimeResolution`] — the datetime ↔ integer boundary.
//! - **`calendar`**: [`WorkingCalendar`] — recurring weekly periods plus
//!   dated exceptions, with forward/backward time-arithmetic and interval
//!   enumeration.

mod calendar;
mod resolution;

pub use calendar::{
    weekday_from_index, weekday_index, ExceptionEntry, WorkingCalendar, WorkingIntervals,
    WorkingPeriod,
};
pub use resolution::TimeResolution;
