//! Finite-capacity scheduling primitives for the U-Engine ecosystem.
//!
//! Two layers, bottom-up: a lazy, horizon-free working calendar
//! (recurring weekly periods plus dated exceptions), and an
//! auto-extending occupancy bitmap derived from it (earliest-fit
//! search, commit, release, dynamic mid-run exceptions, speculative
//! snapshot/restore). This crate answers where a piece of work fits,
//! how long it takes in wall time, and what capacity remains after
//! it's committed — it is a primitives layer, not a scheduler: policy
//! (priority, sequencing, objective optimisation) belongs in callers
//! such as `u-schedule`, one layer above.
//!
//! # Modules
//!
//! - **`models`**: `TimeResolution`, `WorkingCalendar` — Layer 1.
//! - **`bitmap`**: `OccupancyBitmap`, `AllocationRecord`, `Snapshot` —
//!   Layer 2.
//! - **`validation`**: calendar input integrity checks (weekday range,
//!   time parseability, same-day overlap, exception shape).
//! - **`error`**: the crate-wide `Error` enum and `Result` alias.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use chrono::{NaiveDate, NaiveTime, Weekday};
//! use u_capacity::models::{TimeResolution, WorkingCalendar, WorkingPeriod};
//! use u_capacity::bitmap::OccupancyBitmap;
//!
//! let period = WorkingPeriod::new(
//!     NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
//!     NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
//! );
//! let calendar = Rc::new(
//!     WorkingCalendar::new("standard")
//!         .with_rule(Weekday::Mon, vec![period])
//!         .with_rule(Weekday::Tue, vec![period])
//!         .with_rule(Weekday::Wed, vec![period])
//!         .with_rule(Weekday::Thu, vec![period])
//!         .with_rule(Weekday::Fri, vec![period]),
//! );
//!
//! let epoch = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let horizon_end = epoch + chrono::Duration::days(14);
//!
//! let mut bitmap = OccupancyBitmap::from_calendar(
//!     calendar,
//!     epoch,
//!     horizon_end,
//!     epoch,
//!     TimeResolution::minute(),
//! ).unwrap();
//!
//! // Earliest 300-minute non-splittable slot no earlier than 08:00 Monday.
//! let record = bitmap.allocate("O1", 480, 300, false, 1, None).unwrap();
//! assert_eq!(record.spans, vec![(480, 780)]);
//!
//! bitmap.deallocate(&record);
//! assert!(bitmap.allocations().is_empty());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Brucker (2007), "Scheduling Algorithms"

pub mod bitmap;
pub mod error;
pub mod models;
pub mod validation;

pub use error::{Error, Result};
