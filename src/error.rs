//! Crate-wide error taxonomy.
//!
//! One enum for every boundary that can fail: the datetime/integer
//! conversion at `TimeResolution`, calendar input validation, and
//! earliest-fit search under a deadline. Calendar arithmetic itself
//! (`WorkingCalendar::add_minutes` and friends) never fails.

use thiserror::Error;

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced across the `u-capacity` API boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A timezone-aware datetime was supplied.
    ///
    /// Structurally unreachable through this crate's public API: every
    /// entry point takes a [`chrono::NaiveDateTime`], which cannot carry
    /// timezone information. Kept in the taxonomy so callers can match
    /// on every error kind exhaustively.
    #[error("naive datetime required, got a timezone-aware value")]
    NaiveRequired,

    /// A datetime does not align to the resolution's unit.
    #[error(
        "datetime does not align to {label} resolution (unit_seconds={unit_seconds}); \
         remainder {remainder_seconds}s — no implicit rounding"
    )]
    Misaligned {
        label: String,
        unit_seconds: i64,
        remainder_seconds: i64,
    },

    /// Calendar input failed structural validation.
    #[error("calendar input is invalid: {0:?}")]
    ValidationError(Vec<String>),

    /// A walk could not complete under the requested deadline.
    #[error(
        "operation {operation_id:?} cannot complete — {work_units_remaining}/{work_units_requested} \
         units remaining (reason: {reason})"
    )]
    Infeasible {
        operation_id: String,
        work_units_remaining: i64,
        work_units_requested: i64,
        reason: &'static str,
    },

    /// A walk or allocation was requested for zero work units.
    #[error("work_units must be greater than zero")]
    EmptyRequest,
}
