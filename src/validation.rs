//! Input validation for calendar definitions.
//!
//! Checks structural integrity of weekly rules and dated exceptions
//! before they are turned into a [`crate::models::WorkingCalendar`].
//! Consumes the plain, `serde`-deserializable [`CalendarInput`] shape
//! described by the engine's external calendar format; does not parse
//! it from any particular file format.
//!
//! # Reference
//! Weekday-indexed rule tables and ISO-8601 exception dates, matching
//! the calendar input format documented alongside `WorkingCalendar`.

use std::collections::HashMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Validation result: `Ok(())` if all checks pass, `Err(errors)` with
/// every detected issue otherwise.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of calendar input validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A weekday key fell outside `0..=6`.
    InvalidWeekday,
    /// A time-of-day string failed to parse.
    InvalidTime,
    /// Two same-day, non-overnight periods overlap.
    OverlappingPeriods,
    /// An exception date string failed to parse.
    InvalidDate,
    /// An exception entry's shape doesn't match `ExceptionInput`.
    MalformedException,
    /// An exception entry is `is_working = false` with a time range —
    /// reserved for partial-day removal, which this engine does not
    /// implement (see `crate::models::calendar`).
    UnsupportedPartialRemoval,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One weekly rule period, as `"HH:MM"` strings.
pub type PeriodInput = (String, String);

/// One exception entry for a specific calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionInput {
    pub is_working: bool,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// The external calendar format: weekday-indexed weekly rules plus
/// dated exceptions, both still in string form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarInput {
    pub rules: HashMap<u8, Vec<PeriodInput>>,
    pub exceptions: HashMap<String, Vec<ExceptionInput>>,
}

/// Validates a calendar input's rules and exceptions together.
pub fn validate_calendar_input(input: &CalendarInput) -> ValidationResult {
    let mut errors = validate_rules(&input.rules);
    errors.extend(validate_exceptions(&input.exceptions));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates weekly rules: weekday keys in `0..=6`, parseable times,
/// and no overlap between same-day non-overnight periods.
pub fn validate_rules(rules: &HashMap<u8, Vec<PeriodInput>>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (&weekday, periods) in rules {
        if weekday > 6 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWeekday,
                format!("invalid weekday key: {weekday} (must be 0-6)"),
            ));
            continue;
        }

        let mut parsed: Vec<(NaiveTime, NaiveTime)> = Vec::new();
        for (i, (start_str, end_str)) in periods.iter().enumerate() {
            match (parse_time(start_str), parse_time(end_str)) {
                (Some(start), Some(end)) => parsed.push((start, end)),
                _ => errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTime,
                    format!(
                        "weekday {weekday}, period {i}: invalid time in ({start_str:?}, {end_str:?})"
                    ),
                )),
            }
        }

        let mut same_day: Vec<(NaiveTime, NaiveTime)> =
            parsed.into_iter().filter(|(s, e)| e > s).collect();
        same_day.sort();
        for j in 1..same_day.len() {
            let (_, prev_end) = same_day[j - 1];
            let (curr_start, _) = same_day[j];
            if curr_start < prev_end {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OverlappingPeriods,
                    format!(
                        "weekday {weekday}: overlapping periods {:?} and {:?}",
                        same_day[j - 1],
                        same_day[j]
                    ),
                ));
            }
        }
    }

    errors
}

/// Validates exception entries: dates parse as ISO dates, and working
/// entries carry parseable start/end times.
///
/// Rejects `is_working = false` entries that also carry a time range —
/// see [`ValidationErrorKind::UnsupportedPartialRemoval`].
pub fn validate_exceptions(
    exceptions: &HashMap<String, Vec<ExceptionInput>>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (date_str, entries) in exceptions {
        if chrono::NaiveDate::parse_from_str(date_str, "%Y-%m-%d").is_err() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDate,
                format!("invalid date: {date_str}"),
            ));
            continue;
        }

        for (i, entry) in entries.iter().enumerate() {
            if !entry.is_working && (entry.start.is_some() || entry.end.is_some()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnsupportedPartialRemoval,
                    format!(
                        "date {date_str}, entry {i}: partial-day removal \
                         (is_working=false with a time range) is not supported"
                    ),
                ));
                continue;
            }

            if entry.is_working {
                match (&entry.start, &entry.end) {
                    (Some(start), Some(end)) => {
                        if parse_time(start).is_none() || parse_time(end).is_none() {
                            errors.push(ValidationError::new(
                                ValidationErrorKind::InvalidTime,
                                format!(
                                    "date {date_str}, entry {i}: invalid time in ({start:?}, {end:?})"
                                ),
                            ));
                        }
                    }
                    _ => errors.push(ValidationError::new(
                        ValidationErrorKind::MalformedException,
                        format!(
                            "date {date_str}, entry {i}: is_working=true requires start and end"
                        ),
                    )),
                }
            }
        }
    }

    errors
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}
