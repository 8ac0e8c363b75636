//! Boundary between naive datetimes and the integer time used internally
//! by [`crate::bitmap::OccupancyBitmap`].
//!
//! All engine arithmetic below this boundary uses plain integers; a
//! `TimeResolution` is the single place that knows how many seconds one
//! unit is worth.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Converts between naive wall-clock datetimes and integer offsets from
/// an epoch. Immutable value.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_capacity::models::TimeResolution;
///
/// let epoch = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let dt = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap().and_hms_opt(9, 0, 0).unwrap();
///
/// let t = TimeResolution::minute().to_int(dt, epoch).unwrap();
/// assert_eq!(t, 540);
/// assert_eq!(TimeResolution::minute().to_datetime(t, epoch), dt);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeResolution {
    /// Number of real seconds in one unit.
    pub unit_seconds: i64,
    /// Human-readable label, used only in diagnostics.
    pub label: String,
}

impl TimeResolution {
    /// Creates a new resolution.
    pub fn new(unit_seconds: i64, label: impl Into<String>) -> Self {
        Self {
            unit_seconds,
            label: label.into(),
        }
    }

    /// The standard one-minute resolution.
    pub fn minute() -> Self {
        Self::new(60, "minute")
    }

    /// The standard one-hour resolution.
    pub fn hour() -> Self {
        Self::new(3600, "hour")
    }

    /// Converts a naive datetime to an integer count of units from `epoch`.
    ///
    /// Fails with [`Error::Misaligned`] if `(dt - epoch)` in seconds is
    /// not a multiple of `unit_seconds`. There is no implicit rounding.
    pub fn to_int(&self, dt: NaiveDateTime, epoch: NaiveDateTime) -> Result<i64> {
        let delta_seconds = (dt - epoch).num_seconds();
        let remainder = delta_seconds.rem_euclid(self.unit_seconds);
        if remainder != 0 {
            return Err(Error::Misaligned {
                label: self.label.clone(),
                unit_seconds: self.unit_seconds,
                remainder_seconds: remainder,
            });
        }
        Ok(delta_seconds.div_euclid(self.unit_seconds))
    }

    /// Converts an integer offset from `epoch` back to a naive datetime.
    pub fn to_datetime(&self, t: i64, epoch: NaiveDateTime) -> NaiveDateTime {
        epoch + Duration::seconds(t * self.unit_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn epoch() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_round_trip_minute() {
        let res = TimeResolution::minute();
        let dt = epoch() + Duration::minutes(123);
        let t = res.to_int(dt, epoch()).unwrap();
        assert_eq!(t, 123);
        assert_eq!(res.to_datetime(t, epoch()), dt);
    }

    #[test]
    fn test_round_trip_hour() {
        let res = TimeResolution::hour();
        let dt = epoch() + Duration::hours(7);
        let t = res.to_int(dt, epoch()).unwrap();
        assert_eq!(t, 7);
        assert_eq!(res.to_datetime(t, epoch()), dt);
    }

    #[test]
    fn test_misaligned() {
        let res = TimeResolution::hour();
        let dt = epoch() + Duration::minutes(90);
        let err = res.to_int(dt, epoch()).unwrap_err();
        assert!(matches!(err, Error::Misaligned { .. }));
    }

    #[test]
    fn test_negative_offset() {
        let res = TimeResolution::minute();
        let dt = epoch() - Duration::minutes(30);
        let t = res.to_int(dt, epoch()).unwrap();
        assert_eq!(t, -30);
        assert_eq!(res.to_datetime(t, epoch()), dt);
    }

    /// P1: round trip for every aligned, naive datetime.
    #[test]
    fn test_property_round_trip_various_offsets() {
        let res = TimeResolution::minute();
        for minutes in [-1000, -1, 0, 1, 59, 60, 1440, 100_000] {
            let dt = epoch() + Duration::minutes(minutes);
            let t = res.to_int(dt, epoch()).unwrap();
            assert_eq!(res.to_datetime(t, epoch()), dt);
        }
    }
}
