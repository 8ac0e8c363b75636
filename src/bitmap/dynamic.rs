//! Mid-run capacity modification against a live bitmap.
//!
//! Distinct from exceptions on a [`crate::models::WorkingCalendar`]:
//! these mutate an already-materialised bitmap directly and never touch
//! the calendar that produced it.

use super::{AllocationRecord, OccupancyBitmap};

impl OccupancyBitmap {
    /// Adds or removes capacity over `[begin, end)`, clipped to the
    /// live window. Never fails.
    ///
    /// - `is_working = true` (overtime): sets every bit in range to
    ///   free. Always returns an empty list.
    /// - `is_working = false` (breakdown): reports every committed
    ///   allocation whose spans intersect the range — once each, in
    ///   allocation order — then clears every bit in range to
    ///   occupied, regardless of its prior value. Reported allocations
    ///   are left in `allocations`; only the bits change.
    pub fn apply_dynamic_exception(
        &mut self,
        begin: i64,
        end: i64,
        is_working: bool,
    ) -> Vec<AllocationRecord> {
        if is_working {
            self.set_span(begin, end, 1);
            return Vec::new();
        }

        let conflicts: Vec<AllocationRecord> = self
            .allocations()
            .iter()
            .filter(|r| r.spans.iter().any(|&(s, e)| s < end && begin < e))
            .cloned()
            .collect();

        self.set_span(begin, end, 0);
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};

    use super::*;
    use crate::models::{TimeResolution, WorkingCalendar, WorkingPeriod};

    fn standard_calendar() -> Rc<WorkingCalendar> {
        let period = WorkingPeriod::new(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        );
        let mut cal = WorkingCalendar::new("standard");
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
        ] {
            cal = cal.with_rule(weekday, vec![period]);
        }
        Rc::new(cal)
    }

    fn epoch() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn fresh_bitmap() -> OccupancyBitmap {
        let cal = standard_calendar();
        let start = epoch();
        let end = start + chrono::Duration::days(5);
        OccupancyBitmap::from_calendar(cal, start, end, epoch(), TimeResolution::minute()).unwrap()
    }

    /// S8: a dynamic removal intersecting a prior allocation reports it.
    #[test]
    fn test_s8_dynamic_removal_reports_conflict() {
        let mut bm = fresh_bitmap();
        let record = bm.allocate("O1", 480, 120, false, 1, None).unwrap();

        let conflicts = bm.apply_dynamic_exception(540, 600, false);
        assert_eq!(conflicts, vec![record]);
    }

    #[test]
    fn test_dynamic_removal_no_conflict_when_disjoint() {
        let mut bm = fresh_bitmap();
        bm.allocate("O1", 480, 120, false, 1, None).unwrap();

        let conflicts = bm.apply_dynamic_exception(700, 760, false);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_dynamic_removal_clears_bits_regardless_of_prior_value() {
        let mut bm = fresh_bitmap();
        assert_eq!(bm.bits()[600], 1);
        bm.apply_dynamic_exception(540, 600, false);
        assert_eq!(bm.bits()[599], 0);
    }

    #[test]
    fn test_dynamic_addition_marks_bits_free() {
        let mut bm = fresh_bitmap();
        let non_working_idx = 1020; // Monday 17:00, just past close.
        assert_eq!(bm.bits()[non_working_idx], 0);
        bm.apply_dynamic_exception(non_working_idx as i64, non_working_idx as i64 + 60, true);
        assert_eq!(bm.bits()[non_working_idx], 1);
    }

    #[test]
    fn test_dynamic_exception_clips_to_live_window() {
        let mut bm = fresh_bitmap();
        let end = bm.horizon_end();
        // Range far beyond the live window must not panic.
        let conflicts = bm.apply_dynamic_exception(end - 5, end + 10_000, false);
        assert!(conflicts.is_empty());
    }
}
