//! Layer 1: the working calendar.
//!
//! A horizon-free, lazy model of recurring weekly working periods plus
//! planned date exceptions. Every query (`add_minutes`,
//! `working_minutes_between`, `working_intervals_in_range`, …) walks the
//! calendar day by day on demand; nothing is precomputed or materialised
//! until [`crate::bitmap::OccupancyBitmap::from_calendar`] asks for a
//! concrete window.
//!
//! # Overnight periods
//! A period whose `end <= start` (with `end == 00:00` read as "end of
//! day") crosses midnight: its first half belongs to the day it starts
//! on, its second half is carried over onto the next day — unless that
//! next day's periods come from an exception, in which case the
//! exception still inherits the carryover (it only replaces *same-day*
//! rules).
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1
//! (working-time calendars as scheduling primitives).

use std::collections::{HashMap, VecDeque};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Midnight, used both as a literal time-of-day and as the "end of day"
/// sentinel for overnight periods.
fn midnight() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 0, 0).unwrap()
}

/// A half-open `[start, end)` working period within one calendar day.
///
/// `end <= start` (with `end == 00:00` as a sentinel for end-of-day)
/// marks an overnight period; see [`WorkingPeriod::is_overnight`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkingPeriod {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WorkingPeriod {
    /// Creates a new working period.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether this period crosses midnight.
    pub fn is_overnight(&self) -> bool {
        is_overnight(self.start, self.end)
    }
}

fn is_overnight(start: NaiveTime, end: NaiveTime) -> bool {
    let mid = midnight();
    if end == mid && start != mid {
        return true;
    }
    end < start
}

/// One exception entry for a specific calendar date.
///
/// `is_working = false` with no time range clears the entire day of
/// rule-derived periods. `is_working = true` adds a period. `is_working
/// = false` *with* a time range is reserved for partial-day removal —
/// parsed but not acted on (see the module-level docs on
/// [`WorkingCalendar::periods_for_date`] and `validation`, which rejects
/// this shape at the input boundary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionEntry {
    pub is_working: bool,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

impl ExceptionEntry {
    /// A full-day removal entry (`is_working = false`, no time range).
    pub fn remove_day() -> Self {
        Self {
            is_working: false,
            start: None,
            end: None,
        }
    }

    /// A working-period addition entry.
    pub fn add_period(start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            is_working: true,
            start: Some(start),
            end: Some(end),
        }
    }
}

/// Maps a `0..=6` weekday index (0 = Monday) to [`chrono::Weekday`].
pub fn weekday_from_index(i: u8) -> Option<Weekday> {
    match i {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// The inverse of [`weekday_from_index`].
pub fn weekday_index(w: Weekday) -> u8 {
    w.num_days_from_monday() as u8
}

/// A horizon-free, lazy model of recurring working periods and planned
/// exceptions. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingCalendar {
    pattern_id: String,
    rules: HashMap<Weekday, Vec<WorkingPeriod>>,
    exceptions: HashMap<NaiveDate, Vec<ExceptionEntry>>,
}

impl WorkingCalendar {
    /// Creates an empty calendar (no working time anywhere).
    pub fn new(pattern_id: impl Into<String>) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            rules: HashMap::new(),
            exceptions: HashMap::new(),
        }
    }

    /// Sets the recurring periods for a weekday, replacing any previous
    /// rule for that weekday. Periods are sorted by start time.
    pub fn with_rule(mut self, weekday: Weekday, mut periods: Vec<WorkingPeriod>) -> Self {
        periods.sort();
        self.rules.insert(weekday, periods);
        self
    }

    /// Adds an exception for a specific date, replacing any previous
    /// exception for that date.
    pub fn with_exception(mut self, date: NaiveDate, entries: Vec<ExceptionEntry>) -> Self {
        self.exceptions.insert(date, entries);
        self
    }

    /// The calendar's identifier.
    pub fn pattern_id(&self) -> &str {
        &self.pattern_id
    }

    /// The working periods in effect for a specific date.
    ///
    /// 1. If `d` has an exception, exception resolution applies (full-day
    ///    clearing, then `is_working = true` additions).
    /// 2. Otherwise, same-day weekly rules apply, plus the previous day's
    ///    overnight carryover.
    ///
    /// Returns periods sorted ascending by start.
    pub fn periods_for_date(&self, d: NaiveDate) -> Vec<WorkingPeriod> {
        if self.exceptions.contains_key(&d) {
            self.resolve_exceptions(d)
        } else {
            self.resolve_rules(d)
        }
    }

    /// Same-day periods from this weekday's rules, with overnight periods
    /// truncated to their same-day `[start, 00:00)` portion.
    fn same_day_rule_periods(&self, d: NaiveDate) -> Vec<WorkingPeriod> {
        let mut periods = Vec::new();
        if let Some(rules) = self.rules.get(&d.weekday()) {
            for p in rules {
                if p.is_overnight() {
                    periods.push(WorkingPeriod::new(p.start, midnight()));
                } else {
                    periods.push(*p);
                }
            }
        }
        periods
    }

    /// The `[00:00, end)` tail of any overnight period in the *previous*
    /// day's weekly rules. Always keyed by weekday — never by the
    /// previous day's resolved (possibly exception-overridden) periods.
    fn carryover_from_previous_day(&self, d: NaiveDate) -> Vec<WorkingPeriod> {
        let mut periods = Vec::new();
        let prev_date = d - Duration::days(1);
        if let Some(rules) = self.rules.get(&prev_date.weekday()) {
            for p in rules {
                if p.is_overnight() && p.end != midnight() {
                    periods.push(WorkingPeriod::new(midnight(), p.end));
                }
            }
        }
        periods
    }

    fn resolve_rules(&self, d: NaiveDate) -> Vec<WorkingPeriod> {
        let mut periods = self.same_day_rule_periods(d);
        periods.extend(self.carryover_from_previous_day(d));
        periods.sort();
        periods
    }

    /// Exception-defined days replace *same-day* rules only. The
    /// previous day's overnight carryover still applies to a day whose
    /// periods are otherwise fully replaced or cleared by an exception —
    /// see the module docs and the "Overnight and exception interaction"
    /// design note this was ported against.
    fn resolve_exceptions(&self, d: NaiveDate) -> Vec<WorkingPeriod> {
        let entries = &self.exceptions[&d];

        let has_full_removal = entries
            .iter()
            .any(|e| !e.is_working && e.start.is_none() && e.end.is_none());

        let mut periods = if has_full_removal {
            Vec::new()
        } else {
            self.same_day_rule_periods(d)
        };
        periods.extend(self.carryover_from_previous_day(d));

        for e in entries {
            if e.is_working {
                if let (Some(start), Some(end)) = (e.start, e.end) {
                    periods.push(WorkingPeriod::new(start, end));
                }
            }
            // `is_working == false` with a time range: reserved for
            // partial-day removal, which has no defined subtraction
            // semantics across a midnight-sentinel boundary.
            // `validation::validate_exceptions` rejects the shape at
            // the input boundary instead.
        }

        periods.sort_by_key(|p| p.start);
        periods
    }

    /// Converts a date's working periods into concrete datetime
    /// intervals. `end == 00:00` becomes midnight at the start of the
    /// next date.
    fn datetime_intervals_for_date(&self, d: NaiveDate) -> Vec<(NaiveDateTime, NaiveDateTime)> {
        self.periods_for_date(d)
            .into_iter()
            .map(|p| {
                let start = d.and_time(p.start);
                let end = if p.end == midnight() {
                    (d + Duration::days(1)).and_time(midnight())
                } else {
                    d.and_time(p.end)
                };
                (start, end)
            })
            .collect()
    }

    /// Forward walk: `start` plus `minutes` of working time.
    ///
    /// Has no horizon limit — it keeps walking day by day until the
    /// requested amount of working time has been consumed.
    pub fn add_minutes(&self, start: NaiveDateTime, minutes: i64) -> NaiveDateTime {
        if minutes == 0 {
            return start;
        }

        let mut remaining = minutes;
        let mut current_date = start.date();
        let mut current_time = start;

        loop {
            for (iv_start, iv_end) in self.datetime_intervals_for_date(current_date) {
                if iv_end <= current_time {
                    continue;
                }

                let effective_start = iv_start.max(current_time);
                let available = (iv_end - effective_start).num_minutes();
                if available <= 0 {
                    continue;
                }

                if remaining <= available {
                    return effective_start + Duration::minutes(remaining);
                }
                remaining -= available;
                current_time = iv_end;
            }

            current_date = current_date
                .succ_opt()
                .expect("calendar date overflowed chrono's representable range");
            current_time = current_date.and_time(midnight());
        }
    }

    /// Backward walk: `end` minus `minutes` of working time.
    pub fn subtract_minutes(&self, end: NaiveDateTime, minutes: i64) -> NaiveDateTime {
        if minutes == 0 {
            return end;
        }

        let mut remaining = minutes;
        let mut current_date = end.date();
        let mut current_time = end;

        loop {
            for (iv_start, iv_end) in self.datetime_intervals_for_date(current_date).into_iter().rev() {
                if iv_start >= current_time {
                    continue;
                }

                let effective_end = iv_end.min(current_time);
                let available = (effective_end - iv_start).num_minutes();
                if available <= 0 {
                    continue;
                }

                if remaining <= available {
                    return effective_end - Duration::minutes(remaining);
                }
                remaining -= available;
                current_time = iv_start;
            }

            current_date = current_date
                .pred_opt()
                .expect("calendar date underflowed chrono's representable range");
            current_time = (current_date + Duration::days(1)).and_time(midnight());
        }
    }

    /// Total working minutes in `[a, b)`. Returns 0 if `a >= b`.
    pub fn working_minutes_between(&self, a: NaiveDateTime, b: NaiveDateTime) -> i64 {
        if a >= b {
            return 0;
        }

        let mut total = 0i64;
        let mut current_date = a.date();
        let end_date = b.date();

        while current_date <= end_date {
            for (iv_start, iv_end) in self.datetime_intervals_for_date(current_date) {
                let effective_start = iv_start.max(a);
                let effective_end = iv_end.min(b);
                if effective_start < effective_end {
                    total += (effective_end - effective_start).num_minutes();
                }
            }
            current_date = current_date.succ_opt().expect("calendar date overflowed");
        }

        total
    }

    /// Lazily enumerates the clamped, non-empty intersections of each
    /// date's working intervals with `[a, b)`, strictly increasing by
    /// start.
    pub fn working_intervals_in_range(
        &self,
        a: NaiveDateTime,
        b: NaiveDateTime,
    ) -> WorkingIntervals<'_> {
        WorkingIntervals {
            calendar: self,
            range_start: a,
            range_end: b,
            cursor_date: Some(a.date()),
            pending: VecDeque::new(),
        }
    }
}

/// Lazy iterator returned by [`WorkingCalendar::working_intervals_in_range`].
pub struct WorkingIntervals<'a> {
    calendar: &'a WorkingCalendar,
    range_start: NaiveDateTime,
    range_end: NaiveDateTime,
    cursor_date: Option<NaiveDate>,
    pending: VecDeque<(NaiveDateTime, NaiveDateTime)>,
}

impl<'a> Iterator for WorkingIntervals<'a> {
    type Item = (NaiveDateTime, NaiveDateTime);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some((s, e)) = self.pending.pop_front() {
                let cs = s.max(self.range_start);
                let ce = e.min(self.range_end);
                if cs < ce {
                    return Some((cs, ce));
                }
            }

            let d = self.cursor_date?;
            if d > self.range_end.date() {
                self.cursor_date = None;
                return None;
            }

            self.pending = self.calendar.datetime_intervals_for_date(d).into();
            self.cursor_date = d.succ_opt();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_calendar() -> WorkingCalendar {
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
        cal
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_weekday_index_round_trip() {
        for i in 0..7u8 {
            let w = weekday_from_index(i).unwrap();
            assert_eq!(weekday_index(w), i);
        }
        assert_eq!(weekday_from_index(7), None);
    }

    #[test]
    fn test_periods_for_date_weekend_empty() {
        let cal = standard_calendar();
        // 2025-01-06 is a Monday; 2025-01-11 is a Saturday.
        let saturday = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        assert!(cal.periods_for_date(saturday).is_empty());
    }

    /// S1: add_minutes(Mon 09:00, 60) == Mon 10:00.
    #[test]
    fn test_s1_add_minutes_same_day() {
        let cal = standard_calendar();
        let start = dt(2025, 1, 6, 9, 0);
        assert_eq!(cal.add_minutes(start, 60), dt(2025, 1, 6, 10, 0));
    }

    /// S2: add_minutes(Mon 16:30, 60) == Tue 08:30.
    #[test]
    fn test_s2_add_minutes_crosses_non_working_gap() {
        let cal = standard_calendar();
        let start = dt(2025, 1, 6, 16, 30);
        assert_eq!(cal.add_minutes(start, 60), dt(2025, 1, 7, 8, 30));
    }

    /// S3: working_minutes_between(Mon 08:00, Fri 17:00) == 2700.
    #[test]
    fn test_s3_working_minutes_between_full_week() {
        let cal = standard_calendar();
        let a = dt(2025, 1, 6, 8, 0);
        let b = dt(2025, 1, 10, 17, 0);
        assert_eq!(cal.working_minutes_between(a, b), 2700);
    }

    #[test]
    fn test_working_minutes_between_empty_range() {
        let cal = standard_calendar();
        let a = dt(2025, 1, 6, 9, 0);
        let b = dt(2025, 1, 6, 9, 0);
        assert_eq!(cal.working_minutes_between(a, b), 0);
        assert_eq!(cal.working_minutes_between(b, a), 0);
    }

    #[test]
    fn test_working_intervals_in_range_lazy() {
        let cal = standard_calendar();
        let a = dt(2025, 1, 6, 0, 0);
        let b = dt(2025, 1, 8, 0, 0);
        let intervals: Vec<_> = cal.working_intervals_in_range(a, b).collect();
        assert_eq!(
            intervals,
            vec![
                (dt(2025, 1, 6, 8, 0), dt(2025, 1, 6, 17, 0)),
                (dt(2025, 1, 7, 8, 0), dt(2025, 1, 7, 17, 0)),
            ]
        );
    }

    /// P2: add_minutes and subtract_minutes are mutual inverses.
    #[test]
    fn test_p2_add_subtract_inverse() {
        let cal = standard_calendar();
        let start = dt(2025, 1, 6, 9, 0);
        for n in [0, 1, 30, 60, 480, 1080] {
            let finish = cal.add_minutes(start, n);
            assert_eq!(cal.subtract_minutes(finish, n), start);

            let end = dt(2025, 1, 10, 17, 0);
            let begin = cal.subtract_minutes(end, n);
            assert_eq!(cal.add_minutes(begin, n), end);
        }
    }

    #[test]
    fn test_overnight_carryover() {
        // Monday 22:00-06:00 overnight.
        let overnight = WorkingPeriod::new(
            NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        );
        let cal = WorkingCalendar::new("night-shift").with_rule(Weekday::Mon, vec![overnight]);

        let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();

        let mon_periods = cal.periods_for_date(monday);
        assert_eq!(
            mon_periods,
            vec![WorkingPeriod::new(
                NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
                midnight()
            )]
        );

        let tue_periods = cal.periods_for_date(tuesday);
        assert_eq!(
            tue_periods,
            vec![WorkingPeriod::new(
                midnight(),
                NaiveTime::from_hms_opt(6, 0, 0).unwrap()
            )]
        );
    }

    #[test]
    fn test_exception_full_day_removal() {
        let cal = standard_calendar().with_exception(
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            vec![ExceptionEntry::remove_day()],
        );
        assert!(cal
            .periods_for_date(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap())
            .is_empty());
    }

    #[test]
    fn test_exception_holiday_replaced_by_half_day() {
        let half_day = ExceptionEntry::add_period(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        );
        let cal = standard_calendar().with_exception(
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
            vec![ExceptionEntry::remove_day(), half_day],
        );
        let periods = cal.periods_for_date(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap());
        assert_eq!(
            periods,
            vec![WorkingPeriod::new(
                NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(12, 0, 0).unwrap()
            )]
        );
    }

    #[test]
    fn test_exception_addition_on_top_of_rules() {
        // Saturday is normally non-working; add an extra morning shift.
        let extra = ExceptionEntry::add_period(
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
        );
        let saturday = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
        let cal = standard_calendar().with_exception(saturday, vec![extra]);
        let periods = cal.periods_for_date(saturday);
        assert_eq!(
            periods,
            vec![WorkingPeriod::new(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(13, 0, 0).unwrap()
            )]
        );
    }

    #[test]
    fn test_overnight_carryover_survives_next_day_exception() {
        // Monday 22:00-06:00 overnight, Tuesday fully replaced by exception.
        let overnight = WorkingPeriod::new(
            NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        );
        let replacement = ExceptionEntry::add_period(
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
        );
        let tuesday = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
        let cal = WorkingCalendar::new("night-shift")
            .with_rule(Weekday::Mon, vec![overnight])
            .with_exception(tuesday, vec![ExceptionEntry::remove_day(), replacement]);

        let periods = cal.periods_for_date(tuesday);
        assert_eq!(
            periods,
            vec![
                WorkingPeriod::new(midnight(), NaiveTime::from_hms_opt(6, 0, 0).unwrap()),
                WorkingPeriod::new(
                    NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(14, 0, 0).unwrap()
                ),
            ]
        );
    }
}
