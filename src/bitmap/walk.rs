//! Earliest-fit search, commit, and release.
//!
//! `walk` never mutates `bits` or `allocations` (it may call
//! [`OccupancyBitmap::extend_to`], which only ever writes to freshly
//! appended slots). `allocate` is `walk` followed by a commit;
//! `deallocate` is its exact inverse.

use super::{AllocationRecord, OccupancyBitmap};
use crate::error::{Error, Result};

impl OccupancyBitmap {
    /// Earliest-fit search for `work_units` of capacity starting no
    /// earlier than `earliest_start`, optionally splittable across
    /// free runs of at least `min_split`, optionally bounded by
    /// `deadline` (the finish of every returned span must be `<=
    /// deadline`). Extends the bitmap as needed; fails with
    /// [`Error::Infeasible`] only once the deadline itself rules out
    /// any further extension helping.
    pub fn walk(
        &mut self,
        operation_id: &str,
        earliest_start: i64,
        work_units: i64,
        allow_split: bool,
        min_split: i64,
        deadline: Option<i64>,
    ) -> Result<AllocationRecord> {
        if work_units <= 0 {
            return Err(Error::EmptyRequest);
        }

        let from = earliest_start.max(self.horizon_begin());

        if allow_split {
            self.walk_splittable(operation_id, from, work_units, min_split, deadline)
        } else {
            self.walk_non_splittable(operation_id, from, work_units, deadline)
        }
    }

    /// `walk` followed by commit: occupied bits are cleared and the
    /// record is appended to `allocations`.
    pub fn allocate(
        &mut self,
        operation_id: &str,
        earliest_start: i64,
        work_units: i64,
        allow_split: bool,
        min_split: i64,
        deadline: Option<i64>,
    ) -> Result<AllocationRecord> {
        let record = self.walk(
            operation_id,
            earliest_start,
            work_units,
            allow_split,
            min_split,
            deadline,
        )?;
        for &(s, e) in &record.spans {
            self.set_span(s, e, 0);
        }
        self.allocations.push(record.clone());
        Ok(record)
    }

    /// The exact inverse of [`OccupancyBitmap::allocate`]: frees every
    /// bit in the record's spans (clipped to the live window) and
    /// removes the value-equal record from `allocations`. Never fails —
    /// a record with no matching entry is simply not found, and its
    /// spans are still freed.
    pub fn deallocate(&mut self, record: &AllocationRecord) {
        if let Some(pos) = self.allocations.iter().position(|r| r == record) {
            self.allocations.remove(pos);
        }
        for &(s, e) in &record.spans {
            self.set_span(s, e, 1);
        }
    }

    fn walk_non_splittable(
        &mut self,
        operation_id: &str,
        from: i64,
        work_units: i64,
        deadline: Option<i64>,
    ) -> Result<AllocationRecord> {
        loop {
            let scan_bound = match deadline {
                Some(d) => d.min(self.horizon_end()),
                None => self.horizon_end(),
            };

            let mut idx = from;
            while idx < self.horizon_end() {
                if self.bit_at(idx) == 0 {
                    idx += 1;
                    continue;
                }
                let run_start = idx;
                while idx < self.horizon_end() && self.bit_at(idx) == 1 {
                    idx += 1;
                }
                if run_start + work_units <= idx && run_start + work_units <= scan_bound {
                    let finish = run_start + work_units;
                    return Ok(AllocationRecord {
                        operation_id: operation_id.to_string(),
                        resource_id: self.resource_id().to_string(),
                        start: run_start,
                        finish,
                        work_units,
                        allow_split: false,
                        spans: vec![(run_start, finish)],
                    });
                }
            }

            if let Some(d) = deadline {
                if scan_bound >= d {
                    return Err(Error::Infeasible {
                        operation_id: operation_id.to_string(),
                        work_units_remaining: work_units,
                        work_units_requested: work_units,
                        reason: "deadline",
                    });
                }
            }

            let next_end = self.horizon_end() + 1;
            self.extend_to(next_end)?;
        }
    }

    fn walk_splittable(
        &mut self,
        operation_id: &str,
        from: i64,
        work_units: i64,
        min_split: i64,
        deadline: Option<i64>,
    ) -> Result<AllocationRecord> {
        let mut remaining = work_units;
        let mut spans: Vec<(i64, i64)> = Vec::new();
        let mut cursor = from;

        loop {
            let scan_bound = match deadline {
                Some(d) => d.min(self.horizon_end()),
                None => self.horizon_end(),
            };

            while cursor < scan_bound && remaining > 0 {
                if self.bit_at(cursor) == 0 {
                    cursor += 1;
                    continue;
                }
                let run_start = cursor;
                let mut end = cursor;
                while end < self.horizon_end() && self.bit_at(end) == 1 {
                    end += 1;
                }
                let capped_end = end.min(scan_bound);
                let run_len = capped_end - run_start;
                if run_len >= min_split {
                    let consume = run_len.min(remaining);
                    spans.push((run_start, run_start + consume));
                    remaining -= consume;
                }
                cursor = end;
            }

            if remaining == 0 {
                break;
            }

            if cursor >= scan_bound {
                if let Some(d) = deadline {
                    if scan_bound >= d {
                        return Err(Error::Infeasible {
                            operation_id: operation_id.to_string(),
                            work_units_remaining: remaining,
                            work_units_requested: work_units,
                            reason: "deadline",
                        });
                    }
                }
                let next_end = self.horizon_end() + 1;
                self.extend_to(next_end)?;
            }
        }

        let start = spans.first().map(|&(s, _)| s).unwrap_or(from);
        let finish = spans.last().map(|&(_, e)| e).unwrap_or(from);
        Ok(AllocationRecord {
            operation_id: operation_id.to_string(),
            resource_id: self.resource_id().to_string(),
            start,
            finish,
            work_units,
            allow_split: true,
            spans,
        })
    }
}
