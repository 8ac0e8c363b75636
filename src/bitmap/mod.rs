//! Layer 2: the occupancy bitmap.
//!
//! An auto-extending integer capacity state derived from a
//! [`WorkingCalendar`]. Bit `i` represents the unit-slot
//! `[horizon_begin+i, horizon_begin+i+1)` and is `1` exactly when that
//! slot is both working time per the calendar and not currently
//! occupied by a committed allocation.
//!
//! # Modules
//! - `record`: [`AllocationRecord`], the value returned by a walk or commit.
//! - `walk`: earliest-fit search, commit, release.
//! - `dynamic`: mid-run capacity addition/removal against a live bitmap.

mod dynamic;
mod record;
mod walk;

pub use record::AllocationRecord;

use std::rc::Rc;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{TimeResolution, WorkingCalendar};

/// Minimum chunk size for auto-extension, in days.
const DEFAULT_EXTEND_DAYS: i64 = 7;

/// Mutable capacity state for one resource, bound to one calendar and
/// resolution for its whole lifetime.
///
/// `bits[i] == 1` iff the slot is working time per the calendar AND not
/// occupied by a committed allocation (invariant I1). The calendar is
/// held via [`Rc`] so it can be shared read-only across every bitmap
/// drawing from it, never copied per bitmap.
#[derive(Debug, Clone)]
pub struct OccupancyBitmap {
    resource_id: String,
    epoch: NaiveDateTime,
    resolution: TimeResolution,
    calendar: Rc<WorkingCalendar>,
    horizon_begin: i64,
    bits: Vec<u8>,
    allocations: Vec<AllocationRecord>,
}

impl OccupancyBitmap {
    /// Materialises a calendar into capacity state over
    /// `[horizon_start, horizon_end)`.
    pub fn from_calendar(
        calendar: Rc<WorkingCalendar>,
        horizon_start: NaiveDateTime,
        horizon_end: NaiveDateTime,
        epoch: NaiveDateTime,
        resolution: TimeResolution,
    ) -> Result<Self> {
        let begin = resolution.to_int(horizon_start, epoch)?;
        let end = resolution.to_int(horizon_end, epoch)?;
        let size = (end - begin).max(0) as usize;

        let mut bits = vec![0u8; size];
        fill_bits_from_calendar(&mut bits, begin, &calendar, &resolution, epoch)?;

        let resource_id = calendar.pattern_id().to_string();
        Ok(Self {
            resource_id,
            epoch,
            resolution,
            calendar,
            horizon_begin: begin,
            bits,
            allocations: Vec::new(),
        })
    }

    /// One past the last materialised bit index.
    pub fn horizon_begin(&self) -> i64 {
        self.horizon_begin
    }

    /// One past the last materialised bit index.
    pub fn horizon_end(&self) -> i64 {
        self.horizon_begin + self.bits.len() as i64
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn epoch(&self) -> NaiveDateTime {
        self.epoch
    }

    pub fn resolution(&self) -> &TimeResolution {
        &self.resolution
    }

    pub fn calendar(&self) -> &WorkingCalendar {
        &self.calendar
    }

    /// Committed allocations, in commit order.
    pub fn allocations(&self) -> &[AllocationRecord] {
        &self.allocations
    }

    /// The raw capacity bits, `1` meaning free. Exposed read-only for
    /// callers that need to inspect or render capacity state directly.
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Number of capacity-engine units represented by one calendar day,
    /// under this bitmap's resolution.
    fn units_per_day(&self) -> i64 {
        86_400 / self.resolution.unit_seconds
    }

    /// Grows the bitmap so `horizon_end() >= needed_end`, materialising
    /// the newly appended slots from the calendar. A no-op if the
    /// bitmap already covers `needed_end`. Existing bits — including
    /// committed allocation bits — are never touched.
    pub fn extend_to(&mut self, needed_end: i64) -> Result<()> {
        if needed_end <= self.horizon_end() {
            return Ok(());
        }

        let min_extend = DEFAULT_EXTEND_DAYS * self.units_per_day();
        let new_end = needed_end.max(self.horizon_end() + min_extend);
        let old_end = self.horizon_end();
        let extend_size = (new_end - old_end) as usize;

        let mut new_bits = vec![0u8; extend_size];
        fill_bits_from_calendar(&mut new_bits, old_end, &self.calendar, &self.resolution, self.epoch)?;

        self.bits.extend(new_bits);
        Ok(())
    }

    /// Deep copy for branching: independent bits and allocations,
    /// sharing the calendar read-only.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Captures an opaque, immutable snapshot of the current bits and
    /// allocations, for later [`OccupancyBitmap::restore`].
    pub fn checkpoint(&self) -> Snapshot {
        Snapshot {
            bits: self.bits.clone(),
            allocations: self.allocations.clone(),
        }
    }

    /// Restores bits and allocations to a prior checkpoint, truncating
    /// the bitmap back to the snapshotted length if it grew since.
    /// `horizon_begin` never changes.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.bits.clear();
        self.bits.extend_from_slice(&snapshot.bits);
        self.allocations = snapshot.allocations.clone();
    }

    /// Clamps `[begin, end)` to the materialised window and returns it
    /// as a bit-index range safe to slice `self.bits` with.
    fn clamp_to_bits(&self, begin: i64, end: i64) -> (usize, usize) {
        let len = self.bits.len() as i64;
        let lo = (begin - self.horizon_begin).clamp(0, len);
        let hi = (end - self.horizon_begin).clamp(0, len).max(lo);
        (lo as usize, hi as usize)
    }

    /// Reads the bit at a global (horizon-relative) integer offset.
    /// Callers in `walk`/`dynamic` only ever call this within
    /// `[horizon_begin, horizon_end)`.
    fn bit_at(&self, global: i64) -> u8 {
        self.bits[(global - self.horizon_begin) as usize]
    }

    /// Sets every bit in `[begin, end)` (clamped to the live window) to
    /// `value`.
    fn set_span(&mut self, begin: i64, end: i64, value: u8) {
        let (lo, hi) = self.clamp_to_bits(begin, end);
        for b in &mut self.bits[lo..hi] {
            *b = value;
        }
    }
}

/// An opaque, immutable capture of an [`OccupancyBitmap`]'s mutable
/// state, used for speculative-planning backtracking.
#[derive(Debug, Clone)]
pub struct Snapshot {
    bits: Vec<u8>,
    allocations: Vec<AllocationRecord>,
}

fn fill_bits_from_calendar(
    bits: &mut [u8],
    bits_offset: i64,
    calendar: &WorkingCalendar,
    resolution: &TimeResolution,
    epoch: NaiveDateTime,
) -> Result<()> {
    let dt_start = resolution.to_datetime(bits_offset, epoch);
    let dt_end = resolution.to_datetime(bits_offset + bits.len() as i64, epoch);

    for (iv_start, iv_end) in calendar.working_intervals_in_range(dt_start, dt_end) {
        let start_int = resolution.to_int(iv_start, epoch)? - bits_offset;
        let end_int = resolution.to_int(iv_end, epoch)? - bits_offset;
        let lo = start_int.max(0) as usize;
        let hi = end_int.min(bits.len() as i64).max(0) as usize;
        if hi > lo {
            for b in &mut bits[lo..hi] {
                *b = 1;
            }
        }
    }
    Ok(())
}
