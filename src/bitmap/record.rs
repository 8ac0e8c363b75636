//! [`AllocationRecord`], the immutable output of a walk or allocation.

use serde::{Deserialize, Serialize};

/// An immutable record of a committed or candidate allocation.
///
/// # Invariants
/// - `spans` are sorted by start, non-overlapping, and lie within
///   `[start, finish)`.
/// - The sum of span lengths equals `work_units`.
/// - If `allow_split` is `false`, `spans` has exactly one entry and
///   `finish - start == work_units`.
///
/// Comparable and hashable by value: two records with identical fields
/// are the same allocation. [`crate::bitmap::OccupancyBitmap::deallocate`]
/// relies on this to find the record to release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub operation_id: String,
    pub resource_id: String,
    pub start: i64,
    pub finish: i64,
    pub work_units: i64,
    pub allow_split: bool,
    pub spans: Vec<(i64, i64)>,
}

impl AllocationRecord {
    /// Total elapsed time including non-working gaps between spans.
    pub fn wall_time(&self) -> i64 {
        self.finish - self.start
    }

    /// Whether this allocation fulfils the required work.
    pub fn is_complete(&self, required_work_units: i64) -> bool {
        self.work_units >= required_work_units
    }
}
