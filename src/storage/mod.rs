mod db;

pub use db::{Db, DbAppender};

use crate::error::Result;
use crate::model::{Labels, SampleValue, Timestamp};

/// Opaque series handle issued by the storage engine on the first append of
/// a label set. Valid only within the open storage instance that issued it.
pub type SeriesRef = u64;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// Smallest block time-range, 2h in milliseconds.
const BLOCK_RANGE_BASE: i64 = 2 * 60 * 60 * 1000;
const BLOCK_RANGE_TIERS: usize = 5;
const BLOCK_RANGE_STEP: i64 = 3;

pub const DEFAULT_RETENTION_DAYS: u64 = 15;

/// Storage policy consumed once at open time.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Maximum age of stored data, in milliseconds.
    pub retention: i64,
    /// Block time-ranges for the compaction tiers, in milliseconds.
    pub block_ranges: Vec<i64>,
}

impl Options {
    pub fn with_retention_days(days: u64) -> Self {
        Self {
            retention: days as i64 * MILLIS_PER_DAY,
            block_ranges: exponential_block_ranges(
                BLOCK_RANGE_BASE,
                BLOCK_RANGE_TIERS,
                BLOCK_RANGE_STEP,
            ),
        }
    }
}

impl Default for Options {
    fn default() -> Self {
        Self::with_retention_days(DEFAULT_RETENTION_DAYS)
    }
}

/// Block ranges growing from `min_size` by a fixed `step` factor, one entry
/// per compaction tier.
pub fn exponential_block_ranges(min_size: i64, tiers: usize, step: i64) -> Vec<i64> {
    let mut ranges = Vec::with_capacity(tiers);
    let mut current = min_size;
    for _ in 0..tiers {
        ranges.push(current);
        current *= step;
    }
    ranges
}

/// One write transaction against the storage engine.
///
/// Appended samples become durable and visible only after `commit`.
pub trait Appender {
    /// Appends a sample for the given label set, returning the reference
    /// under which further samples of the series can be appended.
    fn append(&mut self, labels: &Labels, t: Timestamp, v: SampleValue) -> Result<SeriesRef>;

    /// Appends a sample for an already-resolved series.
    fn append_ref(&mut self, r: SeriesRef, t: Timestamp, v: SampleValue) -> Result<()>;

    /// Makes all appended samples durable. At most one commit per appender.
    fn commit(&mut self) -> Result<()>;
}
