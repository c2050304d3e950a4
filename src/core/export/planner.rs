//! Batch planning
//!
//! Splits the closed interval `[start, end]` into `n` contiguous batches.
//!
//! The step size is `floor((end - start) / n)`. Batch `i` begins at
//! `start + i * step`; every batch ends one id before the next batch begins,
//! and the last batch ends exactly at `end`. The result covers the whole
//! interval with no id in two batches.

use crate::core::state::Batch;
use crate::domain::{RangeId, Result, SierraExportError};

/// Plan `n` batches covering `[start, end]`
///
/// # Errors
///
/// Returns [`SierraExportError::InvalidRange`] when `end < start`, when
/// `n == 0`, or when the interval holds fewer than `n` ids.
///
/// # Examples
///
/// ```
/// use sierra_export::core::export::planner::plan;
/// use sierra_export::domain::RangeId;
///
/// let batches = plan(RangeId::new(1_000_000), RangeId::new(1_000_100), 2).unwrap();
/// assert_eq!(batches.len(), 2);
/// assert_eq!((batches[0].start.value(), batches[0].end.value()), (1_000_000, 1_000_049));
/// assert_eq!((batches[1].start.value(), batches[1].end.value()), (1_000_050, 1_000_100));
/// ```
pub fn plan(start: RangeId, end: RangeId, n: usize) -> Result<Vec<Batch>> {
    if n == 0 {
        return Err(SierraExportError::InvalidRange(
            "number of batches must be positive".to_string(),
        ));
    }

    let span = start.distance_to(end).ok_or_else(|| {
        SierraExportError::InvalidRange(format!("end {end} is before start {start}"))
    })?;

    // Fewer ids (span + 1) than batches
    if n as u64 - 1 > span {
        return Err(SierraExportError::InvalidRange(format!(
            "cannot split [{start}, {end}] into {n} batches"
        )));
    }
    // span / n is zero only when the range holds exactly n ids
    let step = (span / n as u64).max(1);

    let batches = (0..n as u64)
        .map(|i| {
            let batch_start = start.offset(i * step);
            let batch_end = if i + 1 == n as u64 {
                end
            } else {
                RangeId::new(start.offset((i + 1) * step).value() - 1)
            };
            Batch::new(batch_start, batch_end)
        })
        .collect();

    Ok(batches)
}
