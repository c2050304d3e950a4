//! Next-batch selection

use crate::core::state::{Batch, Tracker};

/// What the next step should work on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextBatch<'a> {
    /// First batch, in sequence order, that has not been completed
    Pending { index: usize, batch: &'a Batch },
    /// Every planned batch is complete, or nothing is planned yet
    Done,
}

/// Return the first pending batch, or [`NextBatch::Done`]
pub fn next_batch(tracker: &Tracker) -> NextBatch<'_> {
    tracker
        .batches
        .iter()
        .enumerate()
        .find(|(_, batch)| !batch.is_complete())
        .map(|(index, batch)| NextBatch::Pending { index, batch })
        .unwrap_or(NextBatch::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RangeId;
    use chrono::Utc;

    fn tracker_with(completed: &[bool]) -> Tracker {
        let mut tracker = Tracker::empty();
        for (i, done) in completed.iter().enumerate() {
            let start = 1_000_000 + i as u64 * 10;
            let mut batch = Batch::new(RangeId::new(start), RangeId::new(start + 9));
            if *done {
                batch.last_grabbed = Some(Utc::now());
            }
            tracker.batches.push(batch);
        }
        tracker
    }

    #[test]
    fn test_empty_tracker_is_done() {
        assert_eq!(next_batch(&Tracker::empty()), NextBatch::Done);
    }

    #[test]
    fn test_first_pending_is_selected() {
        let tracker = tracker_with(&[true, false, false]);
        match next_batch(&tracker) {
            NextBatch::Pending { index, batch } => {
                assert_eq!(index, 1);
                assert_eq!(batch.start, RangeId::new(1_000_010));
            }
            NextBatch::Done => panic!("expected a pending batch"),
        }
    }

    #[test]
    fn test_gap_before_completed_batch_is_selected() {
        let tracker = tracker_with(&[false, true]);
        assert!(matches!(
            next_batch(&tracker),
            NextBatch::Pending { index: 0, .. }
        ));
    }

    #[test]
    fn test_all_complete_is_done() {
        let tracker = tracker_with(&[true, true, true]);
        assert_eq!(next_batch(&tracker), NextBatch::Done);
    }
}
