//! Command queue serving an authored plan one key set per simulation step.
//!
//! The queue owns three views of one plan: the holds still waiting to start
//! (`pending`), the hold currently being polled (`current`), and the full
//! admission-ordered record of everything ever queued (`history`). Stepping
//! loops call [`CommandQueue::poll_signal`] once per simulation step; the
//! queue drains the current hold and promotes the next pending one on its
//! own.
//!
//! Mutation goes through `&mut self`, so within one thread exclusive access
//! is enforced by the borrow checker. Sharing one queue across threads means
//! wrapping it in an exclusive lock (`std::sync::Mutex` on hosts) that peeks
//! take as well; the cheaper alternative for concurrent exploration is to
//! hand each branch its own copy via [`CommandQueue::duplicate_unexecuted`]
//! or [`CommandQueue::duplicate_at_execution_point`], after which nothing is
//! shared.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;
use core::mem;

use crate::hold::{HoldRun, KeyHold};
use crate::keys::KeySet;
use crate::plan::{self, PlanError};

/// Error reported when a queue has nothing left to serve.
///
/// Checkable in advance via [`CommandQueue::is_empty`]; stepping loops treat
/// it as "the plan is over, decide the next plan".
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QueueError {
    /// No hold is loaded, or every loaded hold has been fully served.
    Empty,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Empty => f.write_str("command queue has no further signals"),
        }
    }
}

/// Ordered plan of key holds with step-by-step execution state.
#[derive(Debug)]
pub struct CommandQueue {
    /// Holds admitted but not yet started, in execution order.
    pending: VecDeque<KeyHold>,
    /// Hold currently being polled. Stays loaded (exhausted) after the plan
    /// runs dry so the final position remains observable.
    current: Option<HoldRun>,
    /// Every admitted hold in admission order; survives execution and is the
    /// source for resets and duplication.
    history: Vec<KeyHold>,
    /// Signals served since creation or the last clear.
    polled: u64,
    /// True iff nothing is left to poll.
    empty: bool,
}

impl CommandQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            current: None,
            history: Vec::new(),
            polled: 0,
            empty: true,
        }
    }

    /// Admits one hold to the end of the plan.
    ///
    /// Zero-duration holds are tolerated and skipped: they never reach
    /// `pending`, `history`, or the step totals. The first nonzero hold
    /// admitted is loaded as the current hold immediately.
    pub fn add_hold(&mut self, hold: KeyHold) {
        if hold.steps() == 0 {
            return;
        }

        self.pending.push_back(hold);
        self.history.push(hold);

        if self.current.is_none() {
            let first = self
                .pending
                .pop_front()
                .expect("hold queued above must still be pending");
            self.current = Some(first.start());
        }

        self.empty = false;
    }

    /// Admits a whole plan in order.
    ///
    /// # Errors
    ///
    /// [`PlanError::Empty`] when the slice contains no holds; an authored
    /// plan with nothing in it is a caller defect, unlike individual
    /// zero-duration holds which are quietly skipped.
    pub fn add_sequence(&mut self, holds: &[KeyHold]) -> Result<(), PlanError> {
        if holds.is_empty() {
            return Err(PlanError::Empty);
        }

        for hold in holds {
            self.add_hold(*hold);
        }
        Ok(())
    }

    /// Hold currently being polled, if any was ever loaded.
    #[must_use]
    pub fn peek_current_hold(&self) -> Option<&HoldRun> {
        self.current.as_ref()
    }

    /// Hold that will run after the current one completes.
    ///
    /// Returns `Ok(None)` when nothing further is pending.
    ///
    /// # Errors
    ///
    /// [`QueueError::Empty`] when the queue has never admitted a hold.
    pub fn peek_next_hold(&self) -> Result<Option<&KeyHold>, QueueError> {
        if self.history.is_empty() {
            return Err(QueueError::Empty);
        }
        Ok(self.pending.front())
    }

    /// Key set the next [`poll_signal`](CommandQueue::poll_signal) would
    /// serve, without mutating anything.
    ///
    /// Returns `Ok(None)` when the current hold is exhausted and nothing is
    /// pending.
    ///
    /// # Errors
    ///
    /// [`QueueError::Empty`] when no hold was ever loaded.
    pub fn peek_signal(&self) -> Result<Option<KeySet>, QueueError> {
        let current = self.current.as_ref().ok_or(QueueError::Empty)?;
        if current.has_next() {
            Ok(Some(current.peek()))
        } else {
            Ok(self.pending.front().map(|hold| hold.keys()))
        }
    }

    /// Serves the key set for one simulation step, advancing between holds
    /// as they exhaust.
    ///
    /// # Errors
    ///
    /// [`QueueError::Empty`] when the current hold is exhausted and nothing
    /// is pending (or nothing was ever queued).
    ///
    /// # Panics
    ///
    /// If internal bookkeeping has diverged — a promotion finding no pending
    /// hold on a queue that reports non-empty. That state is unrecoverable
    /// and is surfaced loudly rather than repaired.
    pub fn poll_signal(&mut self) -> Result<KeySet, QueueError> {
        let current = self.current.as_mut().ok_or(QueueError::Empty)?;

        if !current.has_next() {
            if self.pending.is_empty() {
                return Err(QueueError::Empty);
            }
            let next = self
                .pending
                .pop_front()
                .expect("non-empty pending queue must yield a hold");
            *current = next.start();
        }

        let keys = current
            .poll()
            .expect("a freshly loaded hold always has steps remaining");
        self.polled += 1;

        if !current.has_next() && self.pending.is_empty() {
            self.empty = true;
        }

        Ok(keys)
    }

    /// Discards the plan and all execution state.
    ///
    /// The poll counter resets with it: [`polled`](CommandQueue::polled)
    /// always measures "since the last clear".
    pub fn clear_all(&mut self) {
        self.pending.clear();
        self.history.clear();
        self.current = None;
        self.polled = 0;
        self.empty = true;
    }

    /// Returns `true` when nothing is left to poll.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Index into [`history`](CommandQueue::history) of the hold currently
    /// loaded. Index 0 is the first admitted hold.
    ///
    /// # Panics
    ///
    /// If no hold was ever loaded, or if the pending count exceeds the
    /// history count. Both mean the queue's bookkeeping has diverged from
    /// reality; the result would be a negative index, which is asserted
    /// fatally rather than clamped.
    #[must_use]
    pub fn current_hold_index(&self) -> usize {
        let started = self
            .history
            .len()
            .checked_sub(self.pending.len())
            .expect("pending holds cannot outnumber recorded history");
        assert!(
            started > 0,
            "current hold index requested before any hold was loaded"
        );
        started - 1
    }

    /// Rewinds the queue to "as authored, zero progress": the recorded plan
    /// is re-admitted from scratch. Resetting a queue that never held a plan
    /// is a no-op.
    pub fn reset(&mut self) {
        let snapshot = mem::take(&mut self.history);
        self.clear_all();
        if !snapshot.is_empty() {
            self.add_sequence(&snapshot)
                .expect("non-empty snapshot always re-admits");
        }
    }

    /// New independent queue loaded with this plan and zero progress.
    ///
    /// Nothing is shared with the original: concurrent branches can poll
    /// their copies freely.
    #[must_use]
    pub fn duplicate_unexecuted(&self) -> Self {
        let mut copy = Self::new();
        if !self.history.is_empty() {
            copy.add_sequence(&self.history)
                .expect("non-empty history always re-admits");
        }
        copy
    }

    /// New independent queue advanced to this queue's exact execution point.
    ///
    /// Built by replaying every served poll against a fresh copy, so the
    /// copy's subsequent signal stream is identical to the original's.
    ///
    /// # Panics
    ///
    /// If the recorded poll count cannot be replayed against the recorded
    /// plan — corrupted bookkeeping, surfaced loudly.
    #[must_use]
    pub fn duplicate_at_execution_point(&self) -> Self {
        let mut copy = self.duplicate_unexecuted();
        for _ in 0..self.polled {
            copy.poll_signal()
                .expect("replaying recorded polls cannot run past the plan");
        }
        copy
    }

    /// Every admitted hold in admission order, including fully served ones.
    #[must_use]
    pub fn history(&self) -> &[KeyHold] {
        &self.history
    }

    /// Signals served since creation or the last clear.
    #[must_use]
    pub fn polled(&self) -> u64 {
        self.polled
    }

    /// Total duration of the recorded plan in steps. Does not change as the
    /// queue is polled.
    #[must_use]
    pub fn total_planned_steps(&self) -> u64 {
        plan::total_steps(&self.history)
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyId, KeySet};

    fn q(steps: u32) -> KeyHold {
        KeyHold::new(KeySet::none().pressing(KeyId::Q), steps)
    }

    fn wo(steps: u32) -> KeyHold {
        KeyHold::new(
            KeySet::none().pressing(KeyId::W).pressing(KeyId::O),
            steps,
        )
    }

    #[test]
    fn first_admitted_hold_is_loaded_immediately() {
        let mut queue = CommandQueue::new();
        assert!(queue.is_empty());
        assert!(queue.peek_current_hold().is_none());

        queue.add_hold(q(2));
        assert!(!queue.is_empty());
        assert_eq!(queue.peek_current_hold().unwrap().hold(), q(2));
        assert_eq!(queue.peek_next_hold().unwrap(), None);

        queue.add_hold(wo(3));
        assert_eq!(queue.peek_next_hold().unwrap(), Some(&wo(3)));
    }

    #[test]
    fn polling_advances_across_holds_in_order() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(2), wo(1)]).unwrap();

        assert_eq!(queue.poll_signal(), Ok(q(2).keys()));
        assert_eq!(queue.poll_signal(), Ok(q(2).keys()));
        assert_eq!(queue.poll_signal(), Ok(wo(1).keys()));
        assert!(queue.is_empty());
        assert_eq!(queue.poll_signal(), Err(QueueError::Empty));
        assert_eq!(queue.polled(), 3);
    }

    #[test]
    fn peek_signal_looks_ahead_without_mutating() {
        let mut queue = CommandQueue::new();
        assert_eq!(queue.peek_signal(), Err(QueueError::Empty));

        queue.add_sequence(&[q(1), wo(1)]).unwrap();
        assert_eq!(queue.peek_signal(), Ok(Some(q(1).keys())));

        queue.poll_signal().unwrap();
        // Current hold is exhausted; the peek reads through to the next one.
        assert_eq!(queue.peek_signal(), Ok(Some(wo(1).keys())));
        assert_eq!(queue.polled(), 1);

        queue.poll_signal().unwrap();
        assert_eq!(queue.peek_signal(), Ok(None));
    }

    #[test]
    fn zero_duration_holds_are_skipped_everywhere() {
        let mut queue = CommandQueue::new();
        queue.add_hold(q(0));
        assert!(queue.is_empty());
        assert!(queue.history().is_empty());

        queue.add_sequence(&[q(0), wo(2), q(0)]).unwrap();
        assert_eq!(queue.history(), [wo(2)]);
        assert_eq!(queue.total_planned_steps(), 2);
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let mut queue = CommandQueue::new();
        assert_eq!(queue.add_sequence(&[]), Err(PlanError::Empty));
    }

    #[test]
    fn current_hold_index_tracks_promotion() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(1), wo(1), q(2)]).unwrap();

        assert_eq!(queue.current_hold_index(), 0);
        queue.poll_signal().unwrap();
        // Promotion happens lazily on the next poll.
        assert_eq!(queue.current_hold_index(), 0);
        queue.poll_signal().unwrap();
        assert_eq!(queue.current_hold_index(), 1);
        queue.poll_signal().unwrap();
        queue.poll_signal().unwrap();
        assert_eq!(queue.current_hold_index(), 2);
    }

    #[test]
    #[should_panic(expected = "before any hold was loaded")]
    fn current_hold_index_asserts_on_unloaded_queue() {
        let queue = CommandQueue::new();
        let _ = queue.current_hold_index();
    }

    #[test]
    fn clear_all_resets_the_poll_counter() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(2)]).unwrap();
        queue.poll_signal().unwrap();

        queue.clear_all();
        assert!(queue.is_empty());
        assert_eq!(queue.polled(), 0);
        assert!(queue.history().is_empty());
        assert_eq!(queue.poll_signal(), Err(QueueError::Empty));
    }

    #[test]
    fn reset_replays_the_plan_from_scratch() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(1), wo(2)]).unwrap();

        let mut first_run = Vec::new();
        while let Ok(keys) = queue.poll_signal() {
            first_run.push(keys);
        }

        queue.reset();
        assert_eq!(queue.polled(), 0);
        assert_eq!(queue.total_planned_steps(), 3);

        let mut second_run = Vec::new();
        while let Ok(keys) = queue.poll_signal() {
            second_run.push(keys);
        }
        assert_eq!(first_run, second_run);
    }

    #[test]
    fn reset_of_a_never_filled_queue_is_a_no_op() {
        let mut queue = CommandQueue::new();
        queue.reset();
        assert!(queue.is_empty());
        assert!(queue.history().is_empty());
    }

    #[test]
    fn duplicate_unexecuted_shares_no_progress() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(2), wo(1)]).unwrap();
        queue.poll_signal().unwrap();

        let copy = queue.duplicate_unexecuted();
        assert_eq!(copy.polled(), 0);
        assert_eq!(copy.history(), queue.history());
        assert_eq!(copy.total_planned_steps(), 3);
        assert!(!copy.is_empty());
    }

    #[test]
    fn duplicate_at_execution_point_matches_remaining_stream() {
        let plan = [q(3), wo(2), q(1)];
        for split in 0..=6u64 {
            let mut queue = CommandQueue::new();
            queue.add_sequence(&plan).unwrap();
            for _ in 0..split {
                queue.poll_signal().unwrap();
            }

            let mut copy = queue.duplicate_at_execution_point();
            assert_eq!(copy.polled(), queue.polled());

            loop {
                let expected = queue.poll_signal();
                let actual = copy.poll_signal();
                assert_eq!(expected, actual);
                if expected.is_err() {
                    break;
                }
            }
        }
    }

    #[test]
    fn total_planned_steps_is_invariant_under_polling() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(4), wo(3)]).unwrap();
        assert_eq!(queue.total_planned_steps(), 7);

        while queue.poll_signal().is_ok() {}
        assert_eq!(queue.total_planned_steps(), 7);
        assert_eq!(queue.polled(), 7);
    }

    #[test]
    fn adding_to_a_drained_queue_resumes_polling() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(1)]).unwrap();
        queue.poll_signal().unwrap();
        assert!(queue.is_empty());

        queue.add_hold(wo(2));
        assert!(!queue.is_empty());
        assert_eq!(queue.poll_signal(), Ok(wo(2).keys()));
    }
}
