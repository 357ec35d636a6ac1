//! Shared status surface for the REPL.
//!
//! Front-ends implement [`StatusProvider`] so the `status` command can
//! surface live queue state without duplicating platform logic;
//! [`StatusFormatter`] keeps the textual rendering consistent across
//! front-ends.

use core::fmt;

use crate::keys::KeySet;

#[cfg(feature = "alloc")]
use crate::queue::CommandQueue;

/// Snapshot of reusable queue state surfaced by the REPL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueSnapshot {
    /// Holds recorded in the plan.
    pub plan_holds: usize,
    /// Index of the loaded hold, if one was ever loaded.
    pub current_index: Option<usize>,
    /// Key set of the loaded hold.
    pub current_keys: Option<KeySet>,
    /// Steps left in the loaded hold.
    pub remaining_in_hold: u32,
    /// Holds admitted but not yet started.
    pub pending_holds: usize,
    /// Signals served since the last clear.
    pub polled: u64,
    /// Total plan duration in steps.
    pub total_steps: u64,
    /// True when nothing is left to poll.
    pub empty: bool,
}

impl QueueSnapshot {
    /// Builds a snapshot for a queue that never held a plan.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            plan_holds: 0,
            current_index: None,
            current_keys: None,
            remaining_in_hold: 0,
            pending_holds: 0,
            polled: 0,
            total_steps: 0,
            empty: true,
        }
    }

    /// Samples a live queue.
    #[cfg(feature = "alloc")]
    #[must_use]
    pub fn of_queue(queue: &CommandQueue) -> Self {
        let current = queue.peek_current_hold();
        Self {
            plan_holds: queue.history().len(),
            current_index: current.map(|_| queue.current_hold_index()),
            current_keys: current.map(crate::hold::HoldRun::peek),
            remaining_in_hold: current.map_or(0, crate::hold::HoldRun::remaining_steps),
            pending_holds: queue.history().len()
                - current.map_or(0, |_| queue.current_hold_index() + 1),
            polled: queue.polled(),
            total_steps: queue.total_planned_steps(),
            empty: queue.is_empty(),
        }
    }
}

/// Platform hook that supplies live status information.
pub trait StatusProvider {
    /// Returns a snapshot if the platform can currently provide one.
    fn snapshot(&mut self) -> Option<QueueSnapshot>;
}

/// Placeholder status provider that never reports snapshots.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStatusProvider;

impl StatusProvider for NoStatusProvider {
    fn snapshot(&mut self) -> Option<QueueSnapshot> {
        None
    }
}

/// Helper that renders a [`QueueSnapshot`] into human-readable lines.
#[derive(Clone, Copy, Debug)]
pub struct StatusFormatter<'a> {
    snapshot: &'a QueueSnapshot,
}

impl<'a> StatusFormatter<'a> {
    /// Creates a new formatter for the provided snapshot.
    #[must_use]
    pub const fn new(snapshot: &'a QueueSnapshot) -> Self {
        Self { snapshot }
    }

    /// Writes the plan line (e.g. `plan holds=4 pending=2 total-steps=18
    /// polled=7 empty=false`).
    pub fn write_plan_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        write!(
            writer,
            "plan holds={} pending={} total-steps={} polled={} empty={}",
            self.snapshot.plan_holds,
            self.snapshot.pending_holds,
            self.snapshot.total_steps,
            self.snapshot.polled,
            self.snapshot.empty
        )
    }

    /// Writes the hold line (e.g. `hold index=1 keys=q--p remaining=3`).
    pub fn write_hold_line<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        match (self.snapshot.current_index, self.snapshot.current_keys) {
            (Some(index), Some(keys)) => write!(
                writer,
                "hold index={index} keys={keys} remaining={}",
                self.snapshot.remaining_in_hold
            ),
            _ => writer.write_str("hold none-loaded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<F>(write: F) -> heapless::String<96>
    where
        F: FnOnce(&mut heapless::String<96>) -> fmt::Result,
    {
        let mut buffer = heapless::String::new();
        write(&mut buffer).expect("status lines fit the buffer");
        buffer
    }

    #[test]
    fn idle_snapshot_renders_placeholder_lines() {
        let snapshot = QueueSnapshot::idle();
        let formatter = StatusFormatter::new(&snapshot);

        let plan = render(|buffer| formatter.write_plan_line(buffer));
        assert_eq!(
            plan.as_str(),
            "plan holds=0 pending=0 total-steps=0 polled=0 empty=true"
        );

        let hold = render(|buffer| formatter.write_hold_line(buffer));
        assert_eq!(hold.as_str(), "hold none-loaded");
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn live_snapshot_tracks_queue_progress() {
        use crate::hold::KeyHold;
        use crate::keys::KeyId;

        let mut queue = CommandQueue::new();
        queue
            .add_sequence(&[
                KeyHold::new(KeySet::none().pressing(KeyId::Q), 2),
                KeyHold::idle(3),
            ])
            .unwrap();
        queue.poll_signal().unwrap();

        let snapshot = QueueSnapshot::of_queue(&queue);
        assert_eq!(snapshot.plan_holds, 2);
        assert_eq!(snapshot.current_index, Some(0));
        assert_eq!(snapshot.remaining_in_hold, 1);
        assert_eq!(snapshot.pending_holds, 1);
        assert_eq!(snapshot.polled, 1);
        assert_eq!(snapshot.total_steps, 5);
        assert!(!snapshot.empty);

        let formatter = StatusFormatter::new(&snapshot);
        let hold = render(|buffer| formatter.write_hold_line(buffer));
        assert_eq!(hold.as_str(), "hold index=0 keys=q--- remaining=1");
    }
}
