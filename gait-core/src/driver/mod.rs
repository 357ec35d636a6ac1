//! Stepping-loop plumbing between a command queue and the signal consumer.
//!
//! The physics integrator (or any stand-in for it) implements [`SignalSink`];
//! [`PlanStepper`] is the reference stepping loop that polls the queue once
//! per simulation step, forwards the key set to the sink, and records
//! telemetry around hold boundaries. Firmer hosts can run their own loop —
//! nothing in the queue depends on this module.

use crate::keys::KeySet;

#[cfg(feature = "alloc")]
use crate::queue::{CommandQueue, QueueError};
#[cfg(feature = "alloc")]
use crate::telemetry::{StepStamp, TelemetryRecorder};

/// Consumer of per-step key sets.
pub trait SignalSink {
    /// Applies the key set for the current simulation step.
    fn apply(&mut self, keys: KeySet);

    /// Releases every key, returning the rig to the idle set.
    fn release_all(&mut self) {
        self.apply(KeySet::none());
    }
}

/// Signal sink that performs no work.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopSignalSink;

impl NoopSignalSink {
    /// Creates a new no-op signal sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SignalSink for NoopSignalSink {
    fn apply(&mut self, _: KeySet) {}
}

/// Reference stepping loop over a [`CommandQueue`].
///
/// Tracks the simulation step count and the hold most recently observed, so
/// promotion edges can be translated into `HoldStarted`/`HoldCompleted`
/// telemetry without the queue having to know telemetry exists.
#[cfg(feature = "alloc")]
#[derive(Debug, Default)]
pub struct PlanStepper {
    step: StepStamp,
    last_hold_index: Option<usize>,
}

#[cfg(feature = "alloc")]
impl PlanStepper {
    /// Creates a stepper at simulation step zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: 0,
            last_hold_index: None,
        }
    }

    /// Simulation steps driven so far.
    #[must_use]
    pub const fn step_count(&self) -> StepStamp {
        self.step
    }

    /// Forgets the observed hold position, e.g. after the plan was reset or
    /// cleared out from under the stepper.
    pub fn rewind(&mut self) {
        self.last_hold_index = None;
    }

    /// Drives one simulation step: polls the queue, applies the key set to
    /// the sink, and records telemetry. When the poll drains the plan the
    /// sink is released so no key stays held past the end.
    ///
    /// # Errors
    ///
    /// [`QueueError::Empty`] straight from the queue when nothing is left;
    /// the sink and telemetry are untouched in that case.
    pub fn advance<S, const CAPACITY: usize>(
        &mut self,
        queue: &mut CommandQueue,
        sink: &mut S,
        telemetry: &mut TelemetryRecorder<CAPACITY>,
    ) -> Result<KeySet, QueueError>
    where
        S: SignalSink,
    {
        let keys = queue.poll_signal()?;
        let index = queue.current_hold_index();
        let serving = queue.history()[index];

        if self.last_hold_index != Some(index) {
            if let Some(previous) = self.last_hold_index {
                telemetry.record_hold_completed(previous, queue.history()[previous], self.step);
            }
            telemetry.record_hold_started(index, serving, self.step);
            self.last_hold_index = Some(index);
        }

        sink.apply(keys);
        let remaining = queue
            .peek_current_hold()
            .map_or(0, crate::hold::HoldRun::remaining_steps);
        telemetry.record_signal(keys, index, serving.steps() - remaining, self.step);

        if queue.is_empty() {
            telemetry.record_hold_completed(index, serving, self.step);
            telemetry.record_plan_exhausted(self.step);
            self.last_hold_index = None;
            sink.release_all();
        }

        self.step += 1;
        Ok(keys)
    }

    /// Drives simulation steps until the queue runs dry, returning how many
    /// were served.
    pub fn drain<S, const CAPACITY: usize>(
        &mut self,
        queue: &mut CommandQueue,
        sink: &mut S,
        telemetry: &mut TelemetryRecorder<CAPACITY>,
    ) -> u64
    where
        S: SignalSink,
    {
        let mut served = 0;
        while self.advance(queue, sink, telemetry).is_ok() {
            served += 1;
        }
        served
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use crate::hold::KeyHold;
    use crate::keys::{KeyId, KeySet};
    use crate::telemetry::QueueEventKind;
    use alloc::vec::Vec;

    /// Sink that remembers every applied key set, release included.
    #[derive(Default)]
    struct RecordingSink {
        applied: Vec<KeySet>,
    }

    impl SignalSink for RecordingSink {
        fn apply(&mut self, keys: KeySet) {
            self.applied.push(keys);
        }
    }

    fn q(steps: u32) -> KeyHold {
        KeyHold::new(KeySet::none().pressing(KeyId::Q), steps)
    }

    #[test]
    fn advance_forwards_each_polled_signal() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(2), KeyHold::idle(1)]).unwrap();

        let mut stepper = PlanStepper::new();
        let mut sink = RecordingSink::default();
        let mut telemetry = TelemetryRecorder::<32>::new();

        assert_eq!(
            stepper.advance(&mut queue, &mut sink, &mut telemetry),
            Ok(q(2).keys())
        );
        assert_eq!(sink.applied, [q(2).keys()]);
        assert_eq!(stepper.step_count(), 1);
    }

    #[test]
    fn drain_serves_the_whole_plan_and_releases_the_sink() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(2), KeyHold::idle(1)]).unwrap();

        let mut stepper = PlanStepper::new();
        let mut sink = RecordingSink::default();
        let mut telemetry = TelemetryRecorder::<32>::new();

        let served = stepper.drain(&mut queue, &mut sink, &mut telemetry);
        assert_eq!(served, 3);
        assert!(queue.is_empty());
        // Three plan signals plus the trailing release of every key.
        assert_eq!(
            sink.applied,
            [q(2).keys(), q(2).keys(), KeySet::none(), KeySet::none()]
        );
    }

    #[test]
    fn telemetry_traces_hold_boundaries() {
        let mut queue = CommandQueue::new();
        queue.add_sequence(&[q(1), KeyHold::idle(1)]).unwrap();

        let mut stepper = PlanStepper::new();
        let mut telemetry = TelemetryRecorder::<32>::new();
        stepper.drain(&mut queue, &mut NoopSignalSink::new(), &mut telemetry);

        let events: Vec<QueueEventKind> =
            telemetry.oldest_first().map(|record| record.event).collect();
        assert_eq!(
            events,
            [
                QueueEventKind::HoldStarted,
                QueueEventKind::SignalApplied(q(1).keys()),
                QueueEventKind::HoldCompleted,
                QueueEventKind::HoldStarted,
                QueueEventKind::SignalApplied(KeySet::none()),
                QueueEventKind::HoldCompleted,
                QueueEventKind::PlanExhausted,
            ]
        );
    }

    #[test]
    fn advance_on_a_drained_queue_touches_nothing() {
        let mut queue = CommandQueue::new();
        let mut stepper = PlanStepper::new();
        let mut sink = RecordingSink::default();
        let mut telemetry = TelemetryRecorder::<8>::new();

        assert_eq!(
            stepper.advance(&mut queue, &mut sink, &mut telemetry),
            Err(QueueError::Empty)
        );
        assert!(sink.applied.is_empty());
        assert!(telemetry.is_empty());
        assert_eq!(stepper.step_count(), 0);
    }
}
