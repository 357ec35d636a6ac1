//! Telemetry event catalog and in-memory recorder.
//!
//! Stepping loops record what the queue actually served — which hold was
//! loaded, which key set went out on which step — into a fixed-capacity ring
//! so host tooling can reconstruct a run without re-polling the queue. Event
//! kinds serialize to compact numeric codes for transport over diagnostics
//! channels; signal events embed the 4-bit key mask directly in the code
//! space.
//!
//! Timestamps are simulation-step stamps, not wall clock: the scheduling
//! domain is discrete and a run must replay identically regardless of how
//! fast the host stepped it.

use core::fmt;

use heapless::{HistoryBuf, OldestOrdered};

use crate::hold::KeyHold;
use crate::keys::KeySet;

/// Identifier assigned to each recorded event, monotonically increasing.
pub type EventId = u32;

/// Simulation-step timestamp attached to telemetry records.
pub type StepStamp = u64;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 128;

/// Discriminated telemetry events emitted around queue execution.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum QueueEventKind {
    /// A plan (or plan suffix) was admitted to the queue.
    PlanQueued,
    /// A hold was promoted and began serving signals.
    HoldStarted,
    /// A key set was served for one simulation step.
    SignalApplied(KeySet),
    /// The loaded hold served its final step.
    HoldCompleted,
    /// The queue ran dry: no current steps, nothing pending.
    PlanExhausted,
    /// The plan and all execution state were discarded.
    PlanCleared,
    /// Implementation-specific extension.
    Custom(u16),
}

impl fmt::Display for QueueEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueEventKind::PlanQueued => f.write_str("plan-queued"),
            QueueEventKind::HoldStarted => f.write_str("hold-started"),
            QueueEventKind::SignalApplied(keys) => write!(f, "signal-applied {keys}"),
            QueueEventKind::HoldCompleted => f.write_str("hold-completed"),
            QueueEventKind::PlanExhausted => f.write_str("plan-exhausted"),
            QueueEventKind::PlanCleared => f.write_str("plan-cleared"),
            QueueEventKind::Custom(code) => write!(f, "custom({code})"),
        }
    }
}

impl QueueEventKind {
    const SIGNAL_APPLIED_BASE: u16 = 0x0000;
    const PLAN_QUEUED_CODE: u16 = 0x0010;
    const HOLD_STARTED_CODE: u16 = 0x0011;
    const HOLD_COMPLETED_CODE: u16 = 0x0012;
    const PLAN_EXHAUSTED_CODE: u16 = 0x0013;
    const PLAN_CLEARED_CODE: u16 = 0x0014;

    /// Encodes the event into a compact transport-friendly discriminant.
    #[must_use]
    pub const fn to_raw(self) -> u16 {
        match self {
            QueueEventKind::SignalApplied(keys) => {
                Self::SIGNAL_APPLIED_BASE + keys.to_mask() as u16
            }
            QueueEventKind::PlanQueued => Self::PLAN_QUEUED_CODE,
            QueueEventKind::HoldStarted => Self::HOLD_STARTED_CODE,
            QueueEventKind::HoldCompleted => Self::HOLD_COMPLETED_CODE,
            QueueEventKind::PlanExhausted => Self::PLAN_EXHAUSTED_CODE,
            QueueEventKind::PlanCleared => Self::PLAN_CLEARED_CODE,
            QueueEventKind::Custom(code) => code,
        }
    }

    /// Decodes a raw discriminant, falling back to [`Custom`] for unknown
    /// codes.
    ///
    /// [`Custom`]: QueueEventKind::Custom
    #[must_use]
    pub fn from_raw(code: u16) -> Self {
        match code {
            Self::PLAN_QUEUED_CODE => QueueEventKind::PlanQueued,
            Self::HOLD_STARTED_CODE => QueueEventKind::HoldStarted,
            Self::HOLD_COMPLETED_CODE => QueueEventKind::HoldCompleted,
            Self::PLAN_EXHAUSTED_CODE => QueueEventKind::PlanExhausted,
            Self::PLAN_CLEARED_CODE => QueueEventKind::PlanCleared,
            value if value < Self::PLAN_QUEUED_CODE => {
                match KeySet::from_mask(mask_byte(value)) {
                    Some(keys) => QueueEventKind::SignalApplied(keys),
                    None => QueueEventKind::Custom(value),
                }
            }
            other => QueueEventKind::Custom(other),
        }
    }
}

fn mask_byte(code: u16) -> u8 {
    match u8::try_from(code) {
        Ok(value) => value,
        Err(_) => u8::MAX,
    }
}

/// Payloads carried alongside telemetry events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TelemetryPayload {
    /// No additional metadata accompanies the event.
    None,
    /// Details about a single served signal.
    Signal(SignalTelemetry),
    /// Details about a hold transition.
    Hold(HoldTelemetry),
    /// Summary of an admitted or discarded plan.
    Plan(PlanTelemetry),
}

impl TelemetryPayload {
    /// Convenience constructor when no payload data is needed.
    #[must_use]
    pub const fn none() -> Self {
        TelemetryPayload::None
    }
}

/// Served-signal payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SignalTelemetry {
    pub keys: KeySet,
    /// Index of the serving hold within the recorded plan.
    pub hold_index: usize,
    /// 1-based step position within the serving hold.
    pub step_in_hold: u32,
}

impl SignalTelemetry {
    #[must_use]
    pub const fn new(keys: KeySet, hold_index: usize, step_in_hold: u32) -> Self {
        Self {
            keys,
            hold_index,
            step_in_hold,
        }
    }
}

/// Hold transition payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HoldTelemetry {
    /// Index of the hold within the recorded plan.
    pub index: usize,
    /// The hold itself, so a run can be reconstructed without the queue.
    pub hold: KeyHold,
}

impl HoldTelemetry {
    #[must_use]
    pub const fn new(index: usize, hold: KeyHold) -> Self {
        Self { index, hold }
    }
}

/// Plan summary payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlanTelemetry {
    /// Number of holds involved, saturating at `u8::MAX`.
    pub holds: u8,
    /// Total plan duration in steps.
    pub total_steps: u64,
}

impl PlanTelemetry {
    #[must_use]
    pub const fn new(holds: u8, total_steps: u64) -> Self {
        Self { holds, total_steps }
    }
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TelemetryRecord {
    pub id: EventId,
    pub step: StepStamp,
    pub event: QueueEventKind,
    pub details: TelemetryPayload,
}

/// Telemetry ring buffer type alias.
pub type TelemetryRing<const CAPACITY: usize = TELEMETRY_RING_CAPACITY> =
    HistoryBuf<TelemetryRecord, CAPACITY>;

/// Records queue execution events into a fixed-size ring buffer.
pub struct TelemetryRecorder<const CAPACITY: usize = TELEMETRY_RING_CAPACITY> {
    ring: TelemetryRing<CAPACITY>,
    next_event_id: EventId,
}

impl<const CAPACITY: usize> TelemetryRecorder<CAPACITY> {
    /// Creates a new recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_event_id: 0,
        }
    }

    /// Returns an iterator over recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, TelemetryRecord> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent telemetry record, if available.
    #[must_use]
    pub fn latest(&self) -> Option<&TelemetryRecord> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no telemetry records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: QueueEventKind,
        details: TelemetryPayload,
        step: StepStamp,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TelemetryRecord {
            id,
            step,
            event,
            details,
        });

        id
    }

    /// Records a plan admission.
    pub fn record_plan_queued(
        &mut self,
        holds: usize,
        total_steps: u64,
        step: StepStamp,
    ) -> EventId {
        let payload =
            TelemetryPayload::Plan(PlanTelemetry::new(truncate_count(holds), total_steps));
        self.record(QueueEventKind::PlanQueued, payload, step)
    }

    /// Records a hold promotion.
    pub fn record_hold_started(&mut self, index: usize, hold: KeyHold, step: StepStamp) -> EventId {
        let payload = TelemetryPayload::Hold(HoldTelemetry::new(index, hold));
        self.record(QueueEventKind::HoldStarted, payload, step)
    }

    /// Records a hold serving its final step.
    pub fn record_hold_completed(
        &mut self,
        index: usize,
        hold: KeyHold,
        step: StepStamp,
    ) -> EventId {
        let payload = TelemetryPayload::Hold(HoldTelemetry::new(index, hold));
        self.record(QueueEventKind::HoldCompleted, payload, step)
    }

    /// Records a served signal.
    pub fn record_signal(
        &mut self,
        keys: KeySet,
        hold_index: usize,
        step_in_hold: u32,
        step: StepStamp,
    ) -> EventId {
        let payload =
            TelemetryPayload::Signal(SignalTelemetry::new(keys, hold_index, step_in_hold));
        self.record(QueueEventKind::SignalApplied(keys), payload, step)
    }

    /// Records the queue running dry.
    pub fn record_plan_exhausted(&mut self, step: StepStamp) -> EventId {
        self.record(
            QueueEventKind::PlanExhausted,
            TelemetryPayload::none(),
            step,
        )
    }

    /// Records a full clear of the plan.
    pub fn record_plan_cleared(
        &mut self,
        holds: usize,
        total_steps: u64,
        step: StepStamp,
    ) -> EventId {
        let payload =
            TelemetryPayload::Plan(PlanTelemetry::new(truncate_count(holds), total_steps));
        self.record(QueueEventKind::PlanCleared, payload, step)
    }
}

impl<const CAPACITY: usize> Default for TelemetryRecorder<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_count(count: usize) -> u8 {
    match u8::try_from(count) {
        Ok(value) => value,
        Err(_) => u8::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyId;

    #[test]
    fn event_codes_round_trip() {
        let fixtures = [
            (QueueEventKind::PlanQueued, 0x0010),
            (QueueEventKind::HoldStarted, 0x0011),
            (QueueEventKind::HoldCompleted, 0x0012),
            (QueueEventKind::PlanExhausted, 0x0013),
            (QueueEventKind::PlanCleared, 0x0014),
            (QueueEventKind::Custom(0x4242), 0x4242),
        ];

        for (event, code) in fixtures {
            assert_eq!(event.to_raw(), code);
            assert_eq!(QueueEventKind::from_raw(code), event);
        }
    }

    #[test]
    fn signal_codes_embed_the_key_mask() {
        let keys = KeySet::none().pressing(KeyId::Q).pressing(KeyId::O);
        let event = QueueEventKind::SignalApplied(keys);
        assert_eq!(event.to_raw(), u16::from(keys.to_mask()));
        assert_eq!(QueueEventKind::from_raw(event.to_raw()), event);
    }

    #[test]
    fn recorder_assigns_sequential_ids() {
        let mut recorder = TelemetryRecorder::<8>::new();
        assert!(recorder.is_empty());

        let first = recorder.record_plan_queued(2, 9, 0);
        let second = recorder.record_hold_started(0, KeyHold::idle(3), 0);
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(recorder.len(), 2);

        let latest = recorder.latest().copied().unwrap();
        assert_eq!(latest.event, QueueEventKind::HoldStarted);
        match latest.details {
            TelemetryPayload::Hold(details) => {
                assert_eq!(details.index, 0);
                assert_eq!(details.hold, KeyHold::idle(3));
            }
            other => panic!("expected hold payload, got {other:?}"),
        }
    }

    #[test]
    fn ring_retains_the_newest_records() {
        let mut recorder = TelemetryRecorder::<4>::new();
        for step in 0..10u64 {
            recorder.record_plan_exhausted(step);
        }

        assert_eq!(recorder.len(), 4);
        let oldest = recorder.oldest_first().next().copied().unwrap();
        assert_eq!(oldest.step, 6);
        assert_eq!(recorder.latest().unwrap().step, 9);
    }

    #[test]
    fn plan_payload_saturates_the_hold_count() {
        let mut recorder = TelemetryRecorder::<4>::new();
        recorder.record_plan_queued(5_000, 123, 0);

        match recorder.latest().unwrap().details {
            TelemetryPayload::Plan(details) => {
                assert_eq!(details.holds, u8::MAX);
                assert_eq!(details.total_steps, 123);
            }
            other => panic!("expected plan payload, got {other:?}"),
        }
    }
}
