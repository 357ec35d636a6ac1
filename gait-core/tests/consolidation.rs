use gait_core::gaits::{STRIDE_CYCLE, stride_cycle};
use gait_core::hold::KeyHold;
use gait_core::keys::{KeyId, KeySet};
use gait_core::plan::{PlanError, consolidate, total_steps};

fn q() -> KeySet {
    KeySet::none().pressing(KeyId::Q)
}

fn w() -> KeySet {
    KeySet::none().pressing(KeyId::W)
}

fn o() -> KeySet {
    KeySet::none().pressing(KeyId::O)
}

#[test]
fn adjacent_same_key_holds_merge_and_zero_durations_vanish() {
    let plan = [
        KeyHold::new(q(), 3),
        KeyHold::new(q(), 2),
        KeyHold::new(w(), 0),
        KeyHold::new(o(), 5),
    ];

    let merged = consolidate(&plan).expect("plan survives consolidation");
    assert_eq!(merged, [KeyHold::new(q(), 5), KeyHold::new(o(), 5)]);
}

#[test]
fn timestep_by_timestep_authoring_collapses_to_runs() {
    // The shape a per-step controller produces: one hold per simulation step.
    let mut plan = Vec::new();
    for _ in 0..10 {
        plan.push(KeyHold::new(q(), 1));
    }
    for _ in 0..4 {
        plan.push(KeyHold::idle(1));
    }
    plan.push(KeyHold::new(q(), 1));

    let merged = consolidate(&plan).unwrap();
    assert_eq!(
        merged,
        [
            KeyHold::new(q(), 10),
            KeyHold::idle(4),
            KeyHold::new(q(), 1),
        ]
    );
    assert_eq!(total_steps(&merged), total_steps(&plan));
}

#[test]
fn consolidation_is_idempotent() {
    let plan = [
        KeyHold::new(q(), 2),
        KeyHold::new(q(), 1),
        KeyHold::idle(0),
        KeyHold::idle(6),
        KeyHold::new(w(), 4),
        KeyHold::new(w(), 4),
        KeyHold::new(o(), 1),
    ];

    let once = consolidate(&plan).unwrap();
    let twice = consolidate(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn already_minimal_plans_pass_through() {
    let merged = consolidate(stride_cycle()).unwrap();
    assert_eq!(merged, STRIDE_CYCLE);
}

#[test]
fn single_zero_duration_hold_is_rejected() {
    assert_eq!(
        consolidate(&[KeyHold::new(q(), 0)]),
        Err(PlanError::ZeroDurationOnly)
    );
}

#[test]
fn plans_of_nothing_but_zero_durations_are_rejected() {
    let plan = [KeyHold::new(q(), 0), KeyHold::idle(0), KeyHold::new(o(), 0)];
    assert_eq!(consolidate(&plan), Err(PlanError::ZeroDurationOnly));
    assert_eq!(consolidate(&[]), Err(PlanError::Empty));
}

#[test]
fn merges_never_reorder_surviving_holds() {
    let plan = [
        KeyHold::new(o(), 2),
        KeyHold::new(q(), 1),
        KeyHold::new(q(), 1),
        KeyHold::idle(0),
        KeyHold::new(q(), 1),
        KeyHold::new(w(), 8),
    ];

    let merged = consolidate(&plan).unwrap();
    assert_eq!(
        merged,
        [
            KeyHold::new(o(), 2),
            KeyHold::new(q(), 3),
            KeyHold::new(w(), 8),
        ]
    );
}
