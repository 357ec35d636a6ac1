use gait_core::hold::{HoldError, KeyHold};
use gait_core::keys::{KeyId, KeySet};

fn sample_holds() -> [KeyHold; 4] {
    [
        KeyHold::new(KeySet::none().pressing(KeyId::Q), 1),
        KeyHold::new(KeySet::none().pressing(KeyId::W).pressing(KeyId::O), 7),
        KeyHold::idle(20),
        KeyHold::new(
            KeySet::new([true, true, true, true]),
            3,
        ),
    ]
}

#[test]
fn every_run_serves_its_full_duration_then_fails() {
    for hold in sample_holds() {
        let mut run = hold.start();

        for served in 0..hold.steps() {
            assert!(run.has_next(), "expected steps left after {served} polls");
            assert_eq!(run.poll(), Ok(hold.keys()));
        }

        assert!(!run.has_next());
        assert_eq!(run.poll(), Err(HoldError::Exhausted));
        // A failed poll leaves the run where it was.
        assert_eq!(run.remaining_steps(), 0);
    }
}

#[test]
fn reset_after_exhaustion_allows_a_full_replay() {
    let hold = KeyHold::new(KeySet::none().pressing(KeyId::Q).pressing(KeyId::P), 5);
    let mut run = hold.start();
    while run.poll().is_ok() {}

    run.reset();
    assert!(run.has_next());

    let mut replayed = 0;
    while let Ok(keys) = run.poll() {
        assert_eq!(keys, hold.keys());
        replayed += 1;
    }
    assert_eq!(replayed, hold.steps());
}

#[test]
fn template_stays_untouched_by_its_runs() {
    let hold = KeyHold::new(KeySet::none().pressing(KeyId::O), 4);

    let mut first = hold.start();
    let mut second = hold.start();
    first.poll().unwrap();
    first.poll().unwrap();
    second.poll().unwrap();

    assert_eq!(hold.steps(), 4);
    assert_eq!(first.remaining_steps(), 2);
    assert_eq!(second.remaining_steps(), 3);

    let third = hold.start();
    assert_eq!(third.remaining_steps(), 4);
}

#[test]
fn equality_is_insensitive_to_progress() {
    let hold = KeyHold::new(KeySet::none().pressing(KeyId::W), 6);
    let fresh = hold.start();
    let mut half = hold.start();
    for _ in 0..3 {
        half.poll().unwrap();
    }

    assert_eq!(fresh, half);
    assert_eq!(half, hold);

    let longer = KeyHold::new(hold.keys(), 7);
    let renamed = KeyHold::new(KeySet::none().pressing(KeyId::O), 6);
    assert_ne!(longer, hold);
    assert_ne!(renamed, hold);
}
