//! Key-hold templates and their disposable execution handles.
//!
//! A [`KeyHold`] describes "hold this key set for N simulation steps" and is
//! an immutable value: it is the durable form a plan is authored, stored, and
//! compared in. Polling happens only through a [`HoldRun`], a throwaway
//! handle created with [`KeyHold::start`]. Splitting the two into distinct
//! types lets any number of execution contexts replay the same authored hold
//! without sharing a step counter, and makes "polled the template by
//! mistake" a compile error instead of a runtime mode check.

use core::fmt;

use crate::keys::KeySet;

/// Immutable description of a key set held for a fixed number of steps.
///
/// Equality covers the key set and the total duration; execution progress is
/// a property of [`HoldRun`], never of the template.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct KeyHold {
    keys: KeySet,
    steps: u32,
}

impl KeyHold {
    /// Creates a hold for the given key set and duration.
    ///
    /// A zero duration is representable — timestep-by-timestep authoring
    /// produces them routinely — but zero-duration holds are dropped by
    /// consolidation and skipped at queue admission.
    #[must_use]
    pub const fn new(keys: KeySet, steps: u32) -> Self {
        Self { keys, steps }
    }

    /// Creates a hold with no key pressed, i.e. a coasting interval.
    #[must_use]
    pub const fn idle(steps: u32) -> Self {
        Self::new(KeySet::none(), steps)
    }

    /// Key set applied on every step of this hold.
    #[must_use]
    pub const fn keys(&self) -> KeySet {
        self.keys
    }

    /// Total duration in simulation steps.
    #[must_use]
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Begins a fresh execution of this hold.
    ///
    /// Every call yields an independent handle with the full duration
    /// remaining; neither the template nor previously started runs are
    /// affected.
    #[must_use]
    pub const fn start(self) -> HoldRun {
        HoldRun {
            hold: self,
            remaining: self.steps,
        }
    }
}

impl fmt::Display for KeyHold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.keys, self.steps)
    }
}

/// Error reported when polling a spent [`HoldRun`].
///
/// Callers that prefer not to hit this can check [`HoldRun::has_next`]
/// first; the error exists to catch stepping-loop logic defects, not as a
/// routine control path.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HoldError {
    /// Every step of the hold has already been served.
    Exhausted,
}

impl fmt::Display for HoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldError::Exhausted => f.write_str("hold already served every step"),
        }
    }
}

/// Pollable execution handle for one [`KeyHold`].
///
/// Starts with the template's full duration remaining and counts down one
/// step per [`poll`](HoldRun::poll). Equality ignores the countdown: a fresh
/// run and a half-polled run of the same template compare equal, to each
/// other and to the template itself.
#[derive(Copy, Clone, Debug)]
pub struct HoldRun {
    hold: KeyHold,
    remaining: u32,
}

impl HoldRun {
    /// Template this run was started from.
    #[must_use]
    pub const fn hold(&self) -> KeyHold {
        self.hold
    }

    /// Key set this run applies, without consuming a step.
    #[must_use]
    pub const fn peek(&self) -> KeySet {
        self.hold.keys()
    }

    /// Total duration of the underlying hold.
    #[must_use]
    pub const fn total_steps(&self) -> u32 {
        self.hold.steps()
    }

    /// Steps left to serve before the run is exhausted.
    #[must_use]
    pub const fn remaining_steps(&self) -> u32 {
        self.remaining
    }

    /// Returns `true` while at least one step is left to serve.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.remaining > 0
    }

    /// Serves one step: returns the key set and decrements the countdown.
    pub fn poll(&mut self) -> Result<KeySet, HoldError> {
        if self.remaining == 0 {
            return Err(HoldError::Exhausted);
        }
        self.remaining -= 1;
        Ok(self.hold.keys())
    }

    /// Restores the full duration, readying the run for another replay.
    pub fn reset(&mut self) {
        self.remaining = self.hold.steps();
    }
}

impl PartialEq for HoldRun {
    fn eq(&self, other: &Self) -> bool {
        self.hold == other.hold
    }
}

impl Eq for HoldRun {}

impl PartialEq<KeyHold> for HoldRun {
    fn eq(&self, other: &KeyHold) -> bool {
        self.hold == *other
    }
}

impl PartialEq<HoldRun> for KeyHold {
    fn eq(&self, other: &HoldRun) -> bool {
        *self == other.hold
    }
}

impl fmt::Display for HoldRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{} remaining",
            self.hold.keys(),
            self.remaining,
            self.hold.steps()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyId;

    fn drive_hold() -> KeyHold {
        KeyHold::new(KeySet::none().pressing(KeyId::Q).pressing(KeyId::P), 3)
    }

    #[test]
    fn run_serves_exactly_the_total_duration() {
        let hold = drive_hold();
        let mut run = hold.start();

        for _ in 0..hold.steps() {
            assert!(run.has_next());
            assert_eq!(run.poll(), Ok(hold.keys()));
        }

        assert!(!run.has_next());
        assert_eq!(run.poll(), Err(HoldError::Exhausted));
    }

    #[test]
    fn reset_restores_the_full_countdown() {
        let mut run = drive_hold().start();
        while run.has_next() {
            run.poll().unwrap();
        }

        run.reset();
        assert!(run.has_next());
        assert_eq!(run.remaining_steps(), run.total_steps());

        let mut served = 0;
        while run.poll().is_ok() {
            served += 1;
        }
        assert_eq!(served, run.total_steps());
    }

    #[test]
    fn runs_progress_independently() {
        let hold = drive_hold();
        let mut first = hold.start();
        let second = hold.start();

        first.poll().unwrap();
        first.poll().unwrap();

        assert_eq!(first.remaining_steps(), 1);
        assert_eq!(second.remaining_steps(), hold.steps());
    }

    #[test]
    fn equality_ignores_progress_and_handle_kind() {
        let hold = drive_hold();
        let fresh = hold.start();
        let mut polled = hold.start();
        polled.poll().unwrap();

        assert_eq!(fresh, polled);
        assert_eq!(polled, hold);
        assert_eq!(hold, fresh);

        let other = KeyHold::new(hold.keys(), hold.steps() + 1);
        assert_ne!(other, fresh);
        assert_ne!(KeyHold::idle(3), drive_hold());
    }

    #[test]
    fn zero_duration_run_is_born_exhausted() {
        let mut run = KeyHold::idle(0).start();
        assert!(!run.has_next());
        assert_eq!(run.poll(), Err(HoldError::Exhausted));
    }
}
