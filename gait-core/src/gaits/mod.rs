//! Preset gait plans shared by the emulator and tests.
//!
//! These are canned key-hold cycles for the rig, not anything the scheduler
//! depends on: the stride cycle alternates the two thigh/knee couplings with
//! short coasting intervals between them, and the hop cycle pumps the knees
//! only. Both are small enough to step through by hand when debugging the
//! queue.

use crate::hold::KeyHold;
use crate::keys::{KeyId, KeySet};

/// Steps a drive coupling is held during the stride cycle.
pub const STRIDE_DRIVE_STEPS: u32 = 7;
/// Coasting steps between stride couplings, letting the torso settle.
pub const STRIDE_COAST_STEPS: u32 = 2;
/// Steps each knee pump is held during the hop cycle.
pub const HOP_PUMP_STEPS: u32 = 4;
/// Coasting steps between hop pumps.
pub const HOP_SETTLE_STEPS: u32 = 3;

/// Left-thigh-forward coupling: Q with the opposite knee.
pub const LEFT_DRIVE: KeySet = KeySet::none().pressing(KeyId::Q).pressing(KeyId::P);
/// Right-thigh-forward coupling: W with the opposite knee.
pub const RIGHT_DRIVE: KeySet = KeySet::none().pressing(KeyId::W).pressing(KeyId::O);

/// One full stride: drive left, coast, drive right, coast.
pub const STRIDE_CYCLE: [KeyHold; 4] = [
    KeyHold::new(LEFT_DRIVE, STRIDE_DRIVE_STEPS),
    KeyHold::idle(STRIDE_COAST_STEPS),
    KeyHold::new(RIGHT_DRIVE, STRIDE_DRIVE_STEPS),
    KeyHold::idle(STRIDE_COAST_STEPS),
];

/// One hop: pump each knee in turn with a settle between.
pub const HOP_CYCLE: [KeyHold; 4] = [
    KeyHold::new(KeySet::none().pressing(KeyId::O), HOP_PUMP_STEPS),
    KeyHold::idle(HOP_SETTLE_STEPS),
    KeyHold::new(KeySet::none().pressing(KeyId::P), HOP_PUMP_STEPS),
    KeyHold::idle(HOP_SETTLE_STEPS),
];

/// Returns the stride cycle plan.
#[must_use]
pub const fn stride_cycle() -> &'static [KeyHold] {
    &STRIDE_CYCLE
}

/// Returns the hop cycle plan.
#[must_use]
pub const fn hop_cycle() -> &'static [KeyHold] {
    &HOP_CYCLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_cycle_alternates_couplings() {
        assert_eq!(STRIDE_CYCLE.len(), 4);
        assert_eq!(STRIDE_CYCLE[0].keys(), LEFT_DRIVE);
        assert_eq!(STRIDE_CYCLE[2].keys(), RIGHT_DRIVE);
        assert!(STRIDE_CYCLE[1].keys().is_idle());
        assert!(STRIDE_CYCLE[3].keys().is_idle());
        assert_eq!(STRIDE_CYCLE[0].steps(), STRIDE_DRIVE_STEPS);
        assert_eq!(STRIDE_CYCLE[1].steps(), STRIDE_COAST_STEPS);
    }

    #[test]
    fn drive_couplings_pair_thigh_with_opposite_knee() {
        assert!(LEFT_DRIVE.is_pressed(KeyId::Q));
        assert!(LEFT_DRIVE.is_pressed(KeyId::P));
        assert!(!LEFT_DRIVE.is_pressed(KeyId::W));

        assert!(RIGHT_DRIVE.is_pressed(KeyId::W));
        assert!(RIGHT_DRIVE.is_pressed(KeyId::O));
        assert!(!RIGHT_DRIVE.is_pressed(KeyId::Q));
    }

    #[test]
    fn hop_cycle_only_pumps_knees() {
        for hold in hop_cycle() {
            assert!(!hold.keys().is_pressed(KeyId::Q));
            assert!(!hold.keys().is_pressed(KeyId::W));
        }
    }
}
