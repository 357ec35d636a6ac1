//! Plan-level transforms over ordered hold lists.
//!
//! Plans authored one timestep at a time arrive as long runs of repeated
//! key sets; [`consolidate`] squashes those runs so the queue stores the
//! shortest plan with the identical signal stream.

use core::fmt;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::hold::KeyHold;

/// Errors reported for degenerate plan inputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlanError {
    /// The plan contained no holds at all.
    Empty,
    /// The plan contained only zero-duration holds, so nothing survives
    /// consolidation.
    ZeroDurationOnly,
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Empty => f.write_str("plan contains no holds"),
            PlanError::ZeroDurationOnly => {
                f.write_str("plan contains only zero-duration holds")
            }
        }
    }
}

/// Merges adjacent holds that share a key set and drops zero-duration holds.
///
/// The output serves the exact same per-step signal stream as the input:
/// holds are never reordered, a merge takes the position of the first of the
/// merged pair, and the transform is idempotent. Sweeps repeat until one
/// completes without a merge, as a loop rather than recursion so pathological
/// inputs cannot grow the stack.
///
/// # Errors
///
/// [`PlanError::Empty`] for an empty input; [`PlanError::ZeroDurationOnly`]
/// when nothing with a nonzero duration remains (including the single
/// zero-duration hold case).
#[cfg(feature = "alloc")]
pub fn consolidate(holds: &[KeyHold]) -> Result<Vec<KeyHold>, PlanError> {
    if holds.is_empty() {
        return Err(PlanError::Empty);
    }

    let mut merged: Vec<KeyHold> = holds
        .iter()
        .copied()
        .filter(|hold| hold.steps() != 0)
        .collect();
    if merged.is_empty() {
        return Err(PlanError::ZeroDurationOnly);
    }

    loop {
        let (swept, merges) = sweep(&merged);
        merged = swept;
        if merges == 0 {
            return Ok(merged);
        }
    }
}

/// Single left-to-right pass merging adjacent same-key pairs.
#[cfg(feature = "alloc")]
fn sweep(holds: &[KeyHold]) -> (Vec<KeyHold>, usize) {
    let mut out = Vec::with_capacity(holds.len());
    let mut merges = 0;
    let mut index = 0;

    while index < holds.len() {
        let first = holds[index];
        if let Some(second) = holds.get(index + 1).copied()
            && first.keys() == second.keys()
        {
            out.push(KeyHold::new(
                first.keys(),
                first.steps().saturating_add(second.steps()),
            ));
            merges += 1;
            index += 2;
            continue;
        }

        out.push(first);
        index += 1;
    }

    (out, merges)
}

/// Total duration of a hold list in simulation steps.
#[must_use]
pub fn total_steps(holds: &[KeyHold]) -> u64 {
    holds.iter().map(|hold| u64::from(hold.steps())).sum()
}
