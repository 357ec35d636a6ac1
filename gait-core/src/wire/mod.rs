//! Flat persistence records for authored plans.
//!
//! A plan travels as a sequence of five-byte records: one key-mask byte
//! (high nibble reserved, must be zero) followed by the hold duration as a
//! big-endian `u32`. Only the authored template data is encoded — execution
//! progress never persists, since replay always starts from reset semantics.

use alloc::vec::Vec;
use core::fmt;

use crate::hold::KeyHold;
use crate::keys::KeySet;

/// Bytes occupied by one encoded hold.
pub const RECORD_BYTES: usize = 5;

/// Errors reported while decoding an encoded plan.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WireError {
    /// Input ended partway through a record.
    Truncated {
        /// Byte offset where the partial record begins.
        offset: usize,
    },
    /// A mask byte used the reserved high nibble.
    ReservedBits {
        /// Byte offset of the offending record.
        offset: usize,
    },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Truncated { offset } => {
                write!(f, "plan record truncated at byte {offset}")
            }
            WireError::ReservedBits { offset } => {
                write!(f, "reserved mask bits set in record at byte {offset}")
            }
        }
    }
}

/// Encodes a plan into its flat record form.
#[must_use]
pub fn encode_plan(holds: &[KeyHold]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(holds.len() * RECORD_BYTES);
    for hold in holds {
        bytes.push(hold.keys().to_mask());
        bytes.extend_from_slice(&hold.steps().to_be_bytes());
    }
    bytes
}

/// Decodes a plan from its flat record form.
///
/// # Errors
///
/// [`WireError::Truncated`] when the input length is not a whole number of
/// records; [`WireError::ReservedBits`] when a mask byte carries bits outside
/// the key channels.
pub fn decode_plan(bytes: &[u8]) -> Result<Vec<KeyHold>, WireError> {
    let remainder = bytes.len() % RECORD_BYTES;
    if remainder != 0 {
        return Err(WireError::Truncated {
            offset: bytes.len() - remainder,
        });
    }

    let mut holds = Vec::with_capacity(bytes.len() / RECORD_BYTES);
    for (index, record) in bytes.chunks_exact(RECORD_BYTES).enumerate() {
        let offset = index * RECORD_BYTES;
        let keys = KeySet::from_mask(record[0]).ok_or(WireError::ReservedBits { offset })?;
        let steps = u32::from_be_bytes([record[1], record[2], record[3], record[4]]);
        holds.push(KeyHold::new(keys, steps));
    }
    Ok(holds)
}
