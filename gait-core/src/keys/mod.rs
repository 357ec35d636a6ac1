//! Key channel catalog shared by the scheduling core and host tooling.
//!
//! The rig is driven by four boolean key channels. Which joints each key
//! torques is fixed by the physics model, so the catalog here is compile-time
//! data; the scheduling core itself treats a [`KeySet`] as an opaque bit
//! vector and never inspects the rig mapping.

use core::fmt::{self, Write as _};

/// Number of key channels exposed by the rig.
pub const KEY_COUNT: usize = 4;

/// Identifier for the logical key channels.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyId {
    Q,
    W,
    O,
    P,
}

impl KeyId {
    /// Deterministic index for lookups into [`ALL_KEYS`].
    #[must_use]
    pub const fn as_index(self) -> usize {
        match self {
            KeyId::Q => 0,
            KeyId::W => 1,
            KeyId::O => 2,
            KeyId::P => 3,
        }
    }

    /// Attempts to construct a [`KeyId`] from a raw index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(KeyId::Q),
            1 => Some(KeyId::W),
            2 => Some(KeyId::O),
            3 => Some(KeyId::P),
            _ => None,
        }
    }

    /// Lowercase letter used in plan text and status lines.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            KeyId::Q => 'q',
            KeyId::W => 'w',
            KeyId::O => 'o',
            KeyId::P => 'p',
        }
    }

    /// Attempts to construct a [`KeyId`] from its letter (either case).
    #[must_use]
    pub const fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'q' | 'Q' => Some(KeyId::Q),
            'w' | 'W' => Some(KeyId::W),
            'o' | 'O' => Some(KeyId::O),
            'p' | 'P' => Some(KeyId::P),
            _ => None,
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(key_by_id(*self).name)
    }
}

/// Metadata describing what a key channel torques on the rig.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyLine {
    pub id: KeyId,
    pub name: &'static str,
    pub joints: &'static str,
    pub swing: &'static str,
}

impl KeyLine {
    pub const fn new(
        id: KeyId,
        name: &'static str,
        joints: &'static str,
        swing: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            joints,
            swing,
        }
    }
}

/// Compile-time catalog of every key channel.
pub const ALL_KEYS: [KeyLine; KEY_COUNT] = [
    KeyLine::new(KeyId::Q, "Q", "hips+shoulders", "left-thigh-forward"),
    KeyLine::new(KeyId::W, "W", "hips+shoulders", "right-thigh-forward"),
    KeyLine::new(KeyId::O, "O", "knees", "right-calf-forward"),
    KeyLine::new(KeyId::P, "P", "knees", "left-calf-forward"),
];

/// Retrieve key metadata by identifier.
#[must_use]
pub const fn key_by_id(id: KeyId) -> KeyLine {
    ALL_KEYS[id.as_index()]
}

/// Errors produced when building a [`KeySet`] from a dynamically sized slice.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct KeyWidthError {
    /// Number of channels the caller supplied.
    pub given: usize,
}

impl fmt::Display for KeyWidthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a key set carries exactly {KEY_COUNT} channels, got {}",
            self.given
        )
    }
}

/// Errors produced when parsing a key set from its textual form.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyParseError {
    /// Input contained no key letters at all.
    Empty,
    /// Input contained a character outside the key alphabet.
    UnknownKey(char),
    /// Input named the same key twice.
    DuplicateKey(char),
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyParseError::Empty => f.write_str("expected key letters or `none`"),
            KeyParseError::UnknownKey(letter) => {
                write!(f, "`{letter}` is not one of the q/w/o/p channels")
            }
            KeyParseError::DuplicateKey(letter) => {
                write!(f, "key `{letter}` listed more than once")
            }
        }
    }
}

/// Fixed-width set of pressed key channels applied for one simulation step.
///
/// The width is part of the type, so a wrong-width set is unrepresentable;
/// dynamic entry points ([`KeySet::from_slice`], [`KeySet::from_labels`],
/// [`KeySet::from_mask`]) report malformed input instead.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct KeySet([bool; KEY_COUNT]);

impl KeySet {
    /// Creates a key set from per-channel pressed flags, ordered as
    /// [`ALL_KEYS`].
    #[must_use]
    pub const fn new(pressed: [bool; KEY_COUNT]) -> Self {
        Self(pressed)
    }

    /// Key set with no channel pressed.
    #[must_use]
    pub const fn none() -> Self {
        Self([false; KEY_COUNT])
    }

    /// Returns a copy of this set with `key` pressed.
    #[must_use]
    pub const fn pressing(self, key: KeyId) -> Self {
        let mut pressed = self.0;
        pressed[key.as_index()] = true;
        Self(pressed)
    }

    /// Builds a key set from a dynamically sized flag slice.
    pub fn from_slice(pressed: &[bool]) -> Result<Self, KeyWidthError> {
        match <[bool; KEY_COUNT]>::try_from(pressed) {
            Ok(flags) => Ok(Self(flags)),
            Err(_) => Err(KeyWidthError {
                given: pressed.len(),
            }),
        }
    }

    /// Parses the textual form used by plan text: a run of key letters
    /// (`"qp"`, `"W"`) or the literal `none`.
    pub fn from_labels(labels: &str) -> Result<Self, KeyParseError> {
        if labels.eq_ignore_ascii_case("none") {
            return Ok(Self::none());
        }
        if labels.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let mut keys = Self::none();
        for letter in labels.chars() {
            let key = KeyId::from_letter(letter).ok_or(KeyParseError::UnknownKey(letter))?;
            if keys.is_pressed(key) {
                return Err(KeyParseError::DuplicateKey(letter));
            }
            keys = keys.pressing(key);
        }
        Ok(keys)
    }

    /// Returns `true` when `key` is pressed in this set.
    #[must_use]
    pub const fn is_pressed(self, key: KeyId) -> bool {
        self.0[key.as_index()]
    }

    /// Returns `true` when no channel is pressed.
    #[must_use]
    pub fn is_idle(self) -> bool {
        self.0 == [false; KEY_COUNT]
    }

    /// Per-channel pressed flags, ordered as [`ALL_KEYS`].
    #[must_use]
    pub const fn as_array(self) -> [bool; KEY_COUNT] {
        self.0
    }

    /// Encodes the set into its 4-bit channel mask.
    #[must_use]
    pub const fn to_mask(self) -> u8 {
        let mut mask = 0u8;
        let mut index = 0;
        while index < KEY_COUNT {
            if self.0[index] {
                mask |= 1 << index;
            }
            index += 1;
        }
        mask
    }

    /// Decodes a 4-bit channel mask. Returns `None` when reserved high bits
    /// are set.
    #[must_use]
    pub const fn from_mask(mask: u8) -> Option<Self> {
        if mask >= 1 << KEY_COUNT {
            return None;
        }

        let mut pressed = [false; KEY_COUNT];
        let mut index = 0;
        while index < KEY_COUNT {
            pressed[index] = mask & (1 << index) != 0;
            index += 1;
        }
        Some(Self(pressed))
    }
}

impl fmt::Display for KeySet {
    /// Renders the set as one column per channel (`qw--`, `---p`, `----`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &ALL_KEYS {
            let glyph = if self.is_pressed(line.id) {
                line.id.letter()
            } else {
                '-'
            };
            f.write_char(glyph)?;
        }
        Ok(())
    }
}
