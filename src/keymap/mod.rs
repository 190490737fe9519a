// Key binding table - physical keyboard keys mapped to notes
//
// The mapping must be a bijection: one key per note, one note per key.
// Violations are configuration errors and are rejected when the layout is
// built, so lookups during play never fail in surprising ways.

use crate::theory::{self, NoteId};

/// QWERTY home-row layout: naturals on the letter row, accidentals on the
/// row above, matching the keyboard's own white/black geometry.
pub const QWERTY_LAYOUT: &[(char, &str)] = &[
    ('a', "C4"),
    ('w', "C#4"),
    ('s', "D4"),
    ('e', "D#4"),
    ('d', "E4"),
    ('f', "F4"),
    ('t', "F#4"),
    ('g', "G4"),
    ('y', "G#4"),
    ('h', "A4"),
    ('u', "A#4"),
    ('j', "B4"),
    ('k', "C5"),
    ('o', "C#5"),
    ('l', "D5"),
];

#[derive(Debug, thiserror::Error)]
pub enum KeymapError {
    #[error("key '{0}' is bound more than once")]
    DuplicateKey(char),

    #[error("note {0} is bound to more than one key")]
    DuplicateNote(String),

    #[error("layout references unknown note {0}")]
    UnknownNote(String),
}

/// One physical key bound to one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: char,
    pub note: NoteId,
}

/// Validated key-to-note mapping, immutable once built.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<KeyBinding>,
}

impl Keymap {
    /// Build a keymap from `(key, note name)` pairs, checking the bijection
    /// and that every note name exists in the note table.
    pub fn new(layout: &[(char, &str)]) -> Result<Self, KeymapError> {
        let mut bindings: Vec<KeyBinding> = Vec::with_capacity(layout.len());

        for &(key, name) in layout {
            let note = theory::find(name).ok_or_else(|| KeymapError::UnknownNote(name.to_string()))?;

            if bindings.iter().any(|b| b.key == key) {
                return Err(KeymapError::DuplicateKey(key));
            }
            if bindings.iter().any(|b| b.note == note.name) {
                return Err(KeymapError::DuplicateNote(name.to_string()));
            }

            bindings.push(KeyBinding {
                key,
                note: note.name,
            });
        }

        Ok(Self { bindings })
    }

    /// Build the keymap named by the user's layout preference. Only the
    /// QWERTY layout ships today; unknown names fall back to it.
    pub fn for_layout(name: &str) -> Result<Self, KeymapError> {
        match name {
            "qwerty" => Self::new(QWERTY_LAYOUT),
            other => {
                log::debug!("unknown layout {other:?}, using qwerty");
                Self::new(QWERTY_LAYOUT)
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The note a physical key triggers, if the key is bound.
    pub fn note_for(&self, key: char) -> Option<NoteId> {
        self.bindings.iter().find(|b| b.key == key).map(|b| b.note)
    }

    /// The physical key bound to a note; feeds the labels painted on keys.
    pub fn key_for(&self, note: &str) -> Option<char> {
        self.bindings.iter().find(|b| b.note == note).map(|b| b.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qwerty_layout_is_valid() {
        let keymap = Keymap::new(QWERTY_LAYOUT).expect("shipped layout must validate");
        assert_eq!(keymap.len(), 15);
    }

    #[test]
    fn test_lookup_both_ways() {
        let keymap = Keymap::new(QWERTY_LAYOUT).unwrap();
        assert_eq!(keymap.note_for('a'), Some("C4"));
        assert_eq!(keymap.note_for('w'), Some("C#4"));
        assert_eq!(keymap.key_for("A4"), Some('h'));
        assert_eq!(keymap.note_for('z'), None);
        assert_eq!(keymap.key_for("Z9"), None);
    }

    #[test]
    fn test_round_trip() {
        let keymap = Keymap::new(QWERTY_LAYOUT).unwrap();
        for binding in keymap.iter() {
            assert_eq!(keymap.note_for(binding.key), Some(binding.note));
            assert_eq!(keymap.key_for(binding.note), Some(binding.key));
        }
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = Keymap::new(&[('a', "C4"), ('a', "D4")]);
        assert!(matches!(result, Err(KeymapError::DuplicateKey('a'))));
    }

    #[test]
    fn test_duplicate_note_rejected() {
        let result = Keymap::new(&[('a', "C4"), ('s', "C4")]);
        assert!(matches!(result, Err(KeymapError::DuplicateNote(_))));
    }

    #[test]
    fn test_unknown_note_rejected() {
        let result = Keymap::new(&[('a', "H7")]);
        assert!(matches!(result, Err(KeymapError::UnknownNote(_))));
    }

    #[test]
    fn test_unknown_layout_falls_back_to_qwerty() {
        let keymap = Keymap::for_layout("dvorak").unwrap();
        assert_eq!(keymap.note_for('a'), Some("C4"));
    }
}
