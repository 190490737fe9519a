// Note table - names, frequencies and key colors for the playing range
//
// The table is fixed at compile time: two octaves around middle C, equal
// temperament with A4 = 440 Hz. Frequencies are stored rather than computed
// so a lookup never involves float math.

/// A note name from the table. Names are `'static` because every valid note
/// comes out of [`NOTES`]; sets and history buffers store these directly.
pub type NoteId = &'static str;

/// White key or black key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteKind {
    Natural,
    Accidental,
}

/// One entry of the frequency table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub name: NoteId,
    pub frequency: f32,
    pub kind: NoteKind,
}

/// Frequency used when a name misses the table at voice-build time.
/// Presses are validated against the same table first, so this only guards
/// against the tables drifting apart.
pub const FALLBACK_FREQUENCY: f32 = 440.0;

const fn natural(name: &'static str, frequency: f32) -> Note {
    Note {
        name,
        frequency,
        kind: NoteKind::Natural,
    }
}

const fn accidental(name: &'static str, frequency: f32) -> Note {
    Note {
        name,
        frequency,
        kind: NoteKind::Accidental,
    }
}

/// The playing range, low to high: C4 to D5.
pub const NOTES: [Note; 15] = [
    natural("C4", 261.63),
    accidental("C#4", 277.18),
    natural("D4", 293.66),
    accidental("D#4", 311.13),
    natural("E4", 329.63),
    natural("F4", 349.23),
    accidental("F#4", 369.99),
    natural("G4", 392.00),
    accidental("G#4", 415.30),
    natural("A4", 440.00),
    accidental("A#4", 466.16),
    natural("B4", 493.88),
    natural("C5", 523.25),
    accidental("C#5", 554.37),
    natural("D5", 587.33),
];

/// Look up a note by name. The table has 15 entries, a linear scan is fine.
pub fn find(name: &str) -> Option<&'static Note> {
    NOTES.iter().find(|n| n.name == name)
}

/// Frequency in Hz for a note name, if the name is in the table.
pub fn frequency_of(name: &str) -> Option<f32> {
    find(name).map(|n| n.frequency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_is_concert_pitch() {
        assert_eq!(frequency_of("A4"), Some(440.0));
    }

    #[test]
    fn test_middle_c_frequency() {
        assert_eq!(frequency_of("C4"), Some(261.63));
    }

    #[test]
    fn test_table_is_ordered_low_to_high() {
        for pair in NOTES.windows(2) {
            assert!(
                pair[0].frequency < pair[1].frequency,
                "{} should be below {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn test_sharps_are_accidentals() {
        for note in NOTES.iter() {
            let expected = if note.name.contains('#') {
                NoteKind::Accidental
            } else {
                NoteKind::Natural
            };
            assert_eq!(note.kind, expected, "wrong kind for {}", note.name);
        }
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert!(find("Z9").is_none());
        assert!(find("c4").is_none()); // names are case sensitive
        assert!(frequency_of("").is_none());
    }
}
