// Voice descriptor - one fire-and-forget sound event
//
// A voice is an immutable value built at press time and handed to the
// synthesis backend. The backend owns it from then on: the engine keeps no
// reference, never cancels it and never retries it. The envelope is
// percussive (short attack, long decay, no sustain), so a voice sounds the
// same whether the key was tapped or held.

use std::time::{Duration, Instant};

use crate::theory::{self, FALLBACK_FREQUENCY, NoteId};

/// The synthesizer's single timbre. The descriptor still names the shape
/// so the backend contract stays explicit, but every voice is a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Triangle,
}

/// Linear gain ramp from silence to the peak.
pub const ATTACK: Duration = Duration::from_millis(10);

/// Exponential gain decay from the peak toward the silence floor.
pub const DECAY: Duration = Duration::from_millis(1000);

/// The master volume is scaled down to this fraction at the peak, leaving
/// headroom when several voices overlap.
pub const PEAK_SCALE: f32 = 0.3;

/// Gain treated as silence. The decay ramps toward it, never to exact zero.
pub const SILENCE_FLOOR: f32 = 0.001;

#[derive(Debug, Clone, Copy)]
pub struct Voice {
    pub note: NoteId,
    pub frequency: f32,
    pub waveform: Waveform,
    pub peak_gain: f32,
    pub attack: Duration,
    pub decay: Duration,
    pub triggered_at: Instant,
}

impl Voice {
    /// Build the voice for a press at the given master volume. Every note
    /// gets the same triangle timbre and the same envelope; only frequency
    /// and peak gain vary.
    pub fn for_note(note: NoteId, volume: f32) -> Self {
        Self {
            note,
            frequency: theory::frequency_of(note).unwrap_or(FALLBACK_FREQUENCY),
            waveform: Waveform::Triangle,
            peak_gain: volume * PEAK_SCALE,
            attack: ATTACK,
            decay: DECAY,
            triggered_at: Instant::now(),
        }
    }

    /// How long the voice sounds, independent of any release.
    pub fn lifetime(&self) -> Duration {
        self.attack + self.decay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_uses_table_frequency() {
        let voice = Voice::for_note("A4", 1.0);
        assert_eq!(voice.frequency, 440.0);
        assert_eq!(voice.note, "A4");
    }

    #[test]
    fn test_voice_timbre_and_envelope_are_fixed() {
        let low = Voice::for_note("C4", 0.2);
        let high = Voice::for_note("D5", 0.9);
        assert_eq!(low.waveform, Waveform::Triangle);
        assert_eq!(high.waveform, Waveform::Triangle);
        assert_eq!(low.attack, high.attack);
        assert_eq!(low.decay, high.decay);
        assert_eq!(low.lifetime(), Duration::from_millis(1010));
    }

    #[test]
    fn test_peak_gain_scales_with_volume() {
        let voice = Voice::for_note("C4", 0.5);
        assert!((voice.peak_gain - 0.15).abs() < 1e-6);

        let silent = Voice::for_note("C4", 0.0);
        assert_eq!(silent.peak_gain, 0.0);
    }

    #[test]
    fn test_unknown_name_falls_back_to_a440() {
        // Presses are validated before a voice is built, so this path only
        // matters if the tables ever drift apart. It must not fail.
        let voice = Voice::for_note("Z9", 1.0);
        assert_eq!(voice.frequency, FALLBACK_FREQUENCY);
    }
}
