// One-shot voice rendering
//
// Every voice the engine emits is percussive: linear attack to its peak
// gain, exponential decay to the silence floor, then gone. There is no
// note-off input anywhere in this file; a voice that started will play out
// no matter what the keyboard does. The pool mixes all live voices and
// reclaims slots as they finish.

use std::time::Instant;

use crate::engine::voice::{SILENCE_FLOOR, Voice};

/// Upper bound on simultaneously decaying voices. With a one second decay
/// this takes deliberately fast playing to reach; beyond it the oldest
/// voice is stolen.
pub const MAX_VOICES: usize = 32;

/// Phase-accumulator triangle oscillator, the one shape every voice uses.
struct Oscillator {
    phase: f32,
    phase_increment: f32,
}

impl Oscillator {
    fn new(frequency: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: frequency / sample_rate,
        }
    }

    fn next_sample(&mut self) -> f32 {
        let sample = if self.phase < 0.5 {
            (self.phase * 4.0) - 1.0
        } else {
            3.0 - (self.phase * 4.0)
        };

        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        sample
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Attack,
    Decay,
    Done,
}

/// A voice being rendered: oscillator plus envelope state.
pub struct OneShotVoice {
    osc: Oscillator,
    stage: Stage,
    gain: f32,
    peak_gain: f32,
    /// Linear gain increment per sample during the attack.
    attack_step: f32,
    attack_samples_left: u32,
    /// Per-sample multiplier that walks the gain down to the silence floor.
    decay_factor: f32,
    decay_samples_left: u32,
    started: Instant,
}

impl OneShotVoice {
    pub fn start(voice: &Voice, sample_rate: f32) -> Self {
        let attack_samples = (voice.attack.as_secs_f32() * sample_rate).max(1.0);
        let decay_samples = (voice.decay.as_secs_f32() * sample_rate).max(1.0);
        let peak_gain = voice.peak_gain;

        // A voice quieter than the silence floor would decay "upward";
        // treat it as already finished.
        let stage = if peak_gain <= SILENCE_FLOOR {
            Stage::Done
        } else {
            Stage::Attack
        };

        let decay_factor = if peak_gain > SILENCE_FLOOR {
            (SILENCE_FLOOR / peak_gain).powf(1.0 / decay_samples)
        } else {
            0.0
        };

        Self {
            osc: Oscillator::new(voice.frequency, sample_rate),
            stage,
            gain: 0.0,
            peak_gain,
            attack_step: peak_gain / attack_samples,
            attack_samples_left: attack_samples as u32,
            decay_factor,
            decay_samples_left: decay_samples as u32,
            started: voice.triggered_at,
        }
    }

    pub fn next_sample(&mut self) -> f32 {
        if self.stage == Stage::Done {
            return 0.0;
        }

        let out = self.osc.next_sample() * self.gain;

        match self.stage {
            Stage::Attack => {
                self.attack_samples_left -= 1;
                if self.attack_samples_left == 0 {
                    self.gain = self.peak_gain;
                    self.stage = Stage::Decay;
                } else {
                    self.gain += self.attack_step;
                }
            }
            Stage::Decay => {
                self.gain *= self.decay_factor;
                self.decay_samples_left -= 1;
                if self.decay_samples_left == 0 || self.gain <= SILENCE_FLOOR {
                    self.gain = 0.0;
                    self.stage = Stage::Done;
                }
            }
            Stage::Done => {}
        }

        out
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    /// Trigger timestamp carried over from the voice descriptor; the pool
    /// steals the earliest one when it is full.
    pub fn started(&self) -> Instant {
        self.started
    }
}

/// Fixed-capacity mixer for live voices. Lives inside the audio callback,
/// so nothing here allocates after construction.
pub struct VoicePool {
    voices: Vec<OneShotVoice>,
    sample_rate: f32,
}

impl VoicePool {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            voices: Vec::with_capacity(MAX_VOICES),
            sample_rate,
        }
    }

    /// Start rendering a voice, stealing the oldest one if the pool is full.
    pub fn trigger(&mut self, voice: &Voice) {
        let rendered = OneShotVoice::start(voice, self.sample_rate);

        if self.voices.len() < MAX_VOICES {
            self.voices.push(rendered);
        } else if let Some(oldest) = self.voices.iter_mut().min_by_key(|v| v.started()) {
            *oldest = rendered;
        }
    }

    /// Mix of all live voices for one sample; finished voices are reclaimed
    /// in place.
    pub fn next_sample(&mut self) -> f32 {
        let mut mix = 0.0;
        let mut i = 0;
        while i < self.voices.len() {
            mix += self.voices[i].next_sample();
            if self.voices[i].is_done() {
                self.voices.swap_remove(i);
            } else {
                i += 1;
            }
        }
        mix
    }

    pub fn live_count(&self) -> usize {
        self.voices.len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const SAMPLE_RATE: f32 = 48000.0;

    fn voice(volume: f32) -> Voice {
        Voice::for_note("A4", volume)
    }

    #[test]
    fn test_attack_reaches_peak_on_time() {
        let mut v = OneShotVoice::start(&voice(1.0), SAMPLE_RATE);

        let attack_samples = (0.010 * SAMPLE_RATE) as usize;
        for _ in 0..attack_samples {
            v.next_sample();
        }

        assert_eq!(v.stage, Stage::Decay);
        assert!((v.gain - 0.3).abs() < 1e-3, "gain at end of attack: {}", v.gain);
    }

    #[test]
    fn test_decay_is_monotonic() {
        let mut v = OneShotVoice::start(&voice(1.0), SAMPLE_RATE);

        // Skip the attack
        for _ in 0..(0.010 * SAMPLE_RATE) as usize {
            v.next_sample();
        }

        let mut previous = v.gain;
        for _ in 0..10_000 {
            v.next_sample();
            assert!(v.gain <= previous, "gain rose during decay");
            previous = v.gain;
        }
    }

    #[test]
    fn test_voice_self_terminates() {
        let mut v = OneShotVoice::start(&voice(1.0), SAMPLE_RATE);

        // 1010 ms of envelope plus a little slack
        let lifetime_samples = (1.05 * SAMPLE_RATE) as usize;
        for _ in 0..lifetime_samples {
            v.next_sample();
        }

        assert!(v.is_done());
        // A finished voice stays silent forever
        for _ in 0..100 {
            assert_eq!(v.next_sample(), 0.0);
        }
    }

    #[test]
    fn test_zero_volume_voice_is_born_finished() {
        let mut v = OneShotVoice::start(&voice(0.0), SAMPLE_RATE);
        assert!(v.is_done());
        assert_eq!(v.next_sample(), 0.0);
    }

    #[test]
    fn test_output_is_finite_and_bounded() {
        let mut v = OneShotVoice::start(&voice(1.0), SAMPLE_RATE);
        for _ in 0..60_000 {
            let sample = v.next_sample();
            assert!(sample.is_finite());
            assert!(sample.abs() <= 0.3 + 1e-3, "sample beyond peak gain: {sample}");
        }
    }

    #[test]
    fn test_idle_pool_is_silent() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        assert_eq!(pool.next_sample(), 0.0);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_pool_reclaims_finished_voices() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        pool.trigger(&voice(1.0));
        assert_eq!(pool.live_count(), 1);

        for _ in 0..(1.05 * SAMPLE_RATE) as usize {
            pool.next_sample();
        }
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_pool_steals_oldest_when_full() {
        let mut pool = VoicePool::new(SAMPLE_RATE);

        let base = Instant::now();
        for i in 0..MAX_VOICES + 1 {
            let mut v = voice(1.0);
            // Spread the trigger timestamps so "oldest" is unambiguous
            v.triggered_at = base + Duration::from_millis(i as u64);
            pool.trigger(&v);
        }

        assert_eq!(pool.live_count(), MAX_VOICES);
        // The very first voice must be the one that was replaced
        let earliest = pool.voices.iter().map(|v| v.started()).min().unwrap();
        assert_eq!(earliest, base + Duration::from_millis(1));
    }

    #[test]
    fn test_overlapping_voices_mix() {
        let mut pool = VoicePool::new(SAMPLE_RATE);
        pool.trigger(&Voice::for_note("C4", 1.0));
        pool.trigger(&Voice::for_note("E4", 1.0));
        pool.trigger(&Voice::for_note("G4", 1.0));
        assert_eq!(pool.live_count(), 3);

        for _ in 0..1000 {
            let sample = pool.next_sample();
            assert!(sample.is_finite());
            assert!(sample.abs() <= 3.0 * 0.3 + 1e-3);
        }
    }
}
