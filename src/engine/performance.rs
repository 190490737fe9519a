// Performance engine - the state machine behind the keyboard
//
// Owns the pressed set, the play history and the volume state. Input
// handlers (pointer and physical keys) call press/release; the engine
// resolves names against the note table, keeps the state consistent and
// emits voices into the sink. Everything runs synchronously on the calling
// thread; the sink is the only boundary to the audio side.

use std::collections::HashSet;

use log::{debug, warn};

use crate::theory::{self, NoteId};

use super::history::PlayHistory;
use super::sink::VoiceSink;
use super::voice::Voice;

pub struct PerformanceEngine {
    pressed: HashSet<NoteId>,
    history: PlayHistory,
    volume: f32,
    muted: bool,
    sink: Box<dyn VoiceSink>,
}

impl PerformanceEngine {
    /// One engine per session, with the synthesis backend injected behind
    /// the sink seam.
    pub fn new(sink: Box<dyn VoiceSink>) -> Self {
        Self {
            pressed: HashSet::new(),
            history: PlayHistory::new(),
            volume: 0.5,
            muted: false,
            sink,
        }
    }

    /// Press a note by name.
    ///
    /// A name missing from the note table is ignored entirely. A note that
    /// is already pressed is a no-op: OS key-repeat and the second input
    /// source landing on the same note must not double-trigger. Only a real
    /// press transition records history and emits a voice.
    pub fn press(&mut self, name: &str) {
        let Some(note) = theory::find(name) else {
            debug!("press ignored, unknown note {name:?}");
            return;
        };

        if !self.pressed.insert(note.name) {
            return;
        }

        self.history.record(note.name);

        if self.muted {
            return;
        }

        // Volume and mute are read here and baked into the voice; later
        // changes never reach voices already emitted.
        let voice = Voice::for_note(note.name, self.volume);
        if let Err(err) = self.sink.play(voice) {
            // The press is already committed; only the tone is lost.
            warn!("voice for {} dropped: {err}", note.name);
        }
    }

    /// Release a note by name. Safe to call for notes that are not pressed.
    /// Voices already emitted keep decaying on their own.
    pub fn release(&mut self, name: &str) {
        self.pressed.remove(name);
    }

    /// Empty the pressed set. The presentation layer calls this when a
    /// pointer gesture is abandoned without a clean up event, so no key
    /// stays stuck visually or logically. In-flight voices are untouched.
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub fn set_volume(&mut self, gain: f32) {
        self.volume = gain.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn is_pressed(&self, name: &str) -> bool {
        self.pressed.contains(name)
    }

    pub fn pressed(&self) -> &HashSet<NoteId> {
        &self.pressed
    }

    pub fn history(&self) -> &PlayHistory {
        &self.history
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }
}
