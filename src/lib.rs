// Virtual Piano - library exports for the binary and the tests

pub mod audio;
pub mod engine;
pub mod keymap;
pub mod messaging;
pub mod settings;
pub mod theory;
pub mod ui;

// Re-export commonly used types for convenience
pub use audio::backend::{AudioBackend, AudioError, AudioSink};
pub use engine::PerformanceEngine;
pub use engine::history::{HISTORY_CAPACITY, PlayHistory};
pub use engine::sink::{NullSink, SinkError, VoiceSink};
pub use engine::voice::{Voice, Waveform};
pub use keymap::{Keymap, KeymapError};
pub use messaging::channels::{create_notification_channel, create_voice_channel};
pub use settings::{Settings, SettingsStore};
pub use theory::{Note, NoteId, NoteKind};
