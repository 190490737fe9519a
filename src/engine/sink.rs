// Voice sink - the seam between the engine and the synthesis backend
//
// The engine pushes voices through this trait and nothing else. A failing
// sink loses the tone, never the press: callers log the error and move on.

use super::voice::Voice;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("voice queue is full")]
    QueueFull,
}

pub trait VoiceSink {
    /// Hand a voice to the backend. Fire-and-forget: success means the
    /// backend accepted the voice, not that sound came out.
    fn play(&mut self, voice: Voice) -> Result<(), SinkError>;
}

/// Sink used when no audio device is available. Accepts every voice and
/// discards it, keeping the rest of the application fully functional.
pub struct NullSink;

impl VoiceSink for NullSink {
    fn play(&mut self, _voice: Voice) -> Result<(), SinkError> {
        Ok(())
    }
}
