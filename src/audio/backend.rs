// Synthesis backend - CPAL output stream and the engine-facing sink
//
// The backend is acquired once at startup and may legitimately not exist
// (no output device, unsupported format). Everything upstream treats that
// as "the app runs silent", never as a reason to crash: main falls back to
// a NullSink and the stream error callback reports through notifications.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use log::info;

use crate::audio::player::VoicePool;
use crate::engine::sink::{SinkError, VoiceSink};
use crate::engine::voice::Voice;
use crate::messaging::channels::{NotificationProducer, VoiceConsumer, VoiceProducer};
use crate::messaging::notification::Notification;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("failed to read the output configuration: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),

    #[error("unsupported sample format: {0:?}")]
    UnsupportedFormat(SampleFormat),

    #[error("failed to build the output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start the output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Engine-facing handle that feeds the audio thread. Pushing never blocks;
/// a full ring buffer drops the voice and reports it.
pub struct AudioSink {
    tx: VoiceProducer,
}

impl AudioSink {
    pub fn new(tx: VoiceProducer) -> Self {
        Self { tx }
    }
}

impl VoiceSink for AudioSink {
    fn play(&mut self, voice: Voice) -> Result<(), SinkError> {
        ringbuf::traits::Producer::try_push(&mut self.tx, voice).map_err(|_| SinkError::QueueFull)
    }
}

pub struct AudioBackend {
    _device: Device,
    _stream: Stream,
    sample_rate: f32,
}

impl AudioBackend {
    pub fn new(
        voices: VoiceConsumer,
        notifications: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        info!(
            "audio device: {}",
            device.name().unwrap_or_else(|_| "unknown".to_string())
        );

        let supported_config = device.default_output_config()?;
        let sample_format = supported_config.sample_format();
        let sample_rate = supported_config.sample_rate().0 as f32;
        let channels = supported_config.channels() as usize;
        let config: StreamConfig = supported_config.into();

        // Build the stream matching the device's native sample format; the
        // rendering is f32 throughout and converted on write.
        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &config,
                channels,
                sample_rate,
                voices,
                notifications.clone(),
            ),
            SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &config,
                channels,
                sample_rate,
                voices,
                notifications.clone(),
            ),
            SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &config,
                channels,
                sample_rate,
                voices,
                notifications.clone(),
            ),
            other => return Err(AudioError::UnsupportedFormat(other)),
        }?;

        stream.play()?;

        info!("audio backend started: {sample_rate} Hz, {channels} channels");

        if let Ok(mut tx) = notifications.try_lock() {
            let notif = Notification::info(format!("Audio connected: {sample_rate} Hz"));
            let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
        }

        Ok(Self {
            _device: device,
            _stream: stream,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn build_stream<T>(
        device: &Device,
        config: &StreamConfig,
        channels: usize,
        sample_rate: f32,
        mut voices: VoiceConsumer,
        notifications: Arc<Mutex<NotificationProducer>>,
    ) -> Result<Stream, AudioError>
    where
        T: SizedSample + FromSample<f32> + Send + 'static,
    {
        // The pool and the consumer are owned by the callback; no sharing,
        // no locks on the real-time path.
        let mut pool = VoicePool::new(sample_rate);

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Real-time zone: no allocations, no I/O, no locks

                while let Some(voice) = ringbuf::traits::Consumer::try_pop(&mut voices) {
                    pool.trigger(&voice);
                }

                for frame in data.chunks_mut(channels) {
                    let mut sample = pool.next_sample();
                    sample = flush_denormals_to_zero(sample);
                    sample = soft_clip(sample);

                    // Mono render written to every channel
                    for channel_sample in frame.iter_mut() {
                        *channel_sample = Sample::from_sample::<f32>(sample);
                    }
                }
            },
            move |err| {
                // Runs outside the audio callback, I/O is fine here
                log::error!("audio stream error: {err}");

                if let Ok(mut tx) = notifications.try_lock() {
                    let notif = Notification::error(format!("Audio stream error: {err}"));
                    let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
                }
            },
            None,
        )?;

        Ok(stream)
    }
}

/// Denormal floats cost real CPU on some chips; treat them as silence.
#[inline]
fn flush_denormals_to_zero(x: f32) -> f32 {
    if x.abs() < 1e-15 { 0.0 } else { x }
}

/// Keep the final mix inside [-1, 1] without hard edges.
#[inline]
fn soft_clip(x: f32) -> f32 {
    x.tanh()
}
