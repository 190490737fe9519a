use std::sync::{Arc, Mutex};

use log::{info, warn};

use virtual_piano::audio::backend::{AudioBackend, AudioSink};
use virtual_piano::engine::PerformanceEngine;
use virtual_piano::engine::sink::{NullSink, VoiceSink};
use virtual_piano::keymap::Keymap;
use virtual_piano::messaging::channels::{create_notification_channel, create_voice_channel};
use virtual_piano::messaging::notification::Notification;
use virtual_piano::settings::SettingsStore;
use virtual_piano::ui::app::PianoApp;

// Ring buffer capacities. Voices are produced by human key presses, a
// handful per frame at the very most; notifications are rarer still. Both
// sides drop on overflow rather than block.
const VOICE_RINGBUFFER_CAPACITY: usize = 64;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 64;

fn main() {
    env_logger::init();

    // Hydrate preferences; a missing store just means defaults
    let store = match SettingsStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            warn!("settings unavailable: {err}");
            None
        }
    };
    let settings = store.as_ref().map(|s| s.load()).unwrap_or_default();

    // An invalid key layout is a configuration error, fatal at startup
    let keymap = match Keymap::for_layout(&settings.layout) {
        Ok(keymap) => keymap,
        Err(err) => {
            eprintln!("ERROR: invalid key layout: {err}");
            return;
        }
    };

    let (voice_tx, voice_rx) = create_voice_channel(VOICE_RINGBUFFER_CAPACITY);
    let (notification_tx, notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);
    let notification_tx = Arc::new(Mutex::new(notification_tx));

    // Audio is optional: without a device the app runs, keys light up and
    // history updates, there is just no sound.
    let (sink, _backend): (Box<dyn VoiceSink>, Option<AudioBackend>) =
        match AudioBackend::new(voice_rx, notification_tx.clone()) {
            Ok(backend) => {
                info!("audio running at {} Hz", backend.sample_rate());
                (Box::new(AudioSink::new(voice_tx)), Some(backend))
            }
            Err(err) => {
                warn!("audio unavailable, running silent: {err}");
                if let Ok(mut tx) = notification_tx.try_lock() {
                    let notif = Notification::warning(format!("No audio: {err}"));
                    let _ = ringbuf::traits::Producer::try_push(&mut *tx, notif);
                }
                (Box::new(NullSink), None)
            }
        };

    let mut engine = PerformanceEngine::new(sink);
    engine.set_volume(settings.volume);
    engine.set_muted(settings.muted);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([820.0, 480.0])
            .with_title("Virtual Piano"),
        ..Default::default()
    };

    let _ = eframe::run_native(
        "Virtual Piano",
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(PianoApp::new(
                engine,
                keymap,
                store,
                settings,
                notification_rx,
            )))
        }),
    );
}
