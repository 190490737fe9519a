// Piano application - egui presentation layer
//
// Translates both input modalities into engine calls and renders purely
// from engine snapshots. The engine owns all playing state; this file owns
// none beyond what egui needs between frames (which note the pointer is
// holding, pending notifications).

use std::collections::VecDeque;

use eframe::egui;
use log::warn;

use crate::engine::PerformanceEngine;
use crate::keymap::Keymap;
use crate::messaging::channels::NotificationConsumer;
use crate::messaging::notification::{Notification, Severity};
use crate::settings::{Settings, SettingsStore};
use crate::theory::{self, NoteId, NoteKind};

const MAX_PENDING_NOTIFICATIONS: usize = 16;

const WHITE_KEY_SIZE: egui::Vec2 = egui::Vec2::new(46.0, 150.0);
const BLACK_KEY_SIZE: egui::Vec2 = egui::Vec2::new(32.0, 96.0);

pub struct PianoApp {
    engine: PerformanceEngine,
    keymap: Keymap,
    store: Option<SettingsStore>,
    settings: Settings,
    notification_rx: NotificationConsumer,
    notifications: VecDeque<Notification>,
    /// The note currently held by the pointer, if any.
    pointer_note: Option<NoteId>,
}

impl PianoApp {
    pub fn new(
        engine: PerformanceEngine,
        keymap: Keymap,
        store: Option<SettingsStore>,
        settings: Settings,
        notification_rx: NotificationConsumer,
    ) -> Self {
        Self {
            engine,
            keymap,
            store,
            settings,
            notification_rx,
            notifications: VecDeque::new(),
            pointer_note: None,
        }
    }

    /// Write the current volume/mute back through the settings store.
    fn persist_settings(&mut self) {
        self.settings.volume = self.engine.volume();
        self.settings.muted = self.engine.is_muted();

        let Some(store) = &self.store else {
            return;
        };
        if let Err(err) = store.save(&self.settings) {
            warn!("failed to save settings: {err}");
            self.notifications
                .push_back(Notification::warning(format!("Could not save settings: {err}")));
        }
    }

    fn update_notifications(&mut self) {
        while let Some(notif) = ringbuf::traits::Consumer::try_pop(&mut self.notification_rx) {
            self.notifications.push_back(notif);
        }
        while self.notifications.len() > MAX_PENDING_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    /// Physical keyboard modality. egui reports OS key-repeat as repeated
    /// presses; the engine's idempotence absorbs them, so no filtering here.
    fn handle_physical_keys(&mut self, ctx: &egui::Context) {
        for binding in self.keymap.iter() {
            let name = binding.key.to_ascii_uppercase().to_string();
            let Some(key) = egui::Key::from_name(&name) else {
                continue;
            };

            if ctx.input(|i| i.key_pressed(key)) {
                self.engine.press(binding.note);
            }
            if ctx.input(|i| i.key_released(key)) {
                self.engine.release(binding.note);
            }
        }
    }

    fn draw_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let muted = self.engine.is_muted();
            let label = if muted { "Unmute" } else { "Mute" };
            if ui.button(label).clicked() {
                self.engine.set_muted(!muted);
                self.persist_settings();
            }

            let mut volume = self.engine.volume();
            let response = ui.add_enabled(
                !self.engine.is_muted(),
                egui::Slider::new(&mut volume, 0.0..=1.0).text("Volume"),
            );
            if response.changed() {
                self.engine.set_volume(volume);
            }
            if response.drag_stopped() {
                self.persist_settings();
            }

            if ui.button("Clear").clicked() {
                self.engine.clear_history();
            }
        });
    }

    /// Pointer modality. Press follows the key under a held-down pointer,
    /// sliding between keys re-presses; leaving the keyboard entirely while
    /// the button is still down abandons the gesture and releases
    /// everything so no key stays stuck.
    fn draw_keyboard(&mut self, ui: &mut egui::Ui) {
        let pointer_down = ui.input(|i| i.pointer.primary_down());
        let pointer_pos = ui.input(|i| i.pointer.interact_pos());

        let mut down_note: Option<NoteId> = None;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0;

            for note in theory::NOTES.iter() {
                let is_pressed = self.engine.is_pressed(note.name);
                let is_black = note.kind == NoteKind::Accidental;

                let key_hint = self
                    .keymap
                    .key_for(note.name)
                    .map(|k| k.to_ascii_uppercase().to_string())
                    .unwrap_or_default();
                let label = format!("{}\n{}", note.name, key_hint);

                let button = if is_black {
                    egui::Button::new(egui::RichText::new(label).color(egui::Color32::from_gray(200)))
                        .fill(if is_pressed {
                            egui::Color32::from_rgb(100, 100, 255)
                        } else {
                            egui::Color32::from_gray(40)
                        })
                        .min_size(BLACK_KEY_SIZE)
                } else {
                    egui::Button::new(egui::RichText::new(label).color(egui::Color32::from_gray(80)))
                        .fill(if is_pressed {
                            egui::Color32::from_rgb(150, 150, 255)
                        } else {
                            egui::Color32::WHITE
                        })
                        .stroke(egui::Stroke::new(1.0, egui::Color32::BLACK))
                        .min_size(WHITE_KEY_SIZE)
                };

                let response = ui.add(button);

                if pointer_down {
                    if let Some(pos) = pointer_pos {
                        if response.rect.contains(pos) {
                            down_note = Some(note.name);
                        }
                    }
                }
            }
        });

        match (self.pointer_note, down_note) {
            (None, Some(current)) => self.engine.press(current),
            (Some(previous), Some(current)) if previous != current => {
                // Slid from one key onto another
                self.engine.release(previous);
                self.engine.press(current);
            }
            (Some(previous), None) => {
                if pointer_down {
                    // Still held but no longer over any key: the gesture was
                    // abandoned without a clean up event
                    self.engine.release_all();
                } else {
                    self.engine.release(previous);
                }
            }
            _ => {}
        }
        self.pointer_note = down_note;
    }

    fn draw_bindings(&self, ui: &mut egui::Ui) {
        ui.label("Keyboard mapping:");
        ui.horizontal_wrapped(|ui| {
            for binding in self.keymap.iter() {
                ui.small(format!(
                    "{} = {}",
                    binding.key.to_ascii_uppercase(),
                    binding.note
                ));
            }
        });
    }

    fn draw_history(&mut self, ui: &mut egui::Ui) {
        ui.heading("Recently played");
        if self.engine.history().is_empty() {
            ui.weak("Nothing yet - play something");
            return;
        }
        ui.horizontal_wrapped(|ui| {
            for note in self.engine.history().iter() {
                ui.small(note);
            }
        });
    }

    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.separator();
        ui.horizontal(|ui| {
            let visible: Vec<&Notification> = self
                .notifications
                .iter()
                .filter(|n| n.is_visible())
                .collect();

            if visible.is_empty() {
                ui.label("Ready");
                return;
            }

            for notification in visible {
                let (icon, color) = match notification.severity {
                    Severity::Info => ("i", egui::Color32::from_rgb(100, 150, 255)),
                    Severity::Warning => ("!", egui::Color32::from_rgb(255, 165, 0)),
                    Severity::Error => ("x", egui::Color32::RED),
                };

                ui.colored_label(color, icon);
                ui.colored_label(color, &notification.message);
                ui.add_space(10.0);
            }
        });
    }
}

impl eframe::App for PianoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Repaint continuously so physical-key events are captured even
        // when the pointer is idle
        ctx.request_repaint();

        self.update_notifications();
        self.handle_physical_keys(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Virtual Piano");
            ui.label("Play with the pointer or the computer keyboard");
            ui.add_space(10.0);

            self.draw_controls(ui);
            ui.add_space(10.0);

            self.draw_keyboard(ui);
            ui.add_space(6.0);
            self.draw_bindings(ui);

            ui.add_space(12.0);
            ui.separator();
            self.draw_history(ui);

            self.draw_status_bar(ui);
        });
    }
}
