// UI module - egui presentation layer

pub mod app;
