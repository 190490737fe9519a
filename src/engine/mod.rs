// Performance engine - pressed-note tracking, play history, voice emission

pub mod history;
pub mod performance;
pub mod sink;
pub mod voice;

pub use performance::PerformanceEngine;
