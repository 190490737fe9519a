// Notifications - status-bar reports from the audio and settings layers
//
// The audio callback cannot log or touch the UI, so stream faults travel
// through the notification ring buffer; the settings store reports save
// failures the same way. The status bar shows each notification until it
// ages past the display window. Severity only picks the color; the message
// says which subsystem raised it.

use std::time::{Duration, Instant};

/// How long a notification stays visible in the status bar.
pub const DISPLAY_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
    pub raised_at: Instant,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            raised_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Still young enough for the status bar.
    pub fn is_visible(&self) -> bool {
        self.raised_at.elapsed() < DISPLAY_WINDOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_creation() {
        let notif = Notification::error("Audio stream error: device lost");

        assert_eq!(notif.severity, Severity::Error);
        assert_eq!(notif.message, "Audio stream error: device lost");
    }

    #[test]
    fn test_severity_helpers() {
        assert_eq!(Notification::info("connected").severity, Severity::Info);
        assert_eq!(Notification::warning("save failed").severity, Severity::Warning);
        assert_eq!(Notification::error("boom").severity, Severity::Error);
    }

    #[test]
    fn test_fresh_notification_is_visible() {
        let notif = Notification::info("Audio connected: 48000 Hz");
        assert!(notif.is_visible());
    }

    #[test]
    fn test_notification_ages_out() {
        let mut notif = Notification::warning("No audio");
        notif.raised_at = Instant::now()
            .checked_sub(DISPLAY_WINDOW + Duration::from_millis(1))
            .unwrap();
        assert!(!notif.is_visible());
    }
}
