//! Transient user notifications.

/// Fire-and-forget sink for short messages shown to the user.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Writes notifications to stderr, next to the terminal feed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn error(&self, message: &str) {
        tracing::info!("Notifying user: {}", message);
        eprintln!("✗ {}", message);
    }
}

/// Keeps every notification in memory, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    messages: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn error(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
