//! Non-blocking user notifications

use std::sync::Mutex;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Surface short messages to the user without waiting for acknowledgement
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, message: &str);

    fn info(&self, message: &str) {
        self.notify(NoticeLevel::Info, message);
    }

    fn success(&self, message: &str) {
        self.notify(NoticeLevel::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NoticeLevel::Error, message);
    }
}

/// Emits notifications as tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!(?level, "{message}"),
            NoticeLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Keeps every notification in memory, in order
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|(level, _)| *level == NoticeLevel::Error)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((level, message.to_string()));
        }
    }
}
