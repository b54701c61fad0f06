//! Terminal implementations of the notification and navigation seams

use roombook_core::Route;
use roombook_http::notify::NoticeLevel;
use roombook_http::{Navigator, Notifier};

/// Prints notices to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        let tag = match level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        eprintln!("[{tag}] {message}");
    }
}

/// Tells the operator which view the web console would have switched to
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        if route == Route::Login {
            eprintln!("Session expired, run `roombook login` to sign in again");
        } else {
            tracing::debug!(%route, "navigated");
        }
    }
}
