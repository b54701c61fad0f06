//! HTTP client for the meeting-room booking admin API
//!
//! [`ApiClient`] wraps every backend call with bearer-token authentication,
//! transparent token refresh and a single replay of requests that failed
//! with an expired token. User-facing side effects go through the
//! [`Notifier`] and [`NavigationController`] seams.

pub mod client;
pub mod navigation;
pub mod notify;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder, ApiRequest, ClientError};
pub use navigation::{LoggingNavigator, NavigationController, Navigator, RedirectHandle};
pub use notify::{NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
