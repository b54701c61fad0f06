//! Shared fixtures for the client integration tests

#![allow(dead_code)]

use roombook_core::{Route, Session, TokenPair};
use roombook_http::{ApiClient, NavigationController, Navigator, RecordingNotifier};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const REFRESH_PATH: &str = "/user/admin/refresh";
pub const REDIRECT_DELAY: Duration = Duration::from_millis(20);

/// Navigator that remembers every route it was sent to
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub struct Harness {
    pub client: ApiClient,
    pub session: Session,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

pub fn harness(base_url: &str) -> Harness {
    harness_with_delay(base_url, REDIRECT_DELAY)
}

pub fn harness_with_delay(base_url: &str, redirect_delay: Duration) -> Harness {
    let session = Session::in_memory();
    let notifier = Arc::new(RecordingNotifier::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let navigation = Arc::new(
        NavigationController::new(navigator.clone()).with_session(session.clone()),
    );

    let client = ApiClient::builder()
        .base_url(base_url)
        .timeout(Duration::from_secs(5))
        .refresh_path(REFRESH_PATH)
        .redirect_delay(redirect_delay)
        .session(session.clone())
        .notifier(notifier.clone())
        .navigation(navigation)
        .build()
        .unwrap();

    Harness {
        client,
        session,
        notifier,
        navigator,
    }
}

pub fn logged_in(harness: &Harness, access: &str, refresh: &str) {
    harness
        .session
        .store_tokens(&TokenPair {
            access_token: access.into(),
            refresh_token: refresh.into(),
        })
        .unwrap();
}

pub fn ok(data: Value) -> Value {
    json!({ "code": 200, "message": "success", "data": data })
}

pub fn fail(code: i64, data: &str) -> Value {
    json!({ "code": code, "message": "fail", "data": data })
}

pub fn token_pair(access: &str, refresh: &str) -> Value {
    ok(json!({ "access_token": access, "refresh_token": refresh }))
}

/// Let a scheduled redirect run to completion
pub async fn settle_redirect() {
    tokio::time::sleep(REDIRECT_DELAY * 10).await;
}
