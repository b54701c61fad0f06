//! Authenticated client for the booking admin API
//!
//! Every request goes through [`ApiClient::request`]: the stored access token
//! is attached as a bearer header, and a response carrying application code
//! 401 triggers one token refresh followed by a single replay of the request.
//! A failed refresh notifies the user and schedules a redirect to the login
//! view. Code 400 is reported to the user and returned as
//! [`ClientError::Validation`].

pub mod auth;
pub mod booking;
pub mod error;
pub mod meeting_room;
pub mod refresh;
pub mod request;
pub mod storage;
pub mod user;

pub use error::ClientError;
pub use refresh::{RefreshFailure, RefreshOutcome};
pub use request::ApiRequest;

use crate::navigation::{LoggingNavigator, NavigationController};
use crate::notify::{Notifier, TracingNotifier};
use crate::types::Envelope;
use error::{CODE_AUTH_EXPIRED, CODE_VALIDATION};
use futures::FutureExt;
use refresh::{RefreshDecision, RefreshFlight};
use reqwest::{Client, ClientBuilder, StatusCode};
use roombook_core::{ClientSettings, Route, Session, TokenPair};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A non-2xx response, reduced to what the interceptor branches on
#[derive(Debug, Clone)]
struct Failure {
    status: u16,
    code: i64,
    message: String,
}

impl Failure {
    fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let envelope = serde_json::from_slice::<Envelope>(body).ok();
        let code = envelope
            .as_ref()
            .map_or_else(|| i64::from(status.as_u16()), |e| e.code);
        let message = envelope
            .as_ref()
            .and_then(Envelope::describe)
            .or_else(|| {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| status.to_string());

        Self {
            status: status.as_u16(),
            code,
            message,
        }
    }
}

/// Strip the `{code, message, data}` wrapper when present
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("code") && map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

struct Inner {
    http: Client,
    base_url: String,
    refresh_path: String,
    redirect_delay: Duration,
    session: Session,
    notifier: Arc<dyn Notifier>,
    navigation: Arc<NavigationController>,
    refresh: RefreshFlight,
}

/// Booking admin API client
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("refresh_path", &self.inner.refresh_path)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Session the client reads and writes credentials through
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn navigation(&self) -> &Arc<NavigationController> {
        &self.inner.navigation
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.inner.notifier
    }

    /// Underlying HTTP client, for requests that skip the interceptors
    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    /// Send a request through the authentication interceptors and decode the
    /// `data` field of the response.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let data = self.request_value(request).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Like [`request`](Self::request), discarding the response body
    pub async fn request_unit(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.request_value(request).await.map(|_| ())
    }

    async fn request_value(&self, mut request: ApiRequest) -> Result<Value, ClientError> {
        loop {
            self.augment(&mut request)?;
            match self.dispatch(&request).await? {
                Ok(data) => return Ok(data),
                Err(failure) => request = self.intercept(request, failure).await?,
            }
        }
    }

    /// Attach the stored access token; the refresh endpoint is sent bare
    fn augment(&self, request: &mut ApiRequest) -> Result<(), ClientError> {
        if request.targets(&self.inner.refresh_path) {
            return Ok(());
        }
        let token = self.inner.session.access_token()?;
        request.authorize(token.as_deref());
        Ok(())
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<Result<Value, Failure>, ClientError> {
        debug!(
            method = %request.method(),
            path = request.path(),
            replays = request.replays(),
            "dispatching request"
        );

        let response = request
            .build(&self.inner.http, &self.inner.base_url)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            let value = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&body)?
            };
            return Ok(Ok(unwrap_envelope(value)));
        }

        let failure = Failure::from_body(status, &body);
        debug!(
            status = failure.status,
            code = failure.code,
            path = request.path(),
            "request failed"
        );
        Ok(Err(failure))
    }

    /// Decide what happens after a failed response: the next request to send,
    /// or the error handed back to the caller.
    async fn intercept(
        &self,
        request: ApiRequest,
        failure: Failure,
    ) -> Result<ApiRequest, ClientError> {
        let refreshable = failure.code == CODE_AUTH_EXPIRED
            && !request.targets(&self.inner.refresh_path)
            && request.can_replay();

        if refreshable {
            let failed_token = request.bearer_token().map(str::to_string);
            let decision = self
                .inner
                .refresh
                .join(&self.inner.session, failed_token.as_deref(), || {
                    self.refresher().refresh_and_handle_failure().boxed()
                })
                .await;

            return match decision {
                RefreshDecision::AlreadyRefreshed | RefreshDecision::Completed(Ok(_)) => {
                    debug!(path = request.path(), "replaying request with new credentials");
                    Ok(request.replay())
                }
                RefreshDecision::Completed(Err(refresh_failure)) => {
                    Err(ClientError::SessionExpired(refresh_failure.message))
                }
            };
        }

        if failure.code == CODE_VALIDATION {
            self.inner.notifier.error(&failure.message);
        }
        Err(ClientError::from_code(
            failure.status,
            failure.code,
            failure.message,
        ))
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// The refresh endpoint is called directly, without the bearer header and
    /// without the interceptors, so it can never recurse into itself. Only a
    /// 200 or 201 response counts as success; both stored tokens are then
    /// overwritten.
    pub async fn refresh_credentials(&self) -> RefreshOutcome {
        self.refresher().refresh().await
    }

    /// Detached copy of what a refresh needs. The in-flight future lives in
    /// `Inner`, so it must not hold the client itself.
    fn refresher(&self) -> Refresher {
        Refresher {
            http: self.inner.http.clone(),
            base_url: self.inner.base_url.clone(),
            refresh_path: self.inner.refresh_path.clone(),
            redirect_delay: self.inner.redirect_delay,
            session: self.inner.session.clone(),
            notifier: Arc::clone(&self.inner.notifier),
            navigation: Arc::clone(&self.inner.navigation),
        }
    }
}

struct Refresher {
    http: Client,
    base_url: String,
    refresh_path: String,
    redirect_delay: Duration,
    session: Session,
    notifier: Arc<dyn Notifier>,
    navigation: Arc<NavigationController>,
}

impl Refresher {
    /// One refresh attempt as run by the single-flight leader. A failure is
    /// reported once per flight, however many requests are waiting on it.
    async fn refresh_and_handle_failure(self) -> RefreshOutcome {
        let outcome = self.refresh().await;
        if let Err(failure) = &outcome {
            warn!(status = ?failure.status, "Token refresh failed: {}", failure.message);
            self.notifier.error(&failure.message);
            self.navigation
                .schedule_redirect(Route::Login, self.redirect_delay);
        }
        outcome
    }

    async fn refresh(&self) -> RefreshOutcome {
        let refresh_token = self
            .session
            .refresh_token()
            .map_err(|e| RefreshFailure::new(None, e.to_string()))?
            .ok_or_else(|| RefreshFailure::new(None, "No refresh token stored"))?;

        let request =
            ApiRequest::get(self.refresh_path.clone()).query("refreshToken", refresh_token);

        let response = request
            .build(&self.http, &self.base_url)
            .send()
            .await
            .map_err(|e| RefreshFailure::new(None, e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RefreshFailure::new(Some(status.as_u16()), e.to_string()))?;

        if status != StatusCode::OK && status != StatusCode::CREATED {
            let failure = Failure::from_body(status, &body);
            return Err(RefreshFailure::new(Some(failure.status), failure.message));
        }

        let tokens: TokenPair = serde_json::from_slice::<Value>(&body)
            .map(unwrap_envelope)
            .and_then(serde_json::from_value)
            .map_err(|e| {
                RefreshFailure::new(
                    Some(status.as_u16()),
                    format!("Malformed refresh response: {e}"),
                )
            })?;

        self.session
            .store_tokens(&tokens)
            .map_err(|e| RefreshFailure::new(Some(status.as_u16()), e.to_string()))?;
        info!("Access token refreshed");
        Ok(tokens)
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    refresh_path: Option<String>,
    redirect_delay: Option<Duration>,
    session: Option<Session>,
    notifier: Option<Arc<dyn Notifier>>,
    navigation: Option<Arc<NavigationController>>,
}

impl ApiClientBuilder {
    /// Start from loaded settings
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::default()
            .base_url(settings.base_url())
            .timeout(settings.timeout())
            .refresh_path(settings.refresh_path.clone())
            .redirect_delay(settings.redirect_delay())
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Delay between a failed refresh and the redirect to login
    #[must_use]
    pub const fn redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn navigation(mut self, navigation: Arc<NavigationController>) -> Self {
        self.navigation = Some(navigation);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let settings = ClientSettings::default();
        let refresh_path = self.refresh_path.unwrap_or(settings.refresh_path.clone());
        if !refresh_path.starts_with('/') {
            return Err(ClientError::Configuration(
                "refresh_path must start with '/'".into(),
            ));
        }

        let mut client_builder =
            ClientBuilder::new().timeout(self.timeout.unwrap_or_else(|| settings.timeout()));
        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| format!("roombook/{}", env!("CARGO_PKG_VERSION"))),
        );
        let http = client_builder.build()?;

        let session = self.session.unwrap_or_else(Session::in_memory);
        let navigation = self.navigation.unwrap_or_else(|| {
            Arc::new(
                NavigationController::new(Arc::new(LoggingNavigator))
                    .with_session(session.clone()),
            )
        });

        Ok(ApiClient {
            inner: Arc::new(Inner {
                http,
                base_url,
                refresh_path,
                redirect_delay: self
                    .redirect_delay
                    .unwrap_or_else(|| settings.redirect_delay()),
                session,
                notifier: self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier)),
                navigation,
                refresh: RefreshFlight::new(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_requires_base_url() {
        let result = ApiClient::builder().build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:3005/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3005");
    }

    #[test]
    fn builder_rejects_relative_refresh_path() {
        let result = ApiClient::builder()
            .base_url("http://localhost:3005")
            .refresh_path("user/admin/refresh")
            .build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[tokio::test]
    async fn abandoned_refresh_does_not_keep_client_alive() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/info"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "code": 401, "data": "expired" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/admin/refresh"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        client
            .session()
            .store_tokens(&TokenPair {
                access_token: "old".into(),
                refresh_token: "r0".into(),
            })
            .unwrap();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(200),
            client.request_unit(ApiRequest::get("/user/info")),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(client.inner.refresh.in_flight());

        let weak = Arc::downgrade(&client.inner);
        drop(client);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn envelope_is_unwrapped() {
        let value = unwrap_envelope(json!({ "code": 200, "message": "success", "data": [1, 2] }));
        assert_eq!(value, json!([1, 2]));

        let bare = unwrap_envelope(json!({ "id": 1 }));
        assert_eq!(bare, json!({ "id": 1 }));
    }

    #[test]
    fn failure_reads_application_code() {
        let failure = Failure::from_body(
            StatusCode::UNAUTHORIZED,
            r#"{"code":401,"message":"fail","data":"token 失效，请重新登录"}"#.as_bytes(),
        );
        assert_eq!(failure.code, 401);
        assert_eq!(failure.message, "token 失效，请重新登录");
    }

    #[test]
    fn failure_falls_back_to_status() {
        let failure = Failure::from_body(StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(failure.code, 502);
        assert_eq!(failure.message, "upstream down");

        let empty = Failure::from_body(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(empty.code, 500);
        assert_eq!(empty.message, "500 Internal Server Error");
    }
}
