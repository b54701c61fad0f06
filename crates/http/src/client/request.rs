//! Outgoing request descriptor

use super::ClientError;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

/// Number of times a request may be replayed after a token refresh
pub const MAX_REPLAYS: u8 = 1;

/// Everything needed to (re)send a request: method, path, query, body and
/// headers, plus the replay count of the logical request it belongs to.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    headers: HeaderMap,
    replays: u8,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            replays: 0,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query parameter only when a value is present
    #[must_use]
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Set `Authorization: Bearer <token>` when a non-empty token is given.
    ///
    /// Without a token the headers are left untouched.
    pub fn authorize(&mut self, token: Option<&str>) {
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            return;
        };
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            self.headers.insert(AUTHORIZATION, value);
        }
    }

    /// Token currently carried in the Authorization header
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }

    pub const fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Whether the replay budget still allows another attempt
    pub const fn can_replay(&self) -> bool {
        self.replays < MAX_REPLAYS
    }

    pub const fn replays(&self) -> u8 {
        self.replays
    }

    /// Copy of this request for the next attempt, charged against the budget
    pub(crate) fn replay(&self) -> Self {
        let mut next = self.clone();
        next.replays = self.replays.saturating_add(1);
        next
    }

    /// Whether this request targets `path`, ignoring any inline query string
    pub fn targets(&self, path: &str) -> bool {
        self.path.split('?').next() == Some(path)
    }

    pub(crate) fn build(&self, http: &Client, base_url: &str) -> RequestBuilder {
        let url = format!("{}{}", base_url, self.path);
        let mut builder = http
            .request(self.method.clone(), url)
            .headers(self.headers.clone());

        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if let Some(body) = &self.body {
            builder = builder.json(body);
        }
        builder
    }
}
