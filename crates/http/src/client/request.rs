//! Request description accepted by [`ApiClient::request`](super::ApiClient::request)

use crate::client::error::ClientError;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// One call against the API, relative to the client's base URL
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// Defaults to `GET`
    pub method: Method,
    /// Path appended to the base URL, e.g. `/users`
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// Query string parameters
    pub params: BTreeMap<String, Value>,
    /// JSON body
    pub data: Option<Value>,
    /// Aborts the request when cancelled
    pub cancel: Option<CancellationToken>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize `body` as the JSON payload
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ClientError> {
        Ok(self.data(serde_json::to_value(body)?))
    }

    #[must_use]
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Path without its query string
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }

    pub fn is_canceled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    pub(crate) fn has_authorization(&self) -> bool {
        self.headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case("authorization"))
    }
}
