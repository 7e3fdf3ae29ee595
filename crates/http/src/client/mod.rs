//! Lavacar API client

pub mod auth;
pub mod credentials;
pub mod error;
mod refresh;
pub mod request;
pub mod resources;

pub use request::ApiRequest;

use credentials::{AUTH_TOKEN_KEY, CredentialStore, MemoryCredentialStore, REFRESH_TOKEN_KEY};
use error::ClientError;
use lavacar_core::{ApiError, ClientConfig, RefreshMode};
use refresh::{RefreshCoordinator, RefreshOutcome};
use reqwest::{Client, ClientBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Login endpoint; a `401` from it means wrong credentials, never expiry
pub const LOGIN_PATH: &str = "/auth/login";
/// Refresh-token exchange endpoint
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// Told when the session cannot be recovered and the user has to sign in
/// again.
pub trait SessionListener: Send + Sync {
    fn session_expired(&self);
}

impl<F: Fn() + Send + Sync> SessionListener for F {
    fn session_expired(&self) {
        self();
    }
}

/// Everything needed to put one request on the wire. Kept apart from the
/// refresh coordinator so a pending exchange never holds the coordinator.
#[derive(Clone)]
struct Transport {
    client: Client,
    base_url: Arc<str>,
    credentials: Arc<dyn CredentialStore>,
    listener: Option<Arc<dyn SessionListener>>,
}

impl Transport {
    async fn execute<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<T, ClientError> {
        if request.is_canceled() {
            return Err(ClientError::Canceled);
        }

        let url = format!("{}{}", self.base_url, request.url);
        let mut builder = self.client.request(request.method.clone(), url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(token) = bearer.filter(|_| !request.has_authorization()) {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(data) = &request.data {
            builder = builder.json(data);
        }

        let call = async move {
            let response = builder.send().await?;
            Self::decode(response).await
        };

        match &request.cancel {
            Some(cancel) => tokio::select! {
                biased;
                () = cancel.cancelled() => Err(ClientError::Canceled),
                result = call => result,
            },
            None => call.await,
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(ClientError::from_status(status, &body));
        }

        // 204 and friends decode as `()` or `None`
        if body.is_empty() {
            Ok(serde_json::from_value(serde_json::Value::Null)?)
        } else {
            Ok(serde_json::from_slice(&body)?)
        }
    }

    /// The exchange itself, run at most once per refresh cycle. On failure
    /// every stored credential is dropped and the listener is told.
    async fn exchange_refresh_token(self) -> Result<String, String> {
        let Some(refresh_token) = self.credentials.get(REFRESH_TOKEN_KEY) else {
            warn!("No refresh token stored, ending session");
            self.expire_session();
            return Err("no refresh token stored".to_string());
        };

        info!("Refreshing access token");
        let request = ApiRequest::post(REFRESH_PATH)
            .json(&crate::types::RefreshTokenRequest { refresh_token })
            .map_err(|e| e.to_string())?;

        match self.execute::<crate::types::TokenPair>(&request, None).await {
            Ok(pair) => {
                self.credentials.set_pair(&pair.token, &pair.refresh_token);
                info!("Access token refreshed");
                Ok(pair.token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                self.expire_session();
                Err(e.to_string())
            }
        }
    }

    /// Wipe the session. The listener only hears about it once; a store
    /// that is already empty means someone else expired it.
    fn expire_session(&self) {
        let had_session = [AUTH_TOKEN_KEY, REFRESH_TOKEN_KEY]
            .iter()
            .any(|key| self.credentials.get(key).is_some());
        self.credentials.clear();
        if !had_session {
            return;
        }
        if let Some(listener) = &self.listener {
            listener.session_expired();
        }
    }
}

/// Lavacar API client
///
/// Cheap to clone; clones share the credential store and the refresh state.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
    storage_url: Option<Arc<str>>,
    refresh: Arc<RefreshCoordinator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.transport.base_url)
            .field("storage_url", &self.storage_url)
            .field("refresh_mode", &self.refresh.mode())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new client with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.transport.base_url
    }

    /// Object storage base URL, if configured
    pub fn storage_url(&self) -> Option<&str> {
        self.storage_url.as_deref()
    }

    pub fn refresh_mode(&self) -> RefreshMode {
        self.refresh.mode()
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.transport.credentials
    }

    /// Issue `request`, decoding a successful body as `T`.
    ///
    /// A `401` (outside the login endpoint) triggers one refresh-token
    /// exchange and a single retry with the new access token. Every failure
    /// comes back as an [`ApiError`].
    ///
    /// # Errors
    ///
    /// Returns the uniform [`ApiError`] for cancellation, HTTP errors,
    /// session expiry and anything unexpected
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(&request).await.map_err(|e| {
            debug!(method = %request.method, path = request.path(), error = %e, "Request failed");
            ApiError::from(e)
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ClientError> {
        let token = self.transport.credentials.get(AUTH_TOKEN_KEY);
        trace!(method = %request.method, path = request.path(), "Sending request");

        let unauthorized = match self.transport.execute(request, token.as_deref()).await {
            Err(e) if e.is_unauthorized() && request.path() != LOGIN_PATH => e,
            other => return other,
        };

        // Another caller already rotated the pair while this one was on the wire
        if let Some(current) = self.transport.credentials.get(AUTH_TOKEN_KEY)
            && token.as_deref() != Some(current.as_str())
            && !self.refresh.is_in_flight()
        {
            debug!(path = request.path(), "Retrying request with newer stored token");
            return self.transport.execute(request, Some(&current)).await;
        }

        let transport = self.transport.clone();
        match self
            .refresh
            .refresh(move || transport.exchange_refresh_token())
            .await
        {
            RefreshOutcome::Refreshed(token) => {
                debug!(path = request.path(), "Retrying request with refreshed token");
                self.transport.execute(request, Some(&token)).await
            }
            RefreshOutcome::Busy => Err(unauthorized),
            RefreshOutcome::Failed(reason) => Err(ClientError::SessionExpired(reason)),
        }
    }

    /// `GET path`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ApiRequest::post(path).json(body)?).await
    }

    /// `PUT path` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ApiRequest::put(path).json(body)?).await
    }

    /// `PATCH path` with a JSON body
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ApiRequest::patch(path).json(body)?).await
    }

    /// `DELETE path`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(ApiRequest::delete(path)).await
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    storage_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    credentials: Option<Arc<dyn CredentialStore>>,
    listener: Option<Arc<dyn SessionListener>>,
    refresh_mode: RefreshMode,
}

impl ApiClientBuilder {
    /// Start from a loaded [`ClientConfig`]
    pub fn from_config(config: &ClientConfig) -> Self {
        let builder = Self::default()
            .base_url(config.api_base())
            .storage_url(config.storage_url.clone())
            .user_agent(config.user_agent.clone())
            .refresh_mode(config.refresh_mode);

        match config.timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)),
            None => builder,
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the object storage base URL
    #[must_use]
    pub fn storage_url(mut self, url: impl Into<String>) -> Self {
        self.storage_url = Some(url.into());
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

    /// Where tokens are read from and written to. Defaults to memory.
    #[must_use]
    pub fn credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Notified when the session ends because a refresh failed
    #[must_use]
    pub fn session_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    #[must_use]
    pub const fn refresh_mode(mut self, mode: RefreshMode) -> Self {
        self.refresh_mode = mode;
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was set or the HTTP client fails to
    /// build
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let mut client_builder = ClientBuilder::new().user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("lavacar-client/", env!("CARGO_PKG_VERSION")).into()),
        );
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder.build()?;

        Ok(ApiClient {
            transport: Transport {
                client,
                base_url: Arc::from(base_url),
                credentials: self
                    .credentials
                    .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new())),
                listener: self.listener,
            },
            storage_url: self
                .storage_url
                .map(|url| Arc::from(url.trim_end_matches('/'))),
            refresh: Arc::new(RefreshCoordinator::new(self.refresh_mode)),
        })
    }
}
