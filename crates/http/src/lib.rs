//! Lavacar HTTP client
//!
//! Authenticated access to the Lavacar admin REST API: bearer tokens read
//! from an injected credential store, transparent single-flight token
//! refresh on `401`, and one uniform [`ApiError`] for every failure.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod types;

pub use client::credentials::{
    AUTH_TOKEN_KEY, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    REFRESH_TOKEN_KEY, USER_KEY,
};
pub use client::resources::{Page, Resource, ResourceService};
pub use client::{
    ApiClient, ApiClientBuilder, ApiRequest, SessionListener, error::ClientError,
};
pub use lavacar_core::{ApiError, RefreshMode};
pub use reqwest::Method;
