//! Session API client methods

use super::credentials::{AUTH_TOKEN_KEY, USER_KEY};
use super::error::ClientError;
use super::{ApiClient, ApiRequest, LOGIN_PATH};
use crate::types::{LoginRequest, LoginResponse, UserProfile};
use lavacar_core::{ApiError, Validate};

impl ApiClient {
    /// Sign in and store the returned token pair and profile
    ///
    /// # Errors
    ///
    /// `400` when the credentials fail local validation, otherwise whatever
    /// the login endpoint answered. A `401` here never triggers a refresh.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse, ApiError> {
        credentials.validate()?;

        let request = ApiRequest::post(LOGIN_PATH).json(credentials)?;
        let response: LoginResponse = self.request(request).await?;

        let store = self.credentials();
        store.set_pair(&response.token, &response.refresh_token);
        match &response.user {
            Some(user) => {
                let profile = serde_json::to_string(user).map_err(ClientError::from)?;
                store.set(USER_KEY, &profile);
            }
            None => store.remove(USER_KEY),
        }

        info!(email = %credentials.email, "Signed in");
        Ok(response)
    }

    /// Forget the session locally
    pub fn logout(&self) {
        self.credentials().clear();
        info!("Signed out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials().get(AUTH_TOKEN_KEY).is_some()
    }

    /// Profile stored at login, if any and if it still parses
    pub fn current_user(&self) -> Option<UserProfile> {
        let raw = self.credentials().get(USER_KEY)?;
        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(error = %e, "Stored user profile is unreadable"))
            .ok()
    }
}
