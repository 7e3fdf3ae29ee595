//! Request and response bodies of the auth and notification endpoints

use lavacar_core::validation::{Validate, ValidationErrors, validators};
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(validators::validate_email(&self.email, "email"))
            .check(validators::validate_not_empty(&self.password, "senha"));
        errors.into_result()
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Signed-in administrator as returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Refresh-token exchange request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// New credential pair handed out by the refresh endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Notification pushed to every subscriber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationBroadcast {
    pub title: String,
    pub message: String,
}

impl Validate for NotificationBroadcast {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check(validators::validate_not_empty(&self.title, "título"))
            .check(validators::validate_not_empty(&self.message, "mensagem"));
        if self.title.chars().count() > 65 {
            errors.push("título: máximo de 65 caracteres");
        }
        errors.into_result()
    }
}
