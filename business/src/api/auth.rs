//! Login and logout.

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};
use crate::gateway::ApiGateway;
use crate::vault::UserProfile;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: String,
    password: String,
}

/// Successful login payload: the bearer token plus the profile to cache.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Sign in against `/auth/login` (a public endpoint) and establish the
/// local session: store the token and profile, start the idle timers, and
/// re-arm the 401 navigation guard.
pub async fn login(
    gateway: &ApiGateway,
    username: &str,
    password: &str,
) -> Result<UserProfile, ApiError> {
    let username = username.trim();
    let mut fields = Vec::new();
    if username.is_empty() {
        fields.push(FieldError::new("username", "Username is required"));
    }
    if password.is_empty() {
        fields.push(FieldError::new("password", "Password is required"));
    }
    if !fields.is_empty() {
        return Err(ApiError::Validation { fields });
    }

    let response: LoginResponse = gateway
        .post(
            "/auth/login",
            &LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            },
        )
        .await?;

    if let Err(err) = gateway.vault().store_session(&response.token, &response.user) {
        return Err(ApiError::decode(format!("failed to persist session: {err:#}")));
    }
    gateway.session().start();
    gateway.reset_navigation_guard();
    info!("signed in as '{}'", response.user.username);

    Ok(response.user)
}

/// Sign out locally: clear stored credentials and stop the idle timers.
///
/// The backend keeps no server-side session for bearer tokens, so no
/// request is made.
pub fn logout(gateway: &ApiGateway) {
    gateway.vault().clear();
    gateway.session().end_session();
    info!("signed out");
}
