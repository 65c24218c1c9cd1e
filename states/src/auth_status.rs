//! Authentication status rendered by the login and guard screens.

use serde::{Deserialize, Serialize};

/// Where the user currently stands in the authentication flow.
///
/// The business layer moves this forward (login command, token restore,
/// forced logout); screens only read it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    /// Not signed in.
    #[default]
    SignedOut,
    /// A login request is in flight.
    SigningIn,
    /// Signed in, with the bearer token preserved for API calls.
    SignedIn { username: String, token: String },
    /// The last login attempt failed.
    Failed(String),
}

impl AuthStatus {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    pub fn is_signing_in(&self) -> bool {
        matches!(self, Self::SigningIn)
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::SignedIn { username, .. } => Some(username.as_str()),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::SignedIn { token, .. } => Some(token.as_str()),
            _ => None,
        }
    }

    /// The failure message from the last attempt, if that is where we are.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}
