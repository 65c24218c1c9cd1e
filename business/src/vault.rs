//! Auth vault: the persisted bearer token and cached user profile.
//!
//! Storage lives behind [`CredentialStorage`] under two fixed keys, so the
//! vault itself is an injectable instance rather than ambient mutable
//! state: production uses the TOML-backed [`FileStorage`], tests use
//! [`MemoryStorage`]. Writers are the login/logout actions and the
//! gateway's 401 handler; every reader must tolerate the values being
//! cleared between reads.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::{debug, error, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use traveldesk_states::AuthStatus;

/// Fixed storage key for the bearer token.
pub const TOKEN_KEY: &str = "auth.token";
/// Fixed storage key for the serialized user profile.
pub const USER_KEY: &str = "auth.user";

/// Role of the signed-in user; drives the route guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Employee,
    Manager,
    TravelAdmin,
    Admin,
}

/// Cached identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub department: Option<String>,
}

/// Key/value persistence under the vault.
pub trait CredentialStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl CredentialStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// TOML-file storage in the user's config directory.
///
/// The desktop analog of browser-local storage: one small file holding the
/// fixed keys, created on first write and emptied (not deleted) on clear.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage at `$XDG_CONFIG_HOME/traveldesk/credentials.toml` (or the
    /// platform equivalent).
    pub fn in_config_dir() -> Result<Self> {
        let base = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(Self {
            path: base.join("traveldesk").join("credentials.toml"),
        })
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials file: {}", self.path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {}", self.path.display()))
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create credentials directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(values).context("Failed to serialize credentials")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write credentials file: {}", self.path.display()))
    }
}

impl CredentialStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

/// Expiry claim embedded in the bearer token.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: Option<i64>,
}

/// The injectable auth context: token + profile + role queries.
#[derive(Clone)]
pub struct AuthVault {
    storage: Arc<dyn CredentialStorage>,
}

impl AuthVault {
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        Self { storage }
    }

    /// Vault over [`MemoryStorage`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::default()))
    }

    /// Persist a fresh session after login.
    pub fn store_session(&self, token: &str, profile: &UserProfile) -> Result<()> {
        self.storage.write(TOKEN_KEY, token)?;
        let serialized = serde_json::to_string(profile).context("Failed to serialize profile")?;
        self.storage.write(USER_KEY, &serialized)?;
        debug!("stored session for '{}'", profile.username);
        Ok(())
    }

    /// The current bearer token, if present and not past its embedded
    /// expiry claim. An expired claim reads as "no token"; a token without
    /// a readable claim is treated as opaque and non-expiring.
    pub fn token(&self) -> Option<String> {
        let token = match self.storage.read(TOKEN_KEY) {
            Ok(token) => token?,
            Err(err) => {
                error!("failed to read stored token: {err:#}");
                return None;
            }
        };

        match decode_expiry(&token) {
            Some(exp) if exp <= Utc::now().timestamp() => {
                debug!("stored token is past its expiry claim, treating as absent");
                None
            }
            _ => Some(token),
        }
    }

    /// The cached profile, if one is stored and parseable.
    pub fn profile(&self) -> Option<UserProfile> {
        let serialized = match self.storage.read(USER_KEY) {
            Ok(value) => value?,
            Err(err) => {
                error!("failed to read stored profile: {err:#}");
                return None;
            }
        };
        match serde_json::from_str(&serialized) {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!("stored profile is unreadable, ignoring: {err}");
                None
            }
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    /// The [`AuthStatus`] the route guards and screens render from,
    /// derived from what is currently stored. A vault holding a token but
    /// no readable profile still counts as signed out; both are written
    /// together on login.
    pub fn auth_status(&self) -> AuthStatus {
        match (self.token(), self.profile()) {
            (Some(token), Some(profile)) => AuthStatus::SignedIn {
                username: profile.username,
                token,
            },
            _ => AuthStatus::SignedOut,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile().map(|profile| profile.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn is_manager(&self) -> bool {
        self.role() == Some(Role::Manager)
    }

    pub fn is_travel_admin(&self) -> bool {
        self.role() == Some(Role::TravelAdmin)
    }

    /// Remove both fixed keys. Idempotent; failures are logged, not
    /// propagated, because clearing happens on error paths already.
    pub fn clear(&self) {
        if let Err(err) = self.storage.remove(TOKEN_KEY) {
            error!("failed to remove stored token: {err:#}");
        }
        if let Err(err) = self.storage.remove(USER_KEY) {
            error!("failed to remove stored profile: {err:#}");
        }
    }
}

impl std::fmt::Debug for AuthVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthVault")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

/// Read the `exp` claim without verifying the signature; verification is
/// the backend's job, the client only needs the timestamp.
fn decode_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    match decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp,
        Err(err) => {
            debug!("token has no readable expiry claim: {err}");
            None
        }
    }
}
