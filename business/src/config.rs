//! Gateway configuration.

/// Configuration for the [`ApiGateway`](crate::ApiGateway).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL all request paths are appended to, without a trailing slash.
    pub api_base_url: String,

    /// Path substrings callable without a bearer token (login, health).
    /// Everything else fails closed when no token is stored.
    pub public_paths: Vec<String>,

    /// Path substrings where a 404 means "no rows yet" rather than an
    /// error; `get_list` returns an empty collection for these. All other
    /// 404s stay errors.
    pub empty_collection_paths: Vec<String>,
}

impl GatewayConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Whether `path` may be called without credentials.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|public| path.contains(public.as_str()))
    }

    /// Whether a 404 on `path` should be read as an empty collection.
    pub fn treats_missing_as_empty(&self, path: &str) -> bool {
        self.empty_collection_paths
            .iter()
            .any(|pattern| path.contains(pattern.as_str()))
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.api_base_url)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            public_paths: vec!["/auth/".to_string(), "/health".to_string()],
            // New users have no requests yet; the backend answers that
            // lookup with 404 instead of an empty list.
            empty_collection_paths: vec!["/TravelRequest/user/".to_string()],
        }
    }
}
