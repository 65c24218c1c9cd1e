//! The HTTP gateway: single outbound choke point for all API calls.
//!
//! Responsibilities, in order of appearance on every request:
//!
//! 1. Fail closed: protected paths are rejected *before send* when the
//!    vault has no token.
//! 2. Attach the bearer token and serialize the body through the
//!    PascalCase wire transform.
//! 3. Classify the response into [`ApiError`] and perform the 401 side
//!    effects (clear vault, end session, redirect to login exactly once).
//! 4. Refresh session activity on success, while still signed in.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use traveldesk_states::{ObserverHandle, SessionManager};

use crate::casing::pascal_case_keys;
use crate::config::GatewayConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
use crate::route::{Navigator, Route};
use crate::vault::AuthVault;

/// Gateway over an injected transport, vault, session, and navigator.
///
/// Dashboards hold one `Arc<ApiGateway>` and call the typed functions in
/// [`crate::api`]; nothing else in the client performs network I/O.
pub struct ApiGateway {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    vault: Arc<AuthVault>,
    session: Arc<SessionManager>,
    navigator: Arc<dyn Navigator>,
    /// Set once a 401 has triggered the login redirect; cleared by the next
    /// successful login. Keeps repeated 401s from stacking redirects.
    redirecting: AtomicBool,
}

impl ApiGateway {
    pub fn new(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        vault: Arc<AuthVault>,
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            config,
            transport,
            vault,
            session,
            navigator,
            redirecting: AtomicBool::new(false),
        }
    }

    /// Production gateway over [`ReqwestTransport`].
    pub fn with_reqwest(
        config: GatewayConfig,
        vault: Arc<AuthVault>,
        session: Arc<SessionManager>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::new(
            config,
            Arc::new(ReqwestTransport::new()),
            vault,
            session,
            navigator,
        )
    }

    pub fn vault(&self) -> &Arc<AuthVault> {
        &self.vault
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Allow the next 401 to redirect again. Called after a successful
    /// login, when the earlier forced navigation has completed.
    pub fn reset_navigation_guard(&self) {
        self.redirecting.store(false, Ordering::SeqCst);
    }

    /// GET a single resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(Method::Get, path, None).await?;
        decode_body(path, &response)
    }

    /// GET a collection.
    ///
    /// A 404 on a path the config whitelists as expected-empty (the
    /// "requests by user" lookups) is reclassified as an empty collection;
    /// a new employee simply has no rows yet. Every other 404 stays an
    /// error.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        match self.request(Method::Get, path, None).await {
            Ok(response) => decode_body(path, &response),
            Err(ApiError::NotFound { .. }) if self.config.treats_missing_as_empty(path) => {
                debug!("404 on '{path}' reclassified as an empty collection");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// POST a payload, PascalCased on the wire.
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode_body(body)?;
        let response = self.request(Method::Post, path, Some(body)).await?;
        decode_body(path, &response)
    }

    /// PUT a payload, PascalCased on the wire.
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode_body(body)?;
        let response = self.request(Method::Put, path, Some(body)).await?;
        decode_body(path, &response)
    }

    /// DELETE a resource; the response body is discarded.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::Delete, path, None).await?;
        Ok(())
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, ApiError> {
        let public = self.config.is_public(path);
        let token = self.vault.token();

        if !public && token.is_none() {
            // Fail closed: a protected call without credentials is a client
            // bug or a race with logout, never something to send anyway.
            error!("refusing to call protected endpoint '{path}' without a bearer token");
            return Err(ApiError::Unauthorized {
                message: format!("No session token; request to '{path}' was not sent"),
            });
        }

        let mut request = HttpRequest::new(method, self.config.url_for(path));
        if let Some(token) = &token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        if let Some(body) = body {
            let bytes = serde_json::to_vec(&pascal_case_keys(&body))
                .map_err(|err| ApiError::decode(err.to_string()))?;
            request = request
                .header("content-type", "application/json")
                .body(bytes);
        }

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|err| ApiError::network(err.to_string()))?;

        self.classify(path, response)
    }

    /// Map a received response onto the error taxonomy, performing the 401
    /// side effects.
    fn classify(&self, path: &str, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        if response.is_success() {
            // A response landing after logout is stale; don't let it keep
            // the session alive.
            if self.vault.is_signed_in() {
                self.session.update_activity();
            }
            return Ok(response);
        }

        let status = response.status;
        match status {
            401 => {
                self.handle_unauthorized(path);
                Err(ApiError::Unauthorized {
                    message: "Your session has expired. Please sign in again.".to_string(),
                })
            }
            403 => Err(ApiError::Forbidden {
                message: "You do not have permission to perform this action.".to_string(),
            }),
            404 => Err(ApiError::NotFound {
                message: format!("'{path}' was not found"),
            }),
            _ => {
                // 5xx (and unclassified 4xx) surface to the caller as-is;
                // there is no automatic retry at this layer.
                let details = response.json::<Value>().ok();
                warn!("request to '{path}' failed with status {status}");
                Err(ApiError::Server {
                    status,
                    message: format!("The server could not process the request (status {status})"),
                    details,
                })
            }
        }
    }

    /// 401 side effects: clear credentials, end the session, and redirect
    /// to login — at most once, and never while already on the login route.
    fn handle_unauthorized(&self, path: &str) {
        info!("401 from '{path}', ending session");
        if self.vault.is_signed_in() || self.vault.profile().is_some() {
            self.vault.clear();
        }
        self.session.end_session();

        let already_there = self.navigator.current_route() == Route::Login;
        if !already_there && !self.redirecting.swap(true, Ordering::SeqCst) {
            self.navigator.redirect_to_login();
        }
    }
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.config.api_base_url)
            .field("redirecting", &self.redirecting.load(Ordering::SeqCst))
            .finish()
    }
}

/// Wire the session's idle expiry to the forced-logout side effects.
///
/// On timeout: clear the vault and redirect to login (unless already
/// there). Returns the disposer for the registered observer; callers keep
/// it alive for the lifetime of the wiring.
pub fn wire_forced_logout(
    session: &SessionManager,
    vault: Arc<AuthVault>,
    navigator: Arc<dyn Navigator>,
) -> ObserverHandle {
    session.on_timeout(move || {
        info!("idle session expired, clearing credentials");
        vault.clear();
        if navigator.current_route() != Route::Login {
            navigator.redirect_to_login();
        }
    })
}

fn encode_body<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|err| ApiError::decode(err.to_string()))
}

fn decode_body<T: DeserializeOwned>(path: &str, response: &HttpResponse) -> Result<T, ApiError> {
    response.json().map_err(|err| {
        error!("failed to decode response from '{path}': {err}");
        ApiError::decode(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use traveldesk_states::SessionConfig;

    use crate::http::TransportError;
    use crate::route::InMemoryNavigator;
    use crate::vault::{Role, UserProfile};

    /// Scripted transport: pops responses front-to-back and records the
    /// requests it saw.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: Mutex<Vec<HttpResponse>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn respond_with(status: u16, body: &str) -> Arc<Self> {
            let transport = Self::default();
            transport.responses.lock().push(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            });
            Arc::new(transport)
        }

        fn push(&self, status: u16, body: &str) {
            self.responses.lock().push(HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            });
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.seen.lock().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().push(request);
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                return Err(TransportError::new("scripted transport exhausted"));
            }
            Ok(responses.remove(0))
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: 1,
            username: "jdoe".to_string(),
            display_name: None,
            role: Role::Employee,
            department: None,
        }
    }

    fn gateway_with(
        transport: Arc<ScriptedTransport>,
        navigator: Arc<InMemoryNavigator>,
    ) -> ApiGateway {
        let vault = Arc::new(AuthVault::in_memory());
        let session = Arc::new(SessionManager::new(SessionConfig::default()));
        ApiGateway::new(
            GatewayConfig::new("http://api.test"),
            transport,
            vault,
            session,
            navigator,
        )
    }

    #[tokio::test]
    async fn test_protected_request_without_token_is_not_sent() {
        let transport = Arc::new(ScriptedTransport::default());
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), navigator);

        let result: Result<Value, _> = gateway.get("/TravelRequest").await;

        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
        assert!(transport.requests().is_empty(), "request must never be sent");
    }

    #[tokio::test]
    async fn test_public_request_without_token_goes_through() {
        let transport = ScriptedTransport::respond_with(200, r#"{"status":"ok"}"#);
        let navigator = Arc::new(InMemoryNavigator::default());
        let gateway = gateway_with(Arc::clone(&transport), navigator);

        let result: Result<Value, _> = gateway.get("/health").await;

        assert!(result.is_ok());
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_bearer_token_attached_to_protected_requests() {
        let transport = ScriptedTransport::respond_with(200, "[]");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), navigator);
        gateway
            .vault()
            .store_session("tok-123", &profile())
            .expect("store");

        let result: Result<Vec<Value>, _> = gateway.get_list("/TravelRequest").await;

        assert!(result.is_ok());
        let requests = transport.requests();
        assert_eq!(
            requests[0].headers.get("authorization").map(String::as_str),
            Some("Bearer tok-123")
        );
    }

    #[tokio::test]
    async fn test_post_body_is_pascal_cased_on_the_wire() {
        let transport = ScriptedTransport::respond_with(200, "{}");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), navigator);
        gateway
            .vault()
            .store_session("tok", &profile())
            .expect("store");

        let _: Value = gateway
            .post("/TravelRequest", &serde_json::json!({"destination": "Nairobi", "days": 0}))
            .await
            .expect("post");

        let requests = transport.requests();
        let sent: Value =
            serde_json::from_slice(requests[0].body.as_deref().expect("body")).expect("json");
        assert_eq!(sent, serde_json::json!({"Destination": "Nairobi", "Days": 0}));
    }

    #[tokio::test]
    async fn test_401_clears_vault_and_redirects_once() {
        let transport = ScriptedTransport::respond_with(401, "");
        transport.push(401, "");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), Arc::clone(&navigator));
        gateway
            .vault()
            .store_session("tok", &profile())
            .expect("store");
        gateway.session().start();

        let first: Result<Value, _> = gateway.get("/TravelRequest").await;
        assert!(matches!(first, Err(ApiError::Unauthorized { .. })));
        assert!(!gateway.vault().is_signed_in());
        assert!(!gateway.session().phase().is_active());
        assert_eq!(navigator.redirect_count(), 1);

        // A second 401 (e.g. a raced in-flight request) is rejected before
        // send now that the token is gone, and never stacks a redirect.
        let second: Result<Value, _> = gateway.get("/TravelRequest").await;
        assert!(matches!(second, Err(ApiError::Unauthorized { .. })));
        assert_eq!(navigator.redirect_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_401_responses_redirect_once() {
        // Public path: both 401s actually reach the wire.
        let transport = ScriptedTransport::respond_with(401, "");
        transport.push(401, "");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), Arc::clone(&navigator));

        let _: Result<Value, _> = gateway.get("/auth/whoami").await;
        navigator.set_route(Route::Dashboard); // pretend navigation hasn't landed yet
        let _: Result<Value, _> = gateway.get("/auth/whoami").await;

        assert_eq!(navigator.redirect_count(), 1);
    }

    #[tokio::test]
    async fn test_401_while_on_login_route_does_not_redirect() {
        let transport = ScriptedTransport::respond_with(401, "");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Login));
        let gateway = gateway_with(Arc::clone(&transport), Arc::clone(&navigator));

        let _: Result<Value, _> = gateway.get("/auth/whoami").await;

        assert_eq!(navigator.redirect_count(), 0);
    }

    #[tokio::test]
    async fn test_403_is_forbidden_without_logout() {
        let transport = ScriptedTransport::respond_with(403, "");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), Arc::clone(&navigator));
        gateway
            .vault()
            .store_session("tok", &profile())
            .expect("store");

        let result: Result<Value, _> = gateway.get("/TravelRequest/9/approve").await;

        assert!(matches!(result, Err(ApiError::Forbidden { .. })));
        assert!(gateway.vault().is_signed_in(), "403 must not log out");
        assert_eq!(navigator.redirect_count(), 0);
    }

    #[tokio::test]
    async fn test_404_on_whitelisted_path_is_empty_collection() {
        let transport = ScriptedTransport::respond_with(404, "");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), Arc::clone(&navigator));
        gateway
            .vault()
            .store_session("tok", &profile())
            .expect("store");

        let result: Vec<Value> = gateway
            .get_list("/TravelRequest/user/42")
            .await
            .expect("expected-empty 404 must succeed");

        assert!(result.is_empty());
        assert!(gateway.vault().is_signed_in());
    }

    #[tokio::test]
    async fn test_404_elsewhere_is_a_real_error() {
        let transport = ScriptedTransport::respond_with(404, "");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), Arc::clone(&navigator));
        gateway
            .vault()
            .store_session("tok", &profile())
            .expect("store");

        let result: Result<Value, _> = gateway.get("/Department/999").await;

        assert!(matches!(result, Err(ApiError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_5xx_maps_to_server_error_with_status() {
        let transport = ScriptedTransport::respond_with(503, r#"{"reason":"maintenance"}"#);
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), Arc::clone(&navigator));
        gateway
            .vault()
            .store_session("tok", &profile())
            .expect("store");

        let result: Result<Value, _> = gateway.get("/TravelRequest").await;

        match result {
            Err(ApiError::Server {
                status, details, ..
            }) => {
                assert_eq!(status, 503);
                assert_eq!(details, Some(serde_json::json!({"reason": "maintenance"})));
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_failure_maps_to_network_error() {
        let transport = Arc::new(ScriptedTransport::default()); // exhausted -> error
        let navigator = Arc::new(InMemoryNavigator::default());
        let gateway = gateway_with(Arc::clone(&transport), navigator);

        let result: Result<Value, _> = gateway.get("/health").await;

        assert!(matches!(result, Err(ApiError::Network { .. })));
    }

    #[tokio::test]
    async fn test_success_refreshes_session_activity() {
        let transport = ScriptedTransport::respond_with(200, "[]");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let gateway = gateway_with(Arc::clone(&transport), navigator);
        gateway
            .vault()
            .store_session("tok", &profile())
            .expect("store");

        assert!(!gateway.session().phase().is_active());
        let _: Vec<Value> = gateway.get_list("/TravelRequest").await.expect("ok");
        assert!(gateway.session().phase().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_logout_wiring_clears_vault_on_expiry() {
        let vault = Arc::new(AuthVault::in_memory());
        vault.store_session("tok", &profile()).expect("store");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let session = SessionManager::new(SessionConfig::from_minutes(30, 5));

        let _wiring = wire_forced_logout(
            &session,
            Arc::clone(&vault),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        );

        session.start();
        tokio::time::advance(std::time::Duration::from_secs(30 * 60)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        assert!(!vault.is_signed_in(), "expiry must clear stored credentials");
        assert_eq!(navigator.redirect_count(), 1);
    }

    #[tokio::test]
    async fn test_end_session_keeps_credentials() {
        let vault = Arc::new(AuthVault::in_memory());
        vault.store_session("tok", &profile()).expect("store");
        let navigator = Arc::new(InMemoryNavigator::starting_at(Route::Dashboard));
        let session = SessionManager::new(SessionConfig::default());

        let _wiring = wire_forced_logout(
            &session,
            Arc::clone(&vault),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
        );

        session.start();
        session.end_session();

        assert!(
            vault.is_signed_in(),
            "ending a session must not clear credentials"
        );
        assert_eq!(navigator.redirect_count(), 0);
    }
}
