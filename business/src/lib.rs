//! Business layer for the TravelDesk client.
//!
//! Everything between the dashboards and the backend lives here: the auth
//! vault (persisted bearer token + cached user profile), the HTTP gateway
//! that is the single outbound choke point, the wire-casing transform, and
//! the typed API surface the screens call. UI code never touches `reqwest`
//! or raw status codes; it sees [`ApiError`] and typed results.

pub mod api;
mod casing;
mod config;
mod error;
mod gateway;
mod http;
mod route;
mod vault;

pub use casing::pascal_case_keys;
pub use config::GatewayConfig;
pub use error::{ApiError, FieldError};
pub use gateway::{ApiGateway, wire_forced_logout};
pub use http::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
pub use route::{InMemoryNavigator, Navigator, Route};
pub use vault::{
    AuthVault, CredentialStorage, FileStorage, MemoryStorage, Role, TOKEN_KEY, USER_KEY,
    UserProfile,
};
