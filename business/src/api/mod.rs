//! Typed API surface over the gateway.
//!
//! Thin, screen-facing wrappers: one function per backend operation, typed
//! DTOs in and out, every call routed through [`ApiGateway`](crate::ApiGateway)
//! so the auth, casing, and classification rules apply uniformly.

mod auth;
mod directory;
mod travel_requests;

pub use auth::{LoginResponse, login, logout};
pub use directory::{
    Department, Project, User, get_department, get_project, get_user, list_departments,
    list_projects, list_users,
};
pub use travel_requests::{
    RequestStatus, TravelRequest, TravelRequestDraft, approve, book, list, list_by_user, reject,
    submit,
};
