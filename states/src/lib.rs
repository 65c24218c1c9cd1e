//! Session and authentication state for the TravelDesk client.
//!
//! This crate owns the two state machines every screen depends on:
//!
//! - [`SessionManager`]: idle-session tracking with warning and timeout
//!   observers, backed by cancellable tokio timers.
//! - [`AuthStatus`]: the authentication state the login screens render from.
//!
//! Neither type performs I/O; clearing credentials and navigating to the
//! login route on expiry are wired up by the business layer through the
//! observer registry.

mod auth_status;
mod observers;
mod session;

pub use auth_status::AuthStatus;
pub use observers::{ObserverHandle, ObserverRegistry};
pub use session::{
    SessionConfig, SessionEvent, SessionManager, SessionPhase, SessionSnapshot, TimeoutCallback,
    WarningCallback,
};
