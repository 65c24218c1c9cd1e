//! Routes and the navigation seam the gateway redirects through.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The top-level routes the auth flow cares about.
///
/// Screens inside the dashboard shell are the router's business; the
/// gateway only needs to know whether it is already on the login route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// Login page, shown when not authenticated.
    #[default]
    Login,
    /// Any authenticated dashboard screen.
    Dashboard,
}

/// Navigation seam implemented by the host shell.
///
/// The gateway and the forced-logout wiring call this instead of owning a
/// router, so tests can observe redirects and hosts can plug in their own.
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Route;
    fn redirect_to_login(&self);
}

/// Minimal navigator for hosts without a router, and for tests.
///
/// Tracks the current route and counts login redirects.
#[derive(Debug, Default)]
pub struct InMemoryNavigator {
    route: Mutex<Route>,
    redirects: AtomicUsize,
}

impl InMemoryNavigator {
    pub fn starting_at(route: Route) -> Self {
        Self {
            route: Mutex::new(route),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn set_route(&self, route: Route) {
        *self.route.lock() = route;
    }

    /// How many times `redirect_to_login` ran.
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for InMemoryNavigator {
    fn current_route(&self) -> Route {
        *self.route.lock()
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.route.lock() = Route::Login;
    }
}
