//! Idle-session lifecycle manager.
//!
//! Tracks user activity and walks a session through
//! `Inactive -> Active -> Warning -> Expired`:
//!
//! - `Active -> Warning` once `timeout - warning` has elapsed since the last
//!   tracked activity; warning observers receive the remaining minutes.
//! - `Warning -> Expired` once the full `timeout` has elapsed; timeout
//!   observers fire (the business layer wires vault clearing and the
//!   redirect-to-login there).
//! - Any call to [`SessionManager::update_activity`] returns to `Active`
//!   from every phase, cancelling the old timer pair and arming exactly one
//!   new one.
//!
//! Timers are tokio tasks guarded by a [`CancellationToken`] and a
//! generation counter, so rapid activity updates can neither leak timers nor
//! double-fire callbacks. Ending the session cancels timers but never
//! touches stored credentials; that is the caller's decision.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::observers::{ObserverHandle, ObserverRegistry};

/// Warning observer: receives the whole minutes left before forced logout.
pub type WarningCallback = dyn Fn(u64) + Send + Sync;

/// Timeout observer: the session has expired.
pub type TimeoutCallback = dyn Fn() + Send + Sync;

/// Idle timeout configuration.
///
/// `warning` is the lead time before `timeout` at which the warning fires;
/// a warning equal to or larger than the timeout warns immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub timeout: Duration,
    pub warning: Duration,
}

impl SessionConfig {
    pub fn from_minutes(timeout_minutes: u64, warning_minutes: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_minutes * 60),
            warning: Duration::from_secs(warning_minutes * 60),
        }
    }

    /// Time from activity to the warning transition.
    fn warning_lead(&self) -> Duration {
        self.timeout.saturating_sub(self.warning)
    }
}

impl Default for SessionConfig {
    /// 30 minute idle timeout with a 5 minute warning.
    fn default() -> Self {
        Self::from_minutes(30, 5)
    }
}

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No session (never started, ended, or expired and re-idled).
    #[default]
    Inactive,
    /// Session running, timers armed.
    Active,
    /// Warning threshold crossed; timers still running.
    Warning,
    /// Idle timeout reached. Terminal until the next activity.
    Expired,
}

impl SessionPhase {
    /// True while timers are armed (`Active` or `Warning`).
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active | Self::Warning)
    }
}

/// Event stream variant of the observer callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Warning { remaining_minutes: u64 },
    Expired,
}

/// Point-in-time view of the session.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub last_activity: Option<DateTime<Utc>>,
    pub phase: SessionPhase,
    /// Time left until forced logout; `None` when no timers are armed.
    pub time_until_expiry: Option<Duration>,
}

impl SessionSnapshot {
    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }
}

struct SessionInner {
    phase: SessionPhase,
    last_activity: Option<DateTime<Utc>>,
    expires_at: Option<Instant>,
    generation: u64,
    timer_token: Option<CancellationToken>,
    warning_observers: ObserverRegistry<WarningCallback>,
    timeout_observers: ObserverRegistry<TimeoutCallback>,
    subscribers: Vec<flume::Sender<SessionEvent>>,
}

impl SessionInner {
    fn cancel_timers(&mut self) {
        if let Some(token) = self.timer_token.take() {
            token.cancel();
        }
    }

    fn push_event(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|sender| sender.send(event).is_ok());
    }
}

/// The idle-session state machine.
///
/// Cheap to clone-share via the internal `Arc`; construct one per login
/// scope and pass it to the gateway and any screens that surface the
/// warning toast. Must run inside a tokio runtime (timers are spawned
/// tasks).
pub struct SessionManager {
    config: SessionConfig,
    inner: Arc<Mutex<SessionInner>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(SessionInner {
                phase: SessionPhase::Inactive,
                last_activity: None,
                expires_at: None,
                generation: 0,
                timer_token: None,
                warning_observers: ObserverRegistry::default(),
                timeout_observers: ObserverRegistry::default(),
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Begin the session (on login). Idempotent: starting an already
    /// running session does not reset its timers.
    pub fn start(&self) {
        {
            let inner = self.inner.lock();
            if inner.phase.is_active() {
                debug!("session already started, ignoring");
                return;
            }
        }
        info!(
            "session started, idle timeout {}s",
            self.config.timeout.as_secs()
        );
        self.arm();
    }

    /// Record user or API activity.
    ///
    /// Valid from every phase: resets the last-activity timestamp, cancels
    /// the previous timer pair, and arms exactly one new pair. Safe to call
    /// redundantly and in rapid succession.
    pub fn update_activity(&self) {
        self.arm();
    }

    /// Cancel all pending timers unconditionally and return to `Inactive`.
    ///
    /// Stored credentials are deliberately untouched; an explicit logout
    /// clears them at the call site. Idempotent.
    pub fn end_session(&self) {
        let mut inner = self.inner.lock();
        let was_active = inner.phase.is_active();
        inner.cancel_timers();
        inner.generation += 1;
        inner.phase = SessionPhase::Inactive;
        inner.expires_at = None;
        drop(inner);
        if was_active {
            info!("session ended");
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().phase
    }

    /// Time left before forced logout, while timers are armed.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.inner
            .lock()
            .expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock();
        SessionSnapshot {
            last_activity: inner.last_activity,
            phase: inner.phase,
            time_until_expiry: inner
                .expires_at
                .map(|at| at.saturating_duration_since(Instant::now())),
        }
    }

    /// Register a warning observer; the handle removes exactly this one.
    pub fn on_warning(
        &self,
        observer: impl Fn(u64) + Send + Sync + 'static,
    ) -> ObserverHandle {
        let id = self.inner.lock().warning_observers.add(Arc::new(observer));
        let weak = Arc::downgrade(&self.inner);
        ObserverHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().warning_observers.remove(id);
            }
        })
    }

    /// Register a timeout observer; the handle removes exactly this one.
    pub fn on_timeout(
        &self,
        observer: impl Fn() + Send + Sync + 'static,
    ) -> ObserverHandle {
        let id = self.inner.lock().timeout_observers.add(Arc::new(observer));
        let weak = Arc::downgrade(&self.inner);
        ObserverHandle::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().timeout_observers.remove(id);
            }
        })
    }

    /// Event-stream view of the warning/expiry transitions, for hosts that
    /// prefer polling a channel over registering callbacks.
    pub fn subscribe(&self) -> flume::Receiver<SessionEvent> {
        let (sender, receiver) = flume::unbounded();
        self.inner.lock().subscribers.push(sender);
        receiver
    }

    /// Cancel the old timer pair and arm a new one from "now".
    fn arm(&self) {
        let (token, generation, warn_at, expires_at) = {
            let mut inner = self.inner.lock();
            inner.cancel_timers();
            inner.generation += 1;
            let token = CancellationToken::new();
            inner.timer_token = Some(token.clone());
            inner.last_activity = Some(Utc::now());
            inner.phase = SessionPhase::Active;

            let now = Instant::now();
            let expires_at = now + self.config.timeout;
            inner.expires_at = Some(expires_at);
            (
                token,
                inner.generation,
                now + self.config.warning_lead(),
                expires_at,
            )
        };

        debug!("session timers armed (generation {generation})");
        let inner = Arc::clone(&self.inner);
        tokio::spawn(run_timer_pair(inner, token, generation, warn_at, expires_at));
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .field("phase", &inner.phase)
            .field("generation", &inner.generation)
            .field("warning_observers", &inner.warning_observers.len())
            .field("timeout_observers", &inner.timeout_observers.len())
            .finish()
    }
}

/// One armed timer pair: warning deadline, then expiry deadline.
///
/// The generation check makes a superseded pair inert even if its
/// cancellation races the deadline; observers are invoked outside the lock
/// so they may call back into the manager.
async fn run_timer_pair(
    inner: Arc<Mutex<SessionInner>>,
    token: CancellationToken,
    generation: u64,
    warn_at: Instant,
    expires_at: Instant,
) {
    tokio::select! {
        () = token.cancelled() => return,
        () = sleep_until(warn_at) => {}
    }

    let warning = {
        let mut guard = inner.lock();
        if guard.generation != generation || guard.phase != SessionPhase::Active {
            return;
        }
        guard.phase = SessionPhase::Warning;
        let remaining = remaining_minutes(expires_at);
        guard.push_event(SessionEvent::Warning {
            remaining_minutes: remaining,
        });
        Some((guard.warning_observers.snapshot(), remaining))
    };
    if let Some((observers, remaining)) = warning {
        info!("session idle warning, {remaining} minutes until automatic sign-out");
        for observer in observers {
            observer(remaining);
        }
    }

    tokio::select! {
        () = token.cancelled() => return,
        () = sleep_until(expires_at) => {}
    }

    let observers = {
        let mut guard = inner.lock();
        if guard.generation != generation {
            return;
        }
        guard.phase = SessionPhase::Expired;
        guard.timer_token = None;
        guard.expires_at = None;
        guard.push_event(SessionEvent::Expired);
        guard.timeout_observers.snapshot()
    };
    warn!("session expired after idle timeout");
    for observer in observers {
        observer();
    }
}

fn remaining_minutes(expires_at: Instant) -> u64 {
    expires_at
        .saturating_duration_since(Instant::now())
        .as_secs()
        .div_ceil(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_minutes() {
        let config = SessionConfig::from_minutes(30, 5);
        assert_eq!(config.timeout, Duration::from_secs(1800));
        assert_eq!(config.warning, Duration::from_secs(300));
        assert_eq!(config.warning_lead(), Duration::from_secs(1500));
    }

    #[test]
    fn test_warning_larger_than_timeout_saturates() {
        let config = SessionConfig::from_minutes(5, 30);
        assert_eq!(config.warning_lead(), Duration::ZERO);
    }

    #[test]
    fn test_initial_snapshot_is_inactive() {
        let session = SessionManager::new(SessionConfig::default());
        let snapshot = session.snapshot();

        assert_eq!(snapshot.phase, SessionPhase::Inactive);
        assert!(!snapshot.is_active());
        assert!(snapshot.last_activity.is_none());
        assert!(snapshot.time_until_expiry.is_none());
    }

    #[test]
    fn test_phase_is_active() {
        assert!(!SessionPhase::Inactive.is_active());
        assert!(SessionPhase::Active.is_active());
        assert!(SessionPhase::Warning.is_active());
        assert!(!SessionPhase::Expired.is_active());
    }

    #[test]
    fn test_end_session_without_start_is_noop() {
        let session = SessionManager::new(SessionConfig::default());
        session.end_session();
        session.end_session();
        assert_eq!(session.phase(), SessionPhase::Inactive);
    }
}
