//! Session readiness and authorization gating.
//!
//! # Responsibility
//! - Hold the RAM-only user session: `{ logged_in, user, ready }`.
//! - Resolve readiness exactly once per session from a profile check.
//! - Gate auth-only surfaces without redirecting before readiness is known.
//!
//! # Invariants
//! - `ready == false` implies `logged_in == false` and `user == None`.
//! - `complete_check` transitions `Unknown -> Ready*` once; later completions
//!   are ignored until an explicit `reset`.
//! - `login`/`logout` always land in a ready state.

use crate::api::{ApiClient, Profile, Transport};
use crate::events::{EventBus, UiEvent};
use crate::reactive::{Atom, Subscription};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub logged_in: bool,
    pub user: Option<Profile>,
    pub ready: bool,
}

impl SessionState {
    pub fn authenticated(profile: Profile) -> Self {
        Self {
            logged_in: true,
            user: Some(profile),
            ready: true,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            logged_in: false,
            user: None,
            ready: true,
        }
    }

    pub fn readiness(&self) -> SessionReadiness {
        match (self.ready, self.logged_in) {
            (false, _) => SessionReadiness::Unknown,
            (true, true) => SessionReadiness::ReadyAuthenticated,
            (true, false) => SessionReadiness::ReadyUnauthenticated,
        }
    }
}

/// Tri-state view of `SessionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionReadiness {
    Unknown,
    ReadyAuthenticated,
    ReadyUnauthenticated,
}

impl SessionReadiness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::ReadyAuthenticated => "ready_authenticated",
            Self::ReadyUnauthenticated => "ready_unauthenticated",
        }
    }
}

/// RAM-only session store.
#[derive(Clone)]
pub struct SessionStore {
    state: Atom<SessionState>,
    bus: EventBus,
}

impl SessionStore {
    pub fn new(bus: &EventBus) -> Self {
        Self {
            state: Atom::new("session", SessionState::default()),
            bus: bus.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.get()
    }

    pub fn readiness(&self) -> SessionReadiness {
        self.state.with(SessionState::readiness)
    }

    pub fn user(&self) -> Option<Profile> {
        self.state.with(|state| state.user.clone())
    }

    /// Marks the start of the startup session check.
    ///
    /// State stays as it is: an unresolved session remains `Unknown` until
    /// `complete_check` runs.
    pub fn begin_check(&self) -> SessionReadiness {
        let readiness = self.readiness();
        info!(
            "event=session_check module=stores status=start readiness={}",
            readiness.as_str()
        );
        readiness
    }

    /// Applies the outcome of the startup session check.
    ///
    /// `Some(profile)` means authenticated, `None` means no session. Returns
    /// `false` when the session was already resolved and the outcome ignored.
    pub fn complete_check(&self, outcome: Option<Profile>) -> bool {
        let next = match outcome {
            Some(profile) => SessionState::authenticated(profile),
            None => SessionState::unauthenticated(),
        };
        let readiness = next.readiness();
        let applied = self
            .state
            .try_update(move |state| (!state.ready).then_some(next));
        if applied {
            info!(
                "event=session_check module=stores status=ok readiness={}",
                readiness.as_str()
            );
        } else {
            info!("event=session_check module=stores status=ignored reason=already_ready");
        }
        applied
    }

    /// Runs the profile fetch and completes the check.
    ///
    /// Any API failure resolves the session as unauthenticated.
    pub fn check_with<T: Transport>(&self, client: &ApiClient<T>) -> SessionReadiness {
        if self.begin_check() != SessionReadiness::Unknown {
            return self.readiness();
        }
        let outcome = match client.fetch_profile() {
            Ok(profile) => Some(profile),
            Err(err) => {
                warn!(
                    "event=session_check module=stores status=unauthenticated error_code={}",
                    err.code()
                );
                None
            }
        };
        self.complete_check(outcome);
        self.readiness()
    }

    pub fn login(&self, profile: Profile) {
        self.state.set(SessionState::authenticated(profile));
    }

    /// Ends the session and broadcasts `Logout`.
    pub fn logout(&self) {
        self.state.set(SessionState::unauthenticated());
        self.bus.publish(UiEvent::Logout);
    }

    /// Returns to `Unknown` so a new check can resolve the session.
    pub fn reset(&self) {
        self.state.set(SessionState::default());
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&SessionState) + Send + Sync + 'static,
    ) -> Subscription {
        self.state.subscribe(listener)
    }
}

/// What an auth-only surface should do for a session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Readiness unknown: render nothing, redirect nothing.
    Pending,
    Allow,
    Redirect,
}

pub fn gate(state: &SessionState) -> GateDecision {
    match state.readiness() {
        SessionReadiness::Unknown => GateDecision::Pending,
        SessionReadiness::ReadyAuthenticated => GateDecision::Allow,
        SessionReadiness::ReadyUnauthenticated => GateDecision::Redirect,
    }
}

/// Watches the session and fires `on_redirect` once per unauthenticated
/// resolution.
///
/// The latch re-arms when the session becomes authenticated or unknown again.
pub struct AuthGuard {
    subscription: Subscription,
    redirected: Arc<AtomicBool>,
}

impl AuthGuard {
    pub fn attach(
        session: &SessionStore,
        on_redirect: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let redirected = Arc::new(AtomicBool::new(false));
        let latch = Arc::clone(&redirected);
        let evaluate = Arc::new(move |state: &SessionState| match gate(state) {
            GateDecision::Redirect => {
                if !latch.swap(true, Ordering::SeqCst) {
                    on_redirect();
                }
            }
            GateDecision::Allow | GateDecision::Pending => latch.store(false, Ordering::SeqCst),
        });

        let on_change = Arc::clone(&evaluate);
        let subscription = session.subscribe(move |state| on_change(state));
        evaluate(&session.state());

        Self {
            subscription,
            redirected,
        }
    }

    /// Whether the guard has redirected for the current resolution.
    pub fn has_redirected(&self) -> bool {
        self.redirected.load(Ordering::SeqCst)
    }

    pub fn detach(self) {
        self.subscription.unsubscribe();
    }
}
