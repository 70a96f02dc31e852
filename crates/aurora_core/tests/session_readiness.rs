mod common;

use aurora_core::api::ApiClient;
use aurora_core::stores::session::{gate, SessionStore};
use aurora_core::{AuthGuard, EventBus, GateDecision, Profile, SessionReadiness};
use common::{ScriptedTransport, PROFILE_JSON};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn profile() -> Profile {
    serde_json::from_str(PROFILE_JSON).unwrap()
}

fn counting_guard(session: &SessionStore) -> (AuthGuard, Arc<AtomicUsize>) {
    let redirects = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&redirects);
    let guard = AuthGuard::attach(session, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (guard, redirects)
}

#[test]
fn no_redirect_before_check_resolves() {
    let session = SessionStore::new(&EventBus::new());
    let (guard, redirects) = counting_guard(&session);

    assert_eq!(session.begin_check(), SessionReadiness::Unknown);
    let state = session.state();
    assert!(!state.ready);
    assert_eq!(session.readiness(), SessionReadiness::Unknown);
    assert_eq!(gate(&state), GateDecision::Pending);
    assert_eq!(redirects.load(Ordering::SeqCst), 0);
    assert!(!guard.has_redirected());
}

#[test]
fn unauthenticated_resolution_redirects_exactly_once() {
    let session = SessionStore::new(&EventBus::new());
    let (guard, redirects) = counting_guard(&session);

    assert!(session.complete_check(None));
    let state = session.state();
    assert!(state.ready);
    assert!(!state.logged_in);
    assert_eq!(redirects.load(Ordering::SeqCst), 1);

    // Late duplicate completion is ignored and does not re-notify.
    assert!(!session.complete_check(Some(profile())));
    assert_eq!(session.readiness(), SessionReadiness::ReadyUnauthenticated);
    assert_eq!(redirects.load(Ordering::SeqCst), 1);
    assert!(guard.has_redirected());
}

#[test]
fn authenticated_resolution_allows_and_logout_redirects() {
    let bus = EventBus::new();
    let logouts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&logouts);
    let _on_logout = bus.on_logout(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let session = SessionStore::new(&bus);
    let (_guard, redirects) = counting_guard(&session);

    session.complete_check(Some(profile()));
    assert_eq!(session.readiness(), SessionReadiness::ReadyAuthenticated);
    assert_eq!(session.user().unwrap().name, "Ana");
    assert_eq!(redirects.load(Ordering::SeqCst), 0);

    session.logout();
    assert_eq!(session.readiness(), SessionReadiness::ReadyUnauthenticated);
    assert_eq!(redirects.load(Ordering::SeqCst), 1);
    assert_eq!(logouts.load(Ordering::SeqCst), 1);

    session.login(profile());
    session.logout();
    assert_eq!(redirects.load(Ordering::SeqCst), 2);
}

#[test]
fn guard_attached_after_resolution_redirects_immediately() {
    let session = SessionStore::new(&EventBus::new());
    session.complete_check(None);

    let (guard, redirects) = counting_guard(&session);
    assert_eq!(redirects.load(Ordering::SeqCst), 1);
    guard.detach();

    session.login(profile());
    session.logout();
    assert_eq!(redirects.load(Ordering::SeqCst), 1);
}

#[test]
fn check_with_api_resolves_authenticated_from_profile() {
    let session = SessionStore::new(&EventBus::new());
    let client = ApiClient::new(ScriptedTransport::new().respond(200, PROFILE_JSON));

    assert_eq!(
        session.check_with(&client),
        SessionReadiness::ReadyAuthenticated
    );
    assert_eq!(session.user(), Some(profile()));
    assert_eq!(client.transport().requests()[0].path, "/profile");
}

#[test]
fn check_with_api_failure_resolves_unauthenticated() {
    for transport in [
        ScriptedTransport::new().respond(401, r#"{"error":"unauthorized"}"#),
        ScriptedTransport::new().fail("connection refused"),
        ScriptedTransport::new().respond(200, "not json"),
    ] {
        let session = SessionStore::new(&EventBus::new());
        let client = ApiClient::new(transport);
        assert_eq!(
            session.check_with(&client),
            SessionReadiness::ReadyUnauthenticated
        );
    }
}

#[test]
fn check_with_skips_network_once_ready() {
    let session = SessionStore::new(&EventBus::new());
    session.complete_check(None);
    let client = ApiClient::new(ScriptedTransport::new().respond(200, PROFILE_JSON));

    assert_eq!(
        session.check_with(&client),
        SessionReadiness::ReadyUnauthenticated
    );
    assert!(client.transport().requests().is_empty());
}

#[test]
fn reset_returns_to_unknown_and_allows_new_check() {
    let session = SessionStore::new(&EventBus::new());
    session.complete_check(None);
    session.reset();
    assert_eq!(session.readiness(), SessionReadiness::Unknown);
    assert!(session.complete_check(Some(profile())));
    assert_eq!(session.readiness(), SessionReadiness::ReadyAuthenticated);
}

#[test]
fn racing_completions_resolve_the_session_once() {
    for _ in 0..200 {
        let session = SessionStore::new(&EventBus::new());
        let (_guard, redirects) = counting_guard(&session);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = [None, Some(profile())]
            .into_iter()
            .map(|outcome| {
                let session = session.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    session.complete_check(outcome)
                })
            })
            .collect();
        let applied: Vec<bool> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(applied.iter().filter(|won| **won).count(), 1);
        let expected_redirects = usize::from(applied[0]);
        assert_eq!(redirects.load(Ordering::SeqCst), expected_redirects);
        let expected = if applied[0] {
            SessionReadiness::ReadyUnauthenticated
        } else {
            SessionReadiness::ReadyAuthenticated
        };
        assert_eq!(session.readiness(), expected);
    }
}
