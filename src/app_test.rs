use super::*;
use crate::api::test_helpers::MockBackend;
use crate::store::MemoryCredentialStore;
use crate::surface::test_helpers::{RecordingSurface, SurfaceEvent};
use crate::types::{AuthResponse, Credential};

struct Harness {
    backend: Arc<MockBackend>,
    store: Arc<MemoryCredentialStore>,
    surface: Arc<RecordingSurface>,
    app: ChatApp,
}

fn harness_with(store: MemoryCredentialStore) -> Harness {
    let backend = Arc::new(MockBackend::new());
    let store = Arc::new(store);
    let surface = Arc::new(RecordingSurface::new());
    let app = ChatApp::new(backend.clone(), store.clone(), surface.clone(), Duration::from_secs(3));
    Harness { backend, store, surface, app }
}

fn logged_in() -> Harness {
    let h = harness_with(MemoryCredentialStore::with_credential(Credential::new("alice", "t1")));
    h.backend.push_auth(Ok(AuthResponse::default()));
    h
}

// =============================================================================
// InputCommand
// =============================================================================

#[test]
fn parse_recognises_slash_commands() {
    assert_eq!(InputCommand::parse("/refresh"), InputCommand::Refresh);
    assert_eq!(InputCommand::parse(" /logout "), InputCommand::Logout);
    assert_eq!(InputCommand::parse("/quit"), InputCommand::Quit);
    assert_eq!(InputCommand::parse("/exit"), InputCommand::Quit);
}

#[test]
fn parse_treats_everything_else_as_message() {
    assert_eq!(InputCommand::parse("hello /refresh"), InputCommand::Send("hello /refresh".into()));
    assert_eq!(InputCommand::parse(""), InputCommand::Send(String::new()));
}

// =============================================================================
// gating
// =============================================================================

#[tokio::test(start_paused = true)]
async fn start_without_credential_never_polls() {
    let mut h = harness_with(MemoryCredentialStore::new());
    assert!(!h.app.start().await);
    assert!(!h.app.is_polling());

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.backend.fetch_count(), 0);
    assert_eq!(h.surface.count(&SurfaceEvent::RedirectToLogin), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_stored_credential_redirects_and_clears() {
    let mut h = harness_with(MemoryCredentialStore::with_credential(Credential::new("alice", "t1")));
    h.backend.push_auth(Err(ChatError::Auth("Token is invalid".into())));

    assert!(!h.app.start().await);
    assert!(h.store.load().await.unwrap().is_none());
    assert_eq!(h.surface.count(&SurfaceEvent::RedirectToLogin), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(h.backend.fetch_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn validated_session_starts_polling() {
    let mut h = logged_in();
    assert!(h.app.start().await);
    assert!(h.app.is_polling());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(h.backend.fetch_count(), 1);
    h.app.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn activate_twice_keeps_single_poller() {
    let mut h = logged_in();
    assert!(h.app.start().await);
    h.app.activate();

    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert_eq!(h.backend.fetch_count(), 2);
    h.app.shutdown().await;
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test(start_paused = true)]
async fn logout_cancels_poller_and_clears_credential() {
    let mut h = logged_in();
    assert!(h.app.start().await);
    tokio::time::sleep(Duration::from_millis(100)).await;

    h.app.logout().await.unwrap();
    assert!(!h.app.is_polling());
    assert!(h.store.load().await.unwrap().is_none());
    assert_eq!(h.surface.count(&SurfaceEvent::RedirectToLogin), 1);

    let polls = h.backend.fetch_count();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.backend.fetch_count(), polls);
}

// =============================================================================
// run
// =============================================================================

#[tokio::test(start_paused = true)]
async fn run_sends_lines_and_stops_on_quit() {
    let mut h = logged_in();
    let input: &[u8] = b"hello\n   \n/refresh\n/quit\nnever sent\n";

    h.app.run(input).await.unwrap();

    let sent: Vec<_> = h.backend.send_calls.lock().unwrap().iter().map(|s| s.content.clone()).collect();
    assert_eq!(sent, vec!["hello".to_owned()]);
    assert!(!h.app.is_polling());
    // Blank line is rejected client-side with a notice.
    assert_eq!(h.surface.notices().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn run_logout_command_ends_session() {
    let mut h = logged_in();
    h.app.run(&b"/logout\n"[..]).await.unwrap();

    assert!(!h.app.gate().state().is_authenticated());
    assert!(h.store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn run_without_session_is_auth_error() {
    let mut h = harness_with(MemoryCredentialStore::new());
    let err = h.app.run(&b"hello\n"[..]).await.unwrap_err();
    assert!(matches!(err, ChatError::Auth(_)));
    assert_eq!(h.backend.send_count(), 0);
}

#[tokio::test]
async fn refresh_failure_is_reported() {
    let mut h = logged_in();
    h.backend.fail_fetch.store(true, std::sync::atomic::Ordering::SeqCst);

    let control = h.app.handle(InputCommand::Refresh).await.unwrap();
    assert_eq!(control, LoopControl::Continue);
    assert_eq!(h.surface.notices().len(), 1);
}
