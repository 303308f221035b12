//! Push-event wiring through the full server: registration broadcasts,
//! challenge notifications and subscriber lifecycle.

mod common;

use runekeep::server::events::GameEvent;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn sink() -> (
    Box<dyn runekeep::server::events::EventSink>,
    mpsc::UnboundedReceiver<GameEvent>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Box::new(tx), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<GameEvent>) -> Vec<GameEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn first_registration_notifies_admin_subscribers() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let admin = common::login_admin(&mut server, "overseer");
    let (admin_sink, mut admin_rx) = sink();
    server.subscribe_admin(&admin, admin_sink);

    common::login_player(&mut server, "ana");
    let events = drain(&mut admin_rx);
    assert!(events.iter().any(|e| e.name == "newPlayer"
        && e.payload["username"] == serde_json::json!("ana")));

    // A repeat login is not a registration.
    let ana = server
        .store()
        .find_account_by_username("ana")
        .expect("lookup")
        .expect("present")
        .id;
    server.logout(&ana);
    common::login_player(&mut server, "ana");
    let events = drain(&mut admin_rx);
    assert!(!events.iter().any(|e| e.name == "newPlayer"));
}

#[tokio::test]
async fn challenge_flow_notifies_the_right_parties() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let admin = common::login_admin(&mut server, "overseer");
    let ana = common::login_player(&mut server, "ana");
    let bo = common::login_player(&mut server, "bo");

    let (ana_sink, mut ana_rx) = sink();
    let (bo_sink, mut bo_rx) = sink();
    let (admin_sink, mut admin_rx) = sink();
    server.subscribe_player(&ana, ana_sink);
    server.subscribe_player(&bo, bo_sink);
    server.subscribe_admin(&admin, admin_sink);

    let challenge = server.propose_challenge(&ana, &bo).expect("propose");
    let bo_events = drain(&mut bo_rx);
    assert!(bo_events.iter().any(|e| e.name == "newChallenge"));
    assert!(drain(&mut ana_rx)
        .iter()
        .all(|e| e.name == "connected"));

    server
        .respond_challenge(&challenge.id, &bo, true)
        .expect("accept");
    assert!(drain(&mut ana_rx)
        .iter()
        .any(|e| e.name == "challengeAccepted"));

    server
        .set_challenge_winner(&admin, &challenge.id, &ana)
        .expect("winner");
    assert!(drain(&mut ana_rx)
        .iter()
        .any(|e| e.name == "challengeResult"));
    assert!(drain(&mut bo_rx)
        .iter()
        .any(|e| e.name == "challengeResult"));
    assert!(drain(&mut admin_rx)
        .iter()
        .any(|e| e.name == "playerUpdate"));
}

#[tokio::test]
async fn resubscribing_replaces_the_sink() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let ana = common::login_player(&mut server, "ana");
    let bo = common::login_player(&mut server, "bo");

    let (old_sink, mut old_rx) = sink();
    let (new_sink, mut new_rx) = sink();
    server.subscribe_player(&ana, old_sink);
    server.subscribe_player(&ana, new_sink);

    server.propose_challenge(&bo, &ana).expect("propose");
    assert!(drain(&mut old_rx).iter().all(|e| e.name == "connected"));
    assert!(drain(&mut new_rx)
        .iter()
        .any(|e| e.name == "newChallenge"));
}

#[tokio::test]
async fn keepalive_reaches_live_subscribers() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let ana = common::login_player(&mut server, "ana");
    let (ana_sink, mut ana_rx) = sink();
    server.subscribe_player(&ana, ana_sink);

    server.keepalive();
    let events = drain(&mut ana_rx);
    assert!(events.iter().any(|e| e.name == "keepalive"));
}
