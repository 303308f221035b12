//! Skill auction flow through the full server: queueing, bidding events,
//! settlement and the timer path.

mod common;

use runekeep::game::GameError;
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
async fn full_auction_round_trip_with_events() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let admin = common::login_admin(&mut server, "overseer");
    let ana = common::login_player(&mut server, "ana");
    let (ana_sink, mut ana_rx) = sink();
    server.subscribe_player(&ana, ana_sink);

    // Give ana a bankroll.
    let mut account = server.store().get_account(&ana).expect("load");
    account.balances.gold = 2_000;
    server.store().put_account(account).expect("put");

    server.queue_auction(&admin, "cleave").expect("queue");
    let started = server
        .start_next_auction(&admin)
        .expect("start")
        .expect("auction live");
    assert!(drain(&mut ana_rx)
        .iter()
        .any(|e| e.name == "auction_started"));

    server
        .place_auction_bid(&ana, &started.id, 400)
        .expect("bid");
    assert!(drain(&mut ana_rx).iter().any(|e| e.name == "auction_bid"));

    let outcome = server
        .finalize_auction(&admin, &started.id)
        .expect("finalize");
    assert_eq!(outcome.auction.winner_id.as_deref(), Some(ana.as_str()));
    assert!(drain(&mut ana_rx)
        .iter()
        .any(|e| e.name == "auction_ended"));

    let account = server.store().get_account(&ana).expect("reload");
    assert_eq!(account.balances.gold, 1_600);
    assert!(server
        .store()
        .has_skill(&ana, "cleave")
        .expect("skill granted"));

    // The settled auction cannot settle twice.
    let err = server
        .finalize_auction(&admin, &started.id)
        .expect_err("already completed");
    assert!(matches!(err, GameError::Conflict(_)));
}

#[tokio::test]
async fn players_cannot_run_the_auction_house() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    common::login_admin(&mut server, "overseer");
    let ana = common::login_player(&mut server, "ana");
    assert!(server.queue_auction(&ana, "cleave").is_err());
    assert!(server.start_next_auction(&ana).is_err());
}

#[tokio::test]
async fn expiry_check_is_a_no_op_without_an_active_auction() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let admin = common::login_admin(&mut server, "overseer");
    let (admin_sink, mut admin_rx) = sink();
    server.subscribe_admin(&admin, admin_sink);
    drain(&mut admin_rx);

    server.check_auctions().expect("sweep");
    assert!(drain(&mut admin_rx).is_empty(), "no events from an idle sweep");
}

#[tokio::test]
async fn queued_auctions_wait_their_turn() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let admin = common::login_admin(&mut server, "overseer");
    server.queue_auction(&admin, "cleave").expect("queue one");
    server.queue_auction(&admin, "soulfire").expect("queue two");

    let first = server
        .start_next_auction(&admin)
        .expect("start")
        .expect("live");
    assert_eq!(first.skill_id, "cleave");
    assert!(server.start_next_auction(&admin).is_err());

    server.finalize_auction(&admin, &first.id).expect("settle");
    let second = server
        .start_next_auction(&admin)
        .expect("start again")
        .expect("next live");
    assert_eq!(second.skill_id, "soulfire");
}
