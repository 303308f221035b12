//! Cross-system economy invariants: trades, shop flow, pet feeding and
//! quest payouts, all through the full server.

mod common;

use runekeep::game::types::{Element, EquipSlot, QuestRewards, TradeOfferKind};
use runekeep::game::GameError;
use tempfile::TempDir;

#[tokio::test]
async fn traded_items_change_hands_exactly_once() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let ana = common::login_player(&mut server, "ana");
    let bo = common::login_player(&mut server, "bo");

    let blade = server.buy_item(&ana, "rusty_blade").expect("buy");
    server
        .equip_item(&ana, &blade.id, EquipSlot::Weapon)
        .expect("equip");

    let trade = server.open_trade(&ana, &bo).expect("open");
    server
        .add_trade_offer(&trade.id, &ana, TradeOfferKind::Item, &blade.id)
        .expect("offer");
    server.accept_trade(&trade.id, &ana).expect("ana accepts");
    let done = server.accept_trade(&trade.id, &bo).expect("bo accepts");
    assert_eq!(
        done.status,
        runekeep::game::types::TradeStatus::Completed
    );

    // The blade moved, and ana's equipment no longer references it.
    assert!(server
        .store()
        .find_item(&bo, &blade.id)
        .expect("find")
        .is_some());
    let ana_account = server.store().get_account(&ana).expect("reload");
    assert!(ana_account.equipment.is_empty());

    // Accepting again fails; the item does not move twice.
    assert!(server.accept_trade(&trade.id, &bo).is_err());
}

#[tokio::test]
async fn offer_changes_invalidate_consent() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let ana = common::login_player(&mut server, "ana");
    let bo = common::login_player(&mut server, "bo");
    let blade = server.buy_item(&ana, "rusty_blade").expect("buy");

    let trade = server.open_trade(&ana, &bo).expect("open");
    server.accept_trade(&trade.id, &bo).expect("bo accepts");
    let updated = server
        .add_trade_offer(&trade.id, &ana, TradeOfferKind::Item, &blade.id)
        .expect("offer");
    assert!(!updated.recipient_accepted, "consent reset by the new offer");

    // Execution now needs both flags again.
    let after_ana = server.accept_trade(&trade.id, &ana).expect("ana accepts");
    assert_eq!(
        after_ana.status,
        runekeep::game::types::TradeStatus::Pending
    );
}

#[tokio::test]
async fn shop_and_training_keep_balances_consistent() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let ana = common::login_player(&mut server, "ana");
    let blade = server.buy_item(&ana, "rusty_blade").expect("buy");
    let account = server.store().get_account(&ana).expect("reload");
    assert_eq!(account.balances.gold, 400);

    // No training points yet.
    let err = server
        .train_item(&ana, &blade.id, runekeep::game::types::StatKind::Strength, 5)
        .expect_err("broke");
    assert!(matches!(err, GameError::InsufficientFunds { .. }));

    let refund = server.sell_item(&ana, &blade.id).expect("sell");
    assert_eq!(refund, 100);
    let account = server.store().get_account(&ana).expect("reload");
    assert_eq!(account.balances.gold, 500);
    assert!(server.store().list_items(&ana).expect("items").is_empty());
}

#[tokio::test]
async fn pet_feeding_spends_the_pet_exp_balance() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let ana = common::login_player(&mut server, "ana");
    let pet = server
        .create_pet_egg(&ana, "Cinder", Element::Fire)
        .expect("egg");

    let err = server.feed_pet(&ana, &pet.id, 100).expect_err("no balance");
    assert!(matches!(err, GameError::InsufficientFunds { .. }));

    let mut account = server.store().get_account(&ana).expect("load");
    account.balances.pet_exp = 1_500;
    server.store().put_account(account).expect("put");

    let fed = server.feed_pet(&ana, &pet.id, 1_200).expect("feed");
    assert_eq!(fed.exp, 1_200);
    assert_eq!(fed.tier, runekeep::game::types::PetTier::Hatchling);
    let account = server.store().get_account(&ana).expect("reload");
    assert_eq!(account.balances.pet_exp, 300);
}

#[tokio::test]
async fn quest_rewards_are_credited_exactly_once() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let admin = common::login_admin(&mut server, "overseer");
    let ana = common::login_player(&mut server, "ana");

    let quest = server
        .create_quest(
            &admin,
            "Rat Patrol",
            "Clear the cellar.",
            QuestRewards {
                gold: 300,
                soul_shards: 5,
                training_points: 20,
                items: vec![],
            },
        )
        .expect("quest");
    server.assign_quest(&admin, &quest.id, &ana).expect("assign");
    server
        .complete_quest(&admin, &quest.id, &ana)
        .expect("complete");

    let account = server.store().get_account(&ana).expect("reload");
    assert_eq!(account.balances.gold, 800);
    assert_eq!(account.balances.soul_shards, 5);
    assert_eq!(account.balances.training_points, 20);

    assert!(server.complete_quest(&admin, &quest.id, &ana).is_err());
    let account = server.store().get_account(&ana).expect("reload");
    assert_eq!(account.balances.gold, 800);
}

#[tokio::test]
async fn strength_moves_by_exactly_the_equipped_item() {
    let dir = TempDir::new().expect("tempdir");
    let mut server = common::test_server(&dir).await;

    let ana = common::login_player(&mut server, "ana");
    let account = server.store().get_account(&ana).expect("load");
    let bare = runekeep::game::strength::account_strength(server.store(), &account)
        .expect("strength");

    let blade = server.buy_item(&ana, "rusty_blade").expect("buy");
    let account = server
        .equip_item(&ana, &blade.id, EquipSlot::Weapon)
        .expect("equip");
    let armed = runekeep::game::strength::account_strength(server.store(), &account)
        .expect("strength");
    assert_eq!(armed - bare, blade.stats.total());
}
