//! Quest templates, assignment and reward payout.
//!
//! Quests here are admin-driven: an admin defines a template, assigns it to
//! a player, and later marks the assignment complete, which credits the
//! rewards exactly once.

use log::info;

use crate::game::catalog::find_catalog_item;
use crate::game::errors::GameError;
use crate::game::inventory::grant_item;
use crate::game::types::{
    AccountRecord, QuestAssignmentRecord, QuestAssignmentStatus, QuestRecord, QuestRewards,
};
use crate::storage::GameStore;

/// Define a new quest template. Admin only.
pub fn create_quest(
    store: &GameStore,
    actor: &AccountRecord,
    name: &str,
    description: &str,
    rewards: QuestRewards,
) -> Result<QuestRecord, GameError> {
    if !actor.is_admin() {
        return Err(GameError::unauthorized("only admins may create quests"));
    }
    if name.trim().is_empty() {
        return Err(GameError::validation("quest name must not be empty"));
    }
    for item_id in &rewards.items {
        if find_catalog_item(item_id).is_none() {
            return Err(GameError::not_found(format!(
                "reward item not in catalog: {}",
                item_id
            )));
        }
    }
    let quest = QuestRecord::new(name.trim(), description).with_rewards(rewards);
    store.put_quest(&quest)?;
    Ok(quest)
}

/// Assign a quest to a player. One live assignment per (quest, account);
/// re-assignment after completion is allowed.
pub fn assign_quest(
    store: &GameStore,
    actor: &AccountRecord,
    quest_id: &str,
    account_id: &str,
) -> Result<QuestAssignmentRecord, GameError> {
    if !actor.is_admin() {
        return Err(GameError::unauthorized("only admins may assign quests"));
    }
    store.get_quest(quest_id)?;
    store.get_account(account_id)?;
    if let Some(existing) = store.find_assignment(account_id, quest_id)? {
        if existing.status == QuestAssignmentStatus::Assigned {
            return Err(GameError::conflict("that quest is already assigned"));
        }
    }
    let assignment = QuestAssignmentRecord::new(quest_id, account_id, &actor.id);
    store.put_assignment(&assignment)?;
    Ok(assignment)
}

/// Mark an assignment complete and pay out. The Assigned -> Completed
/// transition is the guard: rewards are credited exactly once.
pub fn complete_assignment(
    store: &GameStore,
    actor: &AccountRecord,
    quest_id: &str,
    account_id: &str,
) -> Result<QuestAssignmentRecord, GameError> {
    if !actor.is_admin() {
        return Err(GameError::unauthorized("only admins may complete quests"));
    }
    let mut assignment = store
        .find_assignment(account_id, quest_id)?
        .ok_or_else(|| GameError::not_found("no such quest assignment"))?;
    if assignment.status != QuestAssignmentStatus::Assigned {
        return Err(GameError::conflict("quest assignment already completed"));
    }
    let quest = store.get_quest(quest_id)?;

    let mut account = store.get_account(account_id)?;
    account.balances.gold += quest.rewards.gold;
    account.balances.soul_shards += quest.rewards.soul_shards;
    account.balances.training_points += quest.rewards.training_points;
    store.put_account(account)?;
    for item_id in &quest.rewards.items {
        grant_item(store, account_id, item_id)?;
    }

    assignment.status = QuestAssignmentStatus::Completed;
    assignment.completed_at = Some(chrono::Utc::now());
    store.put_assignment(&assignment)?;
    info!(
        "quest '{}' completed by {} (+{} gold)",
        quest.name, account_id, quest.rewards.gold
    );
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Role;
    use tempfile::TempDir;

    struct Fixture {
        store: GameStore,
        admin: AccountRecord,
        player: AccountRecord,
        _dir: TempDir,
    }

    fn setup() -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStore::open(dir.path()).expect("store");
        let admin = AccountRecord::new("keeper", Role::Admin);
        let player = AccountRecord::new("pia", Role::Player);
        store.put_account(admin.clone()).expect("put");
        store.put_account(player.clone()).expect("put");
        Fixture {
            store,
            admin,
            player,
            _dir: dir,
        }
    }

    fn sample_rewards() -> QuestRewards {
        QuestRewards {
            gold: 300,
            soul_shards: 10,
            training_points: 25,
            items: vec!["rusty_blade".to_string()],
        }
    }

    #[test]
    fn players_cannot_create_quests() {
        let fx = setup();
        let err = create_quest(
            &fx.store,
            &fx.player,
            "Rat Patrol",
            "Clear the cellar.",
            QuestRewards::default(),
        )
        .expect_err("players barred");
        assert!(matches!(err, GameError::Unauthorized(_)));
    }

    #[test]
    fn completion_pays_rewards_exactly_once() {
        let fx = setup();
        let quest = create_quest(
            &fx.store,
            &fx.admin,
            "Rat Patrol",
            "Clear the cellar.",
            sample_rewards(),
        )
        .expect("quest");
        assign_quest(&fx.store, &fx.admin, &quest.id, &fx.player.id).expect("assign");

        complete_assignment(&fx.store, &fx.admin, &quest.id, &fx.player.id)
            .expect("complete");
        let player = fx.store.get_account(&fx.player.id).expect("reload");
        assert_eq!(player.balances.gold, 800);
        assert_eq!(player.balances.soul_shards, 10);
        assert_eq!(fx.store.list_items(&fx.player.id).expect("items").len(), 1);

        let err = complete_assignment(&fx.store, &fx.admin, &quest.id, &fx.player.id)
            .expect_err("already completed");
        assert!(matches!(err, GameError::Conflict(_)));
        let player = fx.store.get_account(&fx.player.id).expect("reload");
        assert_eq!(player.balances.gold, 800);
    }

    #[test]
    fn duplicate_live_assignment_conflicts_but_reassign_after_completion_works() {
        let fx = setup();
        let quest = create_quest(
            &fx.store,
            &fx.admin,
            "Rat Patrol",
            "Clear the cellar.",
            QuestRewards::default(),
        )
        .expect("quest");
        assign_quest(&fx.store, &fx.admin, &quest.id, &fx.player.id).expect("assign");
        assert!(assign_quest(&fx.store, &fx.admin, &quest.id, &fx.player.id).is_err());
        complete_assignment(&fx.store, &fx.admin, &quest.id, &fx.player.id)
            .expect("complete");
        assign_quest(&fx.store, &fx.admin, &quest.id, &fx.player.id).expect("reassign");
    }
}
