//! Guild-vs-guild tournament battles.
//!
//! Each side fields an ordered fighter list (at most four). The per-side
//! index points at the current fighter: a round win scores a point and
//! keeps the fighter on the mat, a loss advances the loser's index. The
//! battle completes the instant either index runs off the end of its list,
//! and the side with the higher score takes the win; a simultaneous
//! exhaustion with equal scores records no winner.

use log::info;

use crate::game::errors::GameError;
use crate::game::types::{
    AccountRecord, GuildBattleRecord, GuildBattleStatus, GuildRecord, GUILD_MAX_MEMBERS,
};
use crate::storage::GameStore;

/// Result of a recorded round, with completion details when the round
/// finished the battle.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub battle: GuildBattleRecord,
    pub completed: bool,
    pub winner_guild: Option<GuildRecord>,
}

fn validate_fighters(
    guild: &GuildRecord,
    fighters: &[String],
) -> Result<(), GameError> {
    if fighters.is_empty() {
        return Err(GameError::validation("fighter list must not be empty"));
    }
    if fighters.len() > GUILD_MAX_MEMBERS {
        return Err(GameError::validation(format!(
            "at most {} fighters per side",
            GUILD_MAX_MEMBERS
        )));
    }
    for fighter in fighters {
        if !guild.is_member(fighter) {
            return Err(GameError::validation(format!(
                "fighter {} is not a member of {}",
                fighter, guild.name
            )));
        }
    }
    let mut seen = fighters.to_vec();
    seen.sort();
    seen.dedup();
    if seen.len() != fighters.len() {
        return Err(GameError::validation("duplicate fighter in list"));
    }
    Ok(())
}

/// Propose a battle against another guild with an ordered fighter list.
/// Master of the challenging guild only.
pub fn propose_battle(
    store: &GameStore,
    master_id: &str,
    challenged_guild_id: &str,
    fighters: Vec<String>,
) -> Result<GuildBattleRecord, GameError> {
    let challenger = store
        .find_guild_of(master_id)?
        .ok_or_else(|| GameError::not_found("you are not in a guild"))?;
    if challenger.master_id != master_id {
        return Err(GameError::unauthorized(
            "only the guild master may start a guild battle",
        ));
    }
    let challenged = store.get_guild(challenged_guild_id)?;
    if challenger.id == challenged.id {
        return Err(GameError::validation("a guild cannot battle itself"));
    }
    validate_fighters(&challenger, &fighters)?;
    let battle = GuildBattleRecord::new(&challenger.id, &challenged.id, fighters);
    store.put_battle(&battle)?;
    Ok(battle)
}

/// Accept or decline a pending battle. Master of the challenged guild only;
/// accepting supplies that side's fighter list and opens round 1.
pub fn respond_battle(
    store: &GameStore,
    battle_id: &str,
    master_id: &str,
    accept: bool,
    fighters: Vec<String>,
) -> Result<GuildBattleRecord, GameError> {
    let mut battle = store.get_battle(battle_id)?;
    if battle.status != GuildBattleStatus::Pending {
        return Err(GameError::conflict(format!(
            "battle is not pending (status: {:?})",
            battle.status
        )));
    }
    let challenged = store.get_guild(&battle.challenged_guild)?;
    if challenged.master_id != master_id {
        return Err(GameError::unauthorized(
            "only the challenged guild's master may respond",
        ));
    }
    if !accept {
        battle.status = GuildBattleStatus::Declined;
        store.put_battle(&battle)?;
        return Ok(battle);
    }
    validate_fighters(&challenged, &fighters)?;
    battle.challenged_fighters = fighters;
    battle.status = GuildBattleStatus::InProgress;
    battle.round = 1;
    store.put_battle(&battle)?;
    Ok(battle)
}

/// Record the winner of the current round. Admin adjudicated; the winner
/// must be one of the two currently indexed fighters.
pub fn record_round_winner(
    store: &GameStore,
    actor: &AccountRecord,
    battle_id: &str,
    winner_account_id: &str,
) -> Result<RoundOutcome, GameError> {
    if !actor.is_admin() {
        return Err(GameError::unauthorized(
            "only admins may record round winners",
        ));
    }
    let mut battle = store.get_battle(battle_id)?;
    if battle.status != GuildBattleStatus::InProgress {
        return Err(GameError::conflict(format!(
            "battle is not in progress (status: {:?})",
            battle.status
        )));
    }
    let (challenger_fighter, challenged_fighter) = battle
        .current_fighters()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .ok_or_else(|| GameError::conflict("battle has no fighters left"))?;

    if winner_account_id == challenger_fighter {
        battle.challenger_score += 1;
        battle.challenged_index += 1;
    } else if winner_account_id == challenged_fighter {
        battle.challenged_score += 1;
        battle.challenger_index += 1;
    } else {
        return Err(GameError::validation(
            "winner must be one of the two current fighters",
        ));
    }
    battle.round += 1;

    let mut winner_guild = None;
    let completed = battle.either_side_exhausted();
    if completed {
        battle.status = GuildBattleStatus::Completed;
        let winning_guild_id = if battle.challenger_score > battle.challenged_score {
            Some(battle.challenger_guild.clone())
        } else if battle.challenged_score > battle.challenger_score {
            Some(battle.challenged_guild.clone())
        } else {
            None
        };
        if let Some(guild_id) = winning_guild_id {
            let mut guild = store.get_guild(&guild_id)?;
            guild.wins += 1;
            store.put_guild(guild.clone())?;
            battle.winner_guild = Some(guild_id);
            winner_guild = Some(guild);
        }
        info!(
            "guild battle {} completed {}:{} winner={:?}",
            battle.id,
            battle.challenger_score,
            battle.challenged_score,
            battle.winner_guild
        );
    }
    store.put_battle(&battle)?;

    Ok(RoundOutcome {
        battle,
        completed,
        winner_guild,
    })
}
