//! Guild membership, invites, the shared bank, and guild levels.
//!
//! A guild holds at most four members and exactly one master, who is always
//! a member and the only account with management rights. An account belongs
//! to at most one guild; accepting any invite consumes every other
//! outstanding invite the account had.

use log::info;

use crate::game::errors::GameError;
use crate::game::types::{
    AccountRecord, BankResource, GuildInviteRecord, GuildRecord, GUILD_MAX_LEVEL,
};
use crate::logutil::escape_log;
use crate::storage::GameStore;
use crate::validation::validate_guild_name;

/// Gold cost to raise the guild from its current level to the next.
pub fn upgrade_cost(current_level: u8) -> u64 {
    current_level as u64 * 10_000
}

/// Found a new guild with the creator as master.
pub fn create_guild(
    store: &GameStore,
    founder_id: &str,
    name: &str,
) -> Result<GuildRecord, GameError> {
    let validated = validate_guild_name(name)
        .map_err(|e| GameError::validation(format!("invalid guild name: {}", e)))?;
    store.get_account(founder_id)?;
    if store.find_guild_by_name(&validated)?.is_some() {
        return Err(GameError::conflict(format!(
            "guild name '{}' is already taken",
            validated
        )));
    }
    if store.find_guild_of(founder_id)?.is_some() {
        return Err(GameError::conflict("you already belong to a guild"));
    }
    let guild = GuildRecord::new(&validated, founder_id);
    store.put_guild(guild.clone())?;
    // Founding a guild consumes any invites the founder was sitting on.
    store.clear_invites(founder_id)?;
    info!("guild '{}' founded by {}", escape_log(&validated), founder_id);
    Ok(guild)
}

/// Invite an account into the guild. Master only; one outstanding invite
/// per (guild, account) pair.
pub fn invite(
    store: &GameStore,
    guild_id: &str,
    master_id: &str,
    target_id: &str,
) -> Result<GuildInviteRecord, GameError> {
    let guild = store.get_guild(guild_id)?;
    if guild.master_id != master_id {
        return Err(GameError::unauthorized(
            "only the guild master may send invites",
        ));
    }
    if guild.is_full() {
        return Err(GameError::conflict("the guild is already full"));
    }
    store.get_account(target_id)?;
    if store.find_guild_of(target_id)?.is_some() {
        return Err(GameError::conflict("that player already belongs to a guild"));
    }
    if store.find_invite(target_id, guild_id)?.is_some() {
        return Err(GameError::conflict("an invite is already outstanding"));
    }
    let record = GuildInviteRecord::new(guild_id, target_id, master_id);
    store.put_invite(&record)?;
    Ok(record)
}

/// Accept or decline an invite. Either way the invite is consumed; an
/// accept also consumes every other invite the account held.
pub fn respond_invite(
    store: &GameStore,
    account_id: &str,
    guild_id: &str,
    accept: bool,
) -> Result<Option<GuildRecord>, GameError> {
    let invite = store
        .find_invite(account_id, guild_id)?
        .ok_or_else(|| GameError::not_found("no invite from that guild"))?;

    if !accept {
        store.remove_invite(account_id, guild_id)?;
        return Ok(None);
    }

    let mut guild = store.get_guild(&invite.guild_id)?;
    if guild.is_full() {
        store.remove_invite(account_id, guild_id)?;
        return Err(GameError::conflict("the guild filled up in the meantime"));
    }
    if store.find_guild_of(account_id)?.is_some() {
        store.remove_invite(account_id, guild_id)?;
        return Err(GameError::conflict("you already belong to a guild"));
    }
    guild.members.push(account_id.to_string());
    store.put_guild(guild.clone())?;
    store.clear_invites(account_id)?;
    info!("{} joined guild '{}'", account_id, escape_log(&guild.name));
    Ok(Some(guild))
}

/// Leave the guild. The master may only leave as the last member, which
/// dissolves the guild.
pub fn leave_guild(store: &GameStore, account_id: &str) -> Result<(), GameError> {
    let mut guild = store
        .find_guild_of(account_id)?
        .ok_or_else(|| GameError::not_found("you are not in a guild"))?;
    if guild.master_id == account_id {
        if guild.members.len() > 1 {
            return Err(GameError::conflict(
                "the guild master cannot leave while members remain",
            ));
        }
        store.delete_guild(&guild.id)?;
        info!("guild '{}' dissolved", escape_log(&guild.name));
        return Ok(());
    }
    guild.members.retain(|m| m != account_id);
    store.put_guild(guild)?;
    Ok(())
}

/// Kick a member. Master only, and never the master themself.
pub fn kick_member(
    store: &GameStore,
    master_id: &str,
    target_id: &str,
) -> Result<GuildRecord, GameError> {
    let mut guild = store
        .find_guild_of(master_id)?
        .ok_or_else(|| GameError::not_found("you are not in a guild"))?;
    if guild.master_id != master_id {
        return Err(GameError::unauthorized(
            "only the guild master may kick members",
        ));
    }
    if target_id == master_id {
        return Err(GameError::validation("the master cannot kick themself"));
    }
    if !guild.is_member(target_id) {
        return Err(GameError::not_found("that player is not a guild member"));
    }
    guild.members.retain(|m| m != target_id);
    store.put_guild(guild.clone())?;
    Ok(guild)
}

fn bank_slot<'a>(guild: &'a mut GuildRecord, resource: BankResource) -> &'a mut u64 {
    match resource {
        BankResource::Gold => &mut guild.bank.gold,
        BankResource::SoulShards => &mut guild.bank.soul_shards,
        BankResource::Runes => &mut guild.bank.runes,
    }
}

fn personal_slot<'a>(account: &'a mut AccountRecord, resource: BankResource) -> &'a mut u64 {
    match resource {
        BankResource::Gold => &mut account.balances.gold,
        BankResource::SoulShards => &mut account.balances.soul_shards,
        BankResource::Runes => &mut account.balances.runes,
    }
}

/// Move resources from a member's personal balance into the guild bank.
pub fn deposit(
    store: &GameStore,
    account_id: &str,
    resource: BankResource,
    amount: u64,
) -> Result<GuildRecord, GameError> {
    if amount == 0 {
        return Err(GameError::validation("deposit amount must be positive"));
    }
    let mut guild = store
        .find_guild_of(account_id)?
        .ok_or_else(|| GameError::not_found("you are not in a guild"))?;
    let mut account = store.get_account(account_id)?;
    let balance = personal_slot(&mut account, resource);
    if *balance < amount {
        return Err(GameError::InsufficientFunds {
            required: amount,
            available: *balance,
        });
    }
    *balance -= amount;
    *bank_slot(&mut guild, resource) += amount;
    store.put_account(account)?;
    store.put_guild(guild.clone())?;
    Ok(guild)
}

/// Withdraw from the bank into the master's personal balance. Master only.
pub fn withdraw(
    store: &GameStore,
    master_id: &str,
    resource: BankResource,
    amount: u64,
) -> Result<GuildRecord, GameError> {
    if amount == 0 {
        return Err(GameError::validation("withdrawal amount must be positive"));
    }
    let mut guild = store
        .find_guild_of(master_id)?
        .ok_or_else(|| GameError::not_found("you are not in a guild"))?;
    if guild.master_id != master_id {
        return Err(GameError::unauthorized(
            "only the guild master may withdraw from the bank",
        ));
    }
    let pool = bank_slot(&mut guild, resource);
    if *pool < amount {
        return Err(GameError::InsufficientFunds {
            required: amount,
            available: *pool,
        });
    }
    *pool -= amount;
    let mut account = store.get_account(master_id)?;
    *personal_slot(&mut account, resource) += amount;
    store.put_account(account)?;
    store.put_guild(guild.clone())?;
    Ok(guild)
}

/// Raise the guild level by one, paid from the bank. Levels 1-10,
/// monotonic.
pub fn upgrade_guild(store: &GameStore, master_id: &str) -> Result<GuildRecord, GameError> {
    let mut guild = store
        .find_guild_of(master_id)?
        .ok_or_else(|| GameError::not_found("you are not in a guild"))?;
    if guild.master_id != master_id {
        return Err(GameError::unauthorized(
            "only the guild master may upgrade the guild",
        ));
    }
    if guild.level >= GUILD_MAX_LEVEL {
        return Err(GameError::conflict("the guild is already at max level"));
    }
    let cost = upgrade_cost(guild.level);
    if guild.bank.gold < cost {
        return Err(GameError::InsufficientFunds {
            required: cost,
            available: guild.bank.gold,
        });
    }
    guild.bank.gold -= cost;
    guild.level += 1;
    store.put_guild(guild.clone())?;
    info!(
        "guild '{}' upgraded to level {}",
        escape_log(&guild.name),
        guild.level
    );
    Ok(guild)
}
