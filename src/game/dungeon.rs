//! Guild co-op dungeon combat.
//!
//! The party is whoever in the guild is online right now. Their stats are
//! pooled, the NPC is derived from the same global-level power formula as
//! solo content with dungeon-specific multipliers, and victory pays into
//! the guild bank, never into personal balances. Progression is
//! guild-global: one shared (floor, level) cursor for all members.

use log::debug;

use crate::game::errors::GameError;
use crate::game::npc::npc_base_power;
use crate::game::strength::equipped_pet;
use crate::game::types::AccountRecord;
use crate::storage::GameStore;

pub const MAX_DUNGEON_FLOOR: u32 = 100;

/// Floors past this point ("Demon Lord" territory) use the higher strength
/// multiplier, triple rewards, and let pets join the pool.
pub const DEMON_LORD_FLOOR: u32 = 50;

/// Fraction of NPC power the party must muster to even attempt the fight.
const MIN_POWER_RATIO: f64 = 0.4;

/// Dungeon NPC stat spread. Bosses skew toward strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DungeonNpc {
    pub strength: f64,
    pub speed: f64,
    pub intellect: f64,
}

impl DungeonNpc {
    pub fn power(&self) -> f64 {
        self.strength + self.speed + self.intellect
    }
}

/// A dungeon boss guards every 10th level.
pub fn is_dungeon_boss(level: u32) -> bool {
    level % 10 == 0
}

/// Derive the dungeon NPC at (floor, level) from the shared base-power
/// formula: 10x strength multiplier up to the Demon Lord floor, 15x past
/// it; bosses get 2x Str and 1.5x Spd/Int further scaled by
/// `1 + (floor-1)*0.5`.
pub fn dungeon_npc(floor: u32, level: u32) -> DungeonNpc {
    let base = npc_base_power(floor, level);
    let strength_multiplier = if floor > DEMON_LORD_FLOOR { 15.0 } else { 10.0 };
    let per_stat = base * strength_multiplier / 3.0;
    let mut npc = DungeonNpc {
        strength: per_stat,
        speed: per_stat,
        intellect: per_stat,
    };
    if is_dungeon_boss(level) {
        let floor_multiplier = 1.0 + (floor - 1) as f64 * 0.5;
        npc.strength *= 2.0 * floor_multiplier;
        npc.speed *= 1.5 * floor_multiplier;
        npc.intellect *= 1.5 * floor_multiplier;
    }
    npc
}

/// Pooled party contribution of one member: Str + Spd + Int + Luck, plus
/// the equipped pet's full power past the Demon Lord floor.
fn member_contribution(
    store: &GameStore,
    account: &AccountRecord,
    floor: u32,
) -> Result<(u64, u64), GameError> {
    let stats = &account.stats;
    let mut power = stats.strength as u64
        + stats.speed as u64
        + stats.intellect as u64
        + stats.luck as u64;
    if floor > DEMON_LORD_FLOOR {
        if let Some(pet) = equipped_pet(store, account)? {
            power += pet.stats.total();
        }
    }
    Ok((power, stats.luck as u64))
}

/// Resources paid into the guild bank for a dungeon win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DungeonRewards {
    pub gold: u64,
    pub soul_shards: u64,
    pub runes: u64,
}

pub fn dungeon_rewards(floor: u32, level: u32) -> DungeonRewards {
    let gl = ((floor - 1) * 100 + level) as u64;
    let multiplier = if floor > DEMON_LORD_FLOOR { 3 } else { 1 };
    DungeonRewards {
        gold: gl * 50 * multiplier,
        soul_shards: gl * 2 * multiplier,
        runes: if is_dungeon_boss(level) {
            floor as u64 * 10 * multiplier
        } else {
            0
        },
    }
}

#[derive(Debug, Clone)]
pub struct DungeonOutcome {
    pub victory: bool,
    pub guild_id: String,
    pub floor: u32,
    pub level: u32,
    pub boss: bool,
    pub party: Vec<String>,
    pub party_power: f64,
    pub npc_power: f64,
    pub rewards: Option<DungeonRewards>,
}

/// Resolve the guild's next dungeon fight at its shared cursor.
///
/// `online_ids` is the session registry's view of who is connected; only
/// online guild members join the pool. The fight needs at least 40% of the
/// NPC's power to attempt, and the win roll is
/// `party_power * (1 + luck*0.01) * luck_roll > npc_power * 0.8`.
pub fn resolve_dungeon_battle(
    store: &GameStore,
    guild_id: &str,
    online_ids: &[String],
    luck_roll: f64,
) -> Result<DungeonOutcome, GameError> {
    let mut guild = store.get_guild(guild_id)?;
    let floor = guild.dungeon_floor;
    let level = guild.dungeon_level;

    let party: Vec<String> = guild
        .members
        .iter()
        .filter(|m| online_ids.contains(m))
        .cloned()
        .collect();
    if party.is_empty() {
        return Err(GameError::conflict(
            "no guild members are online to fight",
        ));
    }

    let mut party_power: u64 = 0;
    let mut party_luck: u64 = 0;
    for member_id in &party {
        let account = store.get_account(member_id)?;
        let (power, luck) = member_contribution(store, &account, floor)?;
        party_power += power;
        party_luck += luck;
    }
    let party_power = party_power as f64;

    let npc = dungeon_npc(floor, level);
    let npc_power = npc.power();

    if party_power < npc_power * MIN_POWER_RATIO {
        return Err(GameError::conflict(format!(
            "party too weak to attempt: {:.0} power, needs at least {:.0}",
            party_power,
            npc_power * MIN_POWER_RATIO
        )));
    }

    let roll = party_power * (1.0 + party_luck as f64 * 0.01) * luck_roll;
    let victory = roll > npc_power * 0.8;
    let boss = is_dungeon_boss(level);
    let mut rewards = None;

    if victory {
        let earned = dungeon_rewards(floor, level);
        guild.bank.gold += earned.gold;
        guild.bank.soul_shards += earned.soul_shards;
        guild.bank.runes += earned.runes;

        if level >= 100 {
            if floor < MAX_DUNGEON_FLOOR {
                guild.dungeon_floor = floor + 1;
                guild.dungeon_level = 1;
            }
        } else {
            guild.dungeon_level = level + 1;
        }
        store.put_guild(guild.clone())?;
        rewards = Some(earned);
    }

    debug!(
        "guild {} dungeon floor {} level {}: {} ({:.0} vs {:.0}, {} fighters)",
        guild.name,
        floor,
        level,
        if victory { "win" } else { "loss" },
        party_power,
        npc_power,
        party.len()
    );

    Ok(DungeonOutcome {
        victory,
        guild_id: guild.id,
        floor,
        level,
        boss,
        party,
        party_power,
        npc_power,
        rewards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::{GuildRecord, Role, StatBlock};
    use tempfile::TempDir;

    fn setup() -> (TempDir, GameStore, GuildRecord, AccountRecord) {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStore::open(dir.path()).expect("store");
        let mut account = AccountRecord::new("rook", Role::Player);
        account.stats = StatBlock::uniform(10);
        store.put_account(account.clone()).expect("put");
        let guild = GuildRecord::new("Night Watch", &account.id);
        store.put_guild(guild.clone()).expect("guild");
        (dir, store, guild, account)
    }

    #[test]
    fn boss_levels_are_every_tenth() {
        assert!(is_dungeon_boss(10));
        assert!(is_dungeon_boss(100));
        assert!(!is_dungeon_boss(11));
    }

    #[test]
    fn boss_stats_scale_with_floor() {
        let normal = dungeon_npc(1, 5);
        let boss = dungeon_npc(1, 10);
        assert!(boss.strength > normal.strength);
        // Floor 1 boss: floor multiplier is 1, so Str doubles exactly.
        let base_at_ten = npc_base_power(1, 10) * 10.0 / 3.0;
        assert!((boss.strength - base_at_ten * 2.0).abs() < 1e-6);
        assert!((boss.speed - base_at_ten * 1.5).abs() < 1e-6);
    }

    #[test]
    fn demon_lord_floors_use_higher_multiplier() {
        let below = dungeon_npc(50, 5).power() / npc_base_power(50, 5);
        let above = dungeon_npc(51, 5).power() / npc_base_power(51, 5);
        assert!((below - 10.0).abs() < 1e-9);
        assert!((above - 15.0).abs() < 1e-9);
    }

    #[test]
    fn rewards_triple_past_demon_lord() {
        let shallow = dungeon_rewards(1, 5);
        assert_eq!(shallow.gold, 250);
        let deep = dungeon_rewards(51, 5);
        assert_eq!(deep.gold, (50 * 100 + 5) as u64 * 50 * 3);
    }

    #[test]
    fn needs_online_members() {
        let (_dir, store, guild, _account) = setup();
        let err =
            resolve_dungeon_battle(&store, &guild.id, &[], 0.5).expect_err("nobody online");
        assert!(matches!(err, GameError::Conflict(_)));
    }

    #[test]
    fn too_weak_party_cannot_attempt() {
        let (_dir, store, mut guild, account) = setup();
        guild.dungeon_floor = 2;
        guild.dungeon_level = 50;
        store.put_guild(guild.clone()).expect("put");
        let online = vec![account.id.clone()];
        let err = resolve_dungeon_battle(&store, &guild.id, &online, 0.9)
            .expect_err("40% floor");
        assert!(matches!(err, GameError::Conflict(_)));
    }

    #[test]
    fn win_pays_the_bank_and_advances_shared_cursor() {
        let (_dir, store, guild, mut account) = setup();
        account.stats = StatBlock::uniform(50);
        store.put_account(account.clone()).expect("put");
        let online = vec![account.id.clone()];
        let outcome =
            resolve_dungeon_battle(&store, &guild.id, &online, 0.99).expect("battle");
        assert!(outcome.victory);
        let guild = store.get_guild(&guild.id).expect("reload");
        assert_eq!(guild.bank.gold, 50);
        assert_eq!(guild.dungeon_level, 2);
        // Personal balances untouched.
        let account = store.get_account(&account.id).expect("reload");
        assert_eq!(account.balances.gold, 500);
    }

    #[test]
    fn loss_changes_nothing() {
        let (_dir, store, guild, mut account) = setup();
        account.stats = StatBlock::uniform(50);
        store.put_account(account.clone()).expect("put");
        let online = vec![account.id.clone()];
        let outcome =
            resolve_dungeon_battle(&store, &guild.id, &online, 0.0).expect("battle");
        assert!(!outcome.victory);
        let guild = store.get_guild(&guild.id).expect("reload");
        assert_eq!(guild.bank.gold, 0);
        assert_eq!(guild.dungeon_level, 1);
    }
}
