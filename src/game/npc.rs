//! Solo NPC combat resolution.
//!
//! The power model is deterministic: NPC power interpolates a per-floor
//! range over levels 1-100, elemental immunities are a pure arithmetic
//! function of the global level, and the only random input (the luck roll)
//! is passed in by the caller so outcomes are exactly reproducible.

use log::debug;

use crate::game::errors::GameError;
use crate::game::strength::{equipped_items, equipped_pet};
use crate::game::types::{
    AccountRecord, Element, ItemRecord, PetRecord, Rank, ELEMENTS,
};
use crate::storage::GameStore;

/// Per-floor [min, max] power ranges for floors 1-10. Floors beyond the
/// table continue the last range multiplied by 100 per floor.
const SOLO_POWER_TABLE: [(f64, f64); 10] = [
    (1.0, 5_000.0),
    (5_000.0, 20_000.0),
    (20_000.0, 60_000.0),
    (60_000.0, 150_000.0),
    (150_000.0, 400_000.0),
    (400_000.0, 1_000_000.0),
    (1_000_000.0, 2_500_000.0),
    (2_500_000.0, 6_000_000.0),
    (6_000_000.0, 15_000_000.0),
    (15_000_000.0, 40_000_000.0),
];

const BOSS_POWER_FACTOR: f64 = 1.2;
pub const MAX_SOLO_FLOOR: u32 = 200;

/// Flattened progression index.
pub fn global_level(floor: u32, level: u32) -> u32 {
    (floor - 1) * 100 + level
}

/// A solo boss guards level 100 of every floor.
pub fn is_boss_level(level: u32) -> bool {
    level == 100
}

/// Base power range for a floor, extrapolating past the table.
fn floor_power_range(floor: u32) -> (f64, f64) {
    let idx = (floor.max(1) as usize - 1).min(SOLO_POWER_TABLE.len() - 1);
    let (min, max) = SOLO_POWER_TABLE[idx];
    let extra_floors = floor.saturating_sub(SOLO_POWER_TABLE.len() as u32);
    if extra_floors == 0 {
        (min, max)
    } else {
        let factor = 100f64.powi(extra_floors as i32);
        (min * factor, max * factor)
    }
}

/// Raw interpolated power at (floor, level), no boss factor. Shared with
/// the guild dungeon, which applies its own multipliers.
pub fn npc_base_power(floor: u32, level: u32) -> f64 {
    let level = level.clamp(1, 100);
    let (min, max) = floor_power_range(floor);
    min + (max - min) * ((level - 1) as f64 / 99.0)
}

/// NPC power at (floor, level): linear interpolation of the floor's range
/// over levels 1-100, with the boss factor applied at level 100.
pub fn solo_npc_power(floor: u32, level: u32) -> f64 {
    let power = npc_base_power(floor, level);
    if is_boss_level(level.clamp(1, 100)) {
        power * BOSS_POWER_FACTOR
    } else {
        power
    }
}

/// Elemental immunities for the NPC at (floor, level).
///
/// Below global level 101 there are none. Past that, the count grows with
/// the floor (capped at 5) and membership is chosen by probing the
/// canonical element list at `(gl*7 + k*13) mod 18`: pure arithmetic, no
/// PRNG, so identical inputs always produce identical sets.
pub fn npc_immunities(floor: u32, level: u32) -> Vec<Element> {
    let gl = global_level(floor, level);
    if gl < 101 {
        return Vec::new();
    }
    let count = (1 + (floor.saturating_sub(2)) / 2).min(5) as usize;
    let mut picked: Vec<usize> = Vec::with_capacity(count);
    let mut k: u32 = 0;
    while picked.len() < count {
        let idx = ((gl as u64 * 7 + k as u64 * 13) % ELEMENTS.len() as u64) as usize;
        if !picked.contains(&idx) {
            picked.push(idx);
        }
        k += 1;
    }
    picked.into_iter().map(|i| ELEMENTS[i]).collect()
}

/// Minimum rank required to fight at a global level.
pub fn required_rank(gl: u32) -> Rank {
    match gl {
        0..=100 => Rank::Novice,
        101..=300 => Rank::Bronze,
        301..=500 => Rank::Silver,
        501..=700 => Rank::Gold,
        701..=900 => Rank::Platinum,
        901..=1100 => Rank::Diamond,
        _ => Rank::Legend,
    }
}

/// Fixed-formula rewards for a win at (floor, level), scaled linearly by
/// global level. Runes only drop from bosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleRewards {
    pub gold: u64,
    pub training_points: u64,
    pub soul_shards: u64,
    pub pet_exp: u64,
    pub runes: u64,
}

pub fn battle_rewards(floor: u32, level: u32) -> BattleRewards {
    let gl = global_level(floor, level) as u64;
    BattleRewards {
        gold: gl * 50,
        training_points: gl * 10,
        soul_shards: gl * 2,
        pet_exp: gl * 100,
        runes: if is_boss_level(level) {
            floor as u64 * 10
        } else {
            0
        },
    }
}

/// Pet combat contribution against a given immunity set: the elemental
/// component is zeroed when any of the pet's elements is on the list.
pub fn pet_power_against(pet: &PetRecord, immunities: &[Element]) -> u64 {
    let blocked = pet.all_elements().iter().any(|e| immunities.contains(e));
    let physical = pet.stats.strength as u64 + pet.stats.speed as u64 + pet.stats.luck as u64;
    if blocked {
        physical
    } else {
        physical + pet.stats.elemental_power as u64
    }
}

/// Effective player power: stat sum + gear + immunity-adjusted pet, scaled
/// by `1 + luck_roll * (luck/100)` with `luck_roll` in `[0, 1)`.
pub fn player_effective_power(
    account: &AccountRecord,
    equipped: &[ItemRecord],
    pet: Option<&PetRecord>,
    immunities: &[Element],
    luck_roll: f64,
) -> f64 {
    let base = account.stats.total();
    let gear: u64 = equipped.iter().map(|item| item.stats.total()).sum();
    let pet_power = pet.map(|p| pet_power_against(p, immunities)).unwrap_or(0);
    let raw = (base + gear + pet_power) as f64;
    let luck_bonus = luck_roll * (account.stats.luck as f64 / 100.0);
    raw * (1.0 + luck_bonus)
}

/// Everything a caller needs to report a solo fight.
#[derive(Debug, Clone)]
pub struct SoloBattleOutcome {
    pub victory: bool,
    pub floor: u32,
    pub level: u32,
    pub global_level: u32,
    pub boss: bool,
    pub player_power: f64,
    pub npc_power: f64,
    pub immunities: Vec<Element>,
    pub rewards: Option<BattleRewards>,
}

/// Resolve the account's next solo fight at its current (floor, level).
///
/// Rank gating happens before any mutation; a loss changes nothing. On a
/// win the rewards are credited and progression advances exactly one level,
/// wrapping level 100 into the next floor up to [`MAX_SOLO_FLOOR`].
pub fn resolve_solo_battle(
    store: &GameStore,
    account_id: &str,
    luck_roll: f64,
) -> Result<SoloBattleOutcome, GameError> {
    let mut account = store.get_account(account_id)?;
    let floor = account.npc_floor;
    let level = account.npc_level;
    let gl = global_level(floor, level);

    let needed = required_rank(gl);
    if account.rank < needed {
        return Err(GameError::RankTooLow {
            required: needed,
            actual: account.rank,
        });
    }

    let immunities = npc_immunities(floor, level);
    let npc_power = solo_npc_power(floor, level);
    let items = equipped_items(store, &account)?;
    let pet = equipped_pet(store, &account)?;
    let player_power =
        player_effective_power(&account, &items, pet.as_ref(), &immunities, luck_roll);

    let victory = player_power >= npc_power;
    let boss = is_boss_level(level);
    let mut rewards = None;

    if victory {
        let earned = battle_rewards(floor, level);
        account.balances.gold += earned.gold;
        account.balances.training_points += earned.training_points;
        account.balances.soul_shards += earned.soul_shards;
        account.balances.pet_exp += earned.pet_exp;
        account.balances.runes += earned.runes;

        if level >= 100 {
            if floor < MAX_SOLO_FLOOR {
                account.npc_floor = floor + 1;
                account.npc_level = 1;
            }
        } else {
            account.npc_level = level + 1;
        }
        store.put_account(account.clone())?;
        rewards = Some(earned);
    }

    debug!(
        "solo battle for {}: floor {} level {} -> {} (player {:.0} vs npc {:.0})",
        account.username,
        floor,
        level,
        if victory { "win" } else { "loss" },
        player_power,
        npc_power
    );

    Ok(SoloBattleOutcome {
        victory,
        floor,
        level,
        global_level: gl,
        boss,
        player_power,
        npc_power,
        immunities,
        rewards,
    })
}
