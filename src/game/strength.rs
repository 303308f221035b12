//! Derived combat power.
//!
//! Strength is a pure, order-independent sum over base stats, equipped gear
//! and the equipped pet. Partially-loaded data contributes zero: a dangling
//! equipment reference or missing pet simply adds nothing.

use crate::game::errors::GameError;
use crate::game::types::{AccountRecord, ItemRecord, PetRecord, EQUIP_SLOTS};
use crate::storage::GameStore;

/// Combat power from stats, equipped items and an optional pet.
///
/// `equipped` must already be resolved to the items referenced by the
/// account's equipment map; unresolved slots are simply absent.
pub fn strength(
    account: &AccountRecord,
    equipped: &[ItemRecord],
    pet: Option<&PetRecord>,
) -> u64 {
    let base = account.stats.total();
    let gear: u64 = equipped.iter().map(|item| item.stats.total()).sum();
    let pet_power = pet.map(|p| p.stats.total()).unwrap_or(0);
    base + gear + pet_power
}

/// Resolve the account's equipped items from the store. Slots pointing at
/// items that no longer exist are skipped.
pub fn equipped_items(
    store: &GameStore,
    account: &AccountRecord,
) -> Result<Vec<ItemRecord>, GameError> {
    let mut items = Vec::new();
    for slot in EQUIP_SLOTS {
        if let Some(item_id) = account.equipment.get(&slot) {
            if let Some(item) = store.find_item(&account.id, item_id)? {
                items.push(item);
            }
        }
    }
    Ok(items)
}

/// Resolve the account's equipped pet, if any.
pub fn equipped_pet(
    store: &GameStore,
    account: &AccountRecord,
) -> Result<Option<PetRecord>, GameError> {
    match &account.equipped_pet {
        Some(pet_id) => Ok(store.find_pet(&account.id, pet_id)?),
        None => Ok(None),
    }
}

/// Convenience: full strength for a stored account.
pub fn account_strength(store: &GameStore, account: &AccountRecord) -> Result<u64, GameError> {
    let items = equipped_items(store, account)?;
    let pet = equipped_pet(store, account)?;
    Ok(strength(account, &items, pet.as_ref()))
}
