//! Inventory management: granting, equipping, training, selling and
//! transferring items.
//!
//! An item instance is owned by exactly one account at a time. Transfers
//! rekey the record under the new owner and always clear any equip slot
//! still pointing at it.

use log::info;

use crate::game::catalog::{find_catalog_item, CatalogItem};
use crate::game::errors::GameError;
use crate::game::types::{AccountRecord, EquipSlot, ItemRecord, StatKind};
use crate::storage::GameStore;

/// Instantiate a catalog item into an account's inventory.
pub fn grant_item(
    store: &GameStore,
    account_id: &str,
    catalog_id: &str,
) -> Result<ItemRecord, GameError> {
    let catalog = lookup_catalog(catalog_id)?;
    store.get_account(account_id)?;
    let item = ItemRecord::new(account_id, catalog_id, catalog.stats);
    store.put_item(&item)?;
    Ok(item)
}

/// Buy a catalog item with personal gold.
pub fn buy_item(
    store: &GameStore,
    account_id: &str,
    catalog_id: &str,
) -> Result<ItemRecord, GameError> {
    let catalog = lookup_catalog(catalog_id)?;
    let mut account = store.get_account(account_id)?;
    if account.balances.gold < catalog.price_gold {
        return Err(GameError::InsufficientFunds {
            required: catalog.price_gold,
            available: account.balances.gold,
        });
    }
    account.balances.gold -= catalog.price_gold;
    store.put_account(account)?;
    let item = ItemRecord::new(account_id, catalog_id, catalog.stats);
    store.put_item(&item)?;
    Ok(item)
}

/// Equip an owned item into a slot. The slot must match the catalog entry;
/// whatever was in the slot before is silently unequipped.
pub fn equip_item(
    store: &GameStore,
    account_id: &str,
    item_id: &str,
    slot: EquipSlot,
) -> Result<AccountRecord, GameError> {
    let item = store
        .find_item(account_id, item_id)?
        .ok_or_else(|| GameError::not_found(format!("item: {}", item_id)))?;
    let catalog = lookup_catalog(&item.item_id)?;
    match catalog.slot {
        Some(expected) if expected == slot => {}
        Some(expected) => {
            return Err(GameError::validation(format!(
                "{} goes in the {:?} slot, not {:?}",
                catalog.name, expected, slot
            )))
        }
        None => {
            return Err(GameError::validation(format!(
                "{} is not equippable",
                catalog.name
            )))
        }
    }
    let mut account = store.get_account(account_id)?;
    account.equipment.insert(slot, item_id.to_string());
    store.put_account(account.clone())?;
    Ok(account)
}

pub fn unequip_slot(
    store: &GameStore,
    account_id: &str,
    slot: EquipSlot,
) -> Result<AccountRecord, GameError> {
    let mut account = store.get_account(account_id)?;
    account.equipment.remove(&slot);
    store.put_account(account.clone())?;
    Ok(account)
}

/// Spend training points 1:1 to raise one stat on an owned item.
pub fn train_item(
    store: &GameStore,
    account_id: &str,
    item_id: &str,
    stat: StatKind,
    points: u64,
) -> Result<ItemRecord, GameError> {
    if points == 0 {
        return Err(GameError::validation("training points must be positive"));
    }
    let mut item = store
        .find_item(account_id, item_id)?
        .ok_or_else(|| GameError::not_found(format!("item: {}", item_id)))?;
    let mut account = store.get_account(account_id)?;
    if account.balances.training_points < points {
        return Err(GameError::InsufficientFunds {
            required: points,
            available: account.balances.training_points,
        });
    }
    account.balances.training_points -= points;
    item.stats.add(stat, points.min(u32::MAX as u64) as u32);
    store.put_account(account)?;
    store.put_item(&item)?;
    Ok(item)
}

/// Sell an owned item back for its catalog price. Clears any equip slot
/// pointing at it.
pub fn sell_item(
    store: &GameStore,
    account_id: &str,
    item_id: &str,
) -> Result<u64, GameError> {
    let item = store
        .find_item(account_id, item_id)?
        .ok_or_else(|| GameError::not_found(format!("item: {}", item_id)))?;
    let catalog = lookup_catalog(&item.item_id)?;
    let mut account = store.get_account(account_id)?;
    account.equipment.retain(|_, equipped| equipped != item_id);
    account.balances.gold = account.balances.gold.saturating_add(catalog.price_gold);
    store.put_account(account)?;
    store.remove_item(account_id, item_id)?;
    Ok(catalog.price_gold)
}

/// Move an item between accounts. Admin path and trade execution both land
/// here so ownership bookkeeping stays in one place.
pub fn transfer_item(
    store: &GameStore,
    from_id: &str,
    to_id: &str,
    item_id: &str,
) -> Result<ItemRecord, GameError> {
    let mut item = store
        .find_item(from_id, item_id)?
        .ok_or_else(|| GameError::not_found(format!("item: {}", item_id)))?;
    let mut from = store.get_account(from_id)?;
    store.get_account(to_id)?;
    from.equipment.retain(|_, equipped| equipped != item_id);
    store.put_account(from)?;
    store.remove_item(from_id, item_id)?;
    item.account_id = to_id.to_string();
    store.put_item(&item)?;
    info!("item {} moved {} -> {}", item_id, from_id, to_id);
    Ok(item)
}

/// Admin-only wrapper around [`transfer_item`].
pub fn admin_transfer_item(
    store: &GameStore,
    actor: &AccountRecord,
    from_id: &str,
    to_id: &str,
    item_id: &str,
) -> Result<ItemRecord, GameError> {
    if !actor.is_admin() {
        return Err(GameError::unauthorized("only admins may transfer items"));
    }
    transfer_item(store, from_id, to_id, item_id)
}

fn lookup_catalog(catalog_id: &str) -> Result<CatalogItem, GameError> {
    find_catalog_item(catalog_id)
        .ok_or_else(|| GameError::not_found(format!("catalog item: {}", catalog_id)))
}
