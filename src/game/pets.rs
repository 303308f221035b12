//! Pet lifecycle: eggs, feeding, tier evolution and merging.
//!
//! Tier transitions are monotonic and irreversible. The only way back to an
//! Egg is a merge, which destroys both parents and hatches a fresh egg
//! carrying their combined element set.

use log::info;

use crate::game::catalog::find_catalog_food;
use crate::game::errors::GameError;
use crate::game::types::{AccountRecord, Element, PetRecord, PetTier};
use crate::storage::GameStore;
use crate::validation::validate_pet_name;

/// Cumulative exp needed to reach each tier past Egg, in tier order.
const TIER_EXP_THRESHOLDS: [(PetTier, u64); 6] = [
    (PetTier::Hatchling, 1_000),
    (PetTier::Juvenile, 5_000),
    (PetTier::Adult, 20_000),
    (PetTier::Elder, 60_000),
    (PetTier::Ancient, 150_000),
    (PetTier::Mythic, 400_000),
];

/// The tier a pet's lifetime exp entitles it to.
pub fn tier_for_exp(exp: u64) -> PetTier {
    let mut tier = PetTier::Egg;
    for (candidate, threshold) in TIER_EXP_THRESHOLDS {
        if exp >= threshold {
            tier = candidate;
        }
    }
    tier
}

/// Create a new egg for an account.
pub fn create_egg(
    store: &GameStore,
    account_id: &str,
    name: &str,
    element: Element,
) -> Result<PetRecord, GameError> {
    let validated = validate_pet_name(name)
        .map_err(|e| GameError::validation(format!("invalid pet name: {}", e)))?;
    store.get_account(account_id)?;
    let pet = PetRecord::new_egg(account_id, &validated, element);
    store.put_pet(&pet)?;
    Ok(pet)
}

/// Spend account pet-exp balance to grow a pet. Evolution happens
/// automatically whenever the exp crosses a threshold; tiers never regress.
pub fn feed_exp(
    store: &GameStore,
    account_id: &str,
    pet_id: &str,
    amount: u64,
) -> Result<PetRecord, GameError> {
    if amount == 0 {
        return Err(GameError::validation("feed amount must be positive"));
    }
    let mut account = store.get_account(account_id)?;
    if account.balances.pet_exp < amount {
        return Err(GameError::InsufficientFunds {
            required: amount,
            available: account.balances.pet_exp,
        });
    }
    let mut pet = store.get_pet(account_id, pet_id)?;
    account.balances.pet_exp -= amount;
    pet.exp = pet.exp.saturating_add(amount);
    apply_evolution(&mut pet);
    store.put_account(account)?;
    store.put_pet(&pet)?;
    Ok(pet)
}

/// Buy catalog food with gold and feed its exp value to a pet.
pub fn feed_food(
    store: &GameStore,
    account_id: &str,
    pet_id: &str,
    food_id: &str,
) -> Result<PetRecord, GameError> {
    let food = find_catalog_food(food_id)
        .ok_or_else(|| GameError::not_found(format!("food: {}", food_id)))?;
    let mut account = store.get_account(account_id)?;
    if account.balances.gold < food.price_gold {
        return Err(GameError::InsufficientFunds {
            required: food.price_gold,
            available: account.balances.gold,
        });
    }
    let mut pet = store.get_pet(account_id, pet_id)?;
    account.balances.gold -= food.price_gold;
    pet.exp = pet.exp.saturating_add(food.pet_exp);
    apply_evolution(&mut pet);
    store.put_account(account)?;
    store.put_pet(&pet)?;
    Ok(pet)
}

fn apply_evolution(pet: &mut PetRecord) {
    let earned = tier_for_exp(pet.exp);
    if earned > pet.tier {
        info!(
            "pet {} evolved {:?} -> {:?}",
            pet.id, pet.tier, earned
        );
        pet.tier = earned;
        // Each evolution step firms up the body a little.
        pet.stats.strength = pet.stats.strength.saturating_add(5);
        pet.stats.speed = pet.stats.speed.saturating_add(5);
        pet.stats.luck = pet.stats.luck.saturating_add(2);
        pet.stats.elemental_power = pet.stats.elemental_power.saturating_add(8);
    }
}

/// Merge two owned pets into a fresh egg carrying the union of their
/// elements. Both parents are destroyed; if either was equipped the slot is
/// cleared.
pub fn merge_pets(
    store: &GameStore,
    account_id: &str,
    first_id: &str,
    second_id: &str,
    name: &str,
) -> Result<PetRecord, GameError> {
    if first_id == second_id {
        return Err(GameError::validation("cannot merge a pet with itself"));
    }
    let validated = validate_pet_name(name)
        .map_err(|e| GameError::validation(format!("invalid pet name: {}", e)))?;
    let first = store.get_pet(account_id, first_id)?;
    let second = store.get_pet(account_id, second_id)?;

    let mut elements: Vec<Element> = first.all_elements();
    for e in second.all_elements() {
        if !elements.contains(&e) {
            elements.push(e);
        }
    }

    let mut account = store.get_account(account_id)?;
    if account
        .equipped_pet
        .as_deref()
        .map(|p| p == first_id || p == second_id)
        .unwrap_or(false)
    {
        account.equipped_pet = None;
    }

    let mut egg = PetRecord::new_egg(account_id, &validated, elements[0]);
    egg.elements = elements;

    store.remove_pet(account_id, first_id)?;
    store.remove_pet(account_id, second_id)?;
    store.put_pet(&egg)?;
    store.put_account(account)?;
    info!(
        "pets {} + {} merged into egg {}",
        first_id, second_id, egg.id
    );
    Ok(egg)
}

/// Equip a pet for combat. Ownership is checked; any previously equipped
/// pet is replaced.
pub fn equip_pet(
    store: &GameStore,
    account_id: &str,
    pet_id: &str,
) -> Result<AccountRecord, GameError> {
    store.get_pet(account_id, pet_id)?;
    let mut account = store.get_account(account_id)?;
    account.equipped_pet = Some(pet_id.to_string());
    store.put_account(account.clone())?;
    Ok(account)
}

pub fn unequip_pet(store: &GameStore, account_id: &str) -> Result<AccountRecord, GameError> {
    let mut account = store.get_account(account_id)?;
    account.equipped_pet = None;
    store.put_account(account.clone())?;
    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Role;
    use tempfile::TempDir;

    fn setup() -> (TempDir, GameStore, AccountRecord) {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStore::open(dir.path()).expect("store");
        let account = AccountRecord::new("finn", Role::Player);
        store.put_account(account.clone()).expect("put");
        (dir, store, account)
    }

    #[test]
    fn exp_thresholds_map_to_tiers() {
        assert_eq!(tier_for_exp(0), PetTier::Egg);
        assert_eq!(tier_for_exp(999), PetTier::Egg);
        assert_eq!(tier_for_exp(1_000), PetTier::Hatchling);
        assert_eq!(tier_for_exp(20_000), PetTier::Adult);
        assert_eq!(tier_for_exp(9_999_999), PetTier::Mythic);
    }

    #[test]
    fn feeding_debits_balance_and_evolves() {
        let (_dir, store, mut account) = setup();
        account.balances.pet_exp = 6_000;
        store.put_account(account.clone()).expect("put");
        let pet = create_egg(&store, &account.id, "Puddle", Element::Water).expect("egg");
        let fed = feed_exp(&store, &account.id, &pet.id, 5_500).expect("feed");
        assert_eq!(fed.tier, PetTier::Juvenile);
        assert_eq!(fed.exp, 5_500);
        let account = store.get_account(&account.id).expect("reload");
        assert_eq!(account.balances.pet_exp, 500);
        assert!(feed_exp(&store, &account.id, &pet.id, 501).is_err());
    }

    #[test]
    fn food_costs_gold_and_grants_its_exp_value() {
        let (_dir, store, account) = setup();
        let pet = create_egg(&store, &account.id, "Puddle", Element::Water).expect("egg");
        let fed = feed_food(&store, &account.id, &pet.id, "honey_loaf").expect("feed");
        assert_eq!(fed.exp, 250);
        let account = store.get_account(&account.id).expect("reload");
        assert_eq!(account.balances.gold, 500 - 90);
        assert!(feed_food(&store, &account.id, &pet.id, "dragonfruit").is_err());
    }

    #[test]
    fn merge_destroys_parents_and_unions_elements() {
        let (_dir, store, account) = setup();
        let a = create_egg(&store, &account.id, "Ash", Element::Fire).expect("a");
        let b = create_egg(&store, &account.id, "Gale", Element::Wind).expect("b");
        equip_pet(&store, &account.id, &a.id).expect("equip");
        let egg = merge_pets(&store, &account.id, &a.id, &b.id, "Cyclone").expect("merge");
        assert_eq!(egg.tier, PetTier::Egg);
        assert!(egg.all_elements().contains(&Element::Fire));
        assert!(egg.all_elements().contains(&Element::Wind));
        assert!(store.find_pet(&account.id, &a.id).expect("find").is_none());
        assert!(store.find_pet(&account.id, &b.id).expect("find").is_none());
        let account = store.get_account(&account.id).expect("reload");
        assert_eq!(account.equipped_pet, None);
    }

    #[test]
    fn merge_rejects_self() {
        let (_dir, store, account) = setup();
        let a = create_egg(&store, &account.id, "Ash", Element::Fire).expect("a");
        assert!(merge_pets(&store, &account.id, &a.id, &a.id, "Oops").is_err());
    }
}
