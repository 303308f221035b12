//! Static item, skill and food catalogs.
//!
//! The catalogs are fixed reference data, not player state: inventory rows
//! point at catalog ids, shops price against them, and skill auctions sell
//! entries from the skill list.

use crate::game::types::{EquipSlot, StatBlock};

#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub id: &'static str,
    pub name: &'static str,
    /// None for unequippable curios.
    pub slot: Option<EquipSlot>,
    pub stats: StatBlock,
    pub price_gold: u64,
}

#[derive(Debug, Clone)]
pub struct CatalogSkill {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone)]
pub struct CatalogFood {
    pub id: &'static str,
    pub name: &'static str,
    pub pet_exp: u64,
    pub price_gold: u64,
}

fn stats(strength: u32, speed: u32, intellect: u32, luck: u32, potential: u32) -> StatBlock {
    StatBlock {
        strength,
        speed,
        intellect,
        luck,
        potential,
    }
}

pub fn item_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem {
            id: "rusty_blade",
            name: "Rusty Blade",
            slot: Some(EquipSlot::Weapon),
            stats: stats(5, 1, 0, 0, 0),
            price_gold: 100,
        },
        CatalogItem {
            id: "runed_sabre",
            name: "Runed Sabre",
            slot: Some(EquipSlot::Weapon),
            stats: stats(25, 8, 4, 0, 2),
            price_gold: 1_200,
        },
        CatalogItem {
            id: "voidrend_halberd",
            name: "Voidrend Halberd",
            slot: Some(EquipSlot::Weapon),
            stats: stats(90, 20, 10, 5, 10),
            price_gold: 9_000,
        },
        CatalogItem {
            id: "padded_jerkin",
            name: "Padded Jerkin",
            slot: Some(EquipSlot::Armor),
            stats: stats(2, 2, 0, 0, 1),
            price_gold: 80,
        },
        CatalogItem {
            id: "wardplate",
            name: "Wardplate",
            slot: Some(EquipSlot::Armor),
            stats: stats(30, 0, 12, 0, 8),
            price_gold: 2_500,
        },
        CatalogItem {
            id: "luckstone_charm",
            name: "Luckstone Charm",
            slot: Some(EquipSlot::Accessory1),
            stats: stats(0, 0, 0, 15, 0),
            price_gold: 600,
        },
        CatalogItem {
            id: "sage_band",
            name: "Sage Band",
            slot: Some(EquipSlot::Accessory1),
            stats: stats(0, 0, 20, 2, 4),
            price_gold: 900,
        },
        CatalogItem {
            id: "swift_anklet",
            name: "Swift Anklet",
            slot: Some(EquipSlot::Accessory2),
            stats: stats(0, 18, 0, 4, 0),
            price_gold: 750,
        },
        CatalogItem {
            id: "ember_totem",
            name: "Ember Totem",
            slot: Some(EquipSlot::Accessory2),
            stats: stats(8, 0, 8, 8, 8),
            price_gold: 1_800,
        },
    ]
}

pub fn skill_catalog() -> Vec<CatalogSkill> {
    vec![
        CatalogSkill {
            id: "cleave",
            name: "Cleave",
        },
        CatalogSkill {
            id: "mirror_guard",
            name: "Mirror Guard",
        },
        CatalogSkill {
            id: "soulfire",
            name: "Soulfire",
        },
        CatalogSkill {
            id: "stormstep",
            name: "Stormstep",
        },
        CatalogSkill {
            id: "gravebind",
            name: "Gravebind",
        },
        CatalogSkill {
            id: "chronoshift",
            name: "Chronoshift",
        },
    ]
}

pub fn food_catalog() -> Vec<CatalogFood> {
    vec![
        CatalogFood {
            id: "meat_scrap",
            name: "Meat Scrap",
            pet_exp: 50,
            price_gold: 20,
        },
        CatalogFood {
            id: "honey_loaf",
            name: "Honey Loaf",
            pet_exp: 250,
            price_gold: 90,
        },
        CatalogFood {
            id: "spirit_nectar",
            name: "Spirit Nectar",
            pet_exp: 1_200,
            price_gold: 400,
        },
        CatalogFood {
            id: "dragonfruit",
            name: "Dragonfruit",
            pet_exp: 6_000,
            price_gold: 1_800,
        },
    ]
}

pub fn find_catalog_item(id: &str) -> Option<CatalogItem> {
    item_catalog().into_iter().find(|i| i.id == id)
}

pub fn find_catalog_skill(id: &str) -> Option<CatalogSkill> {
    skill_catalog().into_iter().find(|s| s.id == id)
}

pub fn find_catalog_food(id: &str) -> Option<CatalogFood> {
    food_catalog().into_iter().find(|f| f.id == id)
}
