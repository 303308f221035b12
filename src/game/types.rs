use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

pub const ACCOUNT_SCHEMA_VERSION: u8 = 1;
pub const ITEM_SCHEMA_VERSION: u8 = 1;
pub const PET_SCHEMA_VERSION: u8 = 1;
pub const GUILD_SCHEMA_VERSION: u8 = 1;
pub const CHALLENGE_SCHEMA_VERSION: u8 = 1;
pub const BATTLE_SCHEMA_VERSION: u8 = 1;
pub const AUCTION_SCHEMA_VERSION: u8 = 1;
pub const TRADE_SCHEMA_VERSION: u8 = 1;
pub const QUEST_SCHEMA_VERSION: u8 = 1;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Player,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Competitive rank, ordered. Gates high-floor NPC content.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    #[default]
    Novice,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    Legend,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rank::Novice => "Novice",
            Rank::Bronze => "Bronze",
            Rank::Silver => "Silver",
            Rank::Gold => "Gold",
            Rank::Platinum => "Platinum",
            Rank::Diamond => "Diamond",
            Rank::Legend => "Legend",
        };
        write!(f, "{}", name)
    }
}

/// The five base combat stats. Also used for trainable item stats, where a
/// missing stat is simply zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatBlock {
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub intellect: u32,
    #[serde(default)]
    pub luck: u32,
    #[serde(default)]
    pub potential: u32,
}

impl StatBlock {
    pub fn uniform(value: u32) -> Self {
        Self {
            strength: value,
            speed: value,
            intellect: value,
            luck: value,
            potential: value,
        }
    }

    pub fn total(&self) -> u64 {
        self.strength as u64
            + self.speed as u64
            + self.intellect as u64
            + self.luck as u64
            + self.potential as u64
    }
}

/// Which stat a training session targets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    Strength,
    Speed,
    Intellect,
    Luck,
    Potential,
}

impl StatBlock {
    pub fn get(&self, kind: StatKind) -> u32 {
        match kind {
            StatKind::Strength => self.strength,
            StatKind::Speed => self.speed,
            StatKind::Intellect => self.intellect,
            StatKind::Luck => self.luck,
            StatKind::Potential => self.potential,
        }
    }

    pub fn add(&mut self, kind: StatKind, amount: u32) {
        let slot = match kind {
            StatKind::Strength => &mut self.strength,
            StatKind::Speed => &mut self.speed,
            StatKind::Intellect => &mut self.intellect,
            StatKind::Luck => &mut self.luck,
            StatKind::Potential => &mut self.potential,
        };
        *slot = slot.saturating_add(amount);
    }
}

/// Per-account resource balances. All balances are non-negative by
/// construction; debits go through checked helpers in the engine code.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balances {
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub rubies: u64,
    #[serde(default)]
    pub soul_shards: u64,
    #[serde(default)]
    pub focused_shards: u64,
    #[serde(default)]
    pub training_points: u64,
    #[serde(default)]
    pub pet_exp: u64,
    #[serde(default)]
    pub runes: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory1,
    Accessory2,
}

pub const EQUIP_SLOTS: [EquipSlot; 4] = [
    EquipSlot::Weapon,
    EquipSlot::Armor,
    EquipSlot::Accessory1,
    EquipSlot::Accessory2,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub balances: Balances,
    pub stats: StatBlock,
    /// Equip slot -> inventory item instance id.
    #[serde(default)]
    pub equipment: HashMap<EquipSlot, String>,
    #[serde(default)]
    pub equipped_pet: Option<String>,
    #[serde(default)]
    pub rank: Rank,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    pub npc_floor: u32,
    pub npc_level: u32,
    pub created_at: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub schema_version: u8,
}

impl AccountRecord {
    pub fn new(username: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            username: username.to_string(),
            password_hash: None,
            role,
            balances: Balances {
                gold: 500,
                ..Balances::default()
            },
            stats: StatBlock::uniform(1),
            equipment: HashMap::new(),
            equipped_pet: None,
            rank: Rank::Novice,
            wins: 0,
            losses: 0,
            npc_floor: 1,
            npc_level: 1,
            created_at: now,
            last_login: now,
            schema_version: ACCOUNT_SCHEMA_VERSION,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Flattened NPC progression index: `(floor-1)*100 + level`.
    pub fn global_level(&self) -> u32 {
        (self.npc_floor - 1) * 100 + self.npc_level
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// One owned instance of a catalog item. Stats start from the catalog entry
/// and grow through training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemRecord {
    pub id: String,
    pub account_id: String,
    /// Catalog reference.
    pub item_id: String,
    #[serde(default)]
    pub stats: StatBlock,
    pub acquired_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl ItemRecord {
    pub fn new(account_id: &str, item_id: &str, stats: StatBlock) -> Self {
        Self {
            id: new_id(),
            account_id: account_id.to_string(),
            item_id: item_id.to_string(),
            stats,
            acquired_at: Utc::now(),
            schema_version: ITEM_SCHEMA_VERSION,
        }
    }
}

// ============================================================================
// Pets
// ============================================================================

/// The canonical element set. Immunity selection indexes into this list, so
/// order matters and must never be reshuffled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Fire,
    Water,
    Earth,
    Wind,
    Lightning,
    Ice,
    Light,
    Dark,
    Poison,
    Metal,
    Wood,
    Arcane,
    Blood,
    Spirit,
    Chaos,
    Gravity,
    Sound,
    Time,
}

pub const ELEMENTS: [Element; 18] = [
    Element::Fire,
    Element::Water,
    Element::Earth,
    Element::Wind,
    Element::Lightning,
    Element::Ice,
    Element::Light,
    Element::Dark,
    Element::Poison,
    Element::Metal,
    Element::Wood,
    Element::Arcane,
    Element::Blood,
    Element::Spirit,
    Element::Chaos,
    Element::Gravity,
    Element::Sound,
    Element::Time,
];

/// Pet maturity stage. Transitions are monotonic; only a merge (which
/// destroys both parents) produces a fresh Egg.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum PetTier {
    #[default]
    Egg,
    Hatchling,
    Juvenile,
    Adult,
    Elder,
    Ancient,
    Mythic,
}

impl PetTier {
    pub fn next(self) -> Option<PetTier> {
        match self {
            PetTier::Egg => Some(PetTier::Hatchling),
            PetTier::Hatchling => Some(PetTier::Juvenile),
            PetTier::Juvenile => Some(PetTier::Adult),
            PetTier::Adult => Some(PetTier::Elder),
            PetTier::Elder => Some(PetTier::Ancient),
            PetTier::Ancient => Some(PetTier::Mythic),
            PetTier::Mythic => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetStats {
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub luck: u32,
    #[serde(default)]
    pub elemental_power: u32,
}

impl PetStats {
    pub fn total(&self) -> u64 {
        self.strength as u64 + self.speed as u64 + self.luck as u64 + self.elemental_power as u64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PetRecord {
    pub id: String,
    pub account_id: String,
    pub name: String,
    /// Primary element, kept alongside the full list for older records.
    pub element: Element,
    #[serde(default)]
    pub elements: Vec<Element>,
    pub tier: PetTier,
    #[serde(default)]
    pub exp: u64,
    #[serde(default)]
    pub stats: PetStats,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl PetRecord {
    pub fn new_egg(account_id: &str, name: &str, element: Element) -> Self {
        Self {
            id: new_id(),
            account_id: account_id.to_string(),
            name: name.to_string(),
            element,
            elements: vec![element],
            tier: PetTier::Egg,
            exp: 0,
            stats: PetStats {
                strength: 1,
                speed: 1,
                luck: 1,
                elemental_power: 1,
            },
            created_at: Utc::now(),
            schema_version: PET_SCHEMA_VERSION,
        }
    }

    /// All elements this pet carries: the legacy scalar plus the list,
    /// deduplicated.
    pub fn all_elements(&self) -> Vec<Element> {
        let mut out = vec![self.element];
        for e in &self.elements {
            if !out.contains(e) {
                out.push(*e);
            }
        }
        out
    }
}

// ============================================================================
// Challenges
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChallengeRecord {
    pub id: String,
    pub challenger_id: String,
    pub challenged_id: String,
    pub status: ChallengeStatus,
    /// Set exactly once, only from the two participants.
    #[serde(default)]
    pub winner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl ChallengeRecord {
    pub fn new(challenger_id: &str, challenged_id: &str) -> Self {
        Self {
            id: new_id(),
            challenger_id: challenger_id.to_string(),
            challenged_id: challenged_id.to_string(),
            status: ChallengeStatus::Pending,
            winner_id: None,
            created_at: Utc::now(),
            schema_version: CHALLENGE_SCHEMA_VERSION,
        }
    }

    pub fn is_participant(&self, account_id: &str) -> bool {
        self.challenger_id == account_id || self.challenged_id == account_id
    }
}

// ============================================================================
// Guilds
// ============================================================================

pub const GUILD_MAX_MEMBERS: usize = 4;
pub const GUILD_MAX_LEVEL: u8 = 10;

/// Shared guild resource pool, distinct from any member's personal balances.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildBank {
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub soul_shards: u64,
    #[serde(default)]
    pub runes: u64,
}

/// Which bank pool a deposit/withdrawal touches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BankResource {
    Gold,
    SoulShards,
    Runes,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuildRecord {
    pub id: String,
    pub name: String,
    pub master_id: String,
    /// Account ids, master included. Never more than GUILD_MAX_MEMBERS.
    pub members: Vec<String>,
    #[serde(default)]
    pub bank: GuildBank,
    pub level: u8,
    pub dungeon_floor: u32,
    pub dungeon_level: u32,
    #[serde(default)]
    pub wins: u32,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl GuildRecord {
    pub fn new(name: &str, master_id: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            master_id: master_id.to_string(),
            members: vec![master_id.to_string()],
            bank: GuildBank::default(),
            level: 1,
            dungeon_floor: 1,
            dungeon_level: 1,
            wins: 0,
            created_at: Utc::now(),
            schema_version: GUILD_SCHEMA_VERSION,
        }
    }

    pub fn is_member(&self, account_id: &str) -> bool {
        self.members.iter().any(|m| m == account_id)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= GUILD_MAX_MEMBERS
    }

    pub fn dungeon_global_level(&self) -> u32 {
        (self.dungeon_floor - 1) * 100 + self.dungeon_level
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuildInviteRecord {
    pub id: String,
    pub guild_id: String,
    pub account_id: String,
    pub invited_by: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl GuildInviteRecord {
    pub fn new(guild_id: &str, account_id: &str, invited_by: &str) -> Self {
        Self {
            id: new_id(),
            guild_id: guild_id.to_string(),
            account_id: account_id.to_string(),
            invited_by: invited_by.to_string(),
            created_at: Utc::now(),
            schema_version: GUILD_SCHEMA_VERSION,
        }
    }
}

// ============================================================================
// Guild battles
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GuildBattleStatus {
    Pending,
    InProgress,
    Declined,
    Completed,
}

/// Tournament-bracket guild battle. Each side's index points at its current
/// fighter and advances only on a round loss; the battle completes the
/// moment either index runs off the end of its list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuildBattleRecord {
    pub id: String,
    pub challenger_guild: String,
    pub challenged_guild: String,
    pub challenger_fighters: Vec<String>,
    pub challenged_fighters: Vec<String>,
    pub round: u32,
    pub challenger_score: u32,
    pub challenged_score: u32,
    pub challenger_index: usize,
    pub challenged_index: usize,
    pub status: GuildBattleStatus,
    #[serde(default)]
    pub winner_guild: Option<String>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl GuildBattleRecord {
    pub fn new(
        challenger_guild: &str,
        challenged_guild: &str,
        challenger_fighters: Vec<String>,
    ) -> Self {
        Self {
            id: new_id(),
            challenger_guild: challenger_guild.to_string(),
            challenged_guild: challenged_guild.to_string(),
            challenger_fighters,
            challenged_fighters: Vec::new(),
            round: 0,
            challenger_score: 0,
            challenged_score: 0,
            challenger_index: 0,
            challenged_index: 0,
            status: GuildBattleStatus::Pending,
            winner_guild: None,
            created_at: Utc::now(),
            schema_version: BATTLE_SCHEMA_VERSION,
        }
    }

    /// The two fighters currently on the mat, or None once either side has
    /// exhausted its list.
    pub fn current_fighters(&self) -> Option<(&str, &str)> {
        let a = self.challenger_fighters.get(self.challenger_index)?;
        let b = self.challenged_fighters.get(self.challenged_index)?;
        Some((a.as_str(), b.as_str()))
    }

    pub fn either_side_exhausted(&self) -> bool {
        self.challenger_index >= self.challenger_fighters.len()
            || self.challenged_index >= self.challenged_fighters.len()
    }
}

// ============================================================================
// Skill auctions
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    Queued,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillAuctionRecord {
    pub id: String,
    pub skill_id: String,
    pub status: AuctionStatus,
    pub queued_at: DateTime<Utc>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub winning_bid: Option<String>,
    #[serde(default)]
    pub winner_id: Option<String>,
    pub schema_version: u8,
}

impl SkillAuctionRecord {
    pub fn new(skill_id: &str) -> Self {
        Self {
            id: new_id(),
            skill_id: skill_id.to_string(),
            status: AuctionStatus::Queued,
            queued_at: Utc::now(),
            started_at: None,
            ends_at: None,
            winning_bid: None,
            winner_id: None,
            schema_version: AUCTION_SCHEMA_VERSION,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, AuctionStatus::Active)
            && self.ends_at.map(|end| now >= end).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillBidRecord {
    pub id: String,
    pub auction_id: String,
    pub bidder_id: String,
    pub amount: u64,
    pub placed_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl SkillBidRecord {
    pub fn new(auction_id: &str, bidder_id: &str, amount: u64) -> Self {
        Self {
            id: new_id(),
            auction_id: auction_id.to_string(),
            bidder_id: bidder_id.to_string(),
            amount,
            placed_at: Utc::now(),
            schema_version: AUCTION_SCHEMA_VERSION,
        }
    }
}

/// How an account came to hold a skill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    AuctionWin,
    Trade,
    AdminGrant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSkillRecord {
    pub account_id: String,
    pub skill_id: String,
    pub source: SkillSource,
    pub acquired_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl PlayerSkillRecord {
    pub fn new(account_id: &str, skill_id: &str, source: SkillSource) -> Self {
        Self {
            account_id: account_id.to_string(),
            skill_id: skill_id.to_string(),
            source,
            acquired_at: Utc::now(),
            schema_version: AUCTION_SCHEMA_VERSION,
        }
    }
}

// ============================================================================
// Trades
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    Pending,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TradeOfferKind {
    Item,
    Skill,
}

/// One entry on the trade table, tagged by the party that put it there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradeOffer {
    pub owner_id: String,
    pub kind: TradeOfferKind,
    /// Item instance id or skill id, depending on kind.
    pub reference: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRecord {
    pub id: String,
    pub initiator_id: String,
    pub recipient_id: String,
    pub initiator_accepted: bool,
    pub recipient_accepted: bool,
    pub status: TradeStatus,
    #[serde(default)]
    pub offers: Vec<TradeOffer>,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl TradeRecord {
    pub fn new(initiator_id: &str, recipient_id: &str) -> Self {
        Self {
            id: new_id(),
            initiator_id: initiator_id.to_string(),
            recipient_id: recipient_id.to_string(),
            initiator_accepted: false,
            recipient_accepted: false,
            status: TradeStatus::Pending,
            offers: Vec::new(),
            created_at: Utc::now(),
            schema_version: TRADE_SCHEMA_VERSION,
        }
    }

    pub fn is_party(&self, account_id: &str) -> bool {
        self.initiator_id == account_id || self.recipient_id == account_id
    }

    /// Any change to the table invalidates prior consent from both sides.
    pub fn add_offer(&mut self, offer: TradeOffer) {
        self.offers.push(offer);
        self.initiator_accepted = false;
        self.recipient_accepted = false;
    }

    /// Remove an offer by reference. Resets both acceptance flags when
    /// something was actually removed.
    pub fn remove_offer(&mut self, owner_id: &str, reference: &str) -> bool {
        let before = self.offers.len();
        self.offers
            .retain(|o| !(o.owner_id == owner_id && o.reference == reference));
        if self.offers.len() != before {
            self.initiator_accepted = false;
            self.recipient_accepted = false;
            true
        } else {
            false
        }
    }

    pub fn accept(&mut self, account_id: &str) {
        if account_id == self.initiator_id {
            self.initiator_accepted = true;
        } else if account_id == self.recipient_id {
            self.recipient_accepted = true;
        }
    }

    pub fn is_ready(&self) -> bool {
        self.initiator_accepted && self.recipient_accepted
    }
}

// ============================================================================
// Quests
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QuestRewards {
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub soul_shards: u64,
    #[serde(default)]
    pub training_points: u64,
    /// Catalog item ids granted on completion.
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub rewards: QuestRewards,
    pub created_at: DateTime<Utc>,
    pub schema_version: u8,
}

impl QuestRecord {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            id: new_id(),
            name: name.to_string(),
            description: description.to_string(),
            rewards: QuestRewards::default(),
            created_at: Utc::now(),
            schema_version: QUEST_SCHEMA_VERSION,
        }
    }

    pub fn with_rewards(mut self, rewards: QuestRewards) -> Self {
        self.rewards = rewards;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestAssignmentStatus {
    Assigned,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestAssignmentRecord {
    pub quest_id: String,
    pub account_id: String,
    pub assigned_by: String,
    pub status: QuestAssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub schema_version: u8,
}

impl QuestAssignmentRecord {
    pub fn new(quest_id: &str, account_id: &str, assigned_by: &str) -> Self {
        Self {
            quest_id: quest_id.to_string(),
            account_id: account_id.to_string(),
            assigned_by: assigned_by.to_string(),
            status: QuestAssignmentStatus::Assigned,
            assigned_at: Utc::now(),
            completed_at: None,
            schema_version: QUEST_SCHEMA_VERSION,
        }
    }
}

// ============================================================================
// Activity feed & leaderboards
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Registration,
    ChallengeResult,
    DungeonVictory,
    GuildBattle,
    AuctionWin,
    QuestCompleted,
    TradeCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    pub id: String,
    pub account_id: String,
    pub kind: ActivityKind,
    pub detail: String,
    pub at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(account_id: &str, kind: ActivityKind, detail: &str) -> Self {
        Self {
            id: new_id(),
            account_id: account_id.to_string(),
            kind,
            detail: detail.to_string(),
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BoardKind {
    PlayerWins,
    PlayerStrength,
    GuildWins,
}

impl BoardKind {
    pub fn as_key(&self) -> &'static str {
        match self {
            BoardKind::PlayerWins => "player_wins",
            BoardKind::PlayerStrength => "player_strength",
            BoardKind::GuildWins => "guild_wins",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardRow {
    pub subject_id: String,
    pub name: String,
    pub value: u64,
}

/// Materialized leaderboard. A time-bounded memoization, never authoritative:
/// stale entries are rebuilt from the underlying records on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardCacheEntry {
    pub kind: BoardKind,
    pub rows: Vec<BoardRow>,
    pub refreshed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_level_flattens_floor_and_level() {
        let mut account = AccountRecord::new("tess", Role::Player);
        assert_eq!(account.global_level(), 1);
        account.npc_floor = 3;
        account.npc_level = 42;
        assert_eq!(account.global_level(), 242);
    }

    #[test]
    fn pet_tiers_are_ordered() {
        assert!(PetTier::Egg < PetTier::Hatchling);
        assert!(PetTier::Ancient < PetTier::Mythic);
        assert_eq!(PetTier::Mythic.next(), None);
        assert_eq!(PetTier::Adult.next(), Some(PetTier::Elder));
    }

    #[test]
    fn pet_all_elements_dedupes_legacy_scalar() {
        let mut pet = PetRecord::new_egg("acct", "Cinder", Element::Fire);
        pet.elements = vec![Element::Fire, Element::Wind];
        assert_eq!(pet.all_elements(), vec![Element::Fire, Element::Wind]);
    }

    #[test]
    fn trade_mutation_resets_acceptance() {
        let mut trade = TradeRecord::new("a", "b");
        trade.accept("a");
        trade.accept("b");
        assert!(trade.is_ready());
        trade.add_offer(TradeOffer {
            owner_id: "a".to_string(),
            kind: TradeOfferKind::Item,
            reference: "item-1".to_string(),
        });
        assert!(!trade.initiator_accepted);
        assert!(!trade.recipient_accepted);
    }

    #[test]
    fn battle_current_fighters_follow_indexes() {
        let mut battle = GuildBattleRecord::new(
            "g1",
            "g2",
            vec!["a1".to_string(), "a2".to_string()],
        );
        battle.challenged_fighters = vec!["b1".to_string()];
        assert_eq!(battle.current_fighters(), Some(("a1", "b1")));
        battle.challenged_index = 1;
        assert_eq!(battle.current_fighters(), None);
        assert!(battle.either_side_exhausted());
    }
}
