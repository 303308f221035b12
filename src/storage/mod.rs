//! # Storage Module - Persistence Gateway
//!
//! Sled-backed persistence for every entity family the game touches:
//! accounts, inventory items, pets, guilds, invites, battles, challenges,
//! auctions, bids, skills, trades, quests, the activity feed and the
//! leaderboard cache.
//!
//! ## Layout
//!
//! One sled tree per entity family, string keys with a `family:` prefix so
//! related records scan together:
//!
//! ```text
//! accounts   accounts:{id}            usernames:{lower} -> id
//! holdings   items:{owner}:{id}       pets:{owner}:{id}     skills:{owner}:{skill}
//! guilds     guilds:{id}              guild_names:{lower}   invites:{account}:{guild}   battles:{id}
//! contests   challenges:{id}          auctions:{id}         bids:{auction}:{seq}        trades:{id}
//!            quests:{id}              assignments:{account}:{quest}
//! feed       feed:{nanos}             boards:{kind}
//! ```
//!
//! Records are bincode-serialized serde structs carrying a `schema_version`
//! that is checked on read for the heavily-mutated families. "Not found" is
//! a distinct error variant; the `find_*` methods return `Option` where
//! absence is an expected outcome rather than a caller error.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sled::IVec;
use thiserror::Error;

use crate::game::types::{
    AccountRecord, ActivityEntry, BoardKind, ChallengeRecord, GuildBattleRecord,
    GuildInviteRecord, GuildRecord, ItemRecord, LeaderboardCacheEntry, PetRecord,
    PlayerSkillRecord, QuestAssignmentRecord, QuestRecord, SkillAuctionRecord, SkillBidRecord,
    TradeRecord, ACCOUNT_SCHEMA_VERSION, AuctionStatus, GUILD_SCHEMA_VERSION,
};

const TREE_ACCOUNTS: &str = "accounts";
const TREE_HOLDINGS: &str = "holdings";
const TREE_GUILDS: &str = "guilds";
const TREE_CONTESTS: &str = "contests";
const TREE_FEED: &str = "feed";

/// Errors that can arise while interacting with the persistence gateway.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },
}

fn next_timestamp_nanos() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000)
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct GameStoreBuilder {
    path: PathBuf,
}

impl GameStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<GameStore, StoreError> {
        GameStore::open(self.path)
    }
}

/// Sled-backed persistence for all game entities.
pub struct GameStore {
    db: sled::Db,
    accounts: sled::Tree,
    holdings: sled::Tree,
    guilds: sled::Tree,
    contests: sled::Tree,
    feed: sled::Tree,
}

impl GameStore {
    /// Open (or create) the game store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let accounts = db.open_tree(TREE_ACCOUNTS)?;
        let holdings = db.open_tree(TREE_HOLDINGS)?;
        let guilds = db.open_tree(TREE_GUILDS)?;
        let contests = db.open_tree(TREE_CONTESTS)?;
        let feed = db.open_tree(TREE_FEED)?;
        Ok(Self {
            db,
            accounts,
            holdings,
            guilds,
            contests,
            feed,
        })
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(bincode::serialize(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, StoreError> {
        Ok(bincode::deserialize::<T>(&bytes)?)
    }

    fn scan_values<T: serde::de::DeserializeOwned>(
        tree: &sled::Tree,
        prefix: &str,
    ) -> Result<Vec<T>, StoreError> {
        let mut out = Vec::new();
        for entry in tree.scan_prefix(prefix.as_bytes()) {
            let (_, value) = entry?;
            out.push(Self::deserialize(value)?);
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    fn account_key(id: &str) -> String {
        format!("accounts:{}", id)
    }

    fn username_key(username: &str) -> String {
        format!("usernames:{}", username.to_ascii_lowercase())
    }

    /// Insert or update an account record, maintaining the username index.
    pub fn put_account(&self, mut account: AccountRecord) -> Result<(), StoreError> {
        account.schema_version = ACCOUNT_SCHEMA_VERSION;
        let bytes = Self::serialize(&account)?;
        self.accounts.insert(Self::account_key(&account.id), bytes)?;
        self.accounts.insert(
            Self::username_key(&account.username),
            account.id.as_bytes(),
        )?;
        self.accounts.flush()?;
        Ok(())
    }

    /// Fetch an account by id; absence is a caller error.
    pub fn get_account(&self, id: &str) -> Result<AccountRecord, StoreError> {
        self.find_account(id)?
            .ok_or_else(|| StoreError::NotFound(format!("account: {}", id)))
    }

    /// Fetch an account by id where absence is an expected outcome.
    pub fn find_account(&self, id: &str) -> Result<Option<AccountRecord>, StoreError> {
        let Some(bytes) = self.accounts.get(Self::account_key(id))? else {
            return Ok(None);
        };
        let record: AccountRecord = Self::deserialize(bytes)?;
        if record.schema_version != ACCOUNT_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "account",
                expected: ACCOUNT_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(Some(record))
    }

    pub fn find_account_by_username(
        &self,
        username: &str,
    ) -> Result<Option<AccountRecord>, StoreError> {
        let Some(id_bytes) = self.accounts.get(Self::username_key(username))? else {
            return Ok(None);
        };
        let id = String::from_utf8_lossy(&id_bytes).to_string();
        self.find_account(&id)
    }

    /// Delete an account and everything it owns (items, pets, skills).
    pub fn delete_account(&self, id: &str) -> Result<(), StoreError> {
        let account = self.get_account(id)?;
        for prefix in [
            format!("items:{}:", id),
            format!("pets:{}:", id),
            format!("skills:{}:", id),
        ] {
            let keys: Vec<IVec> = self
                .holdings
                .scan_prefix(prefix.as_bytes())
                .filter_map(|e| e.ok().map(|(k, _)| k))
                .collect();
            for key in keys {
                self.holdings.remove(key)?;
            }
        }
        self.accounts.remove(Self::username_key(&account.username))?;
        self.accounts.remove(Self::account_key(id))?;
        self.accounts.flush()?;
        self.holdings.flush()?;
        Ok(())
    }

    pub fn list_accounts(&self) -> Result<Vec<AccountRecord>, StoreError> {
        Self::scan_values(&self.accounts, "accounts:")
    }

    // ------------------------------------------------------------------
    // Inventory items
    // ------------------------------------------------------------------

    fn item_key(owner: &str, id: &str) -> String {
        format!("items:{}:{}", owner, id)
    }

    pub fn put_item(&self, item: &ItemRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(item)?;
        self.holdings
            .insert(Self::item_key(&item.account_id, &item.id), bytes)?;
        self.holdings.flush()?;
        Ok(())
    }

    pub fn get_item(&self, owner: &str, id: &str) -> Result<ItemRecord, StoreError> {
        let Some(bytes) = self.holdings.get(Self::item_key(owner, id))? else {
            return Err(StoreError::NotFound(format!("item: {}", id)));
        };
        Self::deserialize(bytes)
    }

    pub fn find_item(&self, owner: &str, id: &str) -> Result<Option<ItemRecord>, StoreError> {
        match self.holdings.get(Self::item_key(owner, id))? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn remove_item(&self, owner: &str, id: &str) -> Result<(), StoreError> {
        self.holdings.remove(Self::item_key(owner, id))?;
        self.holdings.flush()?;
        Ok(())
    }

    pub fn list_items(&self, owner: &str) -> Result<Vec<ItemRecord>, StoreError> {
        Self::scan_values(&self.holdings, &format!("items:{}:", owner))
    }

    // ------------------------------------------------------------------
    // Pets
    // ------------------------------------------------------------------

    fn pet_key(owner: &str, id: &str) -> String {
        format!("pets:{}:{}", owner, id)
    }

    pub fn put_pet(&self, pet: &PetRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(pet)?;
        self.holdings
            .insert(Self::pet_key(&pet.account_id, &pet.id), bytes)?;
        self.holdings.flush()?;
        Ok(())
    }

    pub fn get_pet(&self, owner: &str, id: &str) -> Result<PetRecord, StoreError> {
        let Some(bytes) = self.holdings.get(Self::pet_key(owner, id))? else {
            return Err(StoreError::NotFound(format!("pet: {}", id)));
        };
        Self::deserialize(bytes)
    }

    pub fn find_pet(&self, owner: &str, id: &str) -> Result<Option<PetRecord>, StoreError> {
        match self.holdings.get(Self::pet_key(owner, id))? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn remove_pet(&self, owner: &str, id: &str) -> Result<(), StoreError> {
        self.holdings.remove(Self::pet_key(owner, id))?;
        self.holdings.flush()?;
        Ok(())
    }

    pub fn list_pets(&self, owner: &str) -> Result<Vec<PetRecord>, StoreError> {
        Self::scan_values(&self.holdings, &format!("pets:{}:", owner))
    }

    // ------------------------------------------------------------------
    // Player skills
    // ------------------------------------------------------------------

    fn skill_key(owner: &str, skill_id: &str) -> String {
        format!("skills:{}:{}", owner, skill_id)
    }

    pub fn put_skill(&self, skill: &PlayerSkillRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(skill)?;
        self.holdings
            .insert(Self::skill_key(&skill.account_id, &skill.skill_id), bytes)?;
        self.holdings.flush()?;
        Ok(())
    }

    pub fn has_skill(&self, owner: &str, skill_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .holdings
            .contains_key(Self::skill_key(owner, skill_id))?)
    }

    pub fn remove_skill(&self, owner: &str, skill_id: &str) -> Result<(), StoreError> {
        self.holdings.remove(Self::skill_key(owner, skill_id))?;
        self.holdings.flush()?;
        Ok(())
    }

    pub fn list_skills(&self, owner: &str) -> Result<Vec<PlayerSkillRecord>, StoreError> {
        Self::scan_values(&self.holdings, &format!("skills:{}:", owner))
    }

    // ------------------------------------------------------------------
    // Guilds
    // ------------------------------------------------------------------

    fn guild_key(id: &str) -> String {
        format!("guilds:{}", id)
    }

    fn guild_name_key(name: &str) -> String {
        format!("guild_names:{}", name.to_ascii_lowercase())
    }

    pub fn put_guild(&self, mut guild: GuildRecord) -> Result<(), StoreError> {
        guild.schema_version = GUILD_SCHEMA_VERSION;
        let bytes = Self::serialize(&guild)?;
        self.guilds.insert(Self::guild_key(&guild.id), bytes)?;
        self.guilds
            .insert(Self::guild_name_key(&guild.name), guild.id.as_bytes())?;
        self.guilds.flush()?;
        Ok(())
    }

    pub fn get_guild(&self, id: &str) -> Result<GuildRecord, StoreError> {
        let Some(bytes) = self.guilds.get(Self::guild_key(id))? else {
            return Err(StoreError::NotFound(format!("guild: {}", id)));
        };
        let record: GuildRecord = Self::deserialize(bytes)?;
        if record.schema_version != GUILD_SCHEMA_VERSION {
            return Err(StoreError::SchemaMismatch {
                entity: "guild",
                expected: GUILD_SCHEMA_VERSION,
                found: record.schema_version,
            });
        }
        Ok(record)
    }

    pub fn find_guild_by_name(&self, name: &str) -> Result<Option<GuildRecord>, StoreError> {
        let Some(id_bytes) = self.guilds.get(Self::guild_name_key(name))? else {
            return Ok(None);
        };
        let id = String::from_utf8_lossy(&id_bytes).to_string();
        match self.guilds.get(Self::guild_key(&id))? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    /// The guild an account belongs to, if any.
    pub fn find_guild_of(&self, account_id: &str) -> Result<Option<GuildRecord>, StoreError> {
        for guild in self.list_guilds()? {
            if guild.is_member(account_id) {
                return Ok(Some(guild));
            }
        }
        Ok(None)
    }

    pub fn delete_guild(&self, id: &str) -> Result<(), StoreError> {
        let guild = self.get_guild(id)?;
        self.guilds.remove(Self::guild_name_key(&guild.name))?;
        self.guilds.remove(Self::guild_key(id))?;
        self.guilds.flush()?;
        Ok(())
    }

    pub fn list_guilds(&self) -> Result<Vec<GuildRecord>, StoreError> {
        Self::scan_values(&self.guilds, "guilds:")
    }

    // ------------------------------------------------------------------
    // Guild invites
    // ------------------------------------------------------------------

    fn invite_key(account_id: &str, guild_id: &str) -> String {
        format!("invites:{}:{}", account_id, guild_id)
    }

    /// Insert an invite. The (account, guild) key makes a second outstanding
    /// invite for the same pair overwrite the first.
    pub fn put_invite(&self, invite: &GuildInviteRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(invite)?;
        self.guilds
            .insert(Self::invite_key(&invite.account_id, &invite.guild_id), bytes)?;
        self.guilds.flush()?;
        Ok(())
    }

    pub fn find_invite(
        &self,
        account_id: &str,
        guild_id: &str,
    ) -> Result<Option<GuildInviteRecord>, StoreError> {
        match self.guilds.get(Self::invite_key(account_id, guild_id))? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn remove_invite(&self, account_id: &str, guild_id: &str) -> Result<(), StoreError> {
        self.guilds.remove(Self::invite_key(account_id, guild_id))?;
        self.guilds.flush()?;
        Ok(())
    }

    pub fn list_invites(&self, account_id: &str) -> Result<Vec<GuildInviteRecord>, StoreError> {
        Self::scan_values(&self.guilds, &format!("invites:{}:", account_id))
    }

    /// Remove every outstanding invite for an account. Returns how many were
    /// dropped; zero is a no-op, not an error.
    pub fn clear_invites(&self, account_id: &str) -> Result<usize, StoreError> {
        let prefix = format!("invites:{}:", account_id);
        let keys: Vec<IVec> = self
            .guilds
            .scan_prefix(prefix.as_bytes())
            .filter_map(|e| e.ok().map(|(k, _)| k))
            .collect();
        let removed = keys.len();
        for key in keys {
            self.guilds.remove(key)?;
        }
        if removed > 0 {
            self.guilds.flush()?;
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Guild battles
    // ------------------------------------------------------------------

    fn battle_key(id: &str) -> String {
        format!("battles:{}", id)
    }

    pub fn put_battle(&self, battle: &GuildBattleRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(battle)?;
        self.guilds.insert(Self::battle_key(&battle.id), bytes)?;
        self.guilds.flush()?;
        Ok(())
    }

    pub fn get_battle(&self, id: &str) -> Result<GuildBattleRecord, StoreError> {
        let Some(bytes) = self.guilds.get(Self::battle_key(id))? else {
            return Err(StoreError::NotFound(format!("guild battle: {}", id)));
        };
        Self::deserialize(bytes)
    }

    // ------------------------------------------------------------------
    // Challenges
    // ------------------------------------------------------------------

    fn challenge_key(id: &str) -> String {
        format!("challenges:{}", id)
    }

    pub fn put_challenge(&self, challenge: &ChallengeRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(challenge)?;
        self.contests
            .insert(Self::challenge_key(&challenge.id), bytes)?;
        self.contests.flush()?;
        Ok(())
    }

    pub fn get_challenge(&self, id: &str) -> Result<ChallengeRecord, StoreError> {
        let Some(bytes) = self.contests.get(Self::challenge_key(id))? else {
            return Err(StoreError::NotFound(format!("challenge: {}", id)));
        };
        Self::deserialize(bytes)
    }

    /// Challenges where the account appears on either side.
    pub fn list_challenges_for(
        &self,
        account_id: &str,
    ) -> Result<Vec<ChallengeRecord>, StoreError> {
        let all: Vec<ChallengeRecord> = Self::scan_values(&self.contests, "challenges:")?;
        Ok(all
            .into_iter()
            .filter(|c| c.is_participant(account_id))
            .collect())
    }

    // ------------------------------------------------------------------
    // Skill auctions & bids
    // ------------------------------------------------------------------

    fn auction_key(id: &str) -> String {
        format!("auctions:{}", id)
    }

    pub fn put_auction(&self, auction: &SkillAuctionRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(auction)?;
        self.contests.insert(Self::auction_key(&auction.id), bytes)?;
        self.contests.flush()?;
        Ok(())
    }

    pub fn get_auction(&self, id: &str) -> Result<SkillAuctionRecord, StoreError> {
        let Some(bytes) = self.contests.get(Self::auction_key(id))? else {
            return Err(StoreError::NotFound(format!("auction: {}", id)));
        };
        Self::deserialize(bytes)
    }

    pub fn list_auctions(&self) -> Result<Vec<SkillAuctionRecord>, StoreError> {
        Self::scan_values(&self.contests, "auctions:")
    }

    /// The single active auction, if one exists.
    pub fn active_auction(&self) -> Result<Option<SkillAuctionRecord>, StoreError> {
        Ok(self
            .list_auctions()?
            .into_iter()
            .find(|a| a.status == AuctionStatus::Active))
    }

    /// Oldest queued auction, next in line to start.
    pub fn next_queued_auction(&self) -> Result<Option<SkillAuctionRecord>, StoreError> {
        let mut queued: Vec<SkillAuctionRecord> = self
            .list_auctions()?
            .into_iter()
            .filter(|a| a.status == AuctionStatus::Queued)
            .collect();
        queued.sort_by_key(|a| a.queued_at);
        Ok(queued.into_iter().next())
    }

    /// Append a bid. The key carries a monotonic sequence so bids list in
    /// placement order.
    pub fn append_bid(&self, bid: &SkillBidRecord) -> Result<(), StoreError> {
        let seq = self.db.generate_id()?;
        let key = format!("bids:{}:{:020}", bid.auction_id, seq);
        let bytes = Self::serialize(bid)?;
        self.contests.insert(key, bytes)?;
        self.contests.flush()?;
        Ok(())
    }

    pub fn list_bids(&self, auction_id: &str) -> Result<Vec<SkillBidRecord>, StoreError> {
        Self::scan_values(&self.contests, &format!("bids:{}:", auction_id))
    }

    /// Highest bid on an auction. Amounts are strictly increasing at insert
    /// time, so the last bid in placement order is also the highest.
    pub fn highest_bid(&self, auction_id: &str) -> Result<Option<SkillBidRecord>, StoreError> {
        Ok(self.list_bids(auction_id)?.into_iter().last())
    }

    // ------------------------------------------------------------------
    // Trades
    // ------------------------------------------------------------------

    fn trade_key(id: &str) -> String {
        format!("trades:{}", id)
    }

    pub fn put_trade(&self, trade: &TradeRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(trade)?;
        self.contests.insert(Self::trade_key(&trade.id), bytes)?;
        self.contests.flush()?;
        Ok(())
    }

    pub fn get_trade(&self, id: &str) -> Result<TradeRecord, StoreError> {
        let Some(bytes) = self.contests.get(Self::trade_key(id))? else {
            return Err(StoreError::NotFound(format!("trade: {}", id)));
        };
        Self::deserialize(bytes)
    }

    // ------------------------------------------------------------------
    // Quests
    // ------------------------------------------------------------------

    fn quest_key(id: &str) -> String {
        format!("quests:{}", id)
    }

    fn assignment_key(account_id: &str, quest_id: &str) -> String {
        format!("assignments:{}:{}", account_id, quest_id)
    }

    pub fn put_quest(&self, quest: &QuestRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(quest)?;
        self.contests.insert(Self::quest_key(&quest.id), bytes)?;
        self.contests.flush()?;
        Ok(())
    }

    pub fn get_quest(&self, id: &str) -> Result<QuestRecord, StoreError> {
        let Some(bytes) = self.contests.get(Self::quest_key(id))? else {
            return Err(StoreError::NotFound(format!("quest: {}", id)));
        };
        Self::deserialize(bytes)
    }

    pub fn list_quests(&self) -> Result<Vec<QuestRecord>, StoreError> {
        Self::scan_values(&self.contests, "quests:")
    }

    pub fn put_assignment(&self, assignment: &QuestAssignmentRecord) -> Result<(), StoreError> {
        let bytes = Self::serialize(assignment)?;
        self.contests.insert(
            Self::assignment_key(&assignment.account_id, &assignment.quest_id),
            bytes,
        )?;
        self.contests.flush()?;
        Ok(())
    }

    pub fn find_assignment(
        &self,
        account_id: &str,
        quest_id: &str,
    ) -> Result<Option<QuestAssignmentRecord>, StoreError> {
        match self
            .contests
            .get(Self::assignment_key(account_id, quest_id))?
        {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn list_assignments(
        &self,
        account_id: &str,
    ) -> Result<Vec<QuestAssignmentRecord>, StoreError> {
        Self::scan_values(&self.contests, &format!("assignments:{}:", account_id))
    }

    // ------------------------------------------------------------------
    // Activity feed & leaderboard cache
    // ------------------------------------------------------------------

    pub fn append_activity(&self, entry: &ActivityEntry) -> Result<(), StoreError> {
        let key = format!("feed:{:020}", next_timestamp_nanos());
        let bytes = Self::serialize(entry)?;
        self.feed.insert(key, bytes)?;
        self.feed.flush()?;
        Ok(())
    }

    /// Most recent feed entries, newest first.
    pub fn recent_activity(&self, limit: usize) -> Result<Vec<ActivityEntry>, StoreError> {
        let mut out = Vec::new();
        for entry in self.feed.scan_prefix(b"feed:").rev().take(limit) {
            let (_, value) = entry?;
            out.push(Self::deserialize(value)?);
        }
        Ok(out)
    }

    fn board_key(kind: BoardKind) -> String {
        format!("boards:{}", kind.as_key())
    }

    pub fn put_board(&self, board: &LeaderboardCacheEntry) -> Result<(), StoreError> {
        let bytes = Self::serialize(board)?;
        self.feed.insert(Self::board_key(board.kind), bytes)?;
        self.feed.flush()?;
        Ok(())
    }

    pub fn find_board(
        &self,
        kind: BoardKind,
    ) -> Result<Option<LeaderboardCacheEntry>, StoreError> {
        match self.feed.get(Self::board_key(kind))? {
            Some(bytes) => Ok(Some(Self::deserialize(bytes)?)),
            None => Ok(None),
        }
    }
}
