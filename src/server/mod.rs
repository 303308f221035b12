//! # Game Server
//!
//! The `GameServer` owns every piece of mutable state (the store, the
//! session registry and the event broadcaster) and handles requests one
//! at a time on a single task. That ownership is the concurrency model:
//! each handler runs its whole read-modify-write sequence to completion
//! before the next begins, so balance checks can never interleave with
//! debits, and events always publish after the mutation they describe.
//!
//! The transport layer (HTTP routes, test harnesses) calls the public
//! methods; [`GameServer::run`] drives the periodic work (session sweep,
//! keep-alive pulses, and the auction expiry check) from interval arms in
//! one `select!` loop.

pub mod events;
pub mod sessions;

use anyhow::Result;
use argon2::Argon2;
use chrono::Utc;
use log::{info, warn};
use rand::Rng;
use serde_json::{json, Value};
use tokio::time::{interval, Duration};

use crate::config::Config;
use crate::game::types::{
    AccountRecord, ActivityEntry, ActivityKind, BankResource, BoardKind, ChallengeStatus,
    Element, EquipSlot, GuildRecord, LeaderboardCacheEntry, QuestRewards, Role, StatKind,
    TradeOfferKind,
};
use crate::game::{
    accounts, auction, challenge, dungeon, guild, guild_battle, inventory, leaderboard, npc,
    pets, quest, trade, GameError,
};
use crate::logutil::escape_log;
use crate::storage::GameStore;
use events::{EventBroadcaster, EventSink};
use sessions::SessionRegistry;

/// What a successful login tells the transport layer.
#[derive(Debug)]
pub struct LoginReply {
    pub account: AccountRecord,
    pub newly_registered: bool,
    pub online: usize,
    pub capacity: usize,
}

pub struct GameServer {
    config: Config,
    store: GameStore,
    argon2: Argon2<'static>,
    registry: SessionRegistry,
    broadcaster: EventBroadcaster,
}

fn to_payload<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl GameServer {
    /// Open the store and build a server from configuration.
    pub async fn new(config: Config) -> Result<Self> {
        let store = GameStore::open(&config.storage.data_dir)?;
        let argon2 = accounts::argon2_from_config(
            config
                .security
                .as_ref()
                .and_then(|s| s.argon2.as_ref()),
        );
        let registry = SessionRegistry::new(
            config.server.max_sessions,
            config.server.session_timeout_minutes,
        );
        info!(
            "{} starting: capacity {} sessions, data at {}",
            config.server.name, config.server.max_sessions, config.storage.data_dir
        );
        Ok(Self {
            config,
            store,
            argon2,
            registry,
            broadcaster: EventBroadcaster::new(),
        })
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Sessions & subscriptions
    // ------------------------------------------------------------------

    /// Log in, creating the player account on first contact.
    ///
    /// Order matters: the capacity check runs before any account creation,
    /// so a rejected login leaves no trace. Re-entrant logins for accounts
    /// already online never count against capacity.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<LoginReply, GameError> {
        let existing = self.store.find_account_by_username(username)?;
        let (account, newly_registered) = match existing {
            Some(_) => {
                let account =
                    accounts::authenticate(&self.store, &self.argon2, username, password, role)?;
                if !self.registry.is_online(&account.id) && self.registry.is_full() {
                    return Err(GameError::ServerFull {
                        current: self.registry.online_count(),
                        max: self.registry.max_sessions(),
                    });
                }
                (account, false)
            }
            None => {
                if role != Role::Player {
                    return Err(GameError::not_found(format!(
                        "account: {}",
                        escape_log(username)
                    )));
                }
                if self.registry.is_full() {
                    return Err(GameError::ServerFull {
                        current: self.registry.online_count(),
                        max: self.registry.max_sessions(),
                    });
                }
                let account =
                    accounts::register(&self.store, &self.argon2, username, password, role)?;
                (account, true)
            }
        };

        self.registry
            .login(&account.id, &account.username, account.role)?;
        let mut stored = account.clone();
        stored.last_login = Utc::now();
        self.store.put_account(stored.clone())?;

        if newly_registered {
            self.broadcaster.to_admins(
                "newPlayer",
                json!({ "id": stored.id, "username": stored.username }),
            );
            self.store.append_activity(&ActivityEntry::new(
                &stored.id,
                ActivityKind::Registration,
                &format!("{} joined the realm", stored.username),
            ))?;
        }

        Ok(LoginReply {
            account: stored,
            newly_registered,
            online: self.registry.online_count(),
            capacity: self.registry.max_sessions(),
        })
    }

    pub fn heartbeat(&mut self, account_id: &str) -> bool {
        self.registry.heartbeat(account_id)
    }

    pub fn logout(&mut self, account_id: &str) {
        self.registry.logout(account_id);
        self.broadcaster.unsubscribe_player(account_id);
        self.broadcaster.unsubscribe_admin(account_id);
    }

    pub fn subscribe_player(&mut self, account_id: &str, sink: Box<dyn EventSink>) {
        self.broadcaster.subscribe_player(account_id, sink);
    }

    pub fn subscribe_admin(&mut self, account_id: &str, sink: Box<dyn EventSink>) {
        self.broadcaster.subscribe_admin(account_id, sink);
    }

    pub fn unsubscribe_player(&mut self, account_id: &str) {
        self.broadcaster.unsubscribe_player(account_id);
    }

    pub fn unsubscribe_admin(&mut self, account_id: &str) {
        self.broadcaster.unsubscribe_admin(account_id);
    }

    fn actor(&self, account_id: &str) -> Result<AccountRecord, GameError> {
        Ok(self.store.get_account(account_id)?)
    }

    /// Admin account deletion; also tears down any live session.
    pub fn delete_account(
        &mut self,
        actor_id: &str,
        target_username: &str,
    ) -> Result<(), GameError> {
        let actor = self.actor(actor_id)?;
        let target = accounts::delete_account(&self.store, &actor, target_username)?;
        self.logout(&target.id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Challenges
    // ------------------------------------------------------------------

    pub fn propose_challenge(
        &mut self,
        challenger_id: &str,
        challenged_id: &str,
    ) -> Result<crate::game::types::ChallengeRecord, GameError> {
        let record = challenge::propose(&self.store, challenger_id, challenged_id)?;
        self.broadcaster
            .to_player(challenged_id, "newChallenge", to_payload(&record));
        Ok(record)
    }

    pub fn respond_challenge(
        &mut self,
        challenge_id: &str,
        responder_id: &str,
        accept: bool,
    ) -> Result<crate::game::types::ChallengeRecord, GameError> {
        let record = challenge::respond(&self.store, challenge_id, responder_id, accept)?;
        let event = if record.status == ChallengeStatus::Accepted {
            "challengeAccepted"
        } else {
            "challengeDeclined"
        };
        self.broadcaster
            .to_player(&record.challenger_id, event, to_payload(&record));
        Ok(record)
    }

    pub fn cancel_challenge(
        &mut self,
        challenge_id: &str,
        actor_id: &str,
    ) -> Result<crate::game::types::ChallengeRecord, GameError> {
        challenge::cancel(&self.store, challenge_id, actor_id)
    }

    pub fn set_challenge_winner(
        &mut self,
        actor_id: &str,
        challenge_id: &str,
        winner_id: &str,
    ) -> Result<challenge::ChallengeOutcome, GameError> {
        let actor = self.actor(actor_id)?;
        let outcome = challenge::set_winner(&self.store, &actor, challenge_id, winner_id)?;
        self.broadcaster.to_admins(
            "playerUpdate",
            json!({
                "winner": to_payload(&outcome.winner),
                "loser": to_payload(&outcome.loser),
            }),
        );
        let result = json!({
            "challengeId": outcome.challenge.id,
            "winnerId": outcome.winner.id,
            "loserId": outcome.loser.id,
        });
        self.broadcaster
            .to_player(&outcome.winner.id, "challengeResult", result.clone());
        self.broadcaster
            .to_player(&outcome.loser.id, "challengeResult", result);
        self.store.append_activity(&ActivityEntry::new(
            &outcome.winner.id,
            ActivityKind::ChallengeResult,
            &format!("{} defeated {}", outcome.winner.username, outcome.loser.username),
        ))?;
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // NPC & dungeon combat
    // ------------------------------------------------------------------

    pub fn fight_npc(&mut self, account_id: &str) -> Result<npc::SoloBattleOutcome, GameError> {
        let luck_roll = rand::thread_rng().gen::<f64>();
        let outcome = npc::resolve_solo_battle(&self.store, account_id, luck_roll)?;
        self.broadcaster.to_player(
            account_id,
            "npcBattle",
            json!({
                "victory": outcome.victory,
                "floor": outcome.floor,
                "level": outcome.level,
                "boss": outcome.boss,
                "playerPower": outcome.player_power,
                "npcPower": outcome.npc_power,
            }),
        );
        if outcome.victory && outcome.boss {
            self.store.append_activity(&ActivityEntry::new(
                account_id,
                ActivityKind::DungeonVictory,
                &format!("cleared the floor {} boss", outcome.floor),
            ))?;
        }
        Ok(outcome)
    }

    pub fn fight_guild_dungeon(
        &mut self,
        account_id: &str,
    ) -> Result<dungeon::DungeonOutcome, GameError> {
        let guild = self
            .store
            .find_guild_of(account_id)?
            .ok_or_else(|| GameError::not_found("you are not in a guild"))?;
        let online = self.registry.online_ids();
        let luck_roll = rand::thread_rng().gen::<f64>();
        let outcome = dungeon::resolve_dungeon_battle(&self.store, &guild.id, &online, luck_roll)?;
        if outcome.victory {
            let payload = json!({
                "guildId": outcome.guild_id,
                "floor": outcome.floor,
                "level": outcome.level,
                "boss": outcome.boss,
                "rewards": outcome.rewards.map(|r| json!({
                    "gold": r.gold,
                    "soulShards": r.soul_shards,
                    "runes": r.runes,
                })),
            });
            for member in &outcome.party {
                self.broadcaster
                    .to_player(member, "dungeonVictory", payload.clone());
            }
            self.store.append_activity(&ActivityEntry::new(
                account_id,
                ActivityKind::DungeonVictory,
                &format!(
                    "guild cleared dungeon floor {} level {}",
                    outcome.floor, outcome.level
                ),
            ))?;
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Guilds
    // ------------------------------------------------------------------

    pub fn create_guild(
        &mut self,
        founder_id: &str,
        name: &str,
    ) -> Result<GuildRecord, GameError> {
        guild::create_guild(&self.store, founder_id, name)
    }

    pub fn invite_to_guild(
        &mut self,
        guild_id: &str,
        master_id: &str,
        target_id: &str,
    ) -> Result<(), GameError> {
        let invite = guild::invite(&self.store, guild_id, master_id, target_id)?;
        let guild = self.store.get_guild(guild_id)?;
        self.broadcaster.to_player(
            target_id,
            "guildInvite",
            json!({ "guildId": invite.guild_id, "guildName": guild.name }),
        );
        Ok(())
    }

    pub fn respond_guild_invite(
        &mut self,
        account_id: &str,
        guild_id: &str,
        accept: bool,
    ) -> Result<Option<GuildRecord>, GameError> {
        guild::respond_invite(&self.store, account_id, guild_id, accept)
    }

    pub fn leave_guild(&mut self, account_id: &str) -> Result<(), GameError> {
        guild::leave_guild(&self.store, account_id)
    }

    pub fn kick_guild_member(
        &mut self,
        master_id: &str,
        target_id: &str,
    ) -> Result<GuildRecord, GameError> {
        guild::kick_member(&self.store, master_id, target_id)
    }

    pub fn guild_deposit(
        &mut self,
        account_id: &str,
        resource: BankResource,
        amount: u64,
    ) -> Result<GuildRecord, GameError> {
        guild::deposit(&self.store, account_id, resource, amount)
    }

    pub fn guild_withdraw(
        &mut self,
        master_id: &str,
        resource: BankResource,
        amount: u64,
    ) -> Result<GuildRecord, GameError> {
        guild::withdraw(&self.store, master_id, resource, amount)
    }

    pub fn upgrade_guild(&mut self, master_id: &str) -> Result<GuildRecord, GameError> {
        guild::upgrade_guild(&self.store, master_id)
    }

    // ------------------------------------------------------------------
    // Guild battles
    // ------------------------------------------------------------------

    pub fn propose_guild_battle(
        &mut self,
        master_id: &str,
        challenged_guild_id: &str,
        fighters: Vec<String>,
    ) -> Result<crate::game::types::GuildBattleRecord, GameError> {
        guild_battle::propose_battle(&self.store, master_id, challenged_guild_id, fighters)
    }

    pub fn respond_guild_battle(
        &mut self,
        battle_id: &str,
        master_id: &str,
        accept: bool,
        fighters: Vec<String>,
    ) -> Result<crate::game::types::GuildBattleRecord, GameError> {
        guild_battle::respond_battle(&self.store, battle_id, master_id, accept, fighters)
    }

    /// Record a round. On completion the guild-wins board refreshes
    /// eagerly and everyone hears about it.
    pub fn record_guild_battle_round(
        &mut self,
        actor_id: &str,
        battle_id: &str,
        winner_account_id: &str,
    ) -> Result<guild_battle::RoundOutcome, GameError> {
        let actor = self.actor(actor_id)?;
        let outcome =
            guild_battle::record_round_winner(&self.store, &actor, battle_id, winner_account_id)?;
        if outcome.completed {
            leaderboard::refresh_board(&self.store, BoardKind::GuildWins)?;
            self.broadcaster.to_all_players(
                "guildBattleComplete",
                json!({
                    "battleId": outcome.battle.id,
                    "winnerGuild": outcome.battle.winner_guild,
                    "challengerScore": outcome.battle.challenger_score,
                    "challengedScore": outcome.battle.challenged_score,
                }),
            );
            if let Some(winner) = &outcome.winner_guild {
                self.store.append_activity(&ActivityEntry::new(
                    &winner.master_id,
                    ActivityKind::GuildBattle,
                    &format!("{} won a guild battle", winner.name),
                ))?;
            }
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Skill auctions
    // ------------------------------------------------------------------

    pub fn queue_auction(
        &mut self,
        actor_id: &str,
        skill_id: &str,
    ) -> Result<crate::game::types::SkillAuctionRecord, GameError> {
        let actor = self.actor(actor_id)?;
        auction::queue_auction(&self.store, &actor, skill_id)
    }

    /// Explicit admin start of the next queued auction.
    pub fn start_next_auction(
        &mut self,
        actor_id: &str,
    ) -> Result<Option<crate::game::types::SkillAuctionRecord>, GameError> {
        let actor = self.actor(actor_id)?;
        if !actor.is_admin() {
            return Err(GameError::unauthorized("only admins may start auctions"));
        }
        let started = auction::start_next_auction(
            &self.store,
            Utc::now(),
            self.config.auction.duration_hours,
        )?;
        if let Some(ref record) = started {
            self.broadcaster
                .to_all_players("auction_started", to_payload(record));
        }
        Ok(started)
    }

    pub fn place_auction_bid(
        &mut self,
        bidder_id: &str,
        auction_id: &str,
        amount: u64,
    ) -> Result<crate::game::types::SkillBidRecord, GameError> {
        let bid = auction::place_bid(&self.store, bidder_id, auction_id, amount)?;
        self.broadcaster.to_all_players(
            "auction_bid",
            json!({ "auctionId": auction_id, "amount": amount }),
        );
        Ok(bid)
    }

    /// Explicit admin settlement; shares the status guard with the timer
    /// path, so whichever arrives second gets a conflict.
    pub fn finalize_auction(
        &mut self,
        actor_id: &str,
        auction_id: &str,
    ) -> Result<auction::FinalizeOutcome, GameError> {
        let actor = self.actor(actor_id)?;
        if !actor.is_admin() {
            return Err(GameError::unauthorized("only admins may finalize auctions"));
        }
        let outcome = auction::finalize_auction(&self.store, auction_id)?;
        self.publish_auction_ended(&outcome)?;
        Ok(outcome)
    }

    fn publish_auction_ended(
        &mut self,
        outcome: &auction::FinalizeOutcome,
    ) -> Result<(), GameError> {
        self.broadcaster.to_all_players(
            "auction_ended",
            json!({
                "auctionId": outcome.auction.id,
                "skillId": outcome.auction.skill_id,
                "winnerId": outcome.auction.winner_id,
            }),
        );
        if let Some(bid) = &outcome.winning_bid {
            self.store.append_activity(&ActivityEntry::new(
                &bid.bidder_id,
                ActivityKind::AuctionWin,
                &format!(
                    "won the {} auction at {} gold",
                    outcome.auction.skill_id, bid.amount
                ),
            ))?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Trades
    // ------------------------------------------------------------------

    pub fn open_trade(
        &mut self,
        initiator_id: &str,
        recipient_id: &str,
    ) -> Result<crate::game::types::TradeRecord, GameError> {
        trade::open_trade(&self.store, initiator_id, recipient_id)
    }

    pub fn add_trade_offer(
        &mut self,
        trade_id: &str,
        owner_id: &str,
        kind: TradeOfferKind,
        reference: &str,
    ) -> Result<crate::game::types::TradeRecord, GameError> {
        trade::add_offer(&self.store, trade_id, owner_id, kind, reference)
    }

    pub fn remove_trade_offer(
        &mut self,
        trade_id: &str,
        owner_id: &str,
        reference: &str,
    ) -> Result<crate::game::types::TradeRecord, GameError> {
        trade::remove_offer(&self.store, trade_id, owner_id, reference)
    }

    pub fn accept_trade(
        &mut self,
        trade_id: &str,
        party_id: &str,
    ) -> Result<crate::game::types::TradeRecord, GameError> {
        let (record, executed) = trade::accept_trade(&self.store, trade_id, party_id)?;
        if executed {
            self.store.append_activity(&ActivityEntry::new(
                &record.initiator_id,
                ActivityKind::TradeCompleted,
                &format!("traded {} offers", record.offers.len()),
            ))?;
        }
        Ok(record)
    }

    pub fn cancel_trade(
        &mut self,
        trade_id: &str,
        party_id: &str,
    ) -> Result<crate::game::types::TradeRecord, GameError> {
        trade::cancel_trade(&self.store, trade_id, party_id)
    }

    // ------------------------------------------------------------------
    // Quests, inventory, pets, leaderboards
    // ------------------------------------------------------------------

    pub fn create_quest(
        &mut self,
        actor_id: &str,
        name: &str,
        description: &str,
        rewards: QuestRewards,
    ) -> Result<crate::game::types::QuestRecord, GameError> {
        let actor = self.actor(actor_id)?;
        quest::create_quest(&self.store, &actor, name, description, rewards)
    }

    pub fn assign_quest(
        &mut self,
        actor_id: &str,
        quest_id: &str,
        account_id: &str,
    ) -> Result<(), GameError> {
        let actor = self.actor(actor_id)?;
        quest::assign_quest(&self.store, &actor, quest_id, account_id)?;
        let record = self.store.get_quest(quest_id)?;
        self.broadcaster.to_player(
            account_id,
            "questAssigned",
            json!({ "questId": record.id, "name": record.name }),
        );
        Ok(())
    }

    pub fn complete_quest(
        &mut self,
        actor_id: &str,
        quest_id: &str,
        account_id: &str,
    ) -> Result<(), GameError> {
        let actor = self.actor(actor_id)?;
        quest::complete_assignment(&self.store, &actor, quest_id, account_id)?;
        self.store.append_activity(&ActivityEntry::new(
            account_id,
            ActivityKind::QuestCompleted,
            "completed a quest",
        ))?;
        Ok(())
    }

    pub fn buy_item(
        &mut self,
        account_id: &str,
        catalog_id: &str,
    ) -> Result<crate::game::types::ItemRecord, GameError> {
        inventory::buy_item(&self.store, account_id, catalog_id)
    }

    pub fn equip_item(
        &mut self,
        account_id: &str,
        item_id: &str,
        slot: EquipSlot,
    ) -> Result<AccountRecord, GameError> {
        inventory::equip_item(&self.store, account_id, item_id, slot)
    }

    pub fn unequip_item(
        &mut self,
        account_id: &str,
        slot: EquipSlot,
    ) -> Result<AccountRecord, GameError> {
        inventory::unequip_slot(&self.store, account_id, slot)
    }

    pub fn train_item(
        &mut self,
        account_id: &str,
        item_id: &str,
        stat: StatKind,
        points: u64,
    ) -> Result<crate::game::types::ItemRecord, GameError> {
        inventory::train_item(&self.store, account_id, item_id, stat, points)
    }

    pub fn sell_item(&mut self, account_id: &str, item_id: &str) -> Result<u64, GameError> {
        inventory::sell_item(&self.store, account_id, item_id)
    }

    pub fn admin_transfer_item(
        &mut self,
        actor_id: &str,
        from_id: &str,
        to_id: &str,
        item_id: &str,
    ) -> Result<crate::game::types::ItemRecord, GameError> {
        let actor = self.actor(actor_id)?;
        inventory::admin_transfer_item(&self.store, &actor, from_id, to_id, item_id)
    }

    pub fn create_pet_egg(
        &mut self,
        account_id: &str,
        name: &str,
        element: Element,
    ) -> Result<crate::game::types::PetRecord, GameError> {
        pets::create_egg(&self.store, account_id, name, element)
    }

    pub fn feed_pet(
        &mut self,
        account_id: &str,
        pet_id: &str,
        amount: u64,
    ) -> Result<crate::game::types::PetRecord, GameError> {
        pets::feed_exp(&self.store, account_id, pet_id, amount)
    }

    pub fn merge_pets(
        &mut self,
        account_id: &str,
        first_id: &str,
        second_id: &str,
        name: &str,
    ) -> Result<crate::game::types::PetRecord, GameError> {
        pets::merge_pets(&self.store, account_id, first_id, second_id, name)
    }

    pub fn feed_pet_food(
        &mut self,
        account_id: &str,
        pet_id: &str,
        food_id: &str,
    ) -> Result<crate::game::types::PetRecord, GameError> {
        pets::feed_food(&self.store, account_id, pet_id, food_id)
    }

    pub fn equip_pet(
        &mut self,
        account_id: &str,
        pet_id: &str,
    ) -> Result<AccountRecord, GameError> {
        pets::equip_pet(&self.store, account_id, pet_id)
    }

    pub fn unequip_pet(&mut self, account_id: &str) -> Result<AccountRecord, GameError> {
        pets::unequip_pet(&self.store, account_id)
    }

    /// Admin skill grant outside the auction and trade paths.
    pub fn admin_grant_skill(
        &mut self,
        actor_id: &str,
        account_id: &str,
        skill_id: &str,
    ) -> Result<(), GameError> {
        let actor = self.actor(actor_id)?;
        if !actor.is_admin() {
            return Err(GameError::unauthorized("only admins may grant skills"));
        }
        if crate::game::catalog::find_catalog_skill(skill_id).is_none() {
            return Err(GameError::not_found(format!("skill: {}", skill_id)));
        }
        self.store.get_account(account_id)?;
        self.store.put_skill(&crate::game::types::PlayerSkillRecord::new(
            account_id,
            skill_id,
            crate::game::types::SkillSource::AdminGrant,
        ))?;
        Ok(())
    }

    pub fn leaderboard(&mut self, kind: BoardKind) -> Result<LeaderboardCacheEntry, GameError> {
        leaderboard::get_board(&self.store, kind, Utc::now())
    }

    pub fn recent_activity(
        &self,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, GameError> {
        Ok(self.store.recent_activity(limit)?)
    }

    // ------------------------------------------------------------------
    // Background work
    // ------------------------------------------------------------------

    /// Evict idle sessions. Quiet when nothing qualifies.
    pub fn sweep_sessions(&mut self) -> usize {
        let evicted = self.registry.sweep();
        for session in &evicted {
            self.broadcaster.unsubscribe_player(&session.account_id);
            self.broadcaster.unsubscribe_admin(&session.account_id);
        }
        evicted.len()
    }

    /// Pulse every push subscriber.
    pub fn keepalive(&mut self) {
        self.broadcaster.keepalive();
    }

    /// Timer path for auctions: finalize the expired one (if any), publish
    /// its result, and auto-start the next in the queue.
    pub fn check_auctions(&mut self) -> Result<(), GameError> {
        let sweep = auction::check_expired(
            &self.store,
            Utc::now(),
            self.config.auction.duration_hours,
        )?;
        if let Some(finalized) = sweep.finalized {
            self.publish_auction_ended(&finalized)?;
        }
        if let Some(started) = sweep.started {
            self.broadcaster
                .to_all_players("auction_started", to_payload(&started));
        }
        Ok(())
    }

    /// Drive the periodic work until shutdown. Request handling happens on
    /// this same task via the public methods, so the interval arms never
    /// observe a half-applied mutation.
    pub async fn run(&mut self) -> Result<()> {
        let mut sweep_tick = interval(Duration::from_secs(self.config.server.sweep_seconds));
        let mut keepalive_tick =
            interval(Duration::from_secs(self.config.server.keepalive_seconds));
        let mut auction_tick = interval(Duration::from_secs(
            self.config.auction.finalize_check_seconds,
        ));
        info!("{} running", self.config.server.name);

        loop {
            tokio::select! {
                _ = sweep_tick.tick() => {
                    let evicted = self.sweep_sessions();
                    if evicted > 0 {
                        info!("swept {} idle session(s)", evicted);
                    }
                }
                _ = keepalive_tick.tick() => {
                    self.keepalive();
                }
                _ = auction_tick.tick() => {
                    if let Err(e) = self.check_auctions() {
                        warn!("auction expiry check failed: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    break;
                }
            }
        }
        Ok(())
    }
}
