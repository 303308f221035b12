//! # Runekeep - Persistent Multiplayer RPG Backend
//!
//! Runekeep is the server side of a persistent multiplayer RPG: accounts,
//! inventory, pets, guilds, auctions, trading, quests and battle
//! resolution, mediated through a request API with push notifications to
//! connected clients.
//!
//! ## Features
//!
//! - **Capacity-Limited Sessions**: A fixed pool of concurrent sessions
//!   with heartbeat refresh and idle eviction on a periodic sweep.
//! - **Live Push Events**: Per-admin, per-player and broadcast channels
//!   with keep-alive pulses and silent removal of dead subscribers.
//! - **Contest Engines**: 1v1 challenges, guild-vs-guild tournament
//!   battles, deterministic solo NPC combat and guild co-op dungeons.
//! - **Timed Skill Auctions**: A FIFO auction queue with strictly
//!   ascending bids and guarded exactly-once settlement.
//! - **Economy Invariants**: Checked debits everywhere gold, shards and
//!   runes move: trades, guild banks, quest rewards.
//! - **Security**: Argon2id password hashing and input validation on every
//!   player-supplied name.
//! - **Async Design**: Built with Tokio; one owning server task serializes
//!   all mutation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use runekeep::config::Config;
//! use runekeep::server::GameServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let config = Config::load("config.toml").await?;
//!
//!     // Create and run the game server
//!     let mut server = GameServer::new(config).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`server`] - The owning server task, session registry and event broadcaster
//! - [`game`] - Contest engines, economy rules and record types
//! - [`storage`] - Sled-backed persistence gateway
//! - [`config`] - Configuration management and validation
//! - [`validation`] - Input validation for player-supplied names

pub mod config;
pub mod game;
pub mod logutil;
pub mod server;
pub mod storage;
pub mod validation;
