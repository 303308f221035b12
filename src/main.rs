//! Binary entrypoint for the Runekeep CLI.
//!
//! Commands:
//! - `start` - run the game server
//! - `init` - create a starter `config.toml`
//! - `status` - print store statistics
//! - `admin-passwd` - create an admin account or reset its password (argon2 hashed)
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use runekeep::config::Config;
use runekeep::game::accounts;
use runekeep::game::types::Role;
use runekeep::server::GameServer;
use runekeep::storage::GameStore;

#[derive(Parser)]
#[command(name = "runekeep")]
#[command(about = "A persistent multiplayer RPG backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the game server
    Start,
    /// Initialize a new configuration file
    Init,
    /// Show store statistics
    Status,
    /// Create an admin account or reset its password
    AdminPasswd {
        /// Admin username
        #[arg(short, long, default_value = "overseer")]
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    if !matches!(cli.command, Commands::Init) {
        init_logging(&pre_config, cli.verbose);
    }

    match cli.command {
        Commands::Start => {
            let config = match pre_config {
                Some(c) => c,
                None => Config::load(&cli.config).await?,
            };
            info!("Starting Runekeep v{}", env!("CARGO_PKG_VERSION"));
            let mut server = GameServer::new(config).await?;
            server.run().await?;
        }
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Wrote starter configuration to {}", cli.config);
            println!("Next: set an admin password with `runekeep admin-passwd`.");
        }
        Commands::Status => {
            let config = pre_config
                .ok_or_else(|| anyhow!("no config at {}; run `runekeep init` first", cli.config))?;
            let store = GameStore::open(&config.storage.data_dir)?;
            let accounts = store.list_accounts()?;
            let players = accounts.iter().filter(|a| a.role == Role::Player).count();
            let admins = accounts.len() - players;
            let guilds = store.list_guilds()?.len();
            let active = store.active_auction()?;
            println!("{}", config.server.name);
            println!("  accounts: {} players, {} admins", players, admins);
            println!("  guilds:   {}", guilds);
            match active {
                Some(auction) => println!(
                    "  auction:  {} active, ends {:?}",
                    auction.skill_id, auction.ends_at
                ),
                None => println!("  auction:  none active"),
            }
        }
        Commands::AdminPasswd { username } => {
            let config = pre_config
                .ok_or_else(|| anyhow!("no config at {}; run `runekeep init` first", cli.config))?;
            let store = GameStore::open(&config.storage.data_dir)?;
            let argon2 = accounts::argon2_from_config(
                config.security.as_ref().and_then(|s| s.argon2.as_ref()),
            );
            let password = rpassword::prompt_password("New admin password: ")?;
            let confirm = rpassword::prompt_password("Confirm password: ")?;
            if password != confirm {
                return Err(anyhow!("passwords do not match"));
            }
            match store.find_account_by_username(&username)? {
                Some(mut account) => {
                    if account.role != Role::Admin {
                        return Err(anyhow!("'{}' exists but is not an admin", username));
                    }
                    account.password_hash =
                        Some(accounts::hash_password(&argon2, &password)
                            .map_err(|e| anyhow!("{}", e))?);
                    store.put_account(account)?;
                    println!("Password updated for admin '{}'.", username);
                }
                None => {
                    accounts::register(&store, &argon2, &username, &password, Role::Admin)
                        .map_err(|e| anyhow!("{}", e))?;
                    println!("Admin account '{}' created.", username);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level.
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|c| c.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    if let Some(cfg) = config {
        if let Some(ref file) = cfg.logging.file {
            if let Ok(f) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
            {
                let mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
                let is_tty = atty::is(atty::Stream::Stdout);
                builder.format(move |_fmt, record| {
                    let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                    let line = format!("{} [{}] {}", ts, record.level(), record.args());
                    if let Ok(mut guard) = mutex.lock() {
                        let _ = writeln!(guard, "{}", line);
                    }
                    if is_tty {
                        println!("{}", line);
                    }
                    Ok(())
                });
            }
        }
    }
    let _ = builder.try_init();
}
