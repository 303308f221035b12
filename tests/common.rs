//! Test utilities & fixtures.
//! Builds isolated servers over throwaway sled stores.

use tempfile::TempDir;

use runekeep::config::Config;
use runekeep::game::accounts;
use runekeep::game::types::Role;
use runekeep::server::GameServer;

/// Build a server whose store lives inside `dir`, with a custom session
/// capacity. Every other setting keeps its default.
pub async fn server_with_capacity(dir: &TempDir, max_sessions: usize) -> GameServer {
    let mut config = Config::default();
    config.server.max_sessions = max_sessions;
    config.storage.data_dir = dir.path().join("data").to_string_lossy().to_string();
    GameServer::new(config).await.expect("server")
}

/// Build a server with the default 20-session capacity.
#[allow(dead_code)] // Not every suite needs the default-capacity variant.
pub async fn test_server(dir: &TempDir) -> GameServer {
    server_with_capacity(dir, 20).await
}

/// Register and log in a player, returning the account id.
#[allow(dead_code)]
pub fn login_player(server: &mut GameServer, username: &str) -> String {
    let reply = server
        .login(username, "password123", Role::Player)
        .expect("player login");
    reply.account.id
}

/// Seed an admin account directly in the store and log it in.
#[allow(dead_code)]
pub fn login_admin(server: &mut GameServer, username: &str) -> String {
    let argon2 = argon2::Argon2::default();
    let account = accounts::register(server.store(), &argon2, username, "password123", Role::Admin)
        .expect("admin registered");
    server
        .login(username, "password123", Role::Admin)
        .expect("admin login");
    account.id
}
