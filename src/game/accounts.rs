//! Account registration, authentication and administration.
//!
//! Password hashing uses Argon2id exactly as configured; the hash string is
//! opaque to the rest of the system.

use argon2::{Algorithm, Argon2, Params, Version};
use log::info;
use password_hash::{PasswordHasher, PasswordVerifier};

use crate::config::Argon2Config;
use crate::game::errors::GameError;
use crate::game::types::{AccountRecord, Rank, Role};
use crate::logutil::escape_log;
use crate::storage::GameStore;
use crate::validation::validate_username;

const PASSWORD_MIN: usize = 8;

/// Build an Argon2 hasher from optional config overrides.
pub fn argon2_from_config(config: Option<&Argon2Config>) -> Argon2<'static> {
    if let Some(cfg) = config {
        let defaults = Params::default();
        let params = Params::new(
            cfg.memory_kib.unwrap_or(defaults.m_cost()),
            cfg.time_cost.unwrap_or(defaults.t_cost()),
            cfg.parallelism.unwrap_or(defaults.p_cost()),
            None,
        );
        if let Ok(p) = params {
            return Argon2::new(Algorithm::Argon2id, Version::V0x13, p);
        }
    }
    Argon2::default()
}

pub fn hash_password(argon2: &Argon2<'_>, password: &str) -> Result<String, GameError> {
    if password.len() < PASSWORD_MIN {
        return Err(GameError::validation(format!(
            "password too short (minimum {} characters)",
            PASSWORD_MIN
        )));
    }
    let salt = password_hash::SaltString::generate(&mut rand::thread_rng());
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| GameError::validation(format!("password hash failure: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(argon2: &Argon2<'_>, stored: &str, password: &str) -> bool {
    match password_hash::PasswordHash::new(stored) {
        Ok(parsed) => argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

/// Register a new account. Fails on duplicate username; never touches the
/// session registry (capacity is the caller's concern, checked first).
pub fn register(
    store: &GameStore,
    argon2: &Argon2<'_>,
    username: &str,
    password: &str,
    role: Role,
) -> Result<AccountRecord, GameError> {
    let validated = validate_username(username)
        .map_err(|e| GameError::validation(format!("invalid username: {}", e)))?;

    if store.find_account_by_username(&validated)?.is_some() {
        return Err(GameError::conflict(format!(
            "username '{}' is already taken",
            validated
        )));
    }

    let mut account = AccountRecord::new(&validated, role);
    account.password_hash = Some(hash_password(argon2, password)?);
    store.put_account(account.clone())?;
    info!(
        "registered {} account '{}'",
        role,
        escape_log(&validated)
    );
    Ok(account)
}

/// Verify credentials and the requested role. A role mismatch is rejected
/// without creating a session or mutating anything.
pub fn authenticate(
    store: &GameStore,
    argon2: &Argon2<'_>,
    username: &str,
    password: &str,
    role: Role,
) -> Result<AccountRecord, GameError> {
    let account = store
        .find_account_by_username(username)?
        .ok_or_else(|| GameError::not_found(format!("account: {}", escape_log(username))))?;

    let stored = account
        .password_hash
        .as_deref()
        .ok_or_else(|| GameError::unauthorized("account has no password set"))?;
    if !verify_password(argon2, stored, password) {
        return Err(GameError::unauthorized("invalid credentials"));
    }
    if account.role != role {
        return Err(GameError::unauthorized(format!(
            "account role is {}, not {}",
            account.role, role
        )));
    }
    Ok(account)
}

/// Delete an account. Admin only; admin accounts themselves are never
/// deletable.
pub fn delete_account(
    store: &GameStore,
    actor: &AccountRecord,
    target_username: &str,
) -> Result<AccountRecord, GameError> {
    if !actor.is_admin() {
        return Err(GameError::unauthorized("only admins may delete accounts"));
    }
    let target = store
        .find_account_by_username(target_username)?
        .ok_or_else(|| {
            GameError::not_found(format!("account: {}", escape_log(target_username)))
        })?;
    if target.is_admin() {
        return Err(GameError::unauthorized("admin accounts cannot be deleted"));
    }
    store.delete_account(&target.id)?;
    info!(
        "account '{}' deleted by '{}'",
        escape_log(&target.username),
        escape_log(&actor.username)
    );
    Ok(target)
}

/// Rank earned for a win count. Monotonic in wins.
pub fn rank_for_wins(wins: u32) -> Rank {
    match wins {
        0..=9 => Rank::Novice,
        10..=24 => Rank::Bronze,
        25..=49 => Rank::Silver,
        50..=99 => Rank::Gold,
        100..=199 => Rank::Platinum,
        200..=399 => Rank::Diamond,
        _ => Rank::Legend,
    }
}

/// Promote the account's rank if its win count has crossed a threshold.
/// Ranks never regress. Returns true when the rank changed.
pub fn refresh_rank(account: &mut AccountRecord) -> bool {
    let earned = rank_for_wins(account.wins);
    if earned > account.rank {
        account.rank = earned;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, GameStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStore::open(dir.path()).expect("store");
        (dir, store)
    }

    #[test]
    fn register_and_authenticate() {
        let (_dir, store) = test_store();
        let argon2 = Argon2::default();
        let account =
            register(&store, &argon2, "alice", "correct horse", Role::Player).expect("register");
        assert_eq!(account.balances.gold, 500);
        assert_eq!(account.rank, Rank::Novice);

        let authed =
            authenticate(&store, &argon2, "alice", "correct horse", Role::Player).expect("auth");
        assert_eq!(authed.id, account.id);

        assert!(authenticate(&store, &argon2, "alice", "wrong", Role::Player).is_err());
    }

    #[test]
    fn role_mismatch_is_rejected() {
        let (_dir, store) = test_store();
        let argon2 = Argon2::default();
        register(&store, &argon2, "alice", "correct horse", Role::Player).expect("register");
        let err = authenticate(&store, &argon2, "alice", "correct horse", Role::Admin)
            .expect_err("should reject");
        assert!(matches!(err, GameError::Unauthorized(_)));
    }

    #[test]
    fn duplicate_username_conflicts() {
        let (_dir, store) = test_store();
        let argon2 = Argon2::default();
        register(&store, &argon2, "alice", "password123", Role::Player).expect("register");
        let err = register(&store, &argon2, "alice", "password456", Role::Player)
            .expect_err("duplicate");
        assert!(matches!(err, GameError::Conflict(_)));
    }

    #[test]
    fn admin_accounts_cannot_be_deleted() {
        let (_dir, store) = test_store();
        let argon2 = Argon2::default();
        let admin = register(&store, &argon2, "overseer", "password123", Role::Admin)
            .expect("admin");
        let other = register(&store, &argon2, "keeper", "password123", Role::Admin)
            .expect("admin2");
        let err = delete_account(&store, &admin, &other.username).expect_err("protected");
        assert!(matches!(err, GameError::Unauthorized(_)));
    }

    #[test]
    fn ranks_never_regress() {
        let mut account = AccountRecord::new("vera", Role::Player);
        account.wins = 30;
        assert!(refresh_rank(&mut account));
        assert_eq!(account.rank, Rank::Silver);
        account.wins = 30;
        assert!(!refresh_rank(&mut account));
        account.rank = Rank::Gold;
        account.wins = 26;
        assert!(!refresh_rank(&mut account));
        assert_eq!(account.rank, Rank::Gold);
    }
}
