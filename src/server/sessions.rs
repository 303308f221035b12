//! # Session Registry
//!
//! Tracks which accounts are online, enforces the concurrent-session cap,
//! and expires idle sessions.
//!
//! ## Session Lifecycle
//!
//! 1. **Login** - a session is created (or refreshed, re-entrantly) for an
//!    authenticated account
//! 2. **Heartbeat** - activity pushes the idle deadline forward
//! 3. **Logout / sweep** - explicit logout or the periodic sweep removes it
//!
//! Capacity counts *sessions*, not accounts: logging in again while already
//! online refreshes the existing session and never trips the cap. A
//! brand-new login at capacity is rejected with the current/max counts and
//! must leave no trace.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::HashMap;

use crate::game::errors::GameError;
use crate::game::types::Role;

/// One online account. Ephemeral: lives only in the registry, never in the
/// store.
#[derive(Debug, Clone)]
pub struct OnlineSession {
    pub account_id: String,
    pub username: String,
    pub role: Role,
    pub login_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl OnlineSession {
    fn new(account_id: &str, username: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            account_id: account_id.to_string(),
            username: username.to_string(),
            role,
            login_time: now,
            last_activity: now,
        }
    }

    /// Check if the session has been idle past the timeout.
    pub fn is_inactive(&self, timeout: Duration) -> bool {
        Utc::now() - self.last_activity > timeout
    }
}

/// Owned collection of live sessions. Constructed per server instance so
/// tests get isolated registries.
pub struct SessionRegistry {
    sessions: HashMap<String, OnlineSession>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(max_sessions: usize, idle_timeout_minutes: u32) -> Self {
        Self {
            sessions: HashMap::new(),
            max_sessions,
            idle_timeout: Duration::minutes(idle_timeout_minutes as i64),
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub fn online_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_full(&self) -> bool {
        self.sessions.len() >= self.max_sessions
    }

    pub fn is_online(&self, account_id: &str) -> bool {
        self.sessions.contains_key(account_id)
    }

    pub fn online_ids(&self) -> Vec<String> {
        self.sessions.keys().cloned().collect()
    }

    pub fn get(&self, account_id: &str) -> Option<&OnlineSession> {
        self.sessions.get(account_id)
    }

    /// Create or refresh a session. Re-entrant for accounts already online;
    /// otherwise subject to the capacity cap.
    pub fn login(
        &mut self,
        account_id: &str,
        username: &str,
        role: Role,
    ) -> Result<&OnlineSession, GameError> {
        let current = self.sessions.len();
        let max = self.max_sessions;
        match self.sessions.entry(account_id.to_string()) {
            std::collections::hash_map::Entry::Occupied(occupied) => {
                let session = occupied.into_mut();
                session.last_activity = Utc::now();
                debug!("session refreshed for {}", username);
                Ok(session)
            }
            std::collections::hash_map::Entry::Vacant(vacant) => {
                if current >= max {
                    return Err(GameError::ServerFull { current, max });
                }
                let session = vacant.insert(OnlineSession::new(account_id, username, role));
                info!(
                    "session opened for {} ({} of {} online)",
                    username,
                    current + 1,
                    max
                );
                Ok(session)
            }
        }
    }

    /// Push the idle deadline forward. Returns false for unknown sessions.
    pub fn heartbeat(&mut self, account_id: &str) -> bool {
        match self.sessions.get_mut(account_id) {
            Some(session) => {
                session.last_activity = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn logout(&mut self, account_id: &str) -> Option<OnlineSession> {
        let removed = self.sessions.remove(account_id);
        if let Some(ref session) = removed {
            info!("session closed for {}", session.username);
        }
        removed
    }

    /// Remove every session idle past the timeout. Returns the evicted
    /// sessions; an empty sweep touches nothing.
    pub fn sweep(&mut self) -> Vec<OnlineSession> {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|(_, s)| s.is_inactive(self.idle_timeout))
            .map(|(id, _)| id.clone())
            .collect();
        let mut evicted = Vec::with_capacity(expired.len());
        for id in expired {
            if let Some(session) = self.sessions.remove(&id) {
                info!(
                    "session for {} expired after inactivity",
                    session.username
                );
                evicted.push(session);
            }
        }
        evicted
    }
}
