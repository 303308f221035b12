//! Materialized leaderboards with a freshness window.
//!
//! Boards are memoized views over accounts and guilds, rebuilt when read
//! past their TTL. Guild battle completion refreshes the guild-wins board
//! eagerly rather than waiting for the window to lapse.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::game::errors::GameError;
use crate::game::strength::account_strength;
use crate::game::types::{BoardKind, BoardRow, LeaderboardCacheEntry, Role};
use crate::storage::GameStore;

pub const BOARD_TTL_MINUTES: i64 = 5;
const BOARD_SIZE: usize = 20;

fn build_rows(store: &GameStore, kind: BoardKind) -> Result<Vec<BoardRow>, GameError> {
    let mut rows: Vec<BoardRow> = match kind {
        BoardKind::PlayerWins => store
            .list_accounts()?
            .into_iter()
            .filter(|a| a.role == Role::Player)
            .map(|a| BoardRow {
                subject_id: a.id,
                name: a.username,
                value: a.wins as u64,
            })
            .collect(),
        BoardKind::PlayerStrength => {
            let mut out = Vec::new();
            for account in store.list_accounts()? {
                if account.role != Role::Player {
                    continue;
                }
                let value = account_strength(store, &account)?;
                out.push(BoardRow {
                    subject_id: account.id,
                    name: account.username,
                    value,
                });
            }
            out
        }
        BoardKind::GuildWins => store
            .list_guilds()?
            .into_iter()
            .map(|g| BoardRow {
                subject_id: g.id,
                name: g.name,
                value: g.wins as u64,
            })
            .collect(),
    };
    rows.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    rows.truncate(BOARD_SIZE);
    Ok(rows)
}

/// Rebuild a board unconditionally and cache it.
pub fn refresh_board(
    store: &GameStore,
    kind: BoardKind,
) -> Result<LeaderboardCacheEntry, GameError> {
    let entry = LeaderboardCacheEntry {
        kind,
        rows: build_rows(store, kind)?,
        refreshed_at: Utc::now(),
    };
    store.put_board(&entry)?;
    debug!("leaderboard {:?} refreshed ({} rows)", kind, entry.rows.len());
    Ok(entry)
}

fn is_fresh(entry: &LeaderboardCacheEntry, now: DateTime<Utc>) -> bool {
    now - entry.refreshed_at < Duration::minutes(BOARD_TTL_MINUTES)
}

/// Read a board, serving the cached copy while it is inside the TTL and
/// rebuilding otherwise.
pub fn get_board(
    store: &GameStore,
    kind: BoardKind,
    now: DateTime<Utc>,
) -> Result<LeaderboardCacheEntry, GameError> {
    if let Some(cached) = store.find_board(kind)? {
        if is_fresh(&cached, now) {
            return Ok(cached);
        }
    }
    refresh_board(store, kind)
}
