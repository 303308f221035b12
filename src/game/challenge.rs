//! 1v1 challenge lifecycle.
//!
//! State machine: `pending -> accepted -> winner set` (terminal), with
//! `declined` and `cancelled` as the other terminal exits from pending.
//! Win/loss records are updated exactly once, on winner assignment.

use log::info;

use crate::game::accounts::refresh_rank;
use crate::game::errors::GameError;
use crate::game::types::{AccountRecord, ChallengeRecord, ChallengeStatus};
use crate::storage::GameStore;

/// Result of winner assignment, with both updated participants so the
/// caller can publish notifications.
#[derive(Debug)]
pub struct ChallengeOutcome {
    pub challenge: ChallengeRecord,
    pub winner: AccountRecord,
    pub loser: AccountRecord,
}

/// Propose a challenge. Self-challenges are rejected before any state is
/// created.
pub fn propose(
    store: &GameStore,
    challenger_id: &str,
    challenged_id: &str,
) -> Result<ChallengeRecord, GameError> {
    if challenger_id == challenged_id {
        return Err(GameError::validation("you cannot challenge yourself"));
    }
    store.get_account(challenger_id)?;
    store.get_account(challenged_id)?;
    let challenge = ChallengeRecord::new(challenger_id, challenged_id);
    store.put_challenge(&challenge)?;
    Ok(challenge)
}

/// Accept or decline a pending challenge. Only the challenged party may
/// respond.
pub fn respond(
    store: &GameStore,
    challenge_id: &str,
    responder_id: &str,
    accept: bool,
) -> Result<ChallengeRecord, GameError> {
    let mut challenge = store.get_challenge(challenge_id)?;
    if challenge.challenged_id != responder_id {
        return Err(GameError::unauthorized(
            "only the challenged player may respond",
        ));
    }
    if challenge.status != ChallengeStatus::Pending {
        return Err(GameError::conflict(format!(
            "challenge is not pending (status: {:?})",
            challenge.status
        )));
    }
    challenge.status = if accept {
        ChallengeStatus::Accepted
    } else {
        ChallengeStatus::Declined
    };
    store.put_challenge(&challenge)?;
    Ok(challenge)
}

/// Cancel a pending challenge. Only the challenger may cancel.
pub fn cancel(
    store: &GameStore,
    challenge_id: &str,
    actor_id: &str,
) -> Result<ChallengeRecord, GameError> {
    let mut challenge = store.get_challenge(challenge_id)?;
    if challenge.challenger_id != actor_id {
        return Err(GameError::unauthorized(
            "only the challenger may cancel a challenge",
        ));
    }
    if challenge.status != ChallengeStatus::Pending {
        return Err(GameError::conflict(format!(
            "challenge is not pending (status: {:?})",
            challenge.status
        )));
    }
    challenge.status = ChallengeStatus::Cancelled;
    store.put_challenge(&challenge)?;
    Ok(challenge)
}

/// Record the winner of an accepted challenge. Admin adjudicated; the
/// winner must be one of the two participants and the records update
/// exactly once because the winner slot doubles as the terminal marker.
pub fn set_winner(
    store: &GameStore,
    actor: &AccountRecord,
    challenge_id: &str,
    winner_id: &str,
) -> Result<ChallengeOutcome, GameError> {
    if !actor.is_admin() {
        return Err(GameError::unauthorized(
            "only admins may assign challenge winners",
        ));
    }
    let mut challenge = store.get_challenge(challenge_id)?;
    if challenge.status != ChallengeStatus::Accepted {
        return Err(GameError::conflict(format!(
            "challenge is not accepted (status: {:?})",
            challenge.status
        )));
    }
    if challenge.winner_id.is_some() {
        return Err(GameError::conflict("challenge winner already recorded"));
    }
    if !challenge.is_participant(winner_id) {
        return Err(GameError::validation(
            "winner must be one of the two participants",
        ));
    }

    let loser_id = if winner_id == challenge.challenger_id {
        challenge.challenged_id.clone()
    } else {
        challenge.challenger_id.clone()
    };

    let mut winner = store.get_account(winner_id)?;
    let mut loser = store.get_account(&loser_id)?;
    winner.wins += 1;
    loser.losses += 1;
    refresh_rank(&mut winner);
    store.put_account(winner.clone())?;
    store.put_account(loser.clone())?;

    challenge.winner_id = Some(winner_id.to_string());
    store.put_challenge(&challenge)?;
    info!(
        "challenge {} won by {} ({} wins)",
        challenge.id, winner.username, winner.wins
    );

    Ok(ChallengeOutcome {
        challenge,
        winner,
        loser,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Role;
    use tempfile::TempDir;

    fn setup() -> (TempDir, GameStore, AccountRecord, AccountRecord, AccountRecord) {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStore::open(dir.path()).expect("store");
        let a = AccountRecord::new("ana", Role::Player);
        let b = AccountRecord::new("bo", Role::Player);
        let admin = AccountRecord::new("keeper", Role::Admin);
        store.put_account(a.clone()).expect("put");
        store.put_account(b.clone()).expect("put");
        store.put_account(admin.clone()).expect("put");
        (dir, store, a, b, admin)
    }

    #[test]
    fn self_challenge_creates_no_state() {
        let (_dir, store, a, _b, _admin) = setup();
        assert!(propose(&store, &a.id, &a.id).is_err());
        assert!(store.list_challenges_for(&a.id).expect("list").is_empty());
    }

    #[test]
    fn winner_requires_accepted_status() {
        let (_dir, store, a, b, admin) = setup();
        let challenge = propose(&store, &a.id, &b.id).expect("propose");
        let err = set_winner(&store, &admin, &challenge.id, &a.id).expect_err("pending");
        assert!(matches!(err, GameError::Conflict(_)));

        respond(&store, &challenge.id, &b.id, true).expect("accept");
        let outcome = set_winner(&store, &admin, &challenge.id, &a.id).expect("winner");
        assert_eq!(outcome.winner.wins, 1);
        assert_eq!(outcome.loser.losses, 1);

        // Terminal: a second assignment must fail.
        let err = set_winner(&store, &admin, &challenge.id, &b.id).expect_err("terminal");
        assert!(matches!(err, GameError::Conflict(_)));
        let winner = store.get_account(&a.id).expect("reload");
        assert_eq!(winner.wins, 1);
    }

    #[test]
    fn only_challenged_party_responds() {
        let (_dir, store, a, b, _admin) = setup();
        let challenge = propose(&store, &a.id, &b.id).expect("propose");
        assert!(respond(&store, &challenge.id, &a.id, true).is_err());
        let declined = respond(&store, &challenge.id, &b.id, false).expect("decline");
        assert_eq!(declined.status, ChallengeStatus::Declined);
        assert!(respond(&store, &challenge.id, &b.id, true).is_err());
    }

    #[test]
    fn winner_must_be_participant() {
        let (_dir, store, a, b, admin) = setup();
        let challenge = propose(&store, &a.id, &b.id).expect("propose");
        respond(&store, &challenge.id, &b.id, true).expect("accept");
        let err = set_winner(&store, &admin, &challenge.id, &admin.id).expect_err("outsider");
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[test]
    fn cancel_is_challenger_only_and_pending_only() {
        let (_dir, store, a, b, _admin) = setup();
        let challenge = propose(&store, &a.id, &b.id).expect("propose");
        assert!(cancel(&store, &challenge.id, &b.id).is_err());
        let cancelled = cancel(&store, &challenge.id, &a.id).expect("cancel");
        assert_eq!(cancelled.status, ChallengeStatus::Cancelled);
        assert!(cancel(&store, &challenge.id, &a.id).is_err());
    }
}
