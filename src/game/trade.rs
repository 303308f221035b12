//! Two-party trades of items and skills.
//!
//! Consent is explicit and fragile: any change to the offer table resets
//! both acceptance flags, and the trade executes exactly once: at the
//! moment the second flag flips while the first is still set. Execution
//! moves item ownership and skill grants atomically from the caller's
//! perspective; the Pending -> Completed transition is the single guard.

use log::info;

use crate::game::errors::GameError;
use crate::game::inventory::transfer_item;
use crate::game::types::{
    PlayerSkillRecord, SkillSource, TradeOffer, TradeOfferKind, TradeRecord, TradeStatus,
};
use crate::storage::GameStore;

/// Open a trade between two distinct accounts.
pub fn open_trade(
    store: &GameStore,
    initiator_id: &str,
    recipient_id: &str,
) -> Result<TradeRecord, GameError> {
    if initiator_id == recipient_id {
        return Err(GameError::validation("you cannot trade with yourself"));
    }
    store.get_account(initiator_id)?;
    store.get_account(recipient_id)?;
    let trade = TradeRecord::new(initiator_id, recipient_id);
    store.put_trade(&trade)?;
    Ok(trade)
}

fn pending_trade_for(
    store: &GameStore,
    trade_id: &str,
    party_id: &str,
) -> Result<TradeRecord, GameError> {
    let trade = store.get_trade(trade_id)?;
    if !trade.is_party(party_id) {
        return Err(GameError::unauthorized("you are not part of this trade"));
    }
    if trade.status != TradeStatus::Pending {
        return Err(GameError::conflict(format!(
            "trade is not pending (status: {:?})",
            trade.status
        )));
    }
    Ok(trade)
}

/// Put an owned item or skill on the table. Ownership is verified against
/// the offering party; both acceptance flags reset.
pub fn add_offer(
    store: &GameStore,
    trade_id: &str,
    owner_id: &str,
    kind: TradeOfferKind,
    reference: &str,
) -> Result<TradeRecord, GameError> {
    let mut trade = pending_trade_for(store, trade_id, owner_id)?;
    match kind {
        TradeOfferKind::Item => {
            if store.find_item(owner_id, reference)?.is_none() {
                return Err(GameError::not_found(format!("item: {}", reference)));
            }
        }
        TradeOfferKind::Skill => {
            if !store.has_skill(owner_id, reference)? {
                return Err(GameError::not_found(format!("skill: {}", reference)));
            }
        }
    }
    let duplicate = trade
        .offers
        .iter()
        .any(|o| o.owner_id == owner_id && o.reference == reference);
    if duplicate {
        return Err(GameError::conflict("that offer is already on the table"));
    }
    trade.add_offer(TradeOffer {
        owner_id: owner_id.to_string(),
        kind,
        reference: reference.to_string(),
    });
    store.put_trade(&trade)?;
    Ok(trade)
}

/// Take one of your own offers off the table. Both acceptance flags reset.
pub fn remove_offer(
    store: &GameStore,
    trade_id: &str,
    owner_id: &str,
    reference: &str,
) -> Result<TradeRecord, GameError> {
    let mut trade = pending_trade_for(store, trade_id, owner_id)?;
    if !trade.remove_offer(owner_id, reference) {
        return Err(GameError::not_found("no such offer on the table"));
    }
    store.put_trade(&trade)?;
    Ok(trade)
}

/// Accept the trade as one party. When both flags are set the trade
/// executes immediately; the returned bool reports whether that happened.
pub fn accept_trade(
    store: &GameStore,
    trade_id: &str,
    party_id: &str,
) -> Result<(TradeRecord, bool), GameError> {
    let mut trade = pending_trade_for(store, trade_id, party_id)?;
    trade.accept(party_id);
    if !trade.is_ready() {
        store.put_trade(&trade)?;
        return Ok((trade, false));
    }

    // Both parties consented to the current table: execute.
    for offer in trade.offers.clone() {
        let counterparty = if offer.owner_id == trade.initiator_id {
            trade.recipient_id.clone()
        } else {
            trade.initiator_id.clone()
        };
        match offer.kind {
            TradeOfferKind::Item => {
                transfer_item(store, &offer.owner_id, &counterparty, &offer.reference)?;
            }
            TradeOfferKind::Skill => {
                store.remove_skill(&offer.owner_id, &offer.reference)?;
                store.put_skill(&PlayerSkillRecord::new(
                    &counterparty,
                    &offer.reference,
                    SkillSource::Trade,
                ))?;
            }
        }
    }
    trade.status = TradeStatus::Completed;
    store.put_trade(&trade)?;
    info!(
        "trade {} executed: {} offers between {} and {}",
        trade.id,
        trade.offers.len(),
        trade.initiator_id,
        trade.recipient_id
    );
    Ok((trade, true))
}

/// Cancel a pending trade. Either party may cancel.
pub fn cancel_trade(
    store: &GameStore,
    trade_id: &str,
    party_id: &str,
) -> Result<TradeRecord, GameError> {
    let mut trade = pending_trade_for(store, trade_id, party_id)?;
    trade.status = TradeStatus::Cancelled;
    store.put_trade(&trade)?;
    Ok(trade)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::inventory::grant_item;
    use crate::game::types::{AccountRecord, Role};
    use tempfile::TempDir;

    struct Fixture {
        store: GameStore,
        ana: AccountRecord,
        bo: AccountRecord,
        _dir: TempDir,
    }

    fn setup() -> Fixture {
        let dir = TempDir::new().expect("tempdir");
        let store = GameStore::open(dir.path()).expect("store");
        let ana = AccountRecord::new("ana", Role::Player);
        let bo = AccountRecord::new("bo", Role::Player);
        store.put_account(ana.clone()).expect("put");
        store.put_account(bo.clone()).expect("put");
        Fixture {
            store,
            ana,
            bo,
            _dir: dir,
        }
    }

    #[test]
    fn offer_mutation_resets_both_acceptances() {
        let fx = setup();
        let item = grant_item(&fx.store, &fx.ana.id, "rusty_blade").expect("item");
        let trade = open_trade(&fx.store, &fx.ana.id, &fx.bo.id).expect("open");

        let (trade, executed) = accept_trade(&fx.store, &trade.id, &fx.ana.id).expect("accept");
        assert!(!executed);
        assert!(trade.initiator_accepted);

        let trade = add_offer(
            &fx.store,
            &trade.id,
            &fx.ana.id,
            TradeOfferKind::Item,
            &item.id,
        )
        .expect("offer");
        assert!(!trade.initiator_accepted);
        assert!(!trade.recipient_accepted);
    }

    #[test]
    fn executes_exactly_once_when_both_accept() {
        let fx = setup();
        let item = grant_item(&fx.store, &fx.ana.id, "rusty_blade").expect("item");
        let trade = open_trade(&fx.store, &fx.ana.id, &fx.bo.id).expect("open");
        add_offer(
            &fx.store,
            &trade.id,
            &fx.ana.id,
            TradeOfferKind::Item,
            &item.id,
        )
        .expect("offer");

        let (_, executed) = accept_trade(&fx.store, &trade.id, &fx.ana.id).expect("ana");
        assert!(!executed);
        let (done, executed) = accept_trade(&fx.store, &trade.id, &fx.bo.id).expect("bo");
        assert!(executed);
        assert_eq!(done.status, TradeStatus::Completed);

        // Ownership moved to bo.
        assert!(fx
            .store
            .find_item(&fx.ana.id, &item.id)
            .expect("find")
            .is_none());
        assert!(fx
            .store
            .find_item(&fx.bo.id, &item.id)
            .expect("find")
            .is_some());

        // Completed trades refuse further action.
        assert!(accept_trade(&fx.store, &trade.id, &fx.ana.id).is_err());
    }

    #[test]
    fn skills_swap_sides_on_execution() {
        let fx = setup();
        fx.store
            .put_skill(&PlayerSkillRecord::new(
                &fx.ana.id,
                "cleave",
                SkillSource::AdminGrant,
            ))
            .expect("seed skill");
        let trade = open_trade(&fx.store, &fx.ana.id, &fx.bo.id).expect("open");
        add_offer(
            &fx.store,
            &trade.id,
            &fx.ana.id,
            TradeOfferKind::Skill,
            "cleave",
        )
        .expect("offer");
        accept_trade(&fx.store, &trade.id, &fx.ana.id).expect("ana");
        accept_trade(&fx.store, &trade.id, &fx.bo.id).expect("bo");
        assert!(!fx.store.has_skill(&fx.ana.id, "cleave").expect("check"));
        assert!(fx.store.has_skill(&fx.bo.id, "cleave").expect("check"));
    }

    #[test]
    fn cannot_offer_what_you_do_not_own() {
        let fx = setup();
        let trade = open_trade(&fx.store, &fx.ana.id, &fx.bo.id).expect("open");
        let err = add_offer(
            &fx.store,
            &trade.id,
            &fx.ana.id,
            TradeOfferKind::Skill,
            "cleave",
        )
        .expect_err("unowned");
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[test]
    fn either_party_can_cancel_pending() {
        let fx = setup();
        let trade = open_trade(&fx.store, &fx.ana.id, &fx.bo.id).expect("open");
        let cancelled = cancel_trade(&fx.store, &trade.id, &fx.bo.id).expect("cancel");
        assert_eq!(cancelled.status, TradeStatus::Cancelled);
        assert!(cancel_trade(&fx.store, &trade.id, &fx.ana.id).is_err());
    }

    #[test]
    fn outsiders_cannot_touch_the_trade() {
        let fx = setup();
        let stranger = AccountRecord::new("zed", Role::Player);
        fx.store.put_account(stranger.clone()).expect("put");
        let trade = open_trade(&fx.store, &fx.ana.id, &fx.bo.id).expect("open");
        assert!(accept_trade(&fx.store, &trade.id, &stranger.id).is_err());
        assert!(cancel_trade(&fx.store, &trade.id, &stranger.id).is_err());
    }
}
