//! Timed skill auctions.
//!
//! One auction is active at a time; the rest wait in a FIFO queue. Bids
//! must strictly beat the current highest and be affordable both when
//! placed and again at settlement. Finalization (whether an admin calls
//! it or the expiry timer fires) transitions the status first, so exactly
//! one settlement ever applies.

use chrono::{DateTime, Duration, Utc};
use log::info;

use crate::game::catalog::find_catalog_skill;
use crate::game::errors::GameError;
use crate::game::types::{
    AccountRecord, AuctionStatus, PlayerSkillRecord, SkillAuctionRecord, SkillBidRecord,
    SkillSource,
};
use crate::storage::GameStore;

/// Settlement summary for one finalized auction.
#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    pub auction: SkillAuctionRecord,
    /// The winning bid, when one existed and was still affordable.
    pub winning_bid: Option<SkillBidRecord>,
}

/// Queue a skill for auction. Admin only.
pub fn queue_auction(
    store: &GameStore,
    actor: &AccountRecord,
    skill_id: &str,
) -> Result<SkillAuctionRecord, GameError> {
    if !actor.is_admin() {
        return Err(GameError::unauthorized("only admins may queue auctions"));
    }
    let skill = find_catalog_skill(skill_id)
        .ok_or_else(|| GameError::not_found(format!("skill: {}", skill_id)))?;
    let auction = SkillAuctionRecord::new(skill.id);
    store.put_auction(&auction)?;
    info!("skill '{}' queued for auction ({})", skill.name, auction.id);
    Ok(auction)
}

/// Start the oldest queued auction. Refuses while another auction is
/// active. Returns None when the queue is empty.
pub fn start_next_auction(
    store: &GameStore,
    now: DateTime<Utc>,
    duration_hours: u64,
) -> Result<Option<SkillAuctionRecord>, GameError> {
    if store.active_auction()?.is_some() {
        return Err(GameError::conflict("an auction is already active"));
    }
    let Some(mut auction) = store.next_queued_auction()? else {
        return Ok(None);
    };
    let ends_at = now + Duration::hours(duration_hours as i64);
    auction.status = AuctionStatus::Active;
    auction.started_at = Some(now);
    auction.ends_at = Some(ends_at);
    store.put_auction(&auction)?;
    info!(
        "auction {} started for skill '{}', ends {}",
        auction.id, auction.skill_id, ends_at
    );
    Ok(Some(auction))
}

/// Place a bid: only on an active auction, only strictly above the current
/// highest, and only if the bidder's gold covers it right now.
pub fn place_bid(
    store: &GameStore,
    bidder_id: &str,
    auction_id: &str,
    amount: u64,
) -> Result<SkillBidRecord, GameError> {
    if amount == 0 {
        return Err(GameError::validation("bid amount must be positive"));
    }
    let auction = store.get_auction(auction_id)?;
    if auction.status != AuctionStatus::Active {
        return Err(GameError::conflict(format!(
            "auction is not active (status: {:?})",
            auction.status
        )));
    }
    let bidder = store.get_account(bidder_id)?;
    if bidder.balances.gold < amount {
        return Err(GameError::InsufficientFunds {
            required: amount,
            available: bidder.balances.gold,
        });
    }
    if let Some(highest) = store.highest_bid(auction_id)? {
        if amount <= highest.amount {
            return Err(GameError::conflict(format!(
                "bid must exceed the current highest of {}",
                highest.amount
            )));
        }
    }
    let bid = SkillBidRecord::new(auction_id, bidder_id, amount);
    store.append_bid(&bid)?;
    Ok(bid)
}

/// Settle an auction. The status transition to Completed happens before
/// anything else, so a second finalize attempt, from the timer or an
/// admin, gets a conflict instead of a double settlement.
///
/// If the highest bidder can still afford the bid, they are debited and
/// granted the skill; otherwise the auction completes with no winner.
pub fn finalize_auction(
    store: &GameStore,
    auction_id: &str,
) -> Result<FinalizeOutcome, GameError> {
    let mut auction = store.get_auction(auction_id)?;
    if auction.status != AuctionStatus::Active {
        return Err(GameError::conflict(format!(
            "auction is not active (status: {:?})",
            auction.status
        )));
    }
    auction.status = AuctionStatus::Completed;
    store.put_auction(&auction)?;

    let mut winning_bid = None;
    if let Some(bid) = store.highest_bid(auction_id)? {
        let mut bidder = store.get_account(&bid.bidder_id)?;
        if bidder.balances.gold >= bid.amount {
            bidder.balances.gold -= bid.amount;
            store.put_account(bidder)?;
            store.put_skill(&PlayerSkillRecord::new(
                &bid.bidder_id,
                &auction.skill_id,
                SkillSource::AuctionWin,
            ))?;
            auction.winning_bid = Some(bid.id.clone());
            auction.winner_id = Some(bid.bidder_id.clone());
            store.put_auction(&auction)?;
            info!(
                "auction {} won by {} at {} gold",
                auction.id, bid.bidder_id, bid.amount
            );
            winning_bid = Some(bid);
        } else {
            info!(
                "auction {} highest bidder {} can no longer afford {}; no winner",
                auction.id, bid.bidder_id, bid.amount
            );
        }
    } else {
        info!("auction {} expired with no bids", auction.id);
    }

    Ok(FinalizeOutcome {
        auction,
        winning_bid,
    })
}

/// Timer path: finalize the active auction once its end timestamp passes,
/// then immediately start the next queued one. A no-op (empty result) when
/// nothing qualifies.
#[derive(Debug, Clone, Default)]
pub struct ExpirySweep {
    pub finalized: Option<FinalizeOutcome>,
    pub started: Option<SkillAuctionRecord>,
}

pub fn check_expired(
    store: &GameStore,
    now: DateTime<Utc>,
    duration_hours: u64,
) -> Result<ExpirySweep, GameError> {
    let mut sweep = ExpirySweep::default();
    let Some(active) = store.active_auction()? else {
        return Ok(sweep);
    };
    if !active.is_expired(now) {
        return Ok(sweep);
    }
    sweep.finalized = Some(finalize_auction(store, &active.id)?);
    sweep.started = start_next_auction(store, now, duration_hours)?;
    Ok(sweep)
}
