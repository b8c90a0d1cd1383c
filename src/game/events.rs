//! Domain Events
//!
//! Events emitted by the orchestrator for every committed mutation.
//! Collected on the orchestrator and drained with `take_events`; the
//! service layer logs them, and an audit trail or chain mirror could
//! subscribe the same way.

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::game::state::{MatchId, UserId};

/// A committed platform mutation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// A match was created.
    MatchCreated {
        match_id: MatchId,
        creator: UserId,
        stake_amount: Amount,
    },

    /// A second player joined.
    PlayerJoined {
        match_id: MatchId,
        player: UserId,
        /// Did the join fill the match (status moved to Ready)?
        ready: bool,
    },

    /// A player placed their stake.
    StakePlaced {
        match_id: MatchId,
        player: UserId,
        amount: Amount,
        /// Did this stake start the match (status moved to InProgress)?
        started: bool,
    },

    /// Match settled and winner paid.
    MatchCompleted {
        match_id: MatchId,
        winner: UserId,
        total_stake: Amount,
        reward: Amount,
    },

    /// Match cancelled by its creator; stakes returned.
    MatchCancelled {
        match_id: MatchId,
        refunds: Vec<(UserId, Amount)>,
    },

    /// USDT deposited to an account.
    UsdtDeposited { user: UserId, amount: Amount },

    /// USDT converted to GT.
    UsdtConverted {
        user: UserId,
        usdt_amount: Amount,
        gt_amount: Amount,
    },
}

impl PlatformEvent {
    /// The match this event concerns, if any.
    pub fn match_id(&self) -> Option<MatchId> {
        match self {
            PlatformEvent::MatchCreated { match_id, .. }
            | PlatformEvent::PlayerJoined { match_id, .. }
            | PlatformEvent::StakePlaced { match_id, .. }
            | PlatformEvent::MatchCompleted { match_id, .. }
            | PlatformEvent::MatchCancelled { match_id, .. } => Some(*match_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_match_id() {
        let id = MatchId::generate();
        let event = PlatformEvent::MatchCreated {
            match_id: id,
            creator: UserId::from("alice"),
            stake_amount: Amount::from_whole(10),
        };
        assert_eq!(event.match_id(), Some(id));

        let deposit = PlatformEvent::UsdtDeposited {
            user: UserId::from("alice"),
            amount: Amount::from_whole(10),
        };
        assert_eq!(deposit.match_id(), None);
    }

    #[test]
    fn test_event_serialization_tag() {
        let event = PlatformEvent::UsdtDeposited {
            user: UserId::from("alice"),
            amount: Amount::from_whole(10),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"usdt_deposited\""));
    }
}
