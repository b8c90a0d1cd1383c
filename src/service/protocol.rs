//! Service Protocol
//!
//! Request and response shapes for the in-process platform boundary.
//! Everything serializes as JSON; the (external) HTTP layer maps these
//! 1:1 onto routes and status codes.

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::game::state::{MatchId, MatchRecord, MatchStatus, MatchType, UserId};

// =============================================================================
// RESPONSE ENVELOPE
// =============================================================================

/// The `{success, message, data}` envelope every operation returns.
///
/// Expected validation failures travel as `success: false` with a message;
/// they are data, not exceptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Did the operation commit?
    pub success: bool,

    /// Human-readable status or failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Operation payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Successful response with payload.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// Successful response with payload and message.
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// Failed response with reason.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Fold a fallible operation into the envelope, using the error's
    /// display form as the failure message.
    pub fn from_result<E: std::fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(err.to_string()),
        }
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Every operation the platform accepts, as a tagged request.
///
/// Field names match the original HTTP API bodies (`creatorId`,
/// `stakeAmount`, ...), camel-cased on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
#[serde(rename_all_fields = "camelCase")]
pub enum PlatformRequest {
    /// Create a match with a fixed stake.
    CreateMatch {
        creator_id: UserId,
        stake_amount: Amount,
        /// Absent means Standard.
        #[serde(default)]
        match_type: MatchType,
    },
    /// Join as the second player.
    JoinMatch { match_id: MatchId, player_id: UserId },
    /// Place a participant's stake.
    StakeTokens { match_id: MatchId, player_id: UserId },
    /// Settle the match and pay the winner.
    CompleteMatch { match_id: MatchId, winner_id: UserId },
    /// Cancel and refund (creator only).
    CancelMatch { match_id: MatchId, caller_id: UserId },
    /// List every match.
    GetAllMatches,
    /// Fetch one match.
    GetMatch { match_id: MatchId },
    /// List a player's matches.
    GetMatchesByPlayer { player_id: UserId },
    /// Fetch a user's balances.
    GetBalances { user_id: UserId },
    /// Deposit USDT (development faucet).
    AddUsdt { user_id: UserId, amount: Amount },
    /// Convert USDT to GT.
    ConvertUsdt { user_id: UserId, usdt_amount: Amount },
    /// Fetch the two-party escrow view of a match.
    GetEscrow { match_id: MatchId },
}

// =============================================================================
// ESCROW READ MODEL
// =============================================================================

/// Two-party escrow projection of a match, shaped for the on-chain mirror
/// contract (PlayGame): one record per match, both player addresses, the
/// per-player stake, and the settlement result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowView {
    /// Match identifier.
    pub match_id: MatchId,
    /// First player (the creator).
    pub player1: UserId,
    /// Second player, once joined.
    pub player2: Option<UserId>,
    /// Stake each player commits.
    pub stake_amount: Amount,
    /// True once the winner has been paid.
    pub is_complete: bool,
    /// Winning player, if settled.
    pub winner: Option<UserId>,
}

impl From<&MatchRecord> for EscrowView {
    fn from(record: &MatchRecord) -> Self {
        Self {
            match_id: record.id,
            player1: record.creator.clone(),
            player2: record.players.get(1).cloned(),
            stake_amount: record.stake_amount,
            is_complete: record.status == MatchStatus::Completed,
            winner: record.winner.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
