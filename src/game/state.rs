//! Match State Definitions
//!
//! Identity types, match records, and status transitions.
//! Uses BTreeMap for stable iteration order.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;

// =============================================================================
// USER ID
// =============================================================================

/// Opaque user identifier (wallet address or platform account id).
///
/// Implements Ord for BTreeMap keys in the ledger and registry.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Create from any string-like identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the empty identifier, which no operation accepts.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// =============================================================================
// MATCH ID
// =============================================================================

/// Unique match identifier (UUID as bytes).
///
/// Serialized as the hyphenated UUID string for JSON friendliness.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MatchId(pub [u8; 16]);

impl MatchId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(|u| Self(*u.as_bytes()))
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_bytes(self.0))
    }
}

impl fmt::Debug for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchId({self})")
    }
}

impl From<MatchId> for String {
    fn from(id: MatchId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for MatchId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        MatchId::from_uuid_str(&s).ok_or_else(|| format!("invalid match id: {s}"))
    }
}

// =============================================================================
// MATCH TYPE
// =============================================================================

/// Match type, which selects the reward multiplier at settlement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum MatchType {
    /// Winner takes 100% of the total stake.
    #[default]
    Standard = 0,
    /// Winner takes 110% (10% platform bonus).
    Bonus = 1,
    /// Winner takes 150%.
    Tournament = 2,
}

// =============================================================================
// MATCH STATUS
// =============================================================================

/// Lifecycle status of a match.
///
/// ```text
/// Created ──> Ready ──> InProgress ──> Completed
///    │          │            │
///    └──────────┴────────────┴──────── Cancelled
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Match created, waiting for a second player.
    #[default]
    Created,
    /// Both players joined, waiting for stakes.
    Ready,
    /// Both players staked, match underway.
    InProgress,
    /// Winner determined and paid out.
    Completed,
    /// Cancelled by the creator; stakes refunded.
    Cancelled,
}

impl MatchStatus {
    /// Can a second player still join?
    pub fn is_joinable(self) -> bool {
        self == MatchStatus::Created
    }

    /// Can participants still place stakes?
    pub fn accepts_stakes(self) -> bool {
        matches!(self, MatchStatus::Created | MatchStatus::Ready)
    }

    /// Can the creator still cancel?
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            MatchStatus::Created | MatchStatus::Ready | MatchStatus::InProgress
        )
    }

    /// Has the match reached a final state?
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Created => "created",
            MatchStatus::Ready => "ready",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// MATCH RECORD
// =============================================================================

/// Maximum participants in a match (two-player escrow).
pub const MAX_PLAYERS: usize = 2;

/// Full record of a staked two-player match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Unique match identifier.
    pub id: MatchId,

    /// Player who created the match.
    pub creator: UserId,

    /// Stake each player must commit, fixed at creation.
    pub stake_amount: Amount,

    /// Participants in join order (creator first, at most two).
    pub players: Vec<UserId>,

    /// Stakes actually placed, keyed by player. Absence = not yet staked.
    pub stakes: BTreeMap<UserId, Amount>,

    /// Reward multiplier class.
    pub match_type: MatchType,

    /// Current lifecycle status.
    pub status: MatchStatus,

    /// Winning player, once completed.
    pub winner: Option<UserId>,

    /// When the match was created.
    pub created_at: DateTime<Utc>,

    /// When the match completed (payout credited).
    pub completed_at: Option<DateTime<Utc>>,
}

impl MatchRecord {
    /// Create a fresh record in `Created` status with the creator as the
    /// only player and no stakes placed.
    pub fn new(creator: UserId, stake_amount: Amount, match_type: MatchType) -> Self {
        Self {
            id: MatchId::generate(),
            players: vec![creator.clone()],
            creator,
            stake_amount,
            stakes: BTreeMap::new(),
            match_type,
            status: MatchStatus::Created,
            winner: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Is this user a participant?
    pub fn has_player(&self, user: &UserId) -> bool {
        self.players.iter().any(|p| p == user)
    }

    /// Both seats taken?
    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    /// Has this player already placed their stake?
    pub fn has_staked(&self, user: &UserId) -> bool {
        self.stakes.contains_key(user)
    }

    /// Both players present and both staked?
    pub fn all_staked(&self) -> bool {
        self.players.len() == MAX_PLAYERS && self.players.iter().all(|p| self.stakes.contains_key(p))
    }

    /// Sum of all stakes placed so far.
    pub fn total_stake(&self) -> Amount {
        self.stakes
            .values()
            .fold(Amount::ZERO, |acc, s| acc.saturating_add(*s))
    }
}

// =============================================================================
// TESTS
// =============================================================================
