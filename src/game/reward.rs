//! Reward Policy
//!
//! Stake limits and winner payout computation. Pure functions over amounts;
//! no state machine knowledge.

use serde::{Deserialize, Serialize};

use crate::core::amount::Amount;
use crate::game::state::MatchType;

/// Minimum stake per player: 1 GT.
pub const MIN_STAKE: Amount = Amount::from_whole(1);

/// Maximum stake per player: 1000 GT.
pub const MAX_STAKE: Amount = Amount::from_whole(1000);

/// Reward multipliers by match type, per-myriad (indices match the
/// `MatchType` discriminant).
pub const REWARD_MULTIPLIERS: [u32; 3] = [
    10_000, // Standard:   1.0x - winner gets 100% of the total stake
    11_000, // Bonus:      1.1x - 10% platform bonus
    15_000, // Tournament: 1.5x
];

impl MatchType {
    /// Payout multiplier for this match type, per-myriad.
    #[inline]
    pub fn multiplier_per_myriad(self) -> u32 {
        REWARD_MULTIPLIERS[self as usize]
    }
}

/// Stake validation and payout rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardPolicy {
    /// Smallest stake a match may be created with.
    pub min_stake: Amount,
    /// Largest stake a match may be created with.
    pub max_stake: Amount,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            min_stake: MIN_STAKE,
            max_stake: MAX_STAKE,
        }
    }
}

impl RewardPolicy {
    /// True iff `min_stake <= amount <= max_stake`.
    ///
    /// Enforced at match creation only.
    #[inline]
    pub fn is_valid_stake(&self, amount: Amount) -> bool {
        amount >= self.min_stake && amount <= self.max_stake
    }

    /// Winner payout: total stake times the match-type multiplier.
    ///
    /// Exact for every multiplier in the table (decimal fixed-point).
    #[inline]
    pub fn compute_reward(&self, total_stake: Amount, match_type: MatchType) -> Amount {
        total_stake.mul_per_myriad(match_type.multiplier_per_myriad())
    }
}

// =============================================================================
// TESTS
// =============================================================================
