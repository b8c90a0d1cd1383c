//! Match Orchestrator
//!
//! Drives the match lifecycle over the balance ledger, the match registry,
//! and the reward policy:
//!
//! ```text
//! Created ──join──> Ready ──both staked──> InProgress ──complete──> Completed
//!    │                │                        │
//!    └────────────────┴──────cancel────────────┴──> Cancelled (stakes refunded)
//! ```
//!
//! Every operation validates its preconditions and fails fast with a typed
//! error; expected validation failures never panic. Each mutating method runs
//! to completion while holding `&mut self`, so no caller can observe a
//! half-applied transition.

use chrono::Utc;

use crate::core::amount::Amount;
use crate::game::events::PlatformEvent;
use crate::game::registry::MatchRegistry;
use crate::game::reward::RewardPolicy;
use crate::game::state::{MatchId, MatchRecord, MatchStatus, MatchType, UserId, MAX_PLAYERS};
use crate::ledger::accounts::{BalanceLedger, Balances, LedgerError, TokenKind};

// =============================================================================
// ERRORS
// =============================================================================

/// Match operation errors. All recoverable and caller-reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Missing or malformed required field.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// Stake outside the policy limits.
    #[error("stake amount must be between {min} and {max} GT")]
    InvalidStakeAmount {
        /// Policy minimum.
        min: Amount,
        /// Policy maximum.
        max: Amount,
    },

    /// Balance check failed before a debit.
    #[error("insufficient {0} balance")]
    InsufficientBalance(TokenKind),

    /// No match with this id.
    #[error("match {0} not found")]
    MatchNotFound(MatchId),

    /// Join attempted on a non-Created match.
    #[error("match cannot be joined (status: {0})")]
    NotJoinable(MatchStatus),

    /// Both seats already taken.
    #[error("match is full")]
    MatchFull,

    /// Player is already a participant.
    #[error("player already in match")]
    AlreadyInMatch,

    /// Player has already placed their stake.
    #[error("player has already staked")]
    AlreadyStaked,

    /// Stake attempted after the match started or ended.
    #[error("match does not accept stakes (status: {0})")]
    NotStakeable(MatchStatus),

    /// Completion attempted while not in progress.
    #[error("match is not in progress (status: {0})")]
    NotInProgress(MatchStatus),

    /// Cancellation attempted on a settled match.
    #[error("match can no longer be cancelled (status: {0})")]
    NotCancellable(MatchStatus),

    /// Actor not authorized for the action.
    #[error("{0}")]
    Forbidden(&'static str),
}

impl From<LedgerError> for MatchError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidAmount => MatchError::InvalidInput("amount must be positive"),
            LedgerError::InsufficientGt => MatchError::InsufficientBalance(TokenKind::Gt),
            LedgerError::InsufficientUsdt => MatchError::InsufficientBalance(TokenKind::Usdt),
            LedgerError::Overflow => MatchError::InvalidInput("balance overflow"),
        }
    }
}

// =============================================================================
// OPERATION OUTCOMES
// =============================================================================

/// Result of a stake placement.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StakeOutcome {
    /// Updated match record.
    #[serde(rename = "match")]
    pub match_record: MatchRecord,
    /// The staker's GT balance after the debit.
    pub player_balance: Amount,
}

/// Result of a completed match settlement.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CompletionOutcome {
    /// Updated match record.
    #[serde(rename = "match")]
    pub match_record: MatchRecord,
    /// Payout credited to the winner.
    pub reward: Amount,
    /// Sum of all stakes.
    pub total_stake: Amount,
    /// Winner's GT balance after the credit.
    pub winner_balance: Amount,
}

/// Result of a cancellation.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CancellationOutcome {
    /// Updated match record.
    #[serde(rename = "match")]
    pub match_record: MatchRecord,
    /// Stakes returned, per player.
    pub refunds: Vec<(UserId, Amount)>,
}

/// Result of a USDT -> GT conversion.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ConversionOutcome {
    /// GT credited.
    pub converted_amount: Amount,
    /// Balances after the conversion.
    pub new_balances: Balances,
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

/// Composes ledger, registry, and policy into the full match lifecycle.
///
/// Dependencies are injected at construction; there are no module-level
/// singletons, so tests and the service layer each own their instance.
#[derive(Debug, Default)]
pub struct MatchOrchestrator {
    ledger: BalanceLedger,
    registry: MatchRegistry,
    policy: RewardPolicy,
    pending_events: Vec<PlatformEvent>,
}

impl MatchOrchestrator {
    /// Create an orchestrator over the given collaborators.
    pub fn new(ledger: BalanceLedger, registry: MatchRegistry, policy: RewardPolicy) -> Self {
        Self {
            ledger,
            registry,
            policy,
            pending_events: Vec::new(),
        }
    }

    /// The active reward policy.
    pub fn policy(&self) -> &RewardPolicy {
        &self.policy
    }

    fn push_event(&mut self, event: PlatformEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<PlatformEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // =========================================================================
    // Match lifecycle
    // =========================================================================

    /// Create a match.
    ///
    /// The creator's GT balance must cover the stake, but nothing is debited
    /// until they actually stake - creation only reserves a seat.
    pub fn create_match(
        &mut self,
        creator: &UserId,
        stake_amount: Amount,
        match_type: MatchType,
    ) -> Result<MatchRecord, MatchError> {
        if creator.is_empty() {
            return Err(MatchError::InvalidInput("creator id is required"));
        }
        if stake_amount.is_zero() {
            return Err(MatchError::InvalidInput("stake amount is required"));
        }
        if !self.policy.is_valid_stake(stake_amount) {
            return Err(MatchError::InvalidStakeAmount {
                min: self.policy.min_stake,
                max: self.policy.max_stake,
            });
        }
        if self.ledger.balances(creator).gt < stake_amount {
            return Err(MatchError::InsufficientBalance(TokenKind::Gt));
        }

        let record = MatchRecord::new(creator.clone(), stake_amount, match_type);
        let id = self.registry.insert(record.clone());

        self.push_event(PlatformEvent::MatchCreated {
            match_id: id,
            creator: creator.clone(),
            stake_amount,
        });
        Ok(record)
    }

    /// Join an existing match as the second player.
    pub fn join_match(&mut self, id: &MatchId, player: &UserId) -> Result<MatchRecord, MatchError> {
        if player.is_empty() {
            return Err(MatchError::InvalidInput("player id is required"));
        }

        let (status, stake_amount, already_in, full) = {
            let record = self.registry.get(id).ok_or(MatchError::MatchNotFound(*id))?;
            (
                record.status,
                record.stake_amount,
                record.has_player(player),
                record.is_full(),
            )
        };

        if !status.is_joinable() {
            return Err(MatchError::NotJoinable(status));
        }
        if already_in {
            return Err(MatchError::AlreadyInMatch);
        }
        if full {
            return Err(MatchError::MatchFull);
        }
        if self.ledger.balances(player).gt < stake_amount {
            return Err(MatchError::InsufficientBalance(TokenKind::Gt));
        }

        let record = self
            .registry
            .update(id, |m| {
                m.players.push(player.clone());
                if m.players.len() == MAX_PLAYERS {
                    m.status = MatchStatus::Ready;
                }
                m.clone()
            })
            .ok_or(MatchError::MatchNotFound(*id))?;

        self.push_event(PlatformEvent::PlayerJoined {
            match_id: *id,
            player: player.clone(),
            ready: record.status == MatchStatus::Ready,
        });
        Ok(record)
    }

    /// Place a player's stake. Debits GT and starts the match once both
    /// players have staked (order of the two calls is irrelevant).
    pub fn stake_tokens(&mut self, id: &MatchId, player: &UserId) -> Result<StakeOutcome, MatchError> {
        if player.is_empty() {
            return Err(MatchError::InvalidInput("player id is required"));
        }

        let (status, stake_amount, is_player, staked) = {
            let record = self.registry.get(id).ok_or(MatchError::MatchNotFound(*id))?;
            (
                record.status,
                record.stake_amount,
                record.has_player(player),
                record.has_staked(player),
            )
        };

        if !status.accepts_stakes() {
            return Err(MatchError::NotStakeable(status));
        }
        if !is_player {
            return Err(MatchError::Forbidden("player is not part of this match"));
        }
        if staked {
            return Err(MatchError::AlreadyStaked);
        }

        // Balance check happens inside the debit; with the operation running
        // to completion there is no window between check and debit.
        let balances = self.ledger.debit_gt(player, stake_amount)?;

        let record = self
            .registry
            .update(id, |m| {
                m.stakes.insert(player.clone(), stake_amount);
                if m.all_staked() {
                    m.status = MatchStatus::InProgress;
                }
                m.clone()
            })
            .ok_or(MatchError::MatchNotFound(*id))?;

        self.push_event(PlatformEvent::StakePlaced {
            match_id: *id,
            player: player.clone(),
            amount: stake_amount,
            started: record.status == MatchStatus::InProgress,
        });
        Ok(StakeOutcome {
            match_record: record,
            player_balance: balances.gt,
        })
    }

    /// Settle a match: credit the winner and mark it completed.
    ///
    /// A single atomic step - the payout and the status change commit
    /// together or not at all.
    pub fn complete_match(
        &mut self,
        id: &MatchId,
        winner: &UserId,
    ) -> Result<CompletionOutcome, MatchError> {
        if winner.is_empty() {
            return Err(MatchError::InvalidInput("winner id is required"));
        }

        let (status, is_player, total_stake, match_type) = {
            let record = self.registry.get(id).ok_or(MatchError::MatchNotFound(*id))?;
            (
                record.status,
                record.has_player(winner),
                record.total_stake(),
                record.match_type,
            )
        };

        if status != MatchStatus::InProgress {
            return Err(MatchError::NotInProgress(status));
        }
        if !is_player {
            return Err(MatchError::Forbidden("winner is not a player in this match"));
        }

        let reward = self.policy.compute_reward(total_stake, match_type);
        let balances = self.ledger.credit_gt(winner, reward)?;

        let record = self
            .registry
            .update(id, |m| {
                m.status = MatchStatus::Completed;
                m.winner = Some(winner.clone());
                m.completed_at = Some(Utc::now());
                m.clone()
            })
            .ok_or(MatchError::MatchNotFound(*id))?;

        self.push_event(PlatformEvent::MatchCompleted {
            match_id: *id,
            winner: winner.clone(),
            total_stake,
            reward,
        });
        Ok(CompletionOutcome {
            match_record: record,
            reward,
            total_stake,
            winner_balance: balances.gt,
        })
    }

    /// Cancel a match and refund every stake placed so far.
    ///
    /// Creator-only, mirroring the chain-side refund path. The record is
    /// marked Cancelled, never erased.
    pub fn cancel_match(
        &mut self,
        id: &MatchId,
        caller: &UserId,
    ) -> Result<CancellationOutcome, MatchError> {
        if caller.is_empty() {
            return Err(MatchError::InvalidInput("caller id is required"));
        }

        let (status, creator, stakes) = {
            let record = self.registry.get(id).ok_or(MatchError::MatchNotFound(*id))?;
            (
                record.status,
                record.creator.clone(),
                record
                    .stakes
                    .iter()
                    .map(|(p, a)| (p.clone(), *a))
                    .collect::<Vec<_>>(),
            )
        };

        if caller != &creator {
            return Err(MatchError::Forbidden("only the match creator can cancel"));
        }
        if !status.is_cancellable() {
            return Err(MatchError::NotCancellable(status));
        }

        // Every refund must be creditable before any is applied; a partial
        // refund would leave the ledger and the match out of step, and a
        // retry would pay the early refunds twice.
        for (player, amount) in &stakes {
            if self.ledger.balances(player).gt.checked_add(*amount).is_none() {
                return Err(LedgerError::Overflow.into());
            }
        }
        for (player, amount) in &stakes {
            self.ledger.credit_gt(player, *amount)?;
        }

        let record = self
            .registry
            .update(id, |m| {
                m.status = MatchStatus::Cancelled;
                m.clone()
            })
            .ok_or(MatchError::MatchNotFound(*id))?;

        self.push_event(PlatformEvent::MatchCancelled {
            match_id: *id,
            refunds: stakes.clone(),
        });
        Ok(CancellationOutcome {
            match_record: record,
            refunds: stakes,
        })
    }

    // =========================================================================
    // Queries (pure reads)
    // =========================================================================

    /// All matches.
    pub fn all_matches(&self) -> Vec<MatchRecord> {
        self.registry.all()
    }

    /// A single match by id.
    pub fn match_by_id(&self, id: &MatchId) -> Option<MatchRecord> {
        self.registry.get(id).cloned()
    }

    /// All matches a player participates in.
    pub fn matches_by_player(&self, player: &UserId) -> Vec<MatchRecord> {
        self.registry.by_player(player)
    }

    // =========================================================================
    // Token operations (ledger passthrough)
    // =========================================================================

    /// A user's balances (zero-initialized on first access).
    pub fn balances(&mut self, user: &UserId) -> Balances {
        self.ledger.balances(user)
    }

    /// Deposit USDT (development faucet).
    pub fn deposit_usdt(&mut self, user: &UserId, amount: Amount) -> Result<Balances, MatchError> {
        if user.is_empty() {
            return Err(MatchError::InvalidInput("user id is required"));
        }
        let balances = self.ledger.credit_usdt(user, amount)?;
        self.push_event(PlatformEvent::UsdtDeposited {
            user: user.clone(),
            amount,
        });
        Ok(balances)
    }

    /// Convert USDT to GT at the ledger's configured rate.
    pub fn convert_usdt(
        &mut self,
        user: &UserId,
        usdt_amount: Amount,
    ) -> Result<ConversionOutcome, MatchError> {
        if user.is_empty() {
            return Err(MatchError::InvalidInput("user id is required"));
        }
        let (converted_amount, new_balances) = self.ledger.convert(user, usdt_amount)?;
        self.push_event(PlatformEvent::UsdtConverted {
            user: user.clone(),
            usdt_amount,
            gt_amount: converted_amount,
        });
        Ok(ConversionOutcome {
            converted_amount,
            new_balances,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user(s: &str) -> UserId {
        UserId::from(s)
    }

    fn gt(n: u64) -> Amount {
        Amount::from_whole(n)
    }

    /// Orchestrator with alice and bob funded at 50 GT each.
    fn funded() -> MatchOrchestrator {
        let mut orch = MatchOrchestrator::default();
        for name in ["alice", "bob"] {
            orch.deposit_usdt(&user(name), gt(50)).unwrap();
            orch.convert_usdt(&user(name), gt(50)).unwrap();
        }
        orch.take_events();
        orch
    }

    #[test]
    fn test_create_match_validation() {
        let mut orch = funded();

        assert_eq!(
            orch.create_match(&user(""), gt(10), MatchType::Standard),
            Err(MatchError::InvalidInput("creator id is required"))
        );
        assert_eq!(
            orch.create_match(&user("alice"), Amount::ZERO, MatchType::Standard),
            Err(MatchError::InvalidInput("stake amount is required"))
        );
        assert!(matches!(
            orch.create_match(&user("alice"), gt(1001), MatchType::Standard),
            Err(MatchError::InvalidStakeAmount { .. })
        ));
        // Balance check without debit
        assert_eq!(
            orch.create_match(&user("alice"), gt(100), MatchType::Standard),
            Err(MatchError::InsufficientBalance(TokenKind::Gt))
        );

        let record = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap();
        assert_eq!(record.status, MatchStatus::Created);
        assert_eq!(record.players, vec![user("alice")]);
        // Creation never debits
        assert_eq!(orch.balances(&user("alice")).gt, gt(50));
    }

    #[test]
    fn test_join_transitions_to_ready() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;

        let record = orch.join_match(&id, &user("bob")).unwrap();
        assert_eq!(record.status, MatchStatus::Ready);
        assert_eq!(record.players, vec![user("alice"), user("bob")]);
        // Join never debits either
        assert_eq!(orch.balances(&user("bob")).gt, gt(50));
    }

    #[test]
    fn test_join_rejections() {
        let mut orch = funded();
        orch.deposit_usdt(&user("carol"), gt(5)).unwrap();
        orch.convert_usdt(&user("carol"), gt(5)).unwrap();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;

        let missing = MatchId::generate();
        assert_eq!(
            orch.join_match(&missing, &user("bob")),
            Err(MatchError::MatchNotFound(missing))
        );
        assert_eq!(orch.join_match(&id, &user("alice")), Err(MatchError::AlreadyInMatch));

        // Insufficient balance leaves the match untouched
        assert_eq!(
            orch.join_match(&id, &user("carol")),
            Err(MatchError::InsufficientBalance(TokenKind::Gt))
        );
        let record = orch.match_by_id(&id).unwrap();
        assert_eq!(record.status, MatchStatus::Created);
        assert_eq!(record.players.len(), 1);

        // Once Ready, joining is a state error
        orch.join_match(&id, &user("bob")).unwrap();
        orch.deposit_usdt(&user("dave"), gt(50)).unwrap();
        orch.convert_usdt(&user("dave"), gt(50)).unwrap();
        assert_eq!(
            orch.join_match(&id, &user("dave")),
            Err(MatchError::NotJoinable(MatchStatus::Ready))
        );
    }

    #[test]
    fn test_stake_debits_and_starts_match() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();

        let first = orch.stake_tokens(&id, &user("alice")).unwrap();
        assert_eq!(first.player_balance, gt(40));
        assert_eq!(first.match_record.status, MatchStatus::Ready);

        let second = orch.stake_tokens(&id, &user("bob")).unwrap();
        assert_eq!(second.player_balance, gt(40));
        assert_eq!(second.match_record.status, MatchStatus::InProgress);
        assert_eq!(second.match_record.total_stake(), gt(20));
    }

    #[test]
    fn test_stake_order_is_irrelevant() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();

        orch.stake_tokens(&id, &user("bob")).unwrap();
        let outcome = orch.stake_tokens(&id, &user("alice")).unwrap();
        assert_eq!(outcome.match_record.status, MatchStatus::InProgress);
    }

    #[test]
    fn test_double_stake_debits_exactly_once() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();

        orch.stake_tokens(&id, &user("alice")).unwrap();
        assert_eq!(orch.stake_tokens(&id, &user("alice")), Err(MatchError::AlreadyStaked));
        assert_eq!(orch.balances(&user("alice")).gt, gt(40));
    }

    #[test]
    fn test_stake_by_stranger_is_forbidden() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;

        assert!(matches!(
            orch.stake_tokens(&id, &user("mallory")),
            Err(MatchError::Forbidden(_))
        ));
    }

    #[test]
    fn test_creator_can_stake_before_second_player_joins() {
        // No status gate between Created and Ready for stakes
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;

        let outcome = orch.stake_tokens(&id, &user("alice")).unwrap();
        assert_eq!(outcome.match_record.status, MatchStatus::Created);

        orch.join_match(&id, &user("bob")).unwrap();
        let outcome = orch.stake_tokens(&id, &user("bob")).unwrap();
        assert_eq!(outcome.match_record.status, MatchStatus::InProgress);
    }

    #[test]
    fn test_end_to_end_standard_settlement() {
        // Spec walkthrough: 50 GT each, stake 10, winner ends at 60
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();
        orch.stake_tokens(&id, &user("alice")).unwrap();
        orch.stake_tokens(&id, &user("bob")).unwrap();

        let outcome = orch.complete_match(&id, &user("alice")).unwrap();
        assert_eq!(outcome.total_stake, gt(20));
        assert_eq!(outcome.reward, gt(20));
        assert_eq!(outcome.winner_balance, gt(60));
        assert_eq!(outcome.match_record.status, MatchStatus::Completed);
        assert_eq!(outcome.match_record.winner, Some(user("alice")));
        assert!(outcome.match_record.completed_at.is_some());

        assert_eq!(orch.balances(&user("alice")).gt, gt(60));
        assert_eq!(orch.balances(&user("bob")).gt, gt(40));
    }

    #[test]
    fn test_bonus_multiplier_settlement() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Bonus).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();
        orch.stake_tokens(&id, &user("alice")).unwrap();
        orch.stake_tokens(&id, &user("bob")).unwrap();

        let outcome = orch.complete_match(&id, &user("bob")).unwrap();
        // 20 GT * 1.1 = 22 GT, exact
        assert_eq!(outcome.reward, gt(22));
        assert_eq!(outcome.winner_balance, gt(62));
    }

    #[test]
    fn test_complete_rejections() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();

        // Not yet in progress
        assert_eq!(
            orch.complete_match(&id, &user("alice")),
            Err(MatchError::NotInProgress(MatchStatus::Ready))
        );

        orch.stake_tokens(&id, &user("alice")).unwrap();
        orch.stake_tokens(&id, &user("bob")).unwrap();

        // Stranger cannot win
        assert!(matches!(
            orch.complete_match(&id, &user("mallory")),
            Err(MatchError::Forbidden(_))
        ));
        // Match unchanged, reward credited zero times
        assert_eq!(orch.match_by_id(&id).unwrap().status, MatchStatus::InProgress);
        assert_eq!(orch.balances(&user("mallory")).gt, Amount::ZERO);

        // Completing twice fails the second time
        orch.complete_match(&id, &user("alice")).unwrap();
        assert_eq!(
            orch.complete_match(&id, &user("alice")),
            Err(MatchError::NotInProgress(MatchStatus::Completed))
        );
        assert_eq!(orch.balances(&user("alice")).gt, gt(60));
    }

    #[test]
    fn test_cancel_refunds_stakes() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();
        orch.stake_tokens(&id, &user("alice")).unwrap();
        orch.stake_tokens(&id, &user("bob")).unwrap();

        let outcome = orch.cancel_match(&id, &user("alice")).unwrap();
        assert_eq!(outcome.match_record.status, MatchStatus::Cancelled);
        assert_eq!(outcome.refunds.len(), 2);

        // Both players made whole
        assert_eq!(orch.balances(&user("alice")).gt, gt(50));
        assert_eq!(orch.balances(&user("bob")).gt, gt(50));

        // Record kept, not erased
        assert!(orch.match_by_id(&id).is_some());
    }

    #[test]
    fn test_cancel_is_creator_only_and_single_shot() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();

        assert!(matches!(
            orch.cancel_match(&id, &user("bob")),
            Err(MatchError::Forbidden(_))
        ));

        orch.cancel_match(&id, &user("alice")).unwrap();
        assert_eq!(
            orch.cancel_match(&id, &user("alice")),
            Err(MatchError::NotCancellable(MatchStatus::Cancelled))
        );
        // A cancelled match accepts no stakes
        assert_eq!(
            orch.stake_tokens(&id, &user("alice")),
            Err(MatchError::NotStakeable(MatchStatus::Cancelled))
        );
    }

    #[test]
    fn test_cancel_refund_overflow_applies_nothing() {
        let mut orch = MatchOrchestrator::default();
        // "zoe" sorts after "bob", so bob's refund would be credited first.
        for name in ["bob", "zoe"] {
            orch.deposit_usdt(&user(name), gt(50)).unwrap();
            orch.convert_usdt(&user(name), gt(50)).unwrap();
        }
        let id = orch.create_match(&user("zoe"), gt(1), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();
        orch.stake_tokens(&id, &user("zoe")).unwrap();
        orch.stake_tokens(&id, &user("bob")).unwrap();

        // Push the creator's balance to within one stake of the counter
        // limit so their refund cannot be credited.
        let headroom = u64::MAX - 3_000 - orch.balances(&user("zoe")).gt.units();
        orch.deposit_usdt(&user("zoe"), Amount::from_units(headroom)).unwrap();
        orch.convert_usdt(&user("zoe"), Amount::from_units(headroom)).unwrap();

        let bob_before = orch.balances(&user("bob")).gt;
        assert_eq!(
            orch.cancel_match(&id, &user("zoe")),
            Err(MatchError::InvalidInput("balance overflow"))
        );

        // No partial refund: nothing credited, nothing consumed, not cancelled
        assert_eq!(orch.balances(&user("bob")).gt, bob_before);
        let record = orch.match_by_id(&id).unwrap();
        assert_eq!(record.status, MatchStatus::InProgress);
        assert_eq!(record.stakes.len(), 2);

        // Retrying fails identically instead of paying anyone twice
        assert!(orch.cancel_match(&id, &user("zoe")).is_err());
        assert_eq!(orch.balances(&user("bob")).gt, bob_before);
    }

    #[test]
    fn test_queries_reflect_committed_state() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.create_match(&user("bob"), gt(5), MatchType::Standard).unwrap();

        assert_eq!(orch.all_matches().len(), 2);
        assert_eq!(orch.matches_by_player(&user("alice")).len(), 1);
        assert!(orch.match_by_id(&MatchId::generate()).is_none());

        orch.join_match(&id, &user("bob")).unwrap();
        assert_eq!(orch.matches_by_player(&user("bob")).len(), 2);
        assert_eq!(orch.match_by_id(&id).unwrap().status, MatchStatus::Ready);
    }

    #[test]
    fn test_conversion_walkthrough() {
        let mut orch = MatchOrchestrator::default();
        orch.deposit_usdt(&user("alice"), gt(100)).unwrap();

        let outcome = orch.convert_usdt(&user("alice"), gt(40)).unwrap();
        assert_eq!(outcome.converted_amount, gt(40));
        assert_eq!(outcome.new_balances.usdt, gt(60));
        assert_eq!(outcome.new_balances.gt, gt(40));

        assert_eq!(
            orch.convert_usdt(&user("alice"), gt(100)),
            Err(MatchError::InsufficientBalance(TokenKind::Usdt))
        );
    }

    #[test]
    fn test_event_stream_matches_mutations() {
        let mut orch = funded();
        let id = orch.create_match(&user("alice"), gt(10), MatchType::Standard).unwrap().id;
        orch.join_match(&id, &user("bob")).unwrap();
        orch.stake_tokens(&id, &user("alice")).unwrap();
        orch.stake_tokens(&id, &user("bob")).unwrap();
        orch.complete_match(&id, &user("bob")).unwrap();

        let events = orch.take_events();
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], PlatformEvent::MatchCreated { .. }));
        assert!(matches!(events[1], PlatformEvent::PlayerJoined { ready: true, .. }));
        assert!(matches!(events[2], PlatformEvent::StakePlaced { started: false, .. }));
        assert!(matches!(events[3], PlatformEvent::StakePlaced { started: true, .. }));
        assert!(matches!(events[4], PlatformEvent::MatchCompleted { .. }));

        // Drained
        assert!(orch.take_events().is_empty());

        // Failed operations emit nothing
        let _ = orch.complete_match(&id, &user("bob"));
        assert!(orch.take_events().is_empty());
    }
}
