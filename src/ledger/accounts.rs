//! Balance Ledger
//!
//! Per-user GT and USDT balances with deposit, conversion, and the
//! debit/credit operations the orchestrator uses for staking and payouts.
//!
//! Accounts are created lazily with zero balances on first access and are
//! never deleted. The ledger substitutes for the on-chain token store in
//! development, so there is no persistence.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::amount::{Amount, PER_MYRIAD};
use crate::game::state::UserId;

/// Default USDT -> GT conversion rate, per-myriad (10_000 = 1:1).
pub const USDT_TO_GT_RATE: u32 = PER_MYRIAD as u32;

/// Currency denomination, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Game Token, the stake/reward currency.
    Gt,
    /// Stable-value deposit currency, convertible to GT.
    Usdt,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Gt => f.write_str("GT"),
            TokenKind::Usdt => f.write_str("USDT"),
        }
    }
}

/// A user's token balances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    /// Game Token balance.
    pub gt: Amount,
    /// USDT balance.
    pub usdt: Amount,
}

/// Ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// Amount was zero where a positive amount is required.
    #[error("amount must be positive")]
    InvalidAmount,

    /// GT debit larger than the current balance.
    #[error("insufficient GT balance")]
    InsufficientGt,

    /// USDT debit larger than the current balance.
    #[error("insufficient USDT balance")]
    InsufficientUsdt,

    /// Credit would overflow the balance counter.
    #[error("balance overflow")]
    Overflow,
}

/// In-memory balance store.
///
/// Single-threaded by construction: every method runs to completion while
/// holding `&mut self`, so no partial mutation is ever observable.
#[derive(Debug)]
pub struct BalanceLedger {
    accounts: BTreeMap<UserId, Balances>,
    usdt_to_gt_rate: u32,
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceLedger {
    /// Create a ledger with the default 1:1 conversion rate.
    pub fn new() -> Self {
        Self::with_rate(USDT_TO_GT_RATE)
    }

    /// Create a ledger with a custom per-myriad USDT -> GT rate.
    pub fn with_rate(usdt_to_gt_rate: u32) -> Self {
        Self {
            accounts: BTreeMap::new(),
            usdt_to_gt_rate,
        }
    }

    fn entry(&mut self, user: &UserId) -> &mut Balances {
        self.accounts.entry(user.clone()).or_default()
    }

    /// Get a user's balances, creating a zero-balance account if absent.
    ///
    /// Never fails.
    pub fn balances(&mut self, user: &UserId) -> Balances {
        *self.entry(user)
    }

    /// Credit USDT to a user (deposit / development faucet).
    pub fn credit_usdt(&mut self, user: &UserId, amount: Amount) -> Result<Balances, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let account = self.entry(user);
        account.usdt = account.usdt.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(*account)
    }

    /// Convert USDT to GT at the configured rate.
    ///
    /// Debits USDT and credits GT in one step; returns the GT amount credited
    /// and the new balances.
    pub fn convert(
        &mut self,
        user: &UserId,
        usdt_amount: Amount,
    ) -> Result<(Amount, Balances), LedgerError> {
        if usdt_amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let gt_amount = usdt_amount.mul_per_myriad(self.usdt_to_gt_rate);

        let account = self.entry(user);
        let new_usdt = account
            .usdt
            .checked_sub(usdt_amount)
            .ok_or(LedgerError::InsufficientUsdt)?;
        let new_gt = account.gt.checked_add(gt_amount).ok_or(LedgerError::Overflow)?;
        account.usdt = new_usdt;
        account.gt = new_gt;
        Ok((gt_amount, *account))
    }

    /// Debit GT from a user (stake collection).
    pub fn debit_gt(&mut self, user: &UserId, amount: Amount) -> Result<Balances, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let account = self.entry(user);
        account.gt = account.gt.checked_sub(amount).ok_or(LedgerError::InsufficientGt)?;
        Ok(*account)
    }

    /// Credit GT to a user (payout / refund).
    pub fn credit_gt(&mut self, user: &UserId, amount: Amount) -> Result<Balances, LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let account = self.entry(user);
        account.gt = account.gt.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(*account)
    }
}

// =============================================================================
// TESTS
// =============================================================================
