//! Balance Ledger
//!
//! In-memory token accounts. The development stand-in for the on-chain
//! GameToken / TokenStore contracts.

pub mod accounts;

pub use accounts::{BalanceLedger, Balances, LedgerError, TokenKind, USDT_TO_GT_RATE};
