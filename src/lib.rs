//! # TriX Platform Core
//!
//! Match staking and reward settlement for the TriX play-to-earn platform.
//! This crate is the development stand-in for the on-chain contracts
//! (GameToken / TokenStore / PlayGame): the same lifecycle and settlement
//! rules, enforced in process.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TRIX CORE                               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Accounting primitives                   │
//! │  └── amount.rs     - Decimal fixed-point token amounts       │
//! │                                                              │
//! │  ledger/           - Balance Ledger                          │
//! │  └── accounts.rs   - GT/USDT balances, deposit, conversion   │
//! │                                                              │
//! │  game/             - Match lifecycle (deterministic)         │
//! │  ├── state.rs      - Ids, match records, status transitions  │
//! │  ├── registry.rs   - Match storage and lookup                │
//! │  ├── reward.rs     - Stake limits, payout multipliers        │
//! │  ├── orchestrator.rs - Lifecycle operations + validation     │
//! │  └── events.rs     - Domain events                           │
//! │                                                              │
//! │  service/          - Boundary (non-deterministic)            │
//! │  ├── protocol.rs   - Envelope, requests, escrow view         │
//! │  └── platform.rs   - Serialized command loop + handle        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Execution model
//!
//! Balances and match records are process-wide mutable state with no
//! persistence. Every mutating operation runs to completion before the
//! next is observed: the orchestrator requires `&mut self`, and the
//! service layer funnels all commands through one queue. No timeouts,
//! no retries, no partial application.
//!
//! All token math is integer-only decimal fixed-point; reward multipliers
//! (1.0x / 1.1x / 1.5x) are exact.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod ledger;
pub mod service;

// Re-export commonly used types
pub use crate::core::amount::Amount;
pub use crate::game::orchestrator::{MatchError, MatchOrchestrator};
pub use crate::game::registry::MatchRegistry;
pub use crate::game::reward::{RewardPolicy, MAX_STAKE, MIN_STAKE};
pub use crate::game::state::{MatchId, MatchRecord, MatchStatus, MatchType, UserId};
pub use crate::ledger::accounts::{BalanceLedger, Balances};
pub use crate::service::platform::PlatformHandle;
pub use crate::service::protocol::{ApiResponse, EscrowView};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
