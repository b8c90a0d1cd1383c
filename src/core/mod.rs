//! Core accounting primitives.
//!
//! Integer-only token math shared by the ledger, the reward policy, and the
//! match orchestrator. Nothing in this module touches floating point.

pub mod amount;

// Re-export core types
pub use amount::{Amount, AMOUNT_SCALE, PER_MYRIAD};
