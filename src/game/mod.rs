//! Match Logic Module
//!
//! The match lifecycle state machine and its collaborators.
//!
//! ## Module Structure
//!
//! - `state`: Identity types, match records, status transitions
//! - `registry`: Match storage and lookup
//! - `reward`: Stake limits and payout multipliers
//! - `orchestrator`: Lifecycle operations with validation
//! - `events`: Domain events for audit/logging

pub mod events;
pub mod orchestrator;
pub mod registry;
pub mod reward;
pub mod state;

// Re-export key types
pub use events::PlatformEvent;
pub use orchestrator::{
    CancellationOutcome, CompletionOutcome, ConversionOutcome, MatchError, MatchOrchestrator,
    StakeOutcome,
};
pub use registry::MatchRegistry;
pub use reward::{RewardPolicy, MAX_STAKE, MIN_STAKE};
pub use state::{MatchId, MatchRecord, MatchStatus, MatchType, UserId, MAX_PLAYERS};
