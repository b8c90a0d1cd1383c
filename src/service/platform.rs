//! Platform Service
//!
//! Serialized command loop that owns the orchestrator. Every mutating
//! operation is a single message processed to completion before the next
//! one is taken off the queue, so there is no interleaving window between
//! a balance check and the matching debit - the uninterruptible
//! unit-of-work the in-memory model requires.
//!
//! `PlatformHandle` is the cloneable async front: it sends a command and
//! awaits a oneshot reply.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::core::amount::Amount;
use crate::game::orchestrator::{
    CancellationOutcome, CompletionOutcome, ConversionOutcome, MatchError, MatchOrchestrator,
    StakeOutcome,
};
use crate::game::state::{MatchId, MatchRecord, MatchType, UserId};
use crate::ledger::accounts::Balances;
use crate::service::protocol::{ApiResponse, EscrowView, PlatformRequest};

/// Default command queue depth.
pub const DEFAULT_QUEUE_DEPTH: usize = 256;

/// Service-boundary errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The command loop has shut down.
    #[error("platform service is no longer running")]
    Closed,

    /// The operation itself failed.
    #[error(transparent)]
    Match(#[from] MatchError),
}

type Reply<T> = oneshot::Sender<Result<T, MatchError>>;

enum Command {
    CreateMatch {
        creator: UserId,
        stake_amount: Amount,
        match_type: MatchType,
        reply: Reply<MatchRecord>,
    },
    JoinMatch {
        match_id: MatchId,
        player: UserId,
        reply: Reply<MatchRecord>,
    },
    StakeTokens {
        match_id: MatchId,
        player: UserId,
        reply: Reply<StakeOutcome>,
    },
    CompleteMatch {
        match_id: MatchId,
        winner: UserId,
        reply: Reply<CompletionOutcome>,
    },
    CancelMatch {
        match_id: MatchId,
        caller: UserId,
        reply: Reply<CancellationOutcome>,
    },
    AllMatches {
        reply: oneshot::Sender<Vec<MatchRecord>>,
    },
    MatchById {
        match_id: MatchId,
        reply: oneshot::Sender<Option<MatchRecord>>,
    },
    MatchesByPlayer {
        player: UserId,
        reply: oneshot::Sender<Vec<MatchRecord>>,
    },
    Balances {
        user: UserId,
        reply: oneshot::Sender<Balances>,
    },
    DepositUsdt {
        user: UserId,
        amount: Amount,
        reply: Reply<Balances>,
    },
    ConvertUsdt {
        user: UserId,
        usdt_amount: Amount,
        reply: Reply<ConversionOutcome>,
    },
}

/// Cloneable async handle to the platform command loop.
#[derive(Clone)]
pub struct PlatformHandle {
    tx: mpsc::Sender<Command>,
}

/// Spawn the command loop on the current tokio runtime.
///
/// The loop owns the orchestrator outright; it exits when every handle
/// has been dropped.
pub fn spawn(orchestrator: MatchOrchestrator) -> PlatformHandle {
    spawn_with_depth(orchestrator, DEFAULT_QUEUE_DEPTH)
}

/// Spawn with an explicit command queue depth.
pub fn spawn_with_depth(mut orchestrator: MatchOrchestrator, depth: usize) -> PlatformHandle {
    let (tx, mut rx) = mpsc::channel(depth);

    tokio::spawn(async move {
        info!("platform service started");
        while let Some(command) = rx.recv().await {
            handle_command(&mut orchestrator, command);
            for event in orchestrator.take_events() {
                debug!(event = ?event, "platform event");
            }
        }
        info!("platform service stopped");
    });

    PlatformHandle { tx }
}

fn handle_command(orchestrator: &mut MatchOrchestrator, command: Command) {
    // A dropped reply receiver just means the caller went away.
    match command {
        Command::CreateMatch {
            creator,
            stake_amount,
            match_type,
            reply,
        } => {
            let result = orchestrator.create_match(&creator, stake_amount, match_type);
            if let Err(err) = &result {
                warn!(%creator, %err, "create_match rejected");
            }
            let _ = reply.send(result);
        }
        Command::JoinMatch {
            match_id,
            player,
            reply,
        } => {
            let result = orchestrator.join_match(&match_id, &player);
            if let Err(err) = &result {
                warn!(%match_id, %player, %err, "join_match rejected");
            }
            let _ = reply.send(result);
        }
        Command::StakeTokens {
            match_id,
            player,
            reply,
        } => {
            let result = orchestrator.stake_tokens(&match_id, &player);
            if let Err(err) = &result {
                warn!(%match_id, %player, %err, "stake_tokens rejected");
            }
            let _ = reply.send(result);
        }
        Command::CompleteMatch {
            match_id,
            winner,
            reply,
        } => {
            let result = orchestrator.complete_match(&match_id, &winner);
            if let Err(err) = &result {
                warn!(%match_id, %winner, %err, "complete_match rejected");
            }
            let _ = reply.send(result);
        }
        Command::CancelMatch {
            match_id,
            caller,
            reply,
        } => {
            let result = orchestrator.cancel_match(&match_id, &caller);
            if let Err(err) = &result {
                warn!(%match_id, %caller, %err, "cancel_match rejected");
            }
            let _ = reply.send(result);
        }
        Command::AllMatches { reply } => {
            let _ = reply.send(orchestrator.all_matches());
        }
        Command::MatchById { match_id, reply } => {
            let _ = reply.send(orchestrator.match_by_id(&match_id));
        }
        Command::MatchesByPlayer { player, reply } => {
            let _ = reply.send(orchestrator.matches_by_player(&player));
        }
        Command::Balances { user, reply } => {
            let _ = reply.send(orchestrator.balances(&user));
        }
        Command::DepositUsdt { user, amount, reply } => {
            let _ = reply.send(orchestrator.deposit_usdt(&user, amount));
        }
        Command::ConvertUsdt {
            user,
            usdt_amount,
            reply,
        } => {
            let _ = reply.send(orchestrator.convert_usdt(&user, usdt_amount));
        }
    }
}

impl PlatformHandle {
    async fn call<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ServiceError::Closed)?;
        rx.await.map_err(|_| ServiceError::Closed)?.map_err(ServiceError::Match)
    }

    async fn query<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ServiceError::Closed)?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Create a match.
    pub async fn create_match(
        &self,
        creator: UserId,
        stake_amount: Amount,
        match_type: MatchType,
    ) -> Result<MatchRecord, ServiceError> {
        self.call(|reply| Command::CreateMatch {
            creator,
            stake_amount,
            match_type,
            reply,
        })
        .await
    }

    /// Join a match.
    pub async fn join_match(
        &self,
        match_id: MatchId,
        player: UserId,
    ) -> Result<MatchRecord, ServiceError> {
        self.call(|reply| Command::JoinMatch {
            match_id,
            player,
            reply,
        })
        .await
    }

    /// Place a stake.
    pub async fn stake_tokens(
        &self,
        match_id: MatchId,
        player: UserId,
    ) -> Result<StakeOutcome, ServiceError> {
        self.call(|reply| Command::StakeTokens {
            match_id,
            player,
            reply,
        })
        .await
    }

    /// Settle a match.
    pub async fn complete_match(
        &self,
        match_id: MatchId,
        winner: UserId,
    ) -> Result<CompletionOutcome, ServiceError> {
        self.call(|reply| Command::CompleteMatch {
            match_id,
            winner,
            reply,
        })
        .await
    }

    /// Cancel a match.
    pub async fn cancel_match(
        &self,
        match_id: MatchId,
        caller: UserId,
    ) -> Result<CancellationOutcome, ServiceError> {
        self.call(|reply| Command::CancelMatch {
            match_id,
            caller,
            reply,
        })
        .await
    }

    /// All matches.
    pub async fn all_matches(&self) -> Result<Vec<MatchRecord>, ServiceError> {
        self.query(|reply| Command::AllMatches { reply }).await
    }

    /// One match by id.
    pub async fn match_by_id(&self, match_id: MatchId) -> Result<Option<MatchRecord>, ServiceError> {
        self.query(|reply| Command::MatchById { match_id, reply }).await
    }

    /// A player's matches.
    pub async fn matches_by_player(&self, player: UserId) -> Result<Vec<MatchRecord>, ServiceError> {
        self.query(|reply| Command::MatchesByPlayer { player, reply }).await
    }

    /// A user's balances.
    pub async fn balances(&self, user: UserId) -> Result<Balances, ServiceError> {
        self.query(|reply| Command::Balances { user, reply }).await
    }

    /// Deposit USDT.
    pub async fn deposit_usdt(&self, user: UserId, amount: Amount) -> Result<Balances, ServiceError> {
        self.call(|reply| Command::DepositUsdt { user, amount, reply }).await
    }

    /// Convert USDT to GT.
    pub async fn convert_usdt(
        &self,
        user: UserId,
        usdt_amount: Amount,
    ) -> Result<ConversionOutcome, ServiceError> {
        self.call(|reply| Command::ConvertUsdt {
            user,
            usdt_amount,
            reply,
        })
        .await
    }

    /// Escrow read model for a match.
    pub async fn escrow_view(&self, match_id: MatchId) -> Result<Option<EscrowView>, ServiceError> {
        let record = self.match_by_id(match_id).await?;
        Ok(record.as_ref().map(EscrowView::from))
    }

    /// Execute a wire request and fold the outcome into the JSON envelope.
    ///
    /// Mutations carry a human-readable confirmation message on success;
    /// queries return the bare payload.
    pub async fn dispatch(&self, request: PlatformRequest) -> serde_json::Value {
        match request {
            PlatformRequest::CreateMatch {
                creator_id,
                stake_amount,
                match_type,
            } => envelope_with(
                self.create_match(creator_id, stake_amount, match_type).await,
                "Match created successfully",
            ),
            PlatformRequest::JoinMatch { match_id, player_id } => envelope_with(
                self.join_match(match_id, player_id).await,
                "Joined match successfully",
            ),
            PlatformRequest::StakeTokens { match_id, player_id } => envelope_with(
                self.stake_tokens(match_id, player_id).await,
                "Stake placed successfully",
            ),
            PlatformRequest::CompleteMatch { match_id, winner_id } => envelope_with(
                self.complete_match(match_id, winner_id).await,
                "Match completed successfully",
            ),
            PlatformRequest::CancelMatch { match_id, caller_id } => envelope_with(
                self.cancel_match(match_id, caller_id).await,
                "Match cancelled successfully",
            ),
            PlatformRequest::GetAllMatches => envelope(self.all_matches().await),
            PlatformRequest::GetMatch { match_id } => match self.match_by_id(match_id).await {
                Ok(Some(record)) => envelope::<_, ServiceError>(Ok(record)),
                Ok(None) => to_json(ApiResponse::<MatchRecord>::failure("Match not found")),
                Err(err) => to_json(ApiResponse::<MatchRecord>::failure(err.to_string())),
            },
            PlatformRequest::GetMatchesByPlayer { player_id } => {
                envelope(self.matches_by_player(player_id).await)
            }
            PlatformRequest::GetBalances { user_id } => envelope(self.balances(user_id).await),
            PlatformRequest::AddUsdt { user_id, amount } => envelope_with(
                self.deposit_usdt(user_id, amount).await,
                "USDT deposited successfully",
            ),
            PlatformRequest::ConvertUsdt { user_id, usdt_amount } => envelope_with(
                self.convert_usdt(user_id, usdt_amount).await,
                "USDT converted successfully",
            ),
            PlatformRequest::GetEscrow { match_id } => match self.escrow_view(match_id).await {
                Ok(Some(view)) => envelope::<_, ServiceError>(Ok(view)),
                Ok(None) => to_json(ApiResponse::<EscrowView>::failure("Match not found")),
                Err(err) => to_json(ApiResponse::<EscrowView>::failure(err.to_string())),
            },
        }
    }
}

fn envelope<T: serde::Serialize, E: std::fmt::Display>(result: Result<T, E>) -> serde_json::Value {
    to_json(ApiResponse::from_result(result))
}

fn envelope_with<T: serde::Serialize, E: std::fmt::Display>(
    result: Result<T, E>,
    message: &str,
) -> serde_json::Value {
    match result {
        Ok(data) => to_json(ApiResponse::ok_with_message(data, message)),
        Err(err) => to_json(ApiResponse::<T>::failure(err.to_string())),
    }
}

fn to_json<T: serde::Serialize>(response: ApiResponse<T>) -> serde_json::Value {
    serde_json::to_value(&response).unwrap_or_else(|err| {
        serde_json::json!({
            "success": false,
            "message": format!("response serialization failed: {err}"),
        })
    })
}

// =============================================================================
// TESTS
// =============================================================================
