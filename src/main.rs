//! TriX Platform Server
//!
//! Development driver for the TriX match-staking core.
//! Walks a full match lifecycle against the in-process service.

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use trix::{
    service::{self, PlatformHandle},
    Amount, MatchOrchestrator, MatchType, UserId, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("TriX Core v{}", VERSION);

    let handle = service::spawn(MatchOrchestrator::default());

    demo_lifecycle(&handle).await?;
    demo_cancellation(&handle).await?;

    Ok(())
}

/// Walk the happy path: deposit, convert, create, join, stake, complete.
async fn demo_lifecycle(handle: &PlatformHandle) -> anyhow::Result<()> {
    info!("=== Match Lifecycle Demo ===");

    let alice = UserId::from("alice");
    let bob = UserId::from("bob");

    // Fund both players: 50 USDT deposited, all of it converted to GT
    for player in [&alice, &bob] {
        handle.deposit_usdt(player.clone(), Amount::from_whole(50)).await?;
        let converted = handle.convert_usdt(player.clone(), Amount::from_whole(50)).await?;
        info!(
            "{player}: {} GT after conversion",
            converted.new_balances.gt
        );
    }

    // Create and fill the match
    let record = handle
        .create_match(alice.clone(), Amount::from_whole(10), MatchType::Standard)
        .await?;
    info!("Match {} created (stake {} GT)", record.id, record.stake_amount);

    let record = handle.join_match(record.id, bob.clone()).await?;
    info!("{bob} joined, status: {}", record.status);

    // Both stakes, in either order
    let staked = handle.stake_tokens(record.id, alice.clone()).await?;
    info!("{alice} staked, balance now {} GT", staked.player_balance);
    let staked = handle.stake_tokens(record.id, bob.clone()).await?;
    info!(
        "{bob} staked, balance now {} GT, status: {}",
        staked.player_balance, staked.match_record.status
    );

    // Settle
    let outcome = handle.complete_match(record.id, alice.clone()).await?;
    info!(
        "Match completed: winner {} takes {} GT of {} staked (balance {} GT)",
        alice, outcome.reward, outcome.total_stake, outcome.winner_balance
    );

    // Escrow projection for the on-chain mirror
    let view = handle
        .escrow_view(record.id)
        .await?
        .context("escrow view missing for settled match")?;
    info!("Escrow view: {}", serde_json::to_string_pretty(&view)?);

    Ok(())
}

/// Walk the refund path: stakes placed, then the creator cancels.
async fn demo_cancellation(handle: &PlatformHandle) -> anyhow::Result<()> {
    info!("=== Cancellation Demo ===");

    let alice = UserId::from("alice");
    let bob = UserId::from("bob");

    let record = handle
        .create_match(alice.clone(), Amount::from_whole(25), MatchType::Tournament)
        .await?;
    handle.join_match(record.id, bob.clone()).await?;
    handle.stake_tokens(record.id, alice.clone()).await?;
    handle.stake_tokens(record.id, bob.clone()).await?;

    let outcome = handle.cancel_match(record.id, alice.clone()).await?;
    info!(
        "Match {} cancelled, {} stakes refunded",
        record.id,
        outcome.refunds.len()
    );
    for (player, amount) in &outcome.refunds {
        info!("  refunded {amount} GT to {player}");
    }

    let balances = handle.balances(alice.clone()).await?;
    info!("{alice} final balance: {} GT / {} USDT", balances.gt, balances.usdt);

    Ok(())
}
