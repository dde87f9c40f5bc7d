//! Reward Tester - live reward shaping monitor
//!
//! Listens to a game bridge (or a seeded synthetic feed), samples every Nth
//! active tick, scores each player with a weighted set of reward components
//! and prints running statistics to stdout.

mod app;
mod config;
mod game;
mod reward;
mod session;
mod transport;
mod util;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::AppState;
use crate::config::{Config, FeedKind};
use crate::game::PacketDecoder;
use crate::session::{ConsoleSink, RewardSession};
use crate::transport::{serve, SyntheticFeed, TransportError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    let state = AppState::new(config);
    let config = state.config.clone();

    info!(session_id = %state.session_id, "Starting Reward Tester");

    let rewards = config.reward_table()?;
    let aggregator = rewards.build_aggregator(state.input_cache.clone());

    let (session, session_tx) = RewardSession::new(
        state.session_id,
        PacketDecoder::new(),
        aggregator,
        config.tick_skip,
        config.print.clone(),
        ConsoleSink::stdout(),
    );
    let session_handle = tokio::spawn(session.run());

    let feed = match config.feed {
        FeedKind::Tcp => {
            let listener = TcpListener::bind(config.listen_addr).await?;
            info!("Waiting for game bridge on {}", config.listen_addr);
            tokio::spawn(serve(listener, state.input_cache.clone(), session_tx))
        }
        FeedKind::Synthetic => {
            info!(
                seed = config.synthetic_seed,
                players = config.synthetic_players,
                "Using synthetic feed"
            );
            let feed = SyntheticFeed::new(config.synthetic_seed, config.synthetic_players);
            tokio::spawn(feed.run(state.input_cache.clone(), session_tx))
        }
    };
    let feed_abort = feed.abort_handle();

    tokio::select! {
        _ = shutdown_signal() => {}
        result = feed => {
            match result {
                Ok(Err(TransportError::SessionClosed)) | Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "Feed stopped"),
                Err(e) => error!(error = %e, "Feed task failed"),
            }
        }
    }

    // Dropping the feed closes the session channel and lets the loop finish
    feed_abort.abort();
    let stats = session_handle.await?;

    let global = stats.global();
    info!(
        steps = global.num_steps,
        total_step_reward = global.total_step_reward,
        "Reward Tester shutdown complete"
    );
    Ok(())
}

/// Initialize tracing/logging; logs go to stderr, reports to stdout
fn init_tracing(log_level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
