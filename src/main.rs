//! Flagrun
//!
//! Runs one session of the standard level from a terminal. Keys are typed
//! as lines on stdin; frames go to stdout, logs to stderr.

use std::sync::Arc;

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use flagrun::{
    agent::{Autopilot, WsSuggestionProvider},
    config::{GameConfig, RenderMode, RunMode},
    game::{replay, tick, Command, Controls, Level, WorldState},
    render::AsciiRenderer,
    runtime::{run_continuous, run_requests, RunSummary, Session},
    TICK_RATE, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Flagrun v{}", VERSION);

    let config = GameConfig::from_env().context("invalid FLAGRUN_* configuration")?;
    info!(
        mode = ?config.mode,
        tick_rate = config.tick_rate,
        default_rate = TICK_RATE,
        autopilot = config.autopilot,
        provider = config.suggest_url.as_deref().unwrap_or("offline"),
        "configuration loaded"
    );

    let mut session = build_session(&config);

    let summary = match config.mode {
        RunMode::Continuous => play_continuous(&mut session, &config).await?,
        RunMode::Requests => play_requests(&mut session, &config).await,
    };

    info!("=== Run Results ===");
    info!("Ticks: {}", summary.ticks);
    info!("Coins: {}", summary.coins);
    info!("Flag reached: {}", summary.flag_reached);
    info!("Final State Hash: {}", hex::encode(summary.final_hash));

    verify_determinism(&session)
}

fn build_session(config: &GameConfig) -> Session {
    let mut session = Session::new(Level::standard(), &config.session_config());

    if config.render == RenderMode::Ascii {
        session = session.with_renderer(AsciiRenderer::new(std::io::stdout()).clear_screen(true));
    }

    if config.autopilot {
        session = match &config.suggest_url {
            Some(url) => {
                let provider = WsSuggestionProvider::new(url.clone());
                info!(url = provider.url(), "using websocket suggestion provider");
                session.with_autopilot(Autopilot::new(
                    provider,
                    &config.autopilot_config(),
                    Handle::current(),
                ))
            }
            None => session.with_autopilot(Autopilot::offline(config.seed)),
        };
    }

    session
}

/// Held keys for a line like `right jump`. An empty line releases all.
fn parse_held(line: &str) -> Option<Controls> {
    let mut held = Controls::NONE;
    for word in line.split_whitespace() {
        match word.to_ascii_lowercase().as_str() {
            "left" | "l" => held.set_left(true),
            "right" | "r" => held.set_right(true),
            "jump" | "j" => held.set_jump(true),
            "reset" => held.set_reset(true),
            _ => return None,
        }
    }
    Some(held)
}

async fn play_continuous(session: &mut Session, config: &GameConfig) -> anyhow::Result<RunSummary> {
    let (held_tx, held_rx) = watch::channel(Controls::NONE);
    let (stop_tx, stop_rx) = watch::channel(false);
    let stop_tx = Arc::new(stop_tx);

    let ctrl_c_stop = Arc::clone(&stop_tx);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = ctrl_c_stop.send(true);
        }
    });

    let stdin_stop = Arc::clone(&stop_tx);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().eq_ignore_ascii_case("quit") {
                let _ = stdin_stop.send(true);
                return;
            }
            match parse_held(&line) {
                Some(held) => {
                    let _ = held_tx.send(held);
                }
                None => warn!(input = %line, "unrecognized keys"),
            }
        }
        // stdin closed: keep running on the keys last held
        std::future::pending::<()>().await;
    });

    let summary = run_continuous(session, held_rx, stop_rx, config.run_options()).await?;
    Ok(summary)
}

async fn play_requests(session: &mut Session, config: &GameConfig) -> RunSummary {
    let (tx, rx) = mpsc::channel::<Command>(64);

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match line.parse::<Command>() {
                Ok(command) => {
                    if tx.send(command).await.is_err() {
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "ignoring input"),
            }
        }
    });

    run_requests(session, rx, config.max_ticks).await
}

/// Replay the recorded controls and check a reset lands on the spawn state.
fn verify_determinism(session: &Session) -> anyhow::Result<()> {
    info!("=== Verifying Determinism ===");

    if let Some(recording) = session.recording() {
        let (replayed, _) = replay(session.level(), recording);
        let replay_hash = replayed.compute_hash();
        info!("Replay State Hash: {}", hex::encode(replay_hash));
        info!(
            ticks = recording.len(),
            deltas = recording.delta_count(),
            inputs = %hex::encode(&recording.compute_hash()[..8]),
            "recording"
        );

        if replay_hash != session.state_hash() {
            error!("DETERMINISM FAILURE: Hashes differ!");
            bail!("replay diverged from the live session");
        }
        info!("DETERMINISM VERIFIED: Hashes match!");
    }

    let mut world = session.world().clone();
    tick(&mut world, session.level(), Controls::RESET);
    if world != WorldState::from_level(session.level()) {
        bail!("reset did not restore the initial world");
    }
    info!("RESET VERIFIED: world matches the level's initial state");

    Ok(())
}
