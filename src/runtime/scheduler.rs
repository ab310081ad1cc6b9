//! Schedulers
//!
//! Decide when a [`Session`] ticks. The continuous scheduler runs at a fixed
//! rate off a tokio interval and samples whatever keys are held; the
//! request-driven one ticks exactly once per delivered command.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument};

use super::session::Session;
use crate::core::hash::StateHash;
use crate::game::input::{Command, Controls};

/// Options for the fixed-rate scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Ticks per second.
    pub tick_rate: u32,
    /// Stop after this many ticks (`None` = until stopped).
    pub max_ticks: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tick_rate: crate::TICK_RATE,
            max_ticks: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("tick rate must be between 1 and 1000000 Hz, got {0}")]
    InvalidTickRate(u32),
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop signal fired or its sender went away.
    Stopped,
    /// `max_ticks` reached.
    TickLimit,
    /// Every command sender was dropped.
    InputClosed,
}

/// Outcome of a scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks run by this call
    pub ticks: u64,
    pub final_hash: StateHash,
    pub coins: u32,
    pub flag_reached: bool,
    pub reason: StopReason,
}

impl RunSummary {
    fn capture(session: &Session, ticks: u64, reason: StopReason) -> Self {
        let progress = session.world().progress;
        Self {
            ticks,
            final_hash: session.state_hash(),
            coins: progress.coins,
            flag_reached: progress.flag_reached,
            reason,
        }
    }
}

/// Duration of one tick at `tick_rate` Hz.
pub fn tick_duration(tick_rate: u32) -> Result<Duration, SchedulerError> {
    if tick_rate == 0 || tick_rate > 1_000_000 {
        return Err(SchedulerError::InvalidTickRate(tick_rate));
    }
    Ok(Duration::from_micros(1_000_000 / tick_rate as u64))
}

/// Tick at a fixed rate until stopped.
///
/// `held` carries the keys currently held down and is sampled once per
/// tick. Reset fires on the tick it is first seen held, not on every tick
/// it stays held.
#[instrument(skip(session, held, stop))]
pub async fn run_continuous(
    session: &mut Session,
    held: watch::Receiver<Controls>,
    mut stop: watch::Receiver<bool>,
    options: RunOptions,
) -> Result<RunSummary, SchedulerError> {
    let mut tick_interval = interval(tick_duration(options.tick_rate)?);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(tick_rate = options.tick_rate, "continuous scheduler started");

    let mut ticks = 0u64;
    let mut reset_was_held = false;

    let reason = loop {
        if *stop.borrow() {
            break StopReason::Stopped;
        }
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break StopReason::TickLimit;
        }

        tokio::select! {
            _ = tick_interval.tick() => {
                let mut controls = *held.borrow();
                let reset_held = controls.reset();
                controls.set_reset(reset_held && !reset_was_held);
                reset_was_held = reset_held;

                session.step(controls);
                ticks += 1;
            }
            changed = stop.changed() => {
                if changed.is_err() {
                    debug!("stop sender dropped");
                    break StopReason::Stopped;
                }
            }
        }
    };

    let summary = RunSummary::capture(session, ticks, reason);
    info!(
        ticks,
        coins = summary.coins,
        flag = summary.flag_reached,
        hash = %hex::encode(&summary.final_hash[..8]),
        "continuous scheduler stopped"
    );
    Ok(summary)
}

/// Run one tick per received command until the channel closes.
#[instrument(skip(session, commands))]
pub async fn run_requests(
    session: &mut Session,
    mut commands: mpsc::Receiver<Command>,
    max_ticks: Option<u64>,
) -> RunSummary {
    info!("request scheduler started");

    let mut ticks = 0u64;
    let reason = loop {
        if max_ticks.is_some_and(|max| ticks >= max) {
            break StopReason::TickLimit;
        }
        let Some(command) = commands.recv().await else {
            break StopReason::InputClosed;
        };
        session.handle(command);
        ticks += 1;
    };

    let summary = RunSummary::capture(session, ticks, reason);
    info!(
        ticks,
        coins = summary.coins,
        flag = summary.flag_reached,
        hash = %hex::encode(&summary.final_hash[..8]),
        "request scheduler stopped"
    );
    summary
}
