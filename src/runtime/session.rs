//! Game Session
//!
//! Owns everything one player's run needs and performs one full tick per
//! call: sample input, simulate, compose a frame, present it. Schedulers
//! decide *when* to call it.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::agent::MoveSource;
use crate::core::hash::StateHash;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::input::{Command, Controls, InputAdapter, InputRecording, Intent};
use crate::game::level::Level;
use crate::game::state::WorldState;
use crate::game::tick::{tick, TickResult};
use crate::render::{Frame, NullRenderer, Renderer};

/// Configuration for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long an automated move is held, in ticks.
    pub tap_hold_ticks: u32,
    /// Keep a delta-compressed recording of every tick's controls.
    pub record_inputs: bool,
}

impl SessionConfig {
    /// Settings for the fixed-rate scheduler.
    pub fn continuous() -> Self {
        Self {
            tap_hold_ticks: InputAdapter::CONTINUOUS_TAP_TICKS,
            record_inputs: true,
        }
    }

    /// Settings for the one-tick-per-command scheduler.
    pub fn discrete() -> Self {
        Self {
            tap_hold_ticks: InputAdapter::DISCRETE_TAP_TICKS,
            record_inputs: true,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::continuous()
    }
}

/// A running game.
pub struct Session {
    level: Level,
    world: WorldState,
    adapter: InputAdapter,
    autopilot: Option<Box<dyn MoveSource>>,
    renderer: Box<dyn Renderer>,
    recording: Option<InputRecording>,
    /// Ticks stepped since the session started (not reset by level resets)
    clock: u32,
    event_tx: broadcast::Sender<GameEvent>,
}

impl Session {
    /// Create a session with no autopilot and no visible output.
    pub fn new(level: Level, config: &SessionConfig) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let world = WorldState::from_level(&level);

        Self {
            level,
            world,
            adapter: InputAdapter::new(config.tap_hold_ticks),
            autopilot: None,
            renderer: Box::new(NullRenderer),
            recording: config.record_inputs.then(InputRecording::new),
            clock: 0,
            event_tx,
        }
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn with_autopilot(mut self, source: impl MoveSource + 'static) -> Self {
        self.autopilot = Some(Box::new(source));
        self
    }

    /// Run one tick with `manual` as the player's own controls.
    pub fn step(&mut self, manual: Controls) -> TickResult {
        let now = self.clock;

        // 1. Sample input
        if manual.has_movement() || manual.reset() {
            if let Some(source) = self.autopilot.as_mut() {
                source.invalidate();
            }
        }
        let level = &self.level;
        let world = &self.world;
        let autopilot = &mut self.autopilot;
        let controls = self.adapter.resolve(manual, || match autopilot {
            Some(source) => source.next_intent(level, world, u64::from(now)),
            None => Intent::None,
        });

        if let Some(recording) = self.recording.as_mut() {
            recording.record(now, controls);
        }

        // 2. Simulate
        let result = tick(&mut self.world, &self.level, controls);
        for event in &result.events {
            log_event(event);
            // No subscribers is fine
            let _ = self.event_tx.send(event.clone());
        }

        // 3. Render (failures never stop the loop)
        let frame = Frame::compose(&self.level, &self.world);
        if let Err(e) = self.renderer.present(&frame) {
            warn!(tick = now, error = %e, "frame presentation failed");
        }

        self.clock = self.clock.wrapping_add(1);
        result
    }

    /// Run exactly one tick for a delivered command.
    pub fn handle(&mut self, command: Command) -> TickResult {
        debug!(?command, tick = self.clock, "command received");
        self.step(command.controls())
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Ticks stepped since the session started.
    pub fn clock(&self) -> u32 {
        self.clock
    }

    /// Controls used so far, if recording is enabled.
    pub fn recording(&self) -> Option<&InputRecording> {
        self.recording.as_ref()
    }

    pub fn state_hash(&self) -> StateHash {
        self.world.compute_hash()
    }

    /// Receive every event the session raises from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }
}

fn log_event(event: &GameEvent) {
    match &event.data {
        GameEventData::CoinCollected { coin_id, total } => {
            info!(tick = event.tick, coin_id, total, "coin collected");
        }
        GameEventData::FlagReached => info!(tick = event.tick, "flag reached"),
        GameEventData::LevelReset => info!(tick = event.tick, "level reset"),
        GameEventData::Jumped => debug!(tick = event.tick, "jumped"),
        GameEventData::Landed => debug!(tick = event.tick, "landed"),
    }
}
