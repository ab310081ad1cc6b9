//! Authoritative Simulation Tick
//!
//! One fixed step of the world. Pure and deterministic: the same world,
//! level and controls always produce the same next world and events.

use crate::game::animation::{animate, Animation};
use crate::game::collision::{collect_coins, reached_flag};
use crate::game::events::GameEvent;
use crate::game::input::{Controls, InputRecording};
use crate::game::level::Level;
use crate::game::physics::advance;
use crate::game::state::WorldState;

/// Result of a tick.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// The world was rebuilt this tick
    pub reset: bool,
}

/// Run one simulation tick.
///
/// A `RESET` in `controls` replaces the world with a fresh one built from
/// `level` and nothing else runs that tick, so the post-reset world equals
/// `WorldState::from_level(level)` exactly.
pub fn tick(world: &mut WorldState, level: &Level, controls: Controls) -> TickResult {
    let mut result = TickResult::default();
    let now = world.tick;

    if controls.reset() {
        *world = WorldState::from_level(level);
        result.reset = true;
        result.events.push(GameEvent::level_reset(now));
        return result;
    }

    // 1. Physics and collision resolution
    let motion = advance(&mut world.player, level, controls);
    if motion.jumped {
        result.events.push(GameEvent::jumped(now));
    }
    if motion.landed {
        result.events.push(GameEvent::landed(now));
    }

    // 2. Coin pickup
    for coin_id in collect_coins(&world.player, &mut world.coins) {
        world.progress.coins += 1;
        result.events.push(GameEvent::coin_collected(now, coin_id, world.progress.coins));
    }

    // 3. Flag arrival (event only on first arrival)
    world.progress.at_flag = reached_flag(&world.player, &level.flag());
    if world.progress.at_flag && !world.progress.flag_reached {
        world.progress.flag_reached = true;
        result.events.push(GameEvent::flag_reached(now));
    }

    // 4. Animation
    let player = &mut world.player;
    let previous = Animation { phase: player.anim_phase, timer: player.anim_timer };
    let next = animate(player.velocity.x, player.on_ground, previous);
    player.anim_phase = next.phase;
    player.anim_timer = next.timer;

    world.tick = world.tick.wrapping_add(1);
    result
}

/// Re-simulate a recording from a fresh world.
///
/// Returns the final world and every event raised along the way.
pub fn replay(level: &Level, recording: &InputRecording) -> (WorldState, Vec<GameEvent>) {
    let mut world = WorldState::from_level(level);
    let mut all_events = Vec::new();

    for (_, controls) in recording.replay_iter() {
        let result = tick(&mut world, level, controls);
        all_events.extend(result.events);
    }

    (world, all_events)
}
