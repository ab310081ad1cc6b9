//! Automated Move Suggestions
//!
//! The boundary to an external move-suggestion collaborator and the local
//! policy that stands in for it.
//!
//! ## Module Structure
//!
//! - `provider`: The suggestion provider seam (offline, WebSocket)
//! - `policy`: Deterministic fallback policy and call quota
//! - `autopilot`: Non-blocking bridge between the tick loop and a provider

pub mod provider;
pub mod policy;
pub mod autopilot;

use serde::{Serialize, Deserialize};

use crate::core::fixed::to_float;
use crate::game::input::Intent;
use crate::game::level::Level;
use crate::game::state::WorldState;

pub use provider::{SuggestionProvider, SuggestError, Offline, WsSuggestionProvider};
pub use policy::{FallbackPolicy, SuggestionQuota, QuotaDenied};
pub use autopilot::{Autopilot, AutopilotConfig, AutopilotStats};

/// Anything that can pick an intent for the current tick.
///
/// Implementations must answer immediately; the tick loop never waits.
pub trait MoveSource: Send {
    /// Choose a move for the tick numbered `now` (monotonic across resets).
    fn next_intent(&mut self, level: &Level, world: &WorldState, now: u64) -> Intent;

    /// The player took over or the level was reset; forget any answer
    /// still being worked out for the old situation.
    fn invalidate(&mut self) {}
}

// =============================================================================
// SNAPSHOT (wire format sent to providers)
// =============================================================================

/// Player fields visible to a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub on_ground: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub collected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlagSnapshot {
    pub x: f32,
    pub y: f32,
}

/// Read-only view of the world handed to a suggestion provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u32,
    pub player: PlayerSnapshot,
    pub coins: Vec<CoinSnapshot>,
    pub flag: FlagSnapshot,
}

impl Snapshot {
    pub fn capture(level: &Level, world: &WorldState) -> Self {
        let p = &world.player;
        let flag = level.flag();
        Self {
            tick: world.tick,
            player: PlayerSnapshot {
                x: to_float(p.position.x),
                y: to_float(p.position.y),
                vx: to_float(p.velocity.x),
                vy: to_float(p.velocity.y),
                on_ground: p.on_ground,
            },
            coins: world
                .coins
                .iter()
                .map(|c| CoinSnapshot {
                    id: c.id,
                    x: to_float(c.center.x),
                    y: to_float(c.center.y),
                    collected: c.collected,
                })
                .collect(),
            flag: FlagSnapshot {
                x: to_float(flag.x),
                y: to_float(flag.y),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
