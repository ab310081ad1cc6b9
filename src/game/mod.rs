//! Game Logic Module
//!
//! All game simulation code. 100% deterministic.
//!
//! ## Module Structure
//!
//! - `level`: Immutable level geometry and validation
//! - `state`: World state, player entity, coins, progress
//! - `input`: Intents, control bits, input arbitration, recordings
//! - `physics`: Integration and AABB resolution
//! - `collision`: Coin pickup and flag arrival
//! - `animation`: Run cycle phases
//! - `tick`: Authoritative simulation step and replay
//! - `events`: Game events raised by ticks

pub mod level;
pub mod state;
pub mod input;
pub mod physics;
pub mod collision;
pub mod animation;
pub mod tick;
pub mod events;

// Re-export key types
pub use level::{Level, LevelError, Solid, SolidKind, CoinSpot};
pub use state::{WorldState, PlayerState, CoinState, Progress, Facing};
pub use input::{Intent, Controls, Command, InputAdapter, InputRecording, ParseIntentError, ParseCommandError};
pub use tick::{tick, replay, TickResult};
pub use events::{GameEvent, GameEventData};
