//! # Flagrun
//!
//! Deterministic side-scrolling platformer: run, jump, pick up coins and
//! reach the flag. Idle ticks can be driven by an external move-suggestion
//! service, with a seeded local policy standing in whenever it is slow,
//! failing or rate-limited.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         FLAGRUN                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── fixed.rs    - Q16.16 fixed-point arithmetic             │
//! │  ├── vec2.rs     - 2D vector with fixed-point                │
//! │  ├── rect.rs     - Axis-aligned rectangles                   │
//! │  ├── rng.rs      - Deterministic Xorshift128+ PRNG           │
//! │  └── hash.rs     - State hashing for verification            │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── level.rs    - Level geometry and validation             │
//! │  ├── state.rs    - World, player and coin state              │
//! │  ├── input.rs    - Intents, controls, input arbitration      │
//! │  ├── physics.rs  - Integration and AABB resolution           │
//! │  ├── collision.rs- Coin pickup and flag arrival              │
//! │  ├── animation.rs- Run cycle                                 │
//! │  └── tick.rs     - Authoritative simulation step             │
//! │                                                              │
//! │  render/         - Frame composition and surfaces            │
//! │  agent/          - Suggestion providers and fallback         │
//! │  runtime/        - Session and schedulers (non-deterministic)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+
//!
//! Given the same level and the same per-tick controls, the simulation
//! produces identical worlds and identical state hashes.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod render;
pub mod agent;
pub mod runtime;
pub mod config;

// Re-export commonly used types
pub use core::fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use core::vec2::FixedVec2;
pub use core::rng::DeterministicRng;
pub use game::input::{Command, Controls, Intent, InputRecording};
pub use game::level::Level;
pub use game::state::{PlayerState, WorldState};
pub use runtime::{Session, SessionConfig};
pub use config::GameConfig;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
