//! Core deterministic primitives.
//!
//! Everything the simulation computes with lives here: fixed-point scalars,
//! vectors, rectangles, the seeded RNG and state hashing.

pub mod fixed;
pub mod vec2;
pub mod rect;
pub mod rng;
pub mod hash;

// Re-export core types
pub use fixed::{Fixed, FIXED_ONE, FIXED_HALF, FIXED_SCALE};
pub use vec2::FixedVec2;
pub use rect::Rect;
pub use rng::DeterministicRng;
pub use hash::{StateHash, StateHasher, compute_state_hash};
