//! Runtime
//!
//! Everything that is allowed to be non-deterministic: wall-clock
//! scheduling, channels, rendering and the autopilot. The simulation it
//! drives stays in `game/`.
//!
//! ## Module Structure
//!
//! - `session`: One running game (input, tick, render)
//! - `scheduler`: Fixed-rate and request-driven loops

pub mod session;
pub mod scheduler;

pub use session::{Session, SessionConfig};
pub use scheduler::{
    run_continuous, run_requests, tick_duration, RunOptions, RunSummary, SchedulerError,
    StopReason,
};
