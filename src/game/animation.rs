//! Run Cycle Animation
//!
//! Cosmetic only. Nothing here feeds back into physics.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, fixed_abs, RUN_ANIM_THRESHOLD};

/// Number of run cycle phases.
pub const RUN_PHASES: u8 = 4;

/// Ticks spent in each phase.
pub const TICKS_PER_PHASE: u32 = 6;

/// Animation phase and timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub phase: u8,
    pub timer: u32,
}

/// Next animation state.
///
/// While grounded and moving faster than the threshold the timer counts up
/// and the phase steps every `TICKS_PER_PHASE` ticks. Anything else snaps
/// back to the idle pose.
pub fn animate(vx: Fixed, on_ground: bool, previous: Animation) -> Animation {
    if !on_ground || fixed_abs(vx) <= RUN_ANIM_THRESHOLD {
        return Animation::default();
    }

    let timer = previous.timer.wrapping_add(1);
    let phase = if timer % TICKS_PER_PHASE == 0 {
        (previous.phase + 1) % RUN_PHASES
    } else {
        previous.phase
    };
    Animation { phase, timer }
}
