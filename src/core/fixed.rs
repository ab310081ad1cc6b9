//! Q16.16 Fixed-Point Arithmetic
//!
//! Deterministic fixed-point math for the platformer simulation.
//! All gameplay arithmetic is integer-only; floats appear only when a value
//! leaves the simulation (rendering, logging).
//!
//! ## Format: Q16.16
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Bit Layout: Q16.16 (32-bit signed integer)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  [S][IIIIIIIIIIIIIIII][FFFFFFFFFFFFFFFF]                    │
//! │   │  └──── 16 bits ────┘└──── 16 bits ────┘                 │
//! │   └─ Sign bit                                               │
//! │                                                             │
//! │  Range: -32768.0 to +32767.99998 pixels                     │
//! │  Precision: 1/65536 pixel                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A 960×480 world uses less than 3% of the integer range, so positions,
//! velocities and rectangle edges never come close to overflowing.

/// Q16.16 fixed-point number stored as i32.
pub type Fixed = i32;

/// Number of fractional bits (16)
pub const FIXED_SCALE: i32 = 16;

/// 1.0 in fixed-point (65536)
pub const FIXED_ONE: Fixed = 1 << FIXED_SCALE;

/// 0.5 in fixed-point (32768)
pub const FIXED_HALF: Fixed = FIXED_ONE >> 1;

// =============================================================================
// PHYSICS CONSTANTS (integer literals, units are pixels and ticks)
// =============================================================================

/// Gravity added to vy every tick: 0.9 * 65536 = 58982
pub const GRAVITY: Fixed = 58982;

/// Horizontal acceleration per tick of held direction: 0.6 * 65536 = 39321
pub const RUN_ACCEL: Fixed = 39321;

/// Horizontal friction factor applied after integration: 0.8 * 65536 = 52428
pub const FRICTION: Fixed = 52428;

/// Launch velocity of a jump (upward is negative y): -16 * 65536
pub const JUMP_VELOCITY: Fixed = -1048576;

/// Maximum overlap depth that still counts as a top/bottom contact: 24 px
pub const SNAP_DEPTH: Fixed = 1572864;

/// Downward velocity given after bumping a ceiling: 0.5 px/tick
pub const CEILING_BOUNCE: Fixed = FIXED_HALF;

/// Gap left between the player and a wall after a side push: 0.01 * 65536
pub const WALL_EPSILON: Fixed = 655;

/// Upper bound of stored |vx| under sustained input: 2.4 * 65536 (rounded up).
///
/// Steady state of `v = (v + RUN_ACCEL) * FRICTION` is `RUN_ACCEL * F / (1 - F)`.
pub const TERMINAL_RUN_SPEED: Fixed = 157287;

/// |vx| above which the run cycle animates: 0.5 px/tick
pub const RUN_ANIM_THRESHOLD: Fixed = FIXED_HALF;

/// Extra reach added to a coin's radius for pickup: 16 px
pub const PICKUP_MARGIN: Fixed = 1048576;

/// How far before the flag pole the player counts as arrived: 4 px
pub const FLAG_MARGIN: Fixed = 262144;

// =============================================================================
// CORE OPERATIONS
// =============================================================================

/// Convert a compile-time float to fixed-point.
///
/// Only use at compile-time or level construction. Never in the tick loop.
///
/// # Example
/// ```
/// use flagrun::core::fixed::{to_fixed, FIXED_ONE};
/// const MY_VALUE: i32 = to_fixed(2.5);
/// assert_eq!(MY_VALUE, FIXED_ONE * 2 + FIXED_ONE / 2);
/// ```
#[inline]
pub const fn to_fixed(f: f64) -> Fixed {
    (f * (FIXED_ONE as f64)) as Fixed
}

/// Convert whole pixels to fixed-point.
#[inline]
pub const fn from_int(i: i32) -> Fixed {
    i << FIXED_SCALE
}

/// Convert fixed-point to float for display/rendering.
#[inline]
pub fn to_float(f: Fixed) -> f32 {
    f as f32 / FIXED_ONE as f32
}

/// Multiply two fixed-point numbers.
///
/// Uses an i64 intermediate; the shift floors toward negative infinity.
#[inline]
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    let wide = (a as i64) * (b as i64);
    (wide >> FIXED_SCALE) as Fixed
}

/// Multiply, truncating toward zero.
///
/// Decay factors must use this: flooring a small negative product keeps
/// it at -1 forever, so a leftward slide would never come to rest.
#[inline]
pub fn fixed_mul_toward_zero(a: Fixed, b: Fixed) -> Fixed {
    if a < 0 {
        fixed_mul(a.wrapping_neg(), b).wrapping_neg()
    } else {
        fixed_mul(a, b)
    }
}

/// Absolute value of a fixed-point number.
#[inline]
pub fn fixed_abs(x: Fixed) -> Fixed {
    if x < 0 { x.wrapping_neg() } else { x }
}

/// Square of a fixed-point number kept in Q32.32 (i64), safe for world-sized values.
#[inline]
pub fn wide_square(x: Fixed) -> i64 {
    (x as i64) * (x as i64)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(FIXED_ONE, 65536);
        assert_eq!(FIXED_HALF, 32768);
        assert_eq!(GRAVITY, to_fixed(0.9));
        assert_eq!(RUN_ACCEL, to_fixed(0.6));
        assert_eq!(FRICTION, to_fixed(0.8));
        assert_eq!(JUMP_VELOCITY, from_int(-16));
        assert_eq!(SNAP_DEPTH, from_int(24));
        assert_eq!(PICKUP_MARGIN, from_int(16));
        assert_eq!(FLAG_MARGIN, from_int(4));
    }

    #[test]
    fn test_fixed_mul() {
        assert_eq!(fixed_mul(to_fixed(2.0), to_fixed(3.0)), to_fixed(6.0));
        assert_eq!(fixed_mul(FIXED_HALF, FIXED_HALF), to_fixed(0.25));
        assert_eq!(fixed_mul(to_fixed(-2.0), to_fixed(3.0)), to_fixed(-6.0));
    }

    #[test]
    fn test_mul_toward_zero_reaches_rest() {
        // Flooring keeps -1 at -1; truncation lets it decay to zero.
        assert_eq!(fixed_mul(-1, FRICTION), -1);
        assert_eq!(fixed_mul_toward_zero(-1, FRICTION), 0);
        assert_eq!(fixed_mul_toward_zero(1, FRICTION), 0);

        let mut v = from_int(-3);
        for _ in 0..200 {
            v = fixed_mul_toward_zero(v, FRICTION);
        }
        assert_eq!(v, 0);
    }

    #[test]
    fn test_mul_toward_zero_is_symmetric() {
        for raw in [1, 7, 655, 39321, 157287, 1048576] {
            assert_eq!(
                fixed_mul_toward_zero(-raw, FRICTION),
                -fixed_mul_toward_zero(raw, FRICTION)
            );
        }
    }

    #[test]
    fn test_terminal_speed_bound() {
        // The recurrence the physics uses must settle under the published bound.
        let mut v = 0;
        for _ in 0..200 {
            v = fixed_mul_toward_zero(v + RUN_ACCEL, FRICTION);
        }
        assert!(v <= TERMINAL_RUN_SPEED);
        assert!(TERMINAL_RUN_SPEED - v < 100);
    }

    #[test]
    fn test_wide_square_does_not_overflow() {
        let edge = from_int(960);
        assert_eq!(wide_square(edge), (960i64 * 960) << 32);
    }
}
