//! Player Physics
//!
//! Fixed-timestep Euler integration followed by discrete AABB resolution
//! against every solid of the level.
//!
//! ## Order within a tick
//!
//! ```text
//! 1. horizontal acceleration + facing   (LEFT / RIGHT)
//! 2. jump impulse                        (JUMP, only if on_ground)
//! 3. gravity
//! 4. integrate position
//! 5. friction on vx
//! 6. clear on_ground
//! 7. resolve against solids, then boundary slabs
//! ```
//!
//! Fast motion can tunnel through thin solids; resolution is not swept.

use crate::core::fixed::{
    Fixed,
    fixed_mul_toward_zero,
    GRAVITY, RUN_ACCEL, FRICTION, JUMP_VELOCITY,
    SNAP_DEPTH, CEILING_BOUNCE, WALL_EPSILON,
};
use crate::core::rect::Rect;
use crate::game::input::Controls;
use crate::game::level::Level;
use crate::game::state::{Facing, PlayerState};

/// Movement transitions observed during one `advance`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Motion {
    /// A jump impulse was applied this tick
    pub jumped: bool,
    /// Player was airborne before and rests on a solid now
    pub landed: bool,
}

/// How a single overlap was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    /// Snapped onto the solid's top
    Floor,
    /// Snapped under the solid's bottom
    Ceiling,
    /// Pushed out of the solid's left side
    WallLeft,
    /// Pushed out of the solid's right side
    WallRight,
}

/// Advance the player by one fixed tick.
pub fn advance(player: &mut PlayerState, level: &Level, controls: Controls) -> Motion {
    let was_on_ground = player.on_ground;
    let mut motion = Motion::default();

    // 1. Horizontal acceleration
    if controls.left() {
        player.velocity.x -= RUN_ACCEL;
        player.facing = Facing::Left;
    }
    if controls.right() {
        player.velocity.x += RUN_ACCEL;
        player.facing = Facing::Right;
    }

    // 2. Jump (airborne requests are ignored)
    if controls.jump() && player.on_ground {
        player.velocity.y = JUMP_VELOCITY;
        motion.jumped = true;
    }

    // 3. Gravity
    player.velocity.y += GRAVITY;

    // 4. Integrate
    player.position = player.position + player.velocity;

    // 5. Friction
    player.velocity.x = fixed_mul_toward_zero(player.velocity.x, FRICTION);

    // 6-7. Resolve
    player.on_ground = false;
    for solid in level.colliders() {
        resolve_overlap(player, &solid.rect);
    }

    motion.landed = player.on_ground && !was_on_ground;
    motion
}

/// Push the player out of `solid` if they overlap.
pub fn resolve_overlap(player: &mut PlayerState, solid: &Rect) -> Option<Contact> {
    let body = player.bounds();
    if !body.overlaps(solid) {
        return None;
    }

    let vy = player.velocity.y;
    let contact = if vy > 0 && body.bottom() - solid.y < SNAP_DEPTH {
        player.position.y = solid.y - PlayerState::HEIGHT;
        player.velocity.y = 0;
        player.on_ground = true;
        Contact::Floor
    } else if vy < 0 && solid.bottom() - body.y < SNAP_DEPTH {
        player.position.y = solid.bottom();
        player.velocity.y = CEILING_BOUNCE;
        Contact::Ceiling
    } else {
        let side = push_side(player.velocity.x, &body, solid);
        match side {
            Contact::WallLeft => {
                player.position.x = solid.x - PlayerState::WIDTH - WALL_EPSILON;
            }
            _ => {
                player.position.x = solid.right() + WALL_EPSILON;
            }
        }
        player.velocity.x = 0;
        side
    };

    Some(contact)
}

/// Which side of `solid` a horizontal push goes to.
///
/// Moving bodies are pushed back against their motion. A body with no
/// horizontal velocity is pushed away from the solid's center.
fn push_side(vx: Fixed, body: &Rect, solid: &Rect) -> Contact {
    let toward_left = match vx {
        v if v > 0 => true,
        v if v < 0 => false,
        _ => body.center().x < solid.center().x,
    };
    if toward_left {
        Contact::WallLeft
    } else {
        Contact::WallRight
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, TERMINAL_RUN_SPEED};
    use crate::core::vec2::FixedVec2;
    use crate::game::state::WorldState;

    fn spawned(level: &Level) -> PlayerState {
        WorldState::from_level(level).player
    }

    #[test]
    fn test_rest_is_idempotent() {
        let level = Level::standard();
        let mut player = spawned(&level);
        let before = player.clone();

        for _ in 0..50 {
            let motion = advance(&mut player, &level, Controls::NONE);
            assert_eq!(motion, Motion::default());
            assert_eq!(player, before);
        }
    }

    #[test]
    fn test_friction_brings_player_to_rest() {
        let level = Level::standard();
        let mut player = spawned(&level);
        player.velocity.x = from_int(-3);

        for _ in 0..200 {
            advance(&mut player, &level, Controls::NONE);
        }
        assert_eq!(player.velocity.x, 0);
        assert!(player.on_ground);
    }

    #[test]
    fn test_terminal_speed_bound() {
        let level = Level::standard();
        let mut player = spawned(&level);
        player.position.x = from_int(500);

        let mut last: Fixed = 0;
        for _ in 0..25 {
            advance(&mut player, &level, Controls::LEFT);
            let speed = player.velocity.x.abs();
            assert!(speed <= TERMINAL_RUN_SPEED);
            assert!(speed >= last.abs(), "speed only grows toward the bound");
            last = player.velocity.x;
        }
        assert!(last < -from_int(2), "should be close to terminal speed");
        assert_eq!(player.facing, Facing::Left);
    }

    #[test]
    fn test_jump_then_land() {
        let level = Level::standard();
        let mut player = spawned(&level);
        let ground_y = player.position.y;

        let first = advance(&mut player, &level, Controls::JUMP);
        assert!(first.jumped);
        assert!(!player.on_ground);
        assert!(player.velocity.y < 0);

        let mut landed_at = None;
        for t in 1..120 {
            let motion = advance(&mut player, &level, Controls::NONE);
            if motion.landed {
                landed_at = Some(t);
                break;
            }
        }

        assert!(landed_at.is_some(), "player must come back down");
        assert_eq!(player.position.y, ground_y);
        assert_eq!(player.velocity.y, 0);
        assert!(player.on_ground);
    }

    #[test]
    fn test_no_double_jump() {
        let level = Level::standard();
        let mut player = spawned(&level);

        advance(&mut player, &level, Controls::JUMP);
        let vy_after_first = player.velocity.y;

        let second = advance(&mut player, &level, Controls::JUMP);
        assert!(!second.jumped);
        assert_eq!(player.velocity.y, vy_after_first + GRAVITY);
    }

    #[test]
    fn test_run_right_stays_on_ground() {
        let level = Level::standard();
        let mut player = spawned(&level);
        let start = player.position;

        for _ in 0..20 {
            advance(&mut player, &level, Controls::RIGHT);
            assert!(player.on_ground);
            assert_eq!(player.position.y, start.y);
        }
        assert!(player.position.x > start.x);
        assert!(player.position.x < from_int(280), "stays short of the first platform");
        assert_eq!(player.facing, Facing::Right);
    }

    #[test]
    fn test_head_bump_under_platform() {
        let level = Level::standard();
        let mut player = spawned(&level);
        // Directly below the first platform (x 280..400, bottom at 314)
        player.position.x = from_int(300);

        advance(&mut player, &level, Controls::JUMP);
        let mut bumped = false;
        for _ in 0..10 {
            advance(&mut player, &level, Controls::NONE);
            if player.position.y == from_int(314) {
                bumped = true;
                break;
            }
        }

        assert!(bumped, "jump should hit the platform underside");
        assert_eq!(player.position.y, from_int(314));
        assert_eq!(player.velocity.y, CEILING_BOUNCE);
        assert!(!player.on_ground);
    }

    #[test]
    fn test_walk_off_ledge_goes_airborne() {
        let level = Level::standard();
        // On top of the first platform (x 280..400, top at 296)
        let mut player = PlayerState::spawn(FixedVec2::from_ints(364, 248));
        let ledge = from_int(400);

        let mut left_ledge = false;
        for _ in 0..40 {
            advance(&mut player, &level, Controls::RIGHT);
            if player.position.x < ledge {
                assert!(player.on_ground, "still over the platform at x={}", player.position.x);
                assert_eq!(player.position.y, from_int(248));
            } else {
                // First tick past the edge: no contact, already airborne
                assert!(!player.on_ground);
                assert!(player.velocity.y > 0);
                left_ledge = true;
                break;
            }
        }
        assert!(left_ledge, "player should run past the ledge");
    }

    #[test]
    fn test_boundary_slab_stops_player() {
        let level = Level::standard();
        let mut player = spawned(&level);
        player.position.x = from_int(2);

        for _ in 0..30 {
            advance(&mut player, &level, Controls::LEFT);
            assert!(player.position.x >= 0);
        }
        assert_eq!(player.position.x, WALL_EPSILON);
        assert_eq!(player.velocity.x, 0);
    }

    #[test]
    fn test_resting_push_uses_solid_center() {
        let mut player = PlayerState::spawn(FixedVec2::from_ints(95, 100));
        player.velocity = FixedVec2::ZERO;
        let solid = Rect::from_ints(100, 50, 100, 200);

        let contact = resolve_overlap(&mut player, &solid);
        assert_eq!(contact, Some(Contact::WallLeft));
        assert_eq!(player.position.x, from_int(100) - PlayerState::WIDTH - WALL_EPSILON);

        let mut player = PlayerState::spawn(FixedVec2::from_ints(180, 100));
        player.velocity = FixedVec2::ZERO;
        assert_eq!(resolve_overlap(&mut player, &solid), Some(Contact::WallRight));
        assert_eq!(player.position.x, from_int(200) + WALL_EPSILON);
    }
}
