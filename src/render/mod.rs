//! Frame Composition
//!
//! Turns the level and world state into an ordered list of draw commands.
//! Composition is pure; surfaces implementing [`Renderer`] decide how to
//! present a [`Frame`].
//!
//! ## Draw Order
//!
//! ```text
//! background → sky band → solids → flag pole → banner → coins
//!   → legs → torso → head → eyes → airborne shadow → arrival glow
//! ```

pub mod ascii;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{Fixed, from_int};
use crate::core::rect::Rect;
use crate::core::vec2::FixedVec2;
use crate::game::level::{Level, SolidKind};
use crate::game::state::{Facing, WorldState};

pub use ascii::AsciiRenderer;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Output surface failed.
    #[error("render surface I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A presentation surface.
pub trait Renderer: Send {
    /// Present one composed frame.
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError>;
}

// =============================================================================
// DRAW COMMANDS
// =============================================================================

/// What a draw command depicts. Surfaces map this to colors or glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Paint {
    Background,
    Sky,
    Ground,
    Platform,
    FlagPole,
    Banner,
    Coin,
    Body,
    Leg,
    Face,
    Eye,
    /// Translucent strip under an airborne player
    Shadow,
    /// Translucent halo around the flag on arrival
    Glow,
}

impl Paint {
    /// Opacity in percent.
    pub fn opacity(self) -> u8 {
        match self {
            Paint::Shadow => 25,
            Paint::Glow => 15,
            _ => 100,
        }
    }

    /// Translucent paints only show over empty background.
    pub fn is_overlay(self) -> bool {
        self.opacity() < 100
    }
}

/// Geometry of a draw command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rect),
    Circle { center: FixedVec2, radius: Fixed },
}

impl Shape {
    /// True if the point lies inside the shape.
    pub fn covers(&self, p: FixedVec2) -> bool {
        match *self {
            Shape::Rect(r) => r.contains_point(p),
            Shape::Circle { center, radius } => {
                center.distance_squared_wide(p) <= (radius as i64) * (radius as i64)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub paint: Paint,
    pub shape: Shape,
}

impl DrawCommand {
    fn rect(paint: Paint, rect: Rect) -> Self {
        Self { paint, shape: Shape::Rect(rect) }
    }
}

/// Status line values shown next to the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub tick: u32,
    pub coins: u32,
    pub total_coins: u32,
    pub at_flag: bool,
    pub flag_reached: bool,
}

/// One composed frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub width: Fixed,
    pub height: Fixed,
    pub commands: Vec<DrawCommand>,
    pub hud: Hud,
}

// =============================================================================
// COMPOSITION
// =============================================================================

/// Sky band covers the top 65% of the world.
const SKY_PERCENT: i32 = 65;

impl Frame {
    /// Compose the draw list for `world` in `level`.
    pub fn compose(level: &Level, world: &WorldState) -> Self {
        let w = level.width();
        let h = level.height();
        let mut commands = Vec::with_capacity(16 + level.solids().len() + world.coins.len());

        commands.push(DrawCommand::rect(Paint::Background, Rect::new(0, 0, w, h)));
        commands.push(DrawCommand::rect(Paint::Sky, Rect::new(0, 0, w, h / 100 * SKY_PERCENT)));

        for solid in level.solids() {
            let paint = match solid.kind {
                SolidKind::Ground => Paint::Ground,
                SolidKind::Platform | SolidKind::Boundary => Paint::Platform,
            };
            commands.push(DrawCommand::rect(paint, solid.rect));
        }

        let flag = level.flag();
        commands.push(DrawCommand::rect(Paint::FlagPole, flag));
        commands.push(DrawCommand::rect(
            Paint::Banner,
            Rect::new(flag.right(), flag.y, from_int(24), from_int(14)),
        ));

        for coin in world.remaining_coins() {
            commands.push(DrawCommand {
                paint: Paint::Coin,
                shape: Shape::Circle { center: coin.center, radius: coin.radius },
            });
        }

        push_player(&mut commands, world);

        if world.progress.at_flag {
            commands.push(DrawCommand::rect(
                Paint::Glow,
                Rect::new(
                    flag.x - from_int(20),
                    flag.y - from_int(20),
                    from_int(80),
                    flag.h + from_int(40),
                ),
            ));
        }

        Self {
            width: w,
            height: h,
            commands,
            hud: Hud {
                tick: world.tick,
                coins: world.progress.coins,
                total_coins: world.coins.len() as u32,
                at_flag: world.progress.at_flag,
                flag_reached: world.progress.flag_reached,
            },
        }
    }

    /// Commands with the given paint, in draw order.
    pub fn with_paint(&self, paint: Paint) -> impl Iterator<Item = &DrawCommand> + '_ {
        self.commands.iter().filter(move |c| c.paint == paint)
    }
}

/// Player sprite: legs, torso, head, eyes, and a shadow while airborne.
fn push_player(commands: &mut Vec<DrawCommand>, world: &WorldState) {
    let player = &world.player;
    let body = player.bounds();
    let (x, y, w, h) = (body.x, body.y, body.w, body.h);
    let px = from_int;

    let feet_y = y + h - px(14);
    commands.push(DrawCommand::rect(Paint::Body, Rect::new(x, feet_y, w, px(14))));
    if player.on_ground {
        // Alternate the stepping leg with the run phase
        let leg_x = if player.anim_phase % 2 == 0 { x } else { x + w - px(10) };
        commands.push(DrawCommand::rect(Paint::Leg, Rect::new(leg_x, feet_y, px(10), px(14))));
    }

    commands.push(DrawCommand::rect(Paint::Body, Rect::new(x, y + px(12), w, h - px(26))));
    commands.push(DrawCommand::rect(Paint::Face, Rect::new(x + px(6), y, px(22), px(18))));

    let eye_dx = match player.facing {
        Facing::Right => px(3),
        Facing::Left => px(-3),
    };
    for eye_x in [px(12), px(18)] {
        commands.push(DrawCommand::rect(
            Paint::Eye,
            Rect::new(x + eye_x + eye_dx, y + px(6), px(3), px(3)),
        ));
    }

    if !player.on_ground {
        commands.push(DrawCommand::rect(Paint::Shadow, Rect::new(x, y + h, w, px(6))));
    }
}

// =============================================================================
// SURFACES
// =============================================================================

/// Discards every frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn present(&mut self, _frame: &Frame) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Keeps presented frames in memory.
#[derive(Clone, Debug, Default)]
pub struct FrameRecorder {
    pub frames: Vec<Frame>,
}

impl Renderer for FrameRecorder {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn present(&mut self, frame: &Frame) -> Result<(), RenderError> {
        (**self).present(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::WorldState;

    #[test]
    fn test_compose_order() {
        let level = Level::standard();
        let world = WorldState::from_level(&level);
        let frame = Frame::compose(&level, &world);

        let paints: Vec<Paint> = frame.commands.iter().map(|c| c.paint).collect();
        assert_eq!(paints[0], Paint::Background);
        assert_eq!(paints[1], Paint::Sky);
        assert_eq!(&paints[2..5], &[Paint::Ground, Paint::Platform, Paint::Platform]);
        assert_eq!(&paints[5..7], &[Paint::FlagPole, Paint::Banner]);
        assert_eq!(&paints[7..9], &[Paint::Coin, Paint::Coin]);
        assert_eq!(paints.last(), Some(&Paint::Eye));
        assert_eq!(frame.hud.total_coins, 2);
    }

    #[test]
    fn test_collected_coins_not_drawn() {
        let level = Level::standard();
        let mut world = WorldState::from_level(&level);
        world.coins[1].collected = true;

        let frame = Frame::compose(&level, &world);
        let coins: Vec<_> = frame.with_paint(Paint::Coin).collect();
        assert_eq!(coins.len(), 1);
        assert_eq!(
            coins[0].shape,
            Shape::Circle { center: level.coins()[0].center, radius: level.coins()[0].radius }
        );
    }

    #[test]
    fn test_airborne_player_has_shadow_and_no_leg() {
        let level = Level::standard();
        let mut world = WorldState::from_level(&level);
        assert_eq!(Frame::compose(&level, &world).with_paint(Paint::Shadow).count(), 0);
        assert_eq!(Frame::compose(&level, &world).with_paint(Paint::Leg).count(), 1);

        world.player.on_ground = false;
        let frame = Frame::compose(&level, &world);
        assert_eq!(frame.with_paint(Paint::Shadow).count(), 1);
        assert_eq!(frame.with_paint(Paint::Leg).count(), 0);
    }

    #[test]
    fn test_leg_follows_phase_and_eyes_follow_facing() {
        let level = Level::standard();
        let mut world = WorldState::from_level(&level);
        let x = world.player.position.x;

        let leg = |world: &WorldState| {
            match Frame::compose(&level, world).with_paint(Paint::Leg).next().map(|c| c.shape) {
                Some(Shape::Rect(r)) => r.x,
                other => panic!("unexpected leg shape {other:?}"),
            }
        };
        assert_eq!(leg(&world), x);
        world.player.anim_phase = 1;
        assert_eq!(leg(&world), x + from_int(24));

        let first_eye = |world: &WorldState| {
            match Frame::compose(&level, world).with_paint(Paint::Eye).next().map(|c| c.shape) {
                Some(Shape::Rect(r)) => r.x - world.player.position.x,
                other => panic!("unexpected eye shape {other:?}"),
            }
        };
        assert_eq!(first_eye(&world), from_int(15));
        world.player.facing = Facing::Left;
        assert_eq!(first_eye(&world), from_int(9));
    }

    #[test]
    fn test_glow_only_at_flag() {
        let level = Level::standard();
        let mut world = WorldState::from_level(&level);
        assert_eq!(Frame::compose(&level, &world).with_paint(Paint::Glow).count(), 0);

        world.progress.at_flag = true;
        let frame = Frame::compose(&level, &world);
        assert_eq!(frame.commands.last().map(|c| c.paint), Some(Paint::Glow));
        assert!(frame.hud.at_flag);
    }

    #[test]
    fn test_frame_recorder_keeps_frames() {
        let level = Level::standard();
        let world = WorldState::from_level(&level);
        let mut recorder = FrameRecorder::default();
        recorder.present(&Frame::compose(&level, &world)).unwrap();
        assert_eq!(recorder.frames.len(), 1);
        assert!(NullRenderer.present(&recorder.frames[0]).is_ok());
    }
}
