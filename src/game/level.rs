//! Level Geometry
//!
//! Immutable description of a level: solid rectangles, coin spots, the goal
//! flag, the player spawn and world bounds. A level is validated once at
//! construction and never mutated afterwards; resetting a run rebuilds the
//! mutable world from it.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{Fixed, from_int};
use crate::core::rect::Rect;
use crate::core::vec2::FixedVec2;
use crate::game::state::PlayerState;

/// Thickness of the solid slabs placed just outside the world edges.
const BOUNDARY_THICKNESS: i32 = 64;

/// Largest accepted world width or height (16384 px). Keeps every edge,
/// boundary slab and in-world sum inside `Fixed` range.
pub const MAX_WORLD_SIZE: Fixed = from_int(16_384);

/// What a solid rectangle represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SolidKind {
    /// Floor segment along the bottom of the world
    Ground = 0,
    /// Floating platform
    Platform = 1,
    /// Out-of-bounds slab surrounding the world
    Boundary = 2,
}

/// A solid rectangle the player collides with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solid {
    pub rect: Rect,
    pub kind: SolidKind,
}

impl Solid {
    pub const fn ground(rect: Rect) -> Self {
        Self { rect, kind: SolidKind::Ground }
    }

    pub const fn platform(rect: Rect) -> Self {
        Self { rect, kind: SolidKind::Platform }
    }
}

/// Where a coin sits in the level blueprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSpot {
    /// Stable coin identifier (index in the blueprint)
    pub id: u32,
    /// Coin center
    pub center: FixedVec2,
    /// Drawn radius; pickup reach adds `PICKUP_MARGIN`
    pub radius: Fixed,
}

/// Level construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LevelError {
    /// Width or height is not positive or exceeds [`MAX_WORLD_SIZE`].
    #[error("world bounds must be positive and at most 16384 px")]
    InvalidBounds,

    /// No ground segment at all.
    #[error("level has no ground")]
    MissingGround,

    /// Ground segments leave a gap or do not sit on the bottom edge.
    #[error("ground must span the full width at the bottom of the world")]
    GroundIncomplete,

    /// Platform outside the world.
    #[error("platform {0} lies outside the world bounds")]
    PlatformOutOfBounds(usize),

    /// Platform reaching down into the ground.
    #[error("platform {0} is not strictly above the ground")]
    PlatformBelowGround(usize),

    /// Coin outside the world.
    #[error("coin {0} lies outside the world bounds")]
    CoinOutOfBounds(u32),

    /// Coin touching or below the ground.
    #[error("coin {0} is not strictly above the ground")]
    CoinBelowGround(u32),

    /// Flag outside the world.
    #[error("flag lies outside the world bounds")]
    FlagOutOfBounds,

    /// Player would spawn partly outside the world.
    #[error("spawn point puts the player outside the world bounds")]
    SpawnOutOfBounds,
}

/// Immutable level description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    width: Fixed,
    height: Fixed,
    solids: Vec<Solid>,
    coins: Vec<CoinSpot>,
    flag: Rect,
    spawn: FixedVec2,
    boundary: [Solid; 4],
}

impl Level {
    /// Build and validate a level.
    ///
    /// Coin ids are assigned from their order in `coins`.
    pub fn new(
        width: Fixed,
        height: Fixed,
        solids: Vec<Solid>,
        coins: Vec<(FixedVec2, Fixed)>,
        flag: Rect,
        spawn: FixedVec2,
    ) -> Result<Self, LevelError> {
        if width <= 0 || height <= 0 || width > MAX_WORLD_SIZE || height > MAX_WORLD_SIZE {
            return Err(LevelError::InvalidBounds);
        }
        let world = Rect::new(0, 0, width, height);

        for (index, solid) in solids.iter().enumerate() {
            if solid.rect.is_well_formed() {
                continue;
            }
            return Err(match solid.kind {
                SolidKind::Platform => LevelError::PlatformOutOfBounds(index),
                _ => LevelError::GroundIncomplete,
            });
        }

        let ground_top = check_ground(&solids, width, height)?;

        for (index, solid) in solids.iter().enumerate() {
            if solid.kind != SolidKind::Platform {
                continue;
            }
            if !world.contains_rect(&solid.rect) {
                return Err(LevelError::PlatformOutOfBounds(index));
            }
            if solid.rect.bottom() >= ground_top {
                return Err(LevelError::PlatformBelowGround(index));
            }
        }

        let coins: Vec<CoinSpot> = coins
            .into_iter()
            .enumerate()
            .map(|(id, (center, radius))| CoinSpot { id: id as u32, center, radius })
            .collect();

        for coin in &coins {
            let bbox = coin_box(coin).ok_or(LevelError::CoinOutOfBounds(coin.id))?;
            if !world.contains_rect(&bbox) {
                return Err(LevelError::CoinOutOfBounds(coin.id));
            }
            if bbox.bottom() >= ground_top {
                return Err(LevelError::CoinBelowGround(coin.id));
            }
        }

        if !flag.is_well_formed() || !world.contains_rect(&flag) {
            return Err(LevelError::FlagOutOfBounds);
        }

        let spawn_box = Rect::new(spawn.x, spawn.y, PlayerState::WIDTH, PlayerState::HEIGHT);
        if !spawn_box.is_well_formed() || !world.contains_rect(&spawn_box) {
            return Err(LevelError::SpawnOutOfBounds);
        }

        Ok(Self {
            width,
            height,
            solids,
            coins,
            flag,
            spawn,
            boundary: boundary_walls(width, height),
        })
    }

    /// The reference level: one full-width ground strip, two floating
    /// platforms each carrying a coin, and the flag near the right edge.
    pub fn standard() -> Self {
        let (width, height, solids, coins, flag, spawn) = standard_blueprint();
        let coins = coins
            .into_iter()
            .enumerate()
            .map(|(id, (center, radius))| CoinSpot { id: id as u32, center, radius })
            .collect();
        Self {
            width,
            height,
            solids,
            coins,
            flag,
            spawn,
            boundary: boundary_walls(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> Fixed {
        self.width
    }

    #[inline]
    pub fn height(&self) -> Fixed {
        self.height
    }

    /// World rectangle (0, 0, width, height).
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// Ground and platform rectangles in blueprint order.
    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    /// Out-of-bounds slabs (left, right, ceiling, floor).
    pub fn boundary_walls(&self) -> &[Solid] {
        &self.boundary
    }

    /// Every rectangle physics resolves against: blueprint solids first,
    /// then the boundary slabs.
    pub fn colliders(&self) -> impl Iterator<Item = &Solid> + '_ {
        self.solids.iter().chain(self.boundary.iter())
    }

    pub fn coins(&self) -> &[CoinSpot] {
        &self.coins
    }

    pub fn flag(&self) -> Rect {
        self.flag
    }

    pub fn spawn(&self) -> FixedVec2 {
        self.spawn
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::standard()
    }
}

type Blueprint = (Fixed, Fixed, Vec<Solid>, Vec<(FixedVec2, Fixed)>, Rect, FixedVec2);

/// Raw parts of the reference level.
fn standard_blueprint() -> Blueprint {
    const W: i32 = 960;
    const H: i32 = 480;
    const GROUND_Y: i32 = H - 64;

    let solids = vec![
        Solid::ground(Rect::from_ints(0, GROUND_Y, W, 64)),
        Solid::platform(Rect::from_ints(280, GROUND_Y - 120, 120, 18)),
        Solid::platform(Rect::from_ints(540, GROUND_Y - 120, 120, 18)),
    ];
    let coins = vec![
        (FixedVec2::from_ints(320, GROUND_Y - 150), from_int(10)),
        (FixedVec2::from_ints(580, GROUND_Y - 150), from_int(10)),
    ];
    let flag = Rect::from_ints(W - 120, GROUND_Y - 160, 12, 160);
    let spawn = FixedVec2::from_ints(120, GROUND_Y - 48);

    (from_int(W), from_int(H), solids, coins, flag, spawn)
}

/// Check the ground covers [0, width] and rests on the bottom edge.
///
/// Returns the highest ground top, which platforms and coins must clear.
fn check_ground(solids: &[Solid], width: Fixed, height: Fixed) -> Result<Fixed, LevelError> {
    let mut segments: Vec<Rect> = solids
        .iter()
        .filter(|s| s.kind == SolidKind::Ground)
        .map(|s| s.rect)
        .collect();

    if segments.is_empty() {
        return Err(LevelError::MissingGround);
    }
    if segments.iter().any(|r| r.bottom() != height) {
        return Err(LevelError::GroundIncomplete);
    }

    segments.sort_by_key(|r| r.x);
    let mut covered = 0;
    for r in &segments {
        if r.x > covered {
            return Err(LevelError::GroundIncomplete);
        }
        covered = covered.max(r.right());
    }
    if segments[0].x > 0 || covered < width {
        return Err(LevelError::GroundIncomplete);
    }

    Ok(segments.iter().map(|r| r.y).min().unwrap_or(height))
}

/// Bounding box of a coin, or `None` if its edges do not fit in `Fixed`.
fn coin_box(coin: &CoinSpot) -> Option<Rect> {
    if coin.radius < 0 {
        return None;
    }
    let size = coin.radius.checked_mul(2)?;
    let bbox = Rect::new(
        coin.center.x.checked_sub(coin.radius)?,
        coin.center.y.checked_sub(coin.radius)?,
        size,
        size,
    );
    bbox.is_well_formed().then_some(bbox)
}

fn boundary_walls(width: Fixed, height: Fixed) -> [Solid; 4] {
    let t = from_int(BOUNDARY_THICKNESS);
    let slab = |rect| Solid { rect, kind: SolidKind::Boundary };
    [
        slab(Rect::new(-t, -t, t, height + 2 * t)),
        slab(Rect::new(width, -t, t, height + 2 * t)),
        slab(Rect::new(0, -t, width, t)),
        slab(Rect::new(0, height, width, t)),
    ]
}
