//! Game State Definitions
//!
//! The mutable world: player entity, coin states and progress. Rebuilt
//! wholesale from a [`Level`] on reset so nothing survives a restart.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{Fixed, from_int};
use crate::core::rect::Rect;
use crate::core::vec2::FixedVec2;
use crate::core::hash::{StateHash, StateHasher, compute_state_hash};
use crate::game::level::{CoinSpot, Level};

// =============================================================================
// FACING
// =============================================================================

/// Horizontal direction the player looks in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Facing {
    Left = 0,
    #[default]
    Right = 1,
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// The single controllable entity.
///
/// Mutated only by physics and animation, once per tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Top-left corner in world space
    pub position: FixedVec2,

    /// Pixels per tick
    pub velocity: FixedVec2,

    pub facing: Facing,

    /// Resting on a solid as of the latest collision resolution
    pub on_ground: bool,

    /// Run cycle phase (0..=3)
    pub anim_phase: u8,

    /// Grounded running ticks since the last phase reset
    pub anim_timer: u32,
}

impl PlayerState {
    /// Player box width: 34 px
    pub const WIDTH: Fixed = from_int(34);

    /// Player box height: 48 px
    pub const HEIGHT: Fixed = from_int(48);

    /// Player standing at `spawn`, at rest and facing right.
    pub fn spawn(spawn: FixedVec2) -> Self {
        Self {
            position: spawn,
            velocity: FixedVec2::ZERO,
            facing: Facing::Right,
            on_ground: true,
            anim_phase: 0,
            anim_timer: 0,
        }
    }

    /// Collision box at the current position.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, Self::WIDTH, Self::HEIGHT)
    }

    #[inline]
    pub fn center(&self) -> FixedVec2 {
        self.bounds().center()
    }

    /// Hash this player's state for verification.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_vec2(self.position);
        hasher.update_vec2(self.velocity);
        hasher.update_u8(self.facing as u8);
        hasher.update_bool(self.on_ground);
        hasher.update_u8(self.anim_phase);
        hasher.update_u32(self.anim_timer);
    }
}

// =============================================================================
// COIN STATE
// =============================================================================

/// A coin placed in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinState {
    pub id: u32,
    pub center: FixedVec2,
    pub radius: Fixed,
    /// Set by the pickup check; cleared only by a level reset
    pub collected: bool,
}

impl From<&CoinSpot> for CoinState {
    fn from(spot: &CoinSpot) -> Self {
        Self {
            id: spot.id,
            center: spot.center,
            radius: spot.radius,
            collected: false,
        }
    }
}

// =============================================================================
// PROGRESS
// =============================================================================

/// Score and goal status derived during play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Coins collected since the last reset
    pub coins: u32,

    /// Latched once the flag has been reached
    pub flag_reached: bool,

    /// Player is at the flag this tick
    pub at_flag: bool,
}

// =============================================================================
// WORLD STATE
// =============================================================================

/// Complete mutable state of a run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    /// Ticks simulated since the world was built
    pub tick: u32,

    pub player: PlayerState,

    /// Coins in level order
    pub coins: Vec<CoinState>,

    pub progress: Progress,
}

impl WorldState {
    /// Fresh world for `level`: player at spawn, every coin uncollected.
    pub fn from_level(level: &Level) -> Self {
        Self {
            tick: 0,
            player: PlayerState::spawn(level.spawn()),
            coins: level.coins().iter().map(CoinState::from).collect(),
            progress: Progress::default(),
        }
    }

    /// Coins still waiting to be picked up.
    pub fn remaining_coins(&self) -> impl Iterator<Item = &CoinState> + '_ {
        self.coins.iter().filter(|c| !c.collected)
    }

    /// Compute hash of current state for verification.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(|hasher| {
            hasher.update_u32(self.tick);
            self.player.hash_into(hasher);

            hasher.update_u32(self.coins.len() as u32);
            for coin in &self.coins {
                hasher.update_u32(coin.id);
                hasher.update_vec2(coin.center);
                hasher.update_fixed(coin.radius);
                hasher.update_bool(coin.collected);
            }

            hasher.update_u32(self.progress.coins);
            hasher.update_bool(self.progress.flag_reached);
            hasher.update_bool(self.progress.at_flag);
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_from_level() {
        let level = Level::standard();
        let world = WorldState::from_level(&level);

        assert_eq!(world.tick, 0);
        assert_eq!(world.player.position, level.spawn());
        assert_eq!(world.player.velocity, FixedVec2::ZERO);
        assert_eq!(world.player.facing, Facing::Right);
        assert!(world.player.on_ground);
        assert_eq!(world.coins.len(), 2);
        assert_eq!(world.remaining_coins().count(), 2);
        assert_eq!(world.progress, Progress::default());
    }

    #[test]
    fn test_world_state_determinism() {
        let level = Level::standard();
        let a = WorldState::from_level(&level);
        let b = WorldState::from_level(&level);
        assert_eq!(a, b);
        assert_eq!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn test_hash_tracks_coin_state() {
        let level = Level::standard();
        let fresh = WorldState::from_level(&level);
        let mut taken = fresh.clone();
        taken.coins[0].collected = true;
        assert_ne!(fresh.compute_hash(), taken.compute_hash());
    }

    #[test]
    fn test_player_box() {
        let player = PlayerState::spawn(FixedVec2::from_ints(120, 368));
        assert_eq!(player.bounds(), Rect::from_ints(120, 368, 34, 48));
        assert_eq!(player.center(), FixedVec2::from_ints(137, 392));
    }
}
