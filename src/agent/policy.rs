//! Fallback Policy and Call Quota
//!
//! The fallback answers whenever no remote suggestion is usable. It only
//! looks at where the flag is and draws from a seeded RNG, so a run driven
//! by it is reproducible.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::fixed::{Fixed, FLAG_MARGIN};
use crate::core::rng::DeterministicRng;
use crate::game::input::Intent;
use crate::game::state::PlayerState;

/// Dead zone around the player's center inside which the flag counts as
/// "here" rather than left or right.
pub const FLAG_BAND: Fixed = FLAG_MARGIN;

/// Chance of hopping while at the flag, as numerator / denominator.
const HOP_CHANCE: (u32, u32) = (1, 4);

/// Heads for the flag; hops at random once there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackPolicy {
    rng: DeterministicRng,
}

impl FallbackPolicy {
    pub fn new(seed: u64) -> Self {
        Self { rng: DeterministicRng::new(seed) }
    }

    /// Pick a move toward the flag at `flag_x`.
    pub fn decide(&mut self, player: &PlayerState, flag_x: Fixed) -> Intent {
        let center = player.center().x;
        if flag_x > center + FLAG_BAND {
            Intent::Right
        } else if flag_x < center - FLAG_BAND {
            Intent::Left
        } else if self.rng.one_in(HOP_CHANCE.0, HOP_CHANCE.1) {
            Intent::Jump
        } else {
            Intent::Stay
        }
    }
}

// =============================================================================
// QUOTA
// =============================================================================

/// Why a remote call was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuotaDenied {
    /// Too soon after the previous call.
    #[error("cooldown active for {remaining} more ticks")]
    Cooldown { remaining: u64 },

    /// Session call limit used up.
    #[error("call limit of {limit} reached")]
    Exhausted { limit: u32 },
}

/// Tick-based rate policy for remote suggestion calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuggestionQuota {
    cooldown_ticks: u64,
    limit: Option<u32>,
    used: u32,
    last_call: Option<u64>,
}

impl SuggestionQuota {
    /// `limit` of `None` means unlimited calls.
    pub fn new(cooldown_ticks: u64, limit: Option<u32>) -> Self {
        Self {
            cooldown_ticks,
            limit,
            used: 0,
            last_call: None,
        }
    }

    /// No cooldown, no limit.
    pub fn unlimited() -> Self {
        Self::new(0, None)
    }

    /// Check whether a call may start at tick `now` without consuming it.
    pub fn check(&self, now: u64) -> Result<(), QuotaDenied> {
        if let Some(limit) = self.limit {
            if self.used >= limit {
                return Err(QuotaDenied::Exhausted { limit });
            }
        }
        if let Some(last) = self.last_call {
            let ready_at = last.saturating_add(self.cooldown_ticks);
            if now < ready_at {
                return Err(QuotaDenied::Cooldown { remaining: ready_at - now });
            }
        }
        Ok(())
    }

    /// Record a call at tick `now` if allowed.
    pub fn try_acquire(&mut self, now: u64) -> Result<(), QuotaDenied> {
        self.check(now)?;
        self.used += 1;
        self.last_call = Some(now);
        Ok(())
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    /// Calls left before the limit, `None` if unlimited.
    pub fn remaining(&self) -> Option<u32> {
        self.limit.map(|l| l.saturating_sub(self.used))
    }
}

impl Default for SuggestionQuota {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;
    use crate::core::vec2::FixedVec2;

    fn player_centered_at(cx: i32) -> PlayerState {
        // Player is 34 px wide
        PlayerState::spawn(FixedVec2::from_ints(cx - 17, 368))
    }

    #[test]
    fn test_heads_toward_flag() {
        let mut policy = FallbackPolicy::new(1);
        assert_eq!(policy.decide(&player_centered_at(137), from_int(840)), Intent::Right);
        assert_eq!(policy.decide(&player_centered_at(900), from_int(840)), Intent::Left);
    }

    #[test]
    fn test_band_edges() {
        let mut policy = FallbackPolicy::new(1);
        // Exactly 4 px away is still inside the band
        let at_band = policy.decide(&player_centered_at(836), from_int(840));
        assert!(matches!(at_band, Intent::Jump | Intent::Stay));
        assert_eq!(policy.decide(&player_centered_at(835), from_int(840)), Intent::Right);
    }

    #[test]
    fn test_hop_rate_at_flag() {
        let mut policy = FallbackPolicy::new(42);
        let player = player_centered_at(840);
        let jumps = (0..4000)
            .filter(|_| policy.decide(&player, from_int(840)) == Intent::Jump)
            .count();
        // Expect about 1000
        assert!((800..1200).contains(&jumps), "jumps = {}", jumps);
    }

    #[test]
    fn test_policy_is_reproducible() {
        let player = player_centered_at(840);
        let run = |seed| {
            let mut p = FallbackPolicy::new(seed);
            (0..64).map(|_| p.decide(&player, from_int(840))).collect::<Vec<_>>()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_quota_cooldown() {
        let mut quota = SuggestionQuota::new(10, None);
        assert!(quota.try_acquire(5).is_ok());
        assert_eq!(quota.try_acquire(9), Err(QuotaDenied::Cooldown { remaining: 6 }));
        assert!(quota.check(14).is_err());
        assert!(quota.try_acquire(15).is_ok());
        assert_eq!(quota.used(), 2);
    }

    #[test]
    fn test_quota_limit() {
        let mut quota = SuggestionQuota::new(0, Some(2));
        assert!(quota.try_acquire(0).is_ok());
        assert!(quota.try_acquire(0).is_ok());
        assert_eq!(quota.try_acquire(1), Err(QuotaDenied::Exhausted { limit: 2 }));
        assert_eq!(quota.remaining(), Some(0));
        assert_eq!(SuggestionQuota::unlimited().remaining(), None);
    }
}
