//! Pickup and Goal Detection
//!
//! Coins and the flag are inert to physics; these checks only read the
//! player's resolved box.

use crate::core::fixed::{wide_square, PICKUP_MARGIN, FLAG_MARGIN};
use crate::core::rect::Rect;
use crate::game::state::{CoinState, PlayerState};

/// Check if a coin is within pickup reach of the player.
///
/// Reach is the coin radius plus `PICKUP_MARGIN`, measured from the
/// player's center. Compared in Q32.32 so no square root is needed.
#[inline]
pub fn coin_in_reach(player: &PlayerState, coin: &CoinState) -> bool {
    let reach = coin.radius + PICKUP_MARGIN;
    player.center().distance_squared_wide(coin.center) < wide_square(reach)
}

/// Mark every uncollected coin in reach as collected.
///
/// Returns the ids of the coins picked up, in level order.
pub fn collect_coins(player: &PlayerState, coins: &mut [CoinState]) -> Vec<u32> {
    let mut picked = Vec::new();
    for coin in coins.iter_mut().filter(|c| !c.collected) {
        if coin_in_reach(player, coin) {
            coin.collected = true;
            picked.push(coin.id);
        }
    }
    picked
}

/// Player's right edge has passed the flag's arrival line.
#[inline]
pub fn reached_flag(player: &PlayerState, flag: &Rect) -> bool {
    player.bounds().right() > flag.x - FLAG_MARGIN
}
