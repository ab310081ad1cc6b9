//! Game Events
//!
//! Events generated during simulation for logging, replay checks and the
//! control surface.

use serde::{Serialize, Deserialize};

/// Game event data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player left the ground under its own jump
    Jumped,

    /// Player came to rest on a solid after being airborne
    Landed,

    /// Player picked up a coin
    CoinCollected {
        coin_id: u32,
        total: u32,
    },

    /// Player reached the flag for the first time since the last reset
    FlagReached,

    /// World was rebuilt from the level blueprint
    LevelReset,
}

/// A game event stamped with the tick that raised it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u32,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    pub fn new(tick: u32, data: GameEventData) -> Self {
        Self { tick, data }
    }

    pub fn jumped(tick: u32) -> Self {
        Self::new(tick, GameEventData::Jumped)
    }

    pub fn landed(tick: u32) -> Self {
        Self::new(tick, GameEventData::Landed)
    }

    /// Create coin collected event. `total` is the coin count after pickup.
    pub fn coin_collected(tick: u32, coin_id: u32, total: u32) -> Self {
        Self::new(tick, GameEventData::CoinCollected { coin_id, total })
    }

    pub fn flag_reached(tick: u32) -> Self {
        Self::new(tick, GameEventData::FlagReached)
    }

    pub fn level_reset(tick: u32) -> Self {
        Self::new(tick, GameEventData::LevelReset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_differ_by_kind_and_payload() {
        assert_ne!(GameEvent::jumped(5), GameEvent::landed(5));
        assert_ne!(GameEvent::coin_collected(5, 0, 1), GameEvent::coin_collected(5, 0, 2));
        assert_ne!(GameEvent::flag_reached(5), GameEvent::flag_reached(6));
        assert_eq!(GameEvent::coin_collected(5, 1, 2), GameEvent::coin_collected(5, 1, 2));
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = GameEvent::coin_collected(3, 1, 2);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("CoinCollected"));
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
