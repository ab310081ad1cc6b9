//! Input Capture and Normalization
//!
//! Turns held keys, one-shot commands and automated suggestions into the
//! single [`Controls`] set the tick consumes. Also records per-tick controls
//! with delta compression for replay.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::core::hash::{StateHash, StateHasher};

// =============================================================================
// INTENT
// =============================================================================

/// Normalized move for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Left,
    Right,
    Jump,
    /// Deliberately do nothing
    Stay,
    /// No intent was produced
    None,
}

/// Strict intent parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized intent: {0:?}")]
pub struct ParseIntentError(pub String);

impl Intent {
    /// Lenient decoding of free-form suggestion text.
    ///
    /// Case-insensitive; picks the first word that names a move. Text with
    /// no recognizable move decodes to `Stay`.
    pub fn decode(text: &str) -> Intent {
        text.split(|c: char| !c.is_ascii_alphabetic())
            .filter(|word| !word.is_empty())
            .find_map(|word| match word.to_ascii_lowercase().as_str() {
                "left" => Some(Intent::Left),
                "right" => Some(Intent::Right),
                "jump" => Some(Intent::Jump),
                "stay" => Some(Intent::Stay),
                _ => None,
            })
            .unwrap_or(Intent::Stay)
    }

    /// Controls this intent presses for a tick.
    pub fn controls(self) -> Controls {
        match self {
            Intent::Left => Controls::LEFT,
            Intent::Right => Controls::RIGHT,
            Intent::Jump => Controls::JUMP,
            Intent::Stay | Intent::None => Controls::NONE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Left => "left",
            Intent::Right => "right",
            Intent::Jump => "jump",
            Intent::Stay => "stay",
            Intent::None => "none",
        }
    }
}

impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Intent::Left),
            "right" => Ok(Intent::Right),
            "jump" => Ok(Intent::Jump),
            "stay" => Ok(Intent::Stay),
            "none" => Ok(Intent::None),
            _ => Err(ParseIntentError(s.to_string())),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CONTROLS
// =============================================================================

/// Per-tick control bits consumed by the simulation.
///
/// Bits:
/// - Bit 0: left held
/// - Bit 1: right held
/// - Bit 2: jump pressed
/// - Bit 3: reset requested
/// - Bit 4-7: Reserved
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Controls(u8);

impl Controls {
    pub const NONE: Controls = Controls(0);
    pub const LEFT: Controls = Controls(Self::FLAG_LEFT);
    pub const RIGHT: Controls = Controls(Self::FLAG_RIGHT);
    pub const JUMP: Controls = Controls(Self::FLAG_JUMP);
    pub const RESET: Controls = Controls(Self::FLAG_RESET);

    pub const FLAG_LEFT: u8 = 0x01;
    pub const FLAG_RIGHT: u8 = 0x02;
    pub const FLAG_JUMP: u8 = 0x04;
    pub const FLAG_RESET: u8 = 0x08;

    const MOVE_MASK: u8 = Self::FLAG_LEFT | Self::FLAG_RIGHT | Self::FLAG_JUMP;
    const VALID_MASK: u8 = Self::MOVE_MASK | Self::FLAG_RESET;

    /// Build from raw bits; reserved bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::VALID_MASK)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Union of two control sets.
    #[inline]
    pub const fn with(self, other: Controls) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub fn left(self) -> bool {
        self.0 & Self::FLAG_LEFT != 0
    }

    #[inline]
    pub fn right(self) -> bool {
        self.0 & Self::FLAG_RIGHT != 0
    }

    #[inline]
    pub fn jump(self) -> bool {
        self.0 & Self::FLAG_JUMP != 0
    }

    #[inline]
    pub fn reset(self) -> bool {
        self.0 & Self::FLAG_RESET != 0
    }

    /// Any movement or jump bit is set.
    #[inline]
    pub fn has_movement(self) -> bool {
        self.0 & Self::MOVE_MASK != 0
    }

    #[inline]
    pub fn is_idle(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn set_left(&mut self, held: bool) {
        self.set(Self::FLAG_LEFT, held);
    }

    #[inline]
    pub fn set_right(&mut self, held: bool) {
        self.set(Self::FLAG_RIGHT, held);
    }

    #[inline]
    pub fn set_jump(&mut self, pressed: bool) {
        self.set(Self::FLAG_JUMP, pressed);
    }

    #[inline]
    pub fn set_reset(&mut self, pressed: bool) {
        self.set(Self::FLAG_RESET, pressed);
    }

    fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

impl fmt::Debug for Controls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Controls({})", self)
    }
}

impl fmt::Display for Controls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_idle() {
            return f.write_str("-");
        }
        let names = [
            (self.left(), "L"),
            (self.right(), "R"),
            (self.jump(), "J"),
            (self.reset(), "X"),
        ];
        for (on, name) in names {
            if on {
                f.write_str(name)?;
            }
        }
        Ok(())
    }
}

// =============================================================================
// COMMANDS (request-driven control surface)
// =============================================================================

/// One-shot command delivered to a request-driven session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Jump,
    Reset,
    /// Let the autopilot choose this tick's move
    Automate,
}

impl Command {
    /// Manual controls carried by the command. `Automate` carries none.
    pub fn controls(self) -> Controls {
        match self {
            Command::MoveLeft => Controls::LEFT,
            Command::MoveRight => Controls::RIGHT,
            Command::Jump => Controls::JUMP,
            Command::Reset => Controls::RESET,
            Command::Automate => Controls::NONE,
        }
    }
}

/// Command parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized command: {0:?}")]
pub struct ParseCommandError(pub String);

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Accepts the move names plus `reset` and `auto`. An empty line means
    /// `auto`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Command::MoveLeft),
            "right" | "r" => Ok(Command::MoveRight),
            "jump" | "j" => Ok(Command::Jump),
            "reset" => Ok(Command::Reset),
            "auto" | "" => Ok(Command::Automate),
            _ => Err(ParseCommandError(s.to_string())),
        }
    }
}

// =============================================================================
// INPUT ADAPTER
// =============================================================================

/// Automated intent held for a few ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tap {
    controls: Controls,
    remaining: u32,
}

/// Arbitrates manual input against automated taps.
///
/// Manual movement always wins and cancels a running tap. A tap keeps its
/// controls pressed for `tap_hold_ticks` ticks, after which the automated
/// source is consulted again.
#[derive(Clone, Debug)]
pub struct InputAdapter {
    tap_hold_ticks: u32,
    tap: Option<Tap>,
}

impl InputAdapter {
    /// Default tap length for the continuous scheduler.
    pub const CONTINUOUS_TAP_TICKS: u32 = 8;

    /// Tap length for the request-driven scheduler.
    pub const DISCRETE_TAP_TICKS: u32 = 1;

    pub fn new(tap_hold_ticks: u32) -> Self {
        Self {
            tap_hold_ticks: tap_hold_ticks.max(1),
            tap: None,
        }
    }

    pub fn tap_hold_ticks(&self) -> u32 {
        self.tap_hold_ticks
    }

    /// True while an automated tap is still being held.
    pub fn tap_active(&self) -> bool {
        self.tap.is_some()
    }

    /// Drop any running tap.
    pub fn cancel_tap(&mut self) {
        self.tap = None;
    }

    /// Resolve the controls for this tick.
    ///
    /// `consult` is only called when neither manual input nor a running
    /// tap decides the tick.
    pub fn resolve<F>(&mut self, manual: Controls, consult: F) -> Controls
    where
        F: FnOnce() -> Intent,
    {
        if manual.has_movement() || manual.reset() {
            self.cancel_tap();
            return manual;
        }

        if let Some(tap) = self.tap.as_mut() {
            let controls = tap.controls;
            tap.remaining -= 1;
            if tap.remaining == 0 {
                self.tap = None;
            }
            return controls;
        }

        let controls = consult().controls();
        if !controls.is_idle() && self.tap_hold_ticks > 1 {
            self.tap = Some(Tap {
                controls,
                remaining: self.tap_hold_ticks - 1,
            });
        }
        controls
    }
}

impl Default for InputAdapter {
    fn default() -> Self {
        Self::new(Self::CONTINUOUS_TAP_TICKS)
    }
}

// =============================================================================
// INPUT RECORDING
// =============================================================================

/// A change of controls starting at `tick`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlsDelta {
    pub tick: u32,
    pub controls: Controls,
}

/// Per-tick controls of a run, stored only where they change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecording {
    /// Number of ticks covered (ticks 0..len)
    len: u32,

    deltas: Vec<ControlsDelta>,
}

impl InputRecording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the controls used at `tick`.
    ///
    /// Only stores if the controls changed from the previous record.
    pub fn record(&mut self, tick: u32, controls: Controls) {
        self.len = self.len.max(tick.saturating_add(1));

        if controls != self.last_controls() {
            self.deltas.push(ControlsDelta { tick, controls });
        }
    }

    /// Append controls for the next tick.
    pub fn push(&mut self, controls: Controls) {
        self.record(self.len, controls);
    }

    fn last_controls(&self) -> Controls {
        self.deltas.last().map(|d| d.controls).unwrap_or_default()
    }

    /// Controls in effect at `tick`.
    pub fn controls_at(&self, tick: u32) -> Controls {
        // Last delta at or before this tick
        let idx = self.deltas.partition_point(|d| d.tick <= tick);
        if idx == 0 {
            Controls::NONE
        } else {
            self.deltas[idx - 1].controls
        }
    }

    /// Number of recorded ticks.
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn delta_count(&self) -> usize {
        self.deltas.len()
    }

    /// Digest of the recording, independent of how it was built.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_recording();
        hasher.update_u32(self.len);
        for delta in &self.deltas {
            hasher.update_u32(delta.tick);
            hasher.update_u8(delta.controls.bits());
        }
        hasher.finalize()
    }

    /// Iterate `(tick, controls)` over every recorded tick.
    pub fn replay_iter(&self) -> ReplayIterator<'_> {
        ReplayIterator {
            recording: self,
            current_tick: 0,
            delta_idx: 0,
            current: Controls::NONE,
        }
    }
}

impl FromIterator<Controls> for InputRecording {
    fn from_iter<I: IntoIterator<Item = Controls>>(iter: I) -> Self {
        let mut recording = Self::new();
        for controls in iter {
            recording.push(controls);
        }
        recording
    }
}

/// Iterator for replaying controls tick-by-tick.
pub struct ReplayIterator<'a> {
    recording: &'a InputRecording,
    current_tick: u32,
    delta_idx: usize,
    current: Controls,
}

impl Iterator for ReplayIterator<'_> {
    type Item = (u32, Controls);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_tick >= self.recording.len {
            return None;
        }

        let deltas = &self.recording.deltas;
        while let Some(delta) = deltas.get(self.delta_idx) {
            if delta.tick > self.current_tick {
                break;
            }
            self.current = delta.controls;
            self.delta_idx += 1;
        }

        let item = (self.current_tick, self.current);
        self.current_tick += 1;
        Some(item)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_picks_first_move_word() {
        assert_eq!(Intent::decode("RIGHT"), Intent::Right);
        assert_eq!(Intent::decode("  jump!  "), Intent::Jump);
        assert_eq!(Intent::decode("I think you should go Left, then right"), Intent::Left);
        assert_eq!(Intent::decode("\"stay\""), Intent::Stay);
    }

    #[test]
    fn test_decode_falls_back_to_stay() {
        assert_eq!(Intent::decode(""), Intent::Stay);
        assert_eq!(Intent::decode("forward"), Intent::Stay);
        assert_eq!(Intent::decode("rightwards"), Intent::Stay);
        assert_eq!(Intent::decode("{\"error\": 500}"), Intent::Stay);
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("Left".parse::<Intent>(), Ok(Intent::Left));
        assert_eq!(" none ".parse::<Intent>(), Ok(Intent::None));
        assert!("go left".parse::<Intent>().is_err());
    }

    #[test]
    fn test_command_parse() {
        assert_eq!("Right".parse::<Command>(), Ok(Command::MoveRight));
        assert_eq!(" j ".parse::<Command>(), Ok(Command::Jump));
        assert_eq!("".parse::<Command>(), Ok(Command::Automate));
        assert!("fly".parse::<Command>().is_err());
    }

    #[test]
    fn test_intent_maps_to_single_bit() {
        assert_eq!(Intent::Left.controls(), Controls::LEFT);
        assert_eq!(Intent::Right.controls(), Controls::RIGHT);
        assert_eq!(Intent::Jump.controls(), Controls::JUMP);
        assert!(Intent::Stay.controls().is_idle());
        assert!(Intent::None.controls().is_idle());
    }

    #[test]
    fn test_controls_flags() {
        let mut c = Controls::NONE;
        assert!(c.is_idle());

        c.set_right(true);
        c.set_jump(true);
        assert!(c.right() && c.jump());
        assert!(!c.left());
        assert_eq!(c, Controls::RIGHT.with(Controls::JUMP));
        assert_eq!(c.to_string(), "RJ");

        c.set_right(false);
        assert_eq!(c, Controls::JUMP);

        assert_eq!(Controls::from_bits(0xF0), Controls::NONE);
        assert!(Controls::RESET.reset());
        assert!(!Controls::RESET.has_movement());
    }

    #[test]
    fn test_manual_preempts_and_cancels_tap() {
        let mut adapter = InputAdapter::new(8);

        let first = adapter.resolve(Controls::NONE, || Intent::Right);
        assert_eq!(first, Controls::RIGHT);
        assert!(adapter.tap_active());

        let manual = adapter.resolve(Controls::LEFT, || panic!("must not consult"));
        assert_eq!(manual, Controls::LEFT);
        assert!(!adapter.tap_active());
    }

    #[test]
    fn test_tap_holds_then_releases() {
        let mut adapter = InputAdapter::new(3);
        let mut consults = 0;

        let mut run = |adapter: &mut InputAdapter| {
            adapter.resolve(Controls::NONE, || {
                consults += 1;
                Intent::Jump
            })
        };

        for _ in 0..3 {
            assert_eq!(run(&mut adapter), Controls::JUMP);
        }
        assert!(!adapter.tap_active());
        assert_eq!(run(&mut adapter), Controls::JUMP);
        drop(run);
        assert_eq!(consults, 2);
    }

    #[test]
    fn test_discrete_tap_is_single_tick() {
        let mut adapter = InputAdapter::new(InputAdapter::DISCRETE_TAP_TICKS);
        assert_eq!(adapter.resolve(Controls::NONE, || Intent::Left), Controls::LEFT);
        assert!(!adapter.tap_active());
        assert_eq!(adapter.resolve(Controls::NONE, || Intent::Stay), Controls::NONE);
    }

    #[test]
    fn test_reset_passes_through() {
        let mut adapter = InputAdapter::new(8);
        adapter.resolve(Controls::NONE, || Intent::Right);
        let c = adapter.resolve(Controls::RESET, || Intent::Left);
        assert_eq!(c, Controls::RESET);
        assert!(!adapter.tap_active());
    }

    #[test]
    fn test_recording_delta_compression() {
        let mut rec = InputRecording::new();
        for _ in 0..4 {
            rec.push(Controls::RIGHT);
        }
        assert_eq!(rec.delta_count(), 1);

        rec.push(Controls::RIGHT.with(Controls::JUMP));
        rec.push(Controls::NONE);
        assert_eq!(rec.delta_count(), 3);
        assert_eq!(rec.len(), 6);
    }

    #[test]
    fn test_recording_controls_at() {
        let mut rec = InputRecording::new();
        rec.record(10, Controls::LEFT);
        rec.record(20, Controls::JUMP);

        assert_eq!(rec.controls_at(5), Controls::NONE);
        assert_eq!(rec.controls_at(10), Controls::LEFT);
        assert_eq!(rec.controls_at(15), Controls::LEFT);
        assert_eq!(rec.controls_at(99), Controls::JUMP);
    }

    #[test]
    fn test_replay_iterator() {
        let rec: InputRecording = [
            Controls::RIGHT,
            Controls::RIGHT,
            Controls::JUMP,
            Controls::NONE,
        ]
        .into_iter()
        .collect();

        let frames: Vec<_> = rec.replay_iter().collect();
        assert_eq!(
            frames,
            vec![
                (0, Controls::RIGHT),
                (1, Controls::RIGHT),
                (2, Controls::JUMP),
                (3, Controls::NONE),
            ]
        );
        assert_eq!(InputRecording::new().replay_iter().count(), 0);
    }

    #[test]
    fn test_recording_survives_serde_round_trip() {
        let original: InputRecording = [Controls::RIGHT, Controls::RIGHT].into_iter().collect();
        let json = serde_json::to_string(&original).unwrap();
        let mut restored: InputRecording = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);

        // Releasing the key must still be recorded after a reload
        let mut continued = original.clone();
        continued.push(Controls::NONE);
        restored.push(Controls::NONE);

        assert_eq!(restored.controls_at(2), Controls::NONE);
        assert_eq!(restored, continued);
        assert_eq!(restored.compute_hash(), continued.compute_hash());
    }

    #[test]
    fn test_recording_hash_is_stable() {
        let a: InputRecording = [Controls::LEFT, Controls::LEFT].into_iter().collect();
        let mut b = InputRecording::new();
        b.record(0, Controls::LEFT);
        b.record(1, Controls::LEFT);
        assert_eq!(a.compute_hash(), b.compute_hash());

        let c: InputRecording = [Controls::LEFT, Controls::RIGHT].into_iter().collect();
        assert_ne!(a.compute_hash(), c.compute_hash());
    }
}
