//! Game Configuration
//!
//! Settings for the binary, read from `FLAGRUN_*` environment variables.
//! Every variable is optional; unset ones keep their defaults.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::agent::AutopilotConfig;
use crate::runtime::{RunOptions, SessionConfig};

const PREFIX: &str = "FLAGRUN_";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?} as {expected}")]
    Invalid {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("{key} must be greater than zero")]
    Zero { key: String },
}

/// Which scheduler drives the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Fixed-rate ticks with held keys
    #[default]
    Continuous,
    /// One tick per command
    Requests,
}

impl FromStr for RunMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "continuous" => Ok(RunMode::Continuous),
            "requests" | "request" => Ok(RunMode::Requests),
            _ => Err(()),
        }
    }
}

/// Where frames go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Ascii,
    None,
}

impl FromStr for RenderMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(RenderMode::Ascii),
            "none" | "off" => Ok(RenderMode::None),
            _ => Err(()),
        }
    }
}

/// Binary configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Ticks per second for the continuous scheduler.
    pub tick_rate: u32,
    pub mode: RunMode,
    /// Automated tap length; `None` picks the mode's default.
    pub tap_hold_ticks: Option<u32>,
    /// WebSocket URL of a suggestion provider.
    pub suggest_url: Option<String>,
    pub suggest_timeout: Duration,
    pub suggest_cooldown_ticks: u64,
    pub suggest_limit: Option<u32>,
    /// Ticks after which a suggestion reply is too old to use.
    pub suggest_ttl_ticks: u64,
    /// Drive idle ticks with the autopilot.
    pub autopilot: bool,
    pub seed: u64,
    pub max_ticks: Option<u64>,
    pub render: RenderMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        let autopilot = AutopilotConfig::default();
        Self {
            tick_rate: crate::TICK_RATE,
            mode: RunMode::default(),
            tap_hold_ticks: None,
            suggest_url: None,
            suggest_timeout: autopilot.timeout,
            suggest_cooldown_ticks: autopilot.cooldown_ticks,
            suggest_limit: autopilot.call_limit,
            suggest_ttl_ticks: autopilot.reply_ttl_ticks,
            autopilot: true,
            seed: autopilot.seed,
            max_ticks: None,
            render: RenderMode::default(),
        }
    }
}

impl GameConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from any lookup of full variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let defaults = Self::default();

        let config = Self {
            tick_rate: vars.parse("TICK_RATE", "an integer")?.unwrap_or(defaults.tick_rate),
            mode: vars.parse("MODE", "continuous or requests")?.unwrap_or(defaults.mode),
            tap_hold_ticks: vars.parse("TAP_HOLD_TICKS", "an integer")?,
            suggest_url: vars.get("SUGGEST_URL"),
            suggest_timeout: vars
                .parse("SUGGEST_TIMEOUT_MS", "milliseconds")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.suggest_timeout),
            suggest_cooldown_ticks: vars
                .parse("SUGGEST_COOLDOWN_TICKS", "an integer")?
                .unwrap_or(defaults.suggest_cooldown_ticks),
            suggest_limit: vars.parse("SUGGEST_LIMIT", "an integer")?.or(defaults.suggest_limit),
            suggest_ttl_ticks: vars
                .parse("SUGGEST_TTL_TICKS", "an integer")?
                .unwrap_or(defaults.suggest_ttl_ticks),
            autopilot: vars.flag("AUTOPILOT")?.unwrap_or(defaults.autopilot),
            seed: vars.parse("SEED", "an integer")?.unwrap_or(defaults.seed),
            max_ticks: vars.parse("MAX_TICKS", "an integer")?,
            render: vars.parse("RENDER", "ascii or none")?.unwrap_or(defaults.render),
        };

        if config.tick_rate == 0 {
            return Err(ConfigError::Zero { key: format!("{PREFIX}TICK_RATE") });
        }
        if config.tap_hold_ticks == Some(0) {
            return Err(ConfigError::Zero { key: format!("{PREFIX}TAP_HOLD_TICKS") });
        }

        Ok(config)
    }

    pub fn session_config(&self) -> SessionConfig {
        let mut session = match self.mode {
            RunMode::Continuous => SessionConfig::continuous(),
            RunMode::Requests => SessionConfig::discrete(),
        };
        if let Some(hold) = self.tap_hold_ticks {
            session.tap_hold_ticks = hold;
        }
        session
    }

    pub fn autopilot_config(&self) -> AutopilotConfig {
        AutopilotConfig {
            timeout: self.suggest_timeout,
            cooldown_ticks: self.suggest_cooldown_ticks,
            call_limit: self.suggest_limit,
            reply_ttl_ticks: self.suggest_ttl_ticks,
            seed: self.seed,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            tick_rate: self.tick_rate,
            max_ticks: self.max_ticks,
        }
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(&format!("{PREFIX}{key}"))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str, expected: &'static str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value.parse().map(Some).map_err(|_| ConfigError::Invalid {
            key: format!("{PREFIX}{key}"),
            value,
            expected,
        })
    }

    fn flag(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::Invalid {
                key: format!("{PREFIX}{key}"),
                value,
                expected: "a boolean",
            }),
        }
    }
}
