//! Autopilot
//!
//! Bridges the synchronous tick loop and an asynchronous suggestion
//! provider. A call is spawned on the tokio runtime with a deadline and
//! its result is polled once per tick; the loop never waits for it. Until a
//! reply arrives, and whenever a call fails, times out or is refused by the
//! quota, the fallback policy answers instead.
//!
//! A reply only counts for the situation it was asked about. Replies older
//! than `reply_ttl_ticks`, and calls still in flight when the player takes
//! over or resets, are thrown away.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, warn};

use super::policy::{FallbackPolicy, SuggestionQuota};
use super::provider::{Offline, SuggestError, SuggestionProvider};
use super::{MoveSource, Snapshot};
use crate::game::input::Intent;
use crate::game::level::Level;
use crate::game::state::WorldState;

type Reply = Result<String, SuggestError>;

/// Autopilot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutopilotConfig {
    /// Deadline for a single provider call.
    pub timeout: Duration,
    /// Minimum ticks between two remote calls.
    pub cooldown_ticks: u64,
    /// Maximum remote calls per session (`None` = unlimited).
    pub call_limit: Option<u32>,
    /// Ticks after the request beyond which a reply is discarded.
    pub reply_ttl_ticks: u64,
    /// Seed of the fallback policy.
    pub seed: u64,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(1500),
            cooldown_ticks: 30,
            call_limit: None,
            // Two seconds at 60 Hz, longer than the call deadline
            reply_ttl_ticks: 120,
            seed: 0x5EED,
        }
    }
}

/// Counters for where intents came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutopilotStats {
    /// Intents decoded from provider replies
    pub remote: u64,
    /// Intents produced by the fallback policy
    pub fallback: u64,
    /// Provider calls that failed or timed out
    pub failures: u64,
    /// Calls refused by the quota
    pub denied: u64,
    /// Replies discarded as too old or superseded
    pub stale: u64,
}

/// A provider call in flight.
struct PendingCall {
    rx: oneshot::Receiver<Reply>,
    /// Session tick the snapshot was taken on
    issued_at: u64,
}

/// Chooses moves from provider replies, falling back to a local policy.
pub struct Autopilot<P: SuggestionProvider> {
    provider: Arc<P>,
    runtime: Option<Handle>,
    timeout: Duration,
    quota: SuggestionQuota,
    fallback: FallbackPolicy,
    reply_ttl: u64,
    pending: Option<PendingCall>,
    stats: AutopilotStats,
}

impl Autopilot<Offline> {
    /// Autopilot with no provider; every intent comes from the fallback.
    pub fn offline(seed: u64) -> Self {
        Self {
            provider: Arc::new(Offline),
            runtime: None,
            timeout: Duration::ZERO,
            quota: SuggestionQuota::new(0, Some(0)),
            fallback: FallbackPolicy::new(seed),
            reply_ttl: 0,
            pending: None,
            stats: AutopilotStats::default(),
        }
    }
}

impl<P: SuggestionProvider> Autopilot<P> {
    /// Autopilot that spawns provider calls on `runtime`.
    pub fn new(provider: P, config: &AutopilotConfig, runtime: Handle) -> Self {
        Self {
            provider: Arc::new(provider),
            runtime: Some(runtime),
            timeout: config.timeout,
            quota: SuggestionQuota::new(config.cooldown_ticks, config.call_limit),
            fallback: FallbackPolicy::new(config.seed),
            reply_ttl: config.reply_ttl_ticks,
            pending: None,
            stats: AutopilotStats::default(),
        }
    }

    pub fn stats(&self) -> AutopilotStats {
        self.stats
    }

    /// A provider call is in flight.
    pub fn call_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    pub fn quota(&self) -> &SuggestionQuota {
        &self.quota
    }

    /// Take a finished reply, if any, without blocking.
    fn poll_reply(&mut self, now: u64) -> Option<Intent> {
        let call = self.pending.as_mut()?;
        let reply = match call.rx.try_recv() {
            Ok(reply) => reply,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(SuggestError::Aborted),
        };
        let issued_at = call.issued_at;
        self.pending = None;

        let age = now.saturating_sub(issued_at);
        if age > self.reply_ttl {
            debug!(issued_at, age, "discarding stale suggestion");
            self.stats.stale += 1;
            return None;
        }

        match reply {
            Ok(text) => {
                let intent = Intent::decode(&text);
                debug!(%intent, "provider suggestion decoded");
                Some(intent)
            }
            Err(e) => {
                warn!(error = %e, "suggestion failed, using fallback");
                self.stats.failures += 1;
                None
            }
        }
    }

    /// Start a provider call if none is running and the quota allows it.
    fn maybe_request(&mut self, level: &Level, world: &WorldState, now: u64) {
        if self.pending.is_some() {
            return;
        }
        let Some(runtime) = self.runtime.as_ref() else {
            return;
        };
        if let Err(denied) = self.quota.try_acquire(now) {
            debug!(reason = %denied, "suggestion call skipped");
            self.stats.denied += 1;
            return;
        }

        let (tx, rx) = oneshot::channel();
        let provider = Arc::clone(&self.provider);
        let snapshot = Snapshot::capture(level, world);
        let timeout = self.timeout;

        runtime.spawn(async move {
            let reply = match tokio::time::timeout(timeout, provider.suggest(snapshot)).await {
                Ok(reply) => reply,
                Err(_) => Err(SuggestError::Timeout(timeout.as_millis() as u64)),
            };
            // Receiver gone means the session moved on
            let _ = tx.send(reply);
        });

        self.pending = Some(PendingCall { rx, issued_at: now });
    }
}

impl<P: SuggestionProvider> MoveSource for Autopilot<P> {
    fn next_intent(&mut self, level: &Level, world: &WorldState, now: u64) -> Intent {
        let remote = self.poll_reply(now);
        self.maybe_request(level, world, now);

        match remote {
            Some(intent) => {
                self.stats.remote += 1;
                intent
            }
            None => {
                self.stats.fallback += 1;
                self.fallback.decide(&world.player, level.flag().x)
            }
        }
    }

    fn invalidate(&mut self) {
        if let Some(call) = self.pending.take() {
            debug!(issued_at = call.issued_at, "dropping superseded suggestion call");
            self.stats.stale += 1;
        }
    }
}
