//! The session tracker: per-player ownership state and payload handoff.
//!
//! # Concurrency note
//!
//! `SessionTracker` is NOT thread-safe by itself — it uses plain
//! `HashMap`s. The acquisition layer wraps it in a mutex at a higher
//! level; keeping this type single-threaded avoids hidden locking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use playervault_store::PlayerId;

use crate::{OwnershipState, SessionConfig, SessionError};

/// A granted payload waiting for the host to pick it up.
#[derive(Debug, Clone)]
struct PendingPayload {
    payload: String,
    stored_at: Instant,
}

/// Tracks every player this process is acquiring or owning.
///
/// ## Lifecycle
///
/// ```text
/// begin_join() ──→ record_join() ──→ take_payload() ──→ end_session()
///       │                │
///       ▼                ▼ (host never shows up)
///  abort_join()    expire_stale_pending()
/// ```
pub struct SessionTracker {
    /// Ownership state per player. Absence means [`OwnershipState::Unclaimed`].
    states: HashMap<PlayerId, OwnershipState>,

    /// Granted payloads not yet consumed by the host. Kept in sync with
    /// `states`: a pending entry always has a `JoinDone` state.
    pending: HashMap<PlayerId, PendingPayload>,

    config: SessionConfig,
}

impl SessionTracker {
    /// Creates an empty tracker with the given config.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            states: HashMap::new(),
            pending: HashMap::new(),
            config,
        }
    }

    /// Marks the start of an acquisition attempt for a player.
    ///
    /// Last write wins: a second `begin_join` for the same player (which
    /// correct host usage never produces) simply restarts the attempt.
    pub fn begin_join(&mut self, player: PlayerId) {
        self.states.insert(player, OwnershipState::JoinInProgress);
        tracing::debug!(%player, "join attempt started");
    }

    /// Records a grant: stores the resolved payload for one-time pickup
    /// and moves the player to `JoinDone`.
    ///
    /// Idempotent per call; if called twice for the same player the later
    /// payload wins.
    pub fn record_join(&mut self, player: PlayerId, payload: String) {
        self.states.insert(player, OwnershipState::JoinDone);
        self.pending.insert(
            player,
            PendingPayload {
                payload,
                stored_at: Instant::now(),
            },
        );
        tracing::info!(%player, "join recorded, payload pending pickup");
    }

    /// Resolves a denied attempt: the player goes back to untracked.
    ///
    /// # Errors
    /// Returns [`SessionError::NotTracked`] if no attempt was in flight,
    /// which would mean the caller denied a join it never started.
    pub fn abort_join(&mut self, player: PlayerId) -> Result<(), SessionError> {
        if self.states.remove(&player).is_none() {
            return Err(SessionError::NotTracked(player));
        }
        self.pending.remove(&player);
        tracing::debug!(%player, "join attempt aborted");
        Ok(())
    }

    /// Hands the granted payload to the host. One-shot: the first call
    /// after a grant returns the payload, every later call returns `None`.
    ///
    /// The ownership state stays `JoinDone` — consuming the payload is
    /// part of session setup, not the end of the session.
    pub fn take_payload(&mut self, player: PlayerId) -> Option<String> {
        self.pending.remove(&player).map(|p| p.payload)
    }

    /// Discards all state for a player when their session ends.
    pub fn end_session(&mut self, player: PlayerId) {
        self.states.remove(&player);
        self.pending.remove(&player);
        tracing::debug!(%player, "session state discarded");
    }

    /// The player's current ownership state. Untracked players report
    /// [`OwnershipState::Unclaimed`].
    pub fn state(&self, player: PlayerId) -> OwnershipState {
        self.states
            .get(&player)
            .copied()
            .unwrap_or(OwnershipState::Unclaimed)
    }

    /// Sweeps payloads the host never consumed.
    ///
    /// A grant whose payload is still parked here after the configured
    /// TTL is treated as abandoned: the payload and the ownership state
    /// are dropped, and the affected players are returned so the caller
    /// can log or release them. Call this periodically.
    pub fn expire_stale_pending(&mut self) -> Vec<PlayerId> {
        let ttl = Duration::from_secs(self.config.pending_ttl_secs);
        let mut expired = Vec::new();

        self.pending.retain(|player, pending| {
            if pending.stored_at.elapsed() >= ttl {
                expired.push(*player);
                false
            } else {
                true
            }
        });

        for player in &expired {
            self.states.remove(player);
            tracing::warn!(
                %player,
                "granted payload never consumed, state dropped"
            );
        }

        expired
    }

    /// Number of players with tracked state (any state).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// `true` if no players are tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
