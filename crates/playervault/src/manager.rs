//! The ownership acquisition protocol.
//!
//! `acquire` decides, from the shared record store alone, whether this
//! process may take over a player's data. The ladder it walks:
//!
//! 1. no record            → insert a claimed row   → `GrantFresh`
//! 2. record offline       → compare-and-set online → `GrantExisting`
//! 3. record online, lease stale (set and > N whole minutes old)
//!                         → take over, re-stamp    → `GrantStaleRecovery`
//! 4. record online, lease fresh or unset           → `Deny`
//!
//! Every mutating rung is a single conditional write, so two processes
//! racing the same rung get exactly one winner; the loser degrades to a
//! deny. Any store failure also degrades to a deny — when the protocol
//! cannot tell who owns a player, it never grants.

use std::sync::Arc;

use playervault_session::SessionTracker;
use playervault_store::{
    epoch_millis, ClaimResult, PlayerId, RecordStore, StoreError,
};
use tokio::sync::Mutex;

use crate::host::{HostHandle, KICK_MESSAGE};
use crate::{Outcome, PlayervaultError, ProtocolConfig};

/// Runs acquisition attempts and routes their results.
///
/// Construct one per process with the store client, the shared session
/// tracker, and the host's main-loop handle — all injected, nothing
/// looked up through process-wide globals.
pub struct OwnershipManager<S: RecordStore> {
    store: Arc<S>,
    tracker: Arc<Mutex<SessionTracker>>,
    host: HostHandle,
    config: ProtocolConfig,
}

impl<S: RecordStore> OwnershipManager<S> {
    /// Creates a manager from its collaborators.
    pub fn new(
        store: S,
        tracker: Arc<Mutex<SessionTracker>>,
        host: HostHandle,
        config: ProtocolConfig,
    ) -> Self {
        Self {
            store: Arc::new(store),
            tracker,
            host,
            config,
        }
    }

    /// The shared session tracker, for the host component that finishes
    /// attaching sessions and consumes granted payloads.
    pub fn tracker(&self) -> Arc<Mutex<SessionTracker>> {
        Arc::clone(&self.tracker)
    }

    /// Decides whether this process may take over the player's data.
    ///
    /// Store I/O is blocking and runs on a blocking worker, never on the
    /// caller's loop. The attempt always resolves: on any grant the
    /// payload is published to the session tracker (state `JoinDone`); on
    /// a deny the attempt is cleared and a kick is posted to the host's
    /// main loop. There is no error outcome — failures are logged for the
    /// operator and surface as a deny.
    pub async fn acquire(&self, player: PlayerId) -> Outcome {
        self.tracker.lock().await.begin_join(player);

        let store = Arc::clone(&self.store);
        let stale_after_mins = self.config.stale_after_mins;
        let attempt = tokio::task::spawn_blocking(move || {
            resolve(store.as_ref(), player, stale_after_mins)
        })
        .await;

        let outcome = match attempt {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                tracing::error!(
                    %player, error = %err,
                    "store access failed during acquisition, denying join"
                );
                Outcome::Deny
            }
            Err(err) => {
                tracing::error!(
                    %player, error = %err,
                    "acquisition task did not complete, denying join"
                );
                Outcome::Deny
            }
        };

        match outcome.payload() {
            Some(payload) => {
                let payload = payload.to_string();
                self.tracker.lock().await.record_join(player, payload);
            }
            None => {
                if let Err(err) = self.tracker.lock().await.abort_join(player) {
                    tracing::debug!(%player, error = %err, "deny for untracked join");
                }
                self.host.kick(player, KICK_MESSAGE);
                tracing::info!(%player, "join denied, kick scheduled");
            }
        }

        outcome
    }

    /// Releases ownership on a normal disconnect: writes the player's
    /// final payload, clears the online flag, stamps the heartbeat, and
    /// discards the in-process session state.
    ///
    /// If this never runs (crash), the record stays online with an aging
    /// lease — exactly the condition the stale-recovery rung repairs.
    pub async fn release(
        &self,
        player: PlayerId,
        payload: String,
    ) -> Result<(), PlayervaultError> {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || {
            store.release(player, &payload, epoch_millis())
        })
        .await;

        // Local state goes regardless of how the store write fared; the
        // session is over either way.
        self.tracker.lock().await.end_session(player);

        result??;
        tracing::info!(%player, "ownership released");
        Ok(())
    }
}

/// The decision ladder, run against the store with blocking I/O.
///
/// Whole-minute staleness, as the store's heartbeats are coarse by
/// contract: a lease is stale once `(now - last) / 60_000` exceeds the
/// configured minutes. A zero heartbeat means "never stamped" and is
/// never stale; a heartbeat from the future (clock skew between
/// processes) is likewise never stale.
fn resolve<S: RecordStore + ?Sized>(
    store: &S,
    player: PlayerId,
    stale_after_mins: i64,
) -> Result<Outcome, StoreError> {
    let now = epoch_millis();

    let Some(record) = store.fetch(player)? else {
        return Ok(if store.insert_claim(player, now)? {
            Outcome::GrantFresh
        } else {
            // Lost the insert race: between our read and our insert,
            // another process created (and claimed) the row.
            Outcome::Deny
        });
    };

    if !record.online {
        return Ok(match store.claim_if_offline(player, now)? {
            ClaimResult::Won(payload) => {
                Outcome::GrantExisting(payload.unwrap_or_default())
            }
            ClaimResult::Lost => Outcome::Deny,
        });
    }

    let minutes_past = (now - record.last_heartbeat) / 60_000;
    if record.has_heartbeat() && minutes_past > stale_after_mins {
        let cutoff = now - stale_after_mins * 60_000;
        return Ok(match store.reclaim_if_stale(player, cutoff, now)? {
            ClaimResult::Won(payload) => {
                tracing::warn!(
                    %player, minutes_past,
                    "stale lease overridden, previous owner presumed crashed"
                );
                Outcome::GrantStaleRecovery(payload.unwrap_or_default())
            }
            ClaimResult::Lost => Outcome::Deny,
        });
    }

    Ok(Outcome::Deny)
}

// =========================================================================
// Tests
// =========================================================================
