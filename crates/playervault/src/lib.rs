//! # Playervault
//!
//! Lets multiple independent game-server processes share one mutable
//! per-player data blob in a single relational store, with at most one
//! process owning a given player at a time — and a crash-recovery
//! heuristic for owners that died without releasing.
//!
//! The decision is made from the shared store alone: no peer-to-peer
//! messaging, no external lock service. A process asking to take over a
//! player gets exactly one of four outcomes:
//!
//! - [`Outcome::GrantFresh`] — first join ever, a claimed row was created
//! - [`Outcome::GrantExisting`] — the player was offline, claim succeeded
//! - [`Outcome::GrantStaleRecovery`] — the previous owner's lease went
//!   stale (presumed crash), claim overridden
//! - [`Outcome::Deny`] — another process actively owns the player (or the
//!   store could not be reached: uncertainty never grants)
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::Mutex;
//! use playervault::{
//!     HostHandle, OwnershipManager, PlayerId, ProtocolConfig,
//!     SessionConfig, SessionTracker, SqlitePlayerStore,
//! };
//!
//! # async fn run() -> Result<(), playervault::PlayervaultError> {
//! let store = SqlitePlayerStore::open("players.db")?;
//! let tracker = Arc::new(Mutex::new(SessionTracker::new(SessionConfig::default())));
//! let (host, mut commands) = HostHandle::channel();
//!
//! let manager = OwnershipManager::new(
//!     store,
//!     Arc::clone(&tracker),
//!     host,
//!     ProtocolConfig::default(),
//! );
//!
//! let player = PlayerId::random();
//! let outcome = manager.acquire(player).await;
//! if outcome.is_grant() {
//!     let payload = tracker.lock().await.take_payload(player);
//!     // ... attach the session using `payload` ...
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The `commands` receiver belongs on the host's single-threaded main
//! loop: denied joins arrive there as [`HostCommand::Kick`] actions in
//! FIFO order, never as direct cross-thread mutation.

mod config;
mod error;
mod host;
mod manager;
mod outcome;

pub use config::ProtocolConfig;
pub use error::PlayervaultError;
pub use host::{HostCommand, HostHandle, KICK_MESSAGE};
pub use manager::OwnershipManager;
pub use outcome::Outcome;

// Re-exports so hosts depending on the meta-crate don't need to name the
// sub-crates.
pub use playervault_session::{
    OwnershipState, SessionConfig, SessionError, SessionTracker,
};
pub use playervault_store::{
    epoch_millis, ClaimResult, PlayerId, PlayerRecord, RecordStore,
    SqlitePlayerStore, StoreError,
};
