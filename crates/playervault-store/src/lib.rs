//! Record-store client layer for Playervault.
//!
//! Every game-server process sharing a player's data talks to one
//! relational store through this crate. It provides the [`RecordStore`]
//! trait that the acquisition protocol is written against, and the
//! SQLite-backed [`SqlitePlayerStore`] implementation.
//!
//! # Why conditional writes?
//!
//! Two processes may race to claim the same player. A read followed by a
//! separate write lets both observe "offline" and both grant — so every
//! mutating operation here is a single conditional statement that reports
//! whether *this* caller won the row. The caller never gets to decide
//! "the row is mine" from a stale read.

mod error;
mod record;
mod sqlite;

pub use error::StoreError;
pub use record::{epoch_millis, ClaimResult, PlayerId, PlayerRecord};
pub use sqlite::SqlitePlayerStore;

/// Read and conditional-write primitives over the shared player table.
///
/// Implementations must make each write atomic with respect to its own
/// condition: when two callers race on the same row, exactly one sees
/// `true`/[`ClaimResult::Won`]. The SQLite implementation gets this from
/// single-statement `INSERT … ON CONFLICT` / conditional `UPDATE`s.
///
/// All methods are blocking I/O. Callers on an async runtime must move
/// them off the main loop (e.g. `tokio::task::spawn_blocking`).
pub trait RecordStore: Send + Sync + 'static {
    /// Reads the record for a player, or `None` if the player has never
    /// been saved.
    fn fetch(&self, player: PlayerId) -> Result<Option<PlayerRecord>, StoreError>;

    /// Inserts a fresh record claimed by this process (`online = 1`,
    /// `last_heartbeat = now_ms`, no payload).
    ///
    /// Returns `true` iff the row did not exist and was inserted by this
    /// call. A concurrent caller that lost the insert race gets `false`.
    fn insert_claim(&self, player: PlayerId, now_ms: i64) -> Result<bool, StoreError>;

    /// Claims an existing record, but only if it is currently offline.
    ///
    /// Flips `online` to 1 and stamps `last_heartbeat = now_ms` in one
    /// statement. [`ClaimResult::Won`] carries the stored payload.
    fn claim_if_offline(
        &self,
        player: PlayerId,
        now_ms: i64,
    ) -> Result<ClaimResult, StoreError>;

    /// Takes over a record whose owner appears to have crashed.
    ///
    /// Applies only if the record is online with a *set* heartbeat older
    /// than `cutoff_ms`; an unset heartbeat (0) never matches, so a row
    /// that was claimed but never stamped cannot be misread as ancient.
    /// On success the lease is re-stamped to `now_ms` so the new owner is
    /// itself recoverable if it crashes later.
    fn reclaim_if_stale(
        &self,
        player: PlayerId,
        cutoff_ms: i64,
        now_ms: i64,
    ) -> Result<ClaimResult, StoreError>;

    /// Releases ownership on a normal disconnect: writes the final
    /// payload, clears `online`, and stamps `last_heartbeat = now_ms`.
    fn release(
        &self,
        player: PlayerId,
        payload: &str,
        now_ms: i64,
    ) -> Result<(), StoreError>;
}
