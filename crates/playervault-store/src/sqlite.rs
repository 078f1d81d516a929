//! SQLite-backed record store.
//!
//! One table, one row per player. All ownership transitions are single
//! conditional statements so that two processes racing on the same row
//! get exactly one winner — the losing statement simply matches nothing.
//!
//! Connections come from an `r2d2` pool. Checking one out returns a
//! guard that hands the connection back when it drops, so every exit
//! path (including errors) releases its connection.

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

use crate::{ClaimResult, PlayerId, PlayerRecord, RecordStore, StoreError};

const CREATE_TABLE: &str = "\
    CREATE TABLE IF NOT EXISTS player_data (
        player         TEXT PRIMARY KEY,
        payload        TEXT,
        online         INTEGER NOT NULL DEFAULT 0,
        last_heartbeat INTEGER NOT NULL DEFAULT 0
    )";

const SELECT: &str = "\
    SELECT payload, online, last_heartbeat FROM player_data \
    WHERE player = ?1";

/// Fresh players come into existence already claimed by the inserter.
/// `ON CONFLICT DO NOTHING` turns a lost insert race into zero changes
/// instead of an error.
const INSERT_CLAIM: &str = "\
    INSERT INTO player_data (player, payload, online, last_heartbeat) \
    VALUES (?1, NULL, 1, ?2) \
    ON CONFLICT(player) DO NOTHING";

/// Compare-and-set on the online flag. `RETURNING` makes the claim and
/// the payload read one statement, so the payload the winner gets is the
/// payload it claimed.
const CLAIM_IF_OFFLINE: &str = "\
    UPDATE player_data SET online = 1, last_heartbeat = ?2 \
    WHERE player = ?1 AND online = 0 \
    RETURNING payload";

/// Stale-recovery takeover. The `last_heartbeat != 0` guard keeps a
/// never-stamped heartbeat from reading as ancient, and re-stamping the
/// lease makes the new owner recoverable in turn.
const RECLAIM_IF_STALE: &str = "\
    UPDATE player_data SET last_heartbeat = ?3 \
    WHERE player = ?1 AND online = 1 \
      AND last_heartbeat != 0 AND last_heartbeat < ?2 \
    RETURNING payload";

const RELEASE: &str = "\
    UPDATE player_data SET payload = ?2, online = 0, last_heartbeat = ?3 \
    WHERE player = ?1";

/// The SQLite implementation of [`RecordStore`].
///
/// Cheap to clone — clones share the same connection pool.
#[derive(Clone)]
pub struct SqlitePlayerStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqlitePlayerStore {
    /// Opens (or creates) the store at the given path and ensures the
    /// player table exists.
    ///
    /// Every pooled connection gets a busy timeout so that writers from
    /// several processes sharing the file queue up instead of failing
    /// immediately with `SQLITE_BUSY`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
        let pool = Pool::builder().build(manager)?;
        let store = Self { pool };
        store.bootstrap()?;
        Ok(store)
    }

    /// Opens an in-memory store for tests and demos.
    ///
    /// The pool is capped at a single connection: an in-memory SQLite
    /// database is private to its connection, so a second pooled
    /// connection would see an empty database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        let store = Self { pool };
        store.bootstrap()?;
        Ok(store)
    }

    fn bootstrap(&self) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(CREATE_TABLE, [])?;
        Ok(())
    }
}

impl RecordStore for SqlitePlayerStore {
    fn fetch(&self, player: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        let conn = self.pool.get()?;
        let record = conn
            .query_row(SELECT, params![player.as_key()], |row| {
                Ok(PlayerRecord {
                    payload: row.get(0)?,
                    online: row.get::<_, i64>(1)? != 0,
                    last_heartbeat: row.get(2)?,
                })
            })
            .optional()?;
        Ok(record)
    }

    fn insert_claim(&self, player: PlayerId, now_ms: i64) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let inserted = conn.execute(INSERT_CLAIM, params![player.as_key(), now_ms])?;
        Ok(inserted == 1)
    }

    fn claim_if_offline(
        &self,
        player: PlayerId,
        now_ms: i64,
    ) -> Result<ClaimResult, StoreError> {
        let conn = self.pool.get()?;
        let payload = conn
            .query_row(CLAIM_IF_OFFLINE, params![player.as_key(), now_ms], |row| {
                row.get::<_, Option<String>>(0)
            })
            .optional()?;
        Ok(match payload {
            Some(payload) => ClaimResult::Won(payload),
            None => ClaimResult::Lost,
        })
    }

    fn reclaim_if_stale(
        &self,
        player: PlayerId,
        cutoff_ms: i64,
        now_ms: i64,
    ) -> Result<ClaimResult, StoreError> {
        let conn = self.pool.get()?;
        let payload = conn
            .query_row(
                RECLAIM_IF_STALE,
                params![player.as_key(), cutoff_ms, now_ms],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(match payload {
            Some(payload) => ClaimResult::Won(payload),
            None => ClaimResult::Lost,
        })
    }

    fn release(
        &self,
        player: PlayerId,
        payload: &str,
        now_ms: i64,
    ) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        let updated = conn.execute(RELEASE, params![player.as_key(), payload, now_ms])?;
        if updated == 0 {
            // Releasing a player that was never inserted indicates a bug
            // in the host's join/quit pairing; loud log, not an error, so
            // the disconnect path never wedges.
            tracing::warn!(%player, "release matched no record");
        }
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Store-level tests for the conditional-write primitives.
    //!
    //! Rows with specific shapes are built through the public operations
    //! themselves: `release` can park a row offline with any payload and
    //! heartbeat, and claiming with a doctored `now_ms` plants an online
    //! row with an arbitrary (even ancient) lease.

    use super::*;

    fn store() -> SqlitePlayerStore {
        SqlitePlayerStore::open_in_memory().expect("in-memory store")
    }

    /// Parks an online row with the given payload and heartbeat.
    fn plant_online(store: &SqlitePlayerStore, player: PlayerId, payload: &str, hb: i64) {
        assert!(store.insert_claim(player, hb).unwrap());
        store.release(player, payload, hb).unwrap();
        assert!(store.claim_if_offline(player, hb).unwrap().is_won());
    }

    // =====================================================================
    // fetch()
    // =====================================================================

    #[test]
    fn test_fetch_unknown_player_returns_none() {
        let s = store();
        assert_eq!(s.fetch(PlayerId::random()).unwrap(), None);
    }

    // =====================================================================
    // insert_claim()
    // =====================================================================

    #[test]
    fn test_insert_claim_new_player_creates_claimed_row() {
        let s = store();
        let p = PlayerId::random();

        assert!(s.insert_claim(p, 1_000).unwrap());

        let rec = s.fetch(p).unwrap().expect("row exists");
        assert_eq!(rec.payload, None);
        assert!(rec.online);
        assert_eq!(rec.last_heartbeat, 1_000);
    }

    #[test]
    fn test_insert_claim_existing_row_is_a_noop() {
        let s = store();
        let p = PlayerId::random();
        s.insert_claim(p, 1_000).unwrap();
        s.release(p, "abc", 2_000).unwrap();

        // Second insert must lose and must not clobber the saved payload.
        assert!(!s.insert_claim(p, 9_000).unwrap());

        let rec = s.fetch(p).unwrap().unwrap();
        assert_eq!(rec.payload.as_deref(), Some("abc"));
        assert!(!rec.online);
        assert_eq!(rec.last_heartbeat, 2_000);
    }

    // =====================================================================
    // claim_if_offline()
    // =====================================================================

    #[test]
    fn test_claim_if_offline_offline_row_wins_with_payload() {
        let s = store();
        let p = PlayerId::random();
        s.insert_claim(p, 1_000).unwrap();
        s.release(p, "abc", 2_000).unwrap();

        let result = s.claim_if_offline(p, 3_000).unwrap();

        assert_eq!(result, ClaimResult::Won(Some("abc".into())));
        let rec = s.fetch(p).unwrap().unwrap();
        assert!(rec.online);
        // The lease is re-stamped on reacquire, not left at release time.
        assert_eq!(rec.last_heartbeat, 3_000);
        assert_eq!(rec.payload.as_deref(), Some("abc"));
    }

    #[test]
    fn test_claim_if_offline_online_row_loses_untouched() {
        let s = store();
        let p = PlayerId::random();
        s.insert_claim(p, 1_000).unwrap();

        let result = s.claim_if_offline(p, 9_000).unwrap();

        assert_eq!(result, ClaimResult::Lost);
        let rec = s.fetch(p).unwrap().unwrap();
        assert_eq!(rec.last_heartbeat, 1_000, "loser must not mutate");
    }

    #[test]
    fn test_claim_if_offline_missing_row_loses() {
        let s = store();
        let result = s.claim_if_offline(PlayerId::random(), 1_000).unwrap();
        assert_eq!(result, ClaimResult::Lost);
    }

    // =====================================================================
    // reclaim_if_stale()
    // =====================================================================

    #[test]
    fn test_reclaim_if_stale_old_lease_wins_and_restamps() {
        let s = store();
        let p = PlayerId::random();
        plant_online(&s, p, "abc", 1_000);

        let result = s.reclaim_if_stale(p, 500_000, 900_000).unwrap();

        assert_eq!(result, ClaimResult::Won(Some("abc".into())));
        let rec = s.fetch(p).unwrap().unwrap();
        assert!(rec.online);
        assert_eq!(rec.last_heartbeat, 900_000, "lease must be re-stamped");
    }

    #[test]
    fn test_reclaim_if_stale_fresh_lease_loses() {
        let s = store();
        let p = PlayerId::random();
        plant_online(&s, p, "abc", 400_000);

        let result = s.reclaim_if_stale(p, 300_000, 900_000).unwrap();

        assert_eq!(result, ClaimResult::Lost);
        let rec = s.fetch(p).unwrap().unwrap();
        assert_eq!(rec.last_heartbeat, 400_000);
    }

    #[test]
    fn test_reclaim_if_stale_offline_row_loses() {
        let s = store();
        let p = PlayerId::random();
        s.insert_claim(p, 1_000).unwrap();
        s.release(p, "abc", 1_000).unwrap();

        assert_eq!(
            s.reclaim_if_stale(p, 500_000, 900_000).unwrap(),
            ClaimResult::Lost
        );
    }

    #[test]
    fn test_reclaim_if_stale_unset_heartbeat_never_matches() {
        let s = store();
        let p = PlayerId::random();
        // An online row whose heartbeat was never stamped: claimed at
        // "time zero". 0 sorts below any cutoff, so only the explicit
        // != 0 guard keeps it safe.
        plant_online(&s, p, "abc", 0);

        let result = s.reclaim_if_stale(p, 500_000, 900_000).unwrap();

        assert_eq!(result, ClaimResult::Lost);
        let rec = s.fetch(p).unwrap().unwrap();
        assert_eq!(rec.last_heartbeat, 0, "unset lease must stay unset");
    }

    // =====================================================================
    // release()
    // =====================================================================

    #[test]
    fn test_release_writes_payload_and_clears_online() {
        let s = store();
        let p = PlayerId::random();
        s.insert_claim(p, 1_000).unwrap();

        s.release(p, "final-state", 5_000).unwrap();

        let rec = s.fetch(p).unwrap().unwrap();
        assert_eq!(rec.payload.as_deref(), Some("final-state"));
        assert!(!rec.online);
        assert_eq!(rec.last_heartbeat, 5_000);
    }

    #[test]
    fn test_release_unknown_player_does_not_error() {
        let s = store();
        s.release(PlayerId::random(), "x", 1_000).unwrap();
    }

    // =====================================================================
    // open() on disk
    // =====================================================================

    #[test]
    fn test_open_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.db");
        let p = PlayerId::random();

        {
            let s = SqlitePlayerStore::open(&path).unwrap();
            s.insert_claim(p, 1_000).unwrap();
            s.release(p, "abc", 2_000).unwrap();
        }

        let s = SqlitePlayerStore::open(&path).unwrap();
        let rec = s.fetch(p).unwrap().expect("row survived reopen");
        assert_eq!(rec.payload.as_deref(), Some("abc"));
        assert!(!rec.online);
    }

    #[test]
    fn test_clones_share_one_pool() {
        let s = store();
        let p = PlayerId::random();
        s.insert_claim(p, 1_000).unwrap();

        let clone = s.clone();
        assert!(clone.fetch(p).unwrap().is_some());
    }
}
