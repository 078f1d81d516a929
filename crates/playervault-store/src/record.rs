//! Row model and identity types for the shared player table.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A stable unique player identity.
///
/// Newtype over [`Uuid`] so a player id can't be confused with any other
/// string or id floating around the host. Stored in the record table as
/// its hyphenated text form.
///
/// `#[serde(transparent)]` keeps the serialized form a plain UUID string,
/// which is what the host's own traffic carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Generates a fresh random identity. Mostly useful in tests and
    /// demos; real identities come from the host's auth layer.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The hyphenated text form used as the table key.
    pub(crate) fn as_key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PlayerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ---------------------------------------------------------------------------
// PlayerRecord
// ---------------------------------------------------------------------------

/// One row of the shared player table.
///
/// The payload is opaque to this system — whatever blob the host saves
/// is what comes back. `None` means no data has ever been written for
/// this player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    /// The player's serialized data, if any has ever been saved.
    pub payload: Option<String>,

    /// Whether some process currently claims ownership of this player.
    pub online: bool,

    /// Epoch milliseconds of the last time ownership was claimed or
    /// refreshed. `0` means the heartbeat was never stamped — which is
    /// *not* the same as "long ago" and must never count as stale.
    pub last_heartbeat: i64,
}

impl PlayerRecord {
    /// `true` if the heartbeat has ever been stamped.
    pub fn has_heartbeat(&self) -> bool {
        self.last_heartbeat != 0
    }
}

// ---------------------------------------------------------------------------
// ClaimResult
// ---------------------------------------------------------------------------

/// Outcome of an atomic claim attempt against an existing row.
///
/// Exactly one of two concurrent claimants for the same row observes
/// [`Won`](ClaimResult::Won); the loser's conditional update matched
/// nothing and left the store untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimResult {
    /// This caller flipped the row; here is the payload it now owns.
    Won(Option<String>),

    /// The row's condition no longer held (someone else got there first,
    /// or the row state changed between read and claim).
    Lost,
}

impl ClaimResult {
    /// `true` if this caller won the claim.
    pub fn is_won(&self) -> bool {
        matches!(self, ClaimResult::Won(_))
    }
}

// ---------------------------------------------------------------------------
// Time base
// ---------------------------------------------------------------------------

/// Current wall-clock time in epoch milliseconds, the unit every
/// heartbeat in the store uses.
///
/// A clock before the epoch collapses to 0 rather than panicking; the
/// staleness check treats 0 as "unset", so a broken clock degrades to
/// never granting stale recovery instead of granting it spuriously.
pub fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

// =========================================================================
// Tests
// =========================================================================
