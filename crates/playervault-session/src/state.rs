//! Ownership state machine and session-layer configuration.

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for the session tracker.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long (in seconds) a granted payload may sit unconsumed before
    /// the cleanup sweep discards it together with its ownership state.
    ///
    /// The host normally consumes a payload within milliseconds of the
    /// grant; a payload still parked here after minutes means the host
    /// lost track of the join, and keeping it would leak memory for the
    /// lifetime of the process. Default: 300 seconds. 0 means a sweep
    /// discards any unconsumed payload it finds.
    pub pending_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pending_ttl_secs: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// OwnershipState
// ---------------------------------------------------------------------------

/// Where a player's join attempt stands inside this process.
///
/// ```text
/// Unclaimed ──(begin_join)──→ JoinInProgress ──(record_join)──→ JoinDone
///     ↑                             │
///     └──────(abort_join / end_session)──────────────────────────────┘
/// ```
///
/// - **Unclaimed**: this process holds nothing for the player. Absence
///   from the tracker means the same thing.
/// - **JoinInProgress**: an acquisition attempt is running. Every attempt
///   resolves — to `JoinDone` on a grant, or back to `Unclaimed` on a
///   deny — so nothing stays here forever.
/// - **JoinDone**: this process owns the player's data for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipState {
    /// No claim and no attempt in flight.
    Unclaimed,

    /// An acquisition attempt started and has not yet resolved.
    JoinInProgress,

    /// The acquisition granted; this process owns the player until the
    /// session ends.
    JoinDone,
}
