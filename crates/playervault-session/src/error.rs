//! Error types for the session layer.

use playervault_store::PlayerId;

/// Errors from the in-process session tracker.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No ownership state exists for the given player — the operation
    /// assumed a join attempt that was never started (or already ended).
    #[error("no ownership state for player {0}")]
    NotTracked(PlayerId),
}
