//! Unified error type for the Playervault meta-crate.

use playervault_session::SessionError;
use playervault_store::StoreError;

/// Top-level error that wraps all crate-specific errors.
///
/// Note that [`acquire`](crate::OwnershipManager::acquire) never returns
/// this: its external contract is grant-or-deny only, and store failures
/// are absorbed into a deny. This type surfaces on the operations that do
/// propagate, like the release path.
#[derive(Debug, thiserror::Error)]
pub enum PlayervaultError {
    /// A record-store error (connection, query).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A session-tracker error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A background task running blocking store I/O panicked or was
    /// cancelled before completing.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
