//! The boundary to the host's single-threaded main loop.
//!
//! The acquisition protocol runs on worker tasks, but a rejection has to
//! touch host-owned state (the live player session) that only the host's
//! main loop may mutate. So rejections are not performed inline: they are
//! posted as commands onto a FIFO channel whose receiver the host drains
//! from its main loop.

use playervault_store::PlayerId;
use tokio::sync::mpsc;

/// The fixed message shown to a player whose join was denied.
pub const KICK_MESSAGE: &str =
    "Your data is still in use on another server. Please rejoin in a few minutes.";

/// An action the host must perform on its main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Disconnect the player with the given message.
    ///
    /// If the player is no longer resolvable by the time the host runs
    /// this (they already disconnected on their own), the host must treat
    /// it as a no-op, not an error.
    Kick { player: PlayerId, reason: String },
}

/// Cloneable sender half of the main-loop command channel.
#[derive(Debug, Clone)]
pub struct HostHandle {
    tx: mpsc::UnboundedSender<HostCommand>,
}

impl HostHandle {
    /// Creates the command channel. The returned receiver belongs to the
    /// host's main loop; commands arrive in the order they were posted.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<HostCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Schedules a disconnect on the host's main loop.
    ///
    /// If the host loop is already gone (shutdown race), the command is
    /// dropped silently — there is nobody left to kick.
    pub fn kick(&self, player: PlayerId, reason: impl Into<String>) {
        let command = HostCommand::Kick {
            player,
            reason: reason.into(),
        };
        if self.tx.send(command).is_err() {
            tracing::debug!(%player, "host loop closed, kick dropped");
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
