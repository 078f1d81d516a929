//! The result of an ownership acquisition attempt.

use serde::{Deserialize, Serialize};

/// What the acquisition protocol decided for one join attempt.
///
/// Grant variants carry the payload the caller now owns. A player who has
/// never had data saved gets the empty string, so the host's load path
/// never has to distinguish "no blob" from "empty blob".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// No record existed; a claimed row was created for the player.
    GrantFresh,

    /// The record existed and was offline; this process claimed it.
    GrantExisting(String),

    /// The record was claimed, but its lease was stale — the previous
    /// owner is presumed crashed and the claim was overridden.
    GrantStaleRecovery(String),

    /// Another process actively owns the player, or the store could not
    /// be consulted. The join attempt must be rejected.
    Deny,
}

impl Outcome {
    /// `true` for any of the three grant variants.
    pub fn is_grant(&self) -> bool {
        !matches!(self, Outcome::Deny)
    }

    /// The payload granted to the caller, or `None` on a deny.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Outcome::GrantFresh => Some(""),
            Outcome::GrantExisting(p) | Outcome::GrantStaleRecovery(p) => Some(p),
            Outcome::Deny => None,
        }
    }
}
