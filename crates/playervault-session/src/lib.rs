//! In-process ownership state tracking for Playervault.
//!
//! Each process keeps a private record of which players it is in the
//! middle of acquiring, which it owns, and which resolved payloads the
//! host has yet to pick up. Nothing here is shared across processes —
//! the shared truth lives in the record store.
//!
//! # How it fits in the stack
//!
//! ```text
//! Acquisition protocol (above)  ← publishes grant payloads here
//!     ↕
//! Session layer (this crate)    ← per-player ownership state + handoff
//!     ↕
//! Host (outside)                ← consumes each payload exactly once
//! ```

mod error;
mod state;
mod tracker;

pub use error::SessionError;
pub use state::{OwnershipState, SessionConfig};
pub use tracker::SessionTracker;
