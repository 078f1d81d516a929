//! Acquisition protocol configuration.

/// Tunables for the ownership acquisition protocol.
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// How old (in whole wall-clock minutes) a claimed record's heartbeat
    /// must be before the previous owner is presumed crashed and the
    /// claim may be overridden.
    ///
    /// Measured with minute granularity: a lease is stale once strictly
    /// more than this many whole minutes have passed. An unset heartbeat
    /// (0) is never stale regardless of this value. Default: 5.
    pub stale_after_mins: i64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self { stale_after_mins: 5 }
    }
}
