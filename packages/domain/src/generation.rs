//! Session generation marker.
use serde::{Deserialize, Serialize};

/// Monotonically increasing counter stamped on each session the coordinator
/// creates.
///
/// Asynchronous callbacks record the generation they were issued against and
/// compare it at delivery time, so results targeting a session that has been
/// reset in the meantime can be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// Create a generation marker from a raw counter value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the underlying counter value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}
