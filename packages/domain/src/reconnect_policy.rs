//! Recovery budget for session-scoped faults.
use serde::{Deserialize, Serialize};

/// How many reconnect attempts a session-scoped failure is granted before
/// the session is discarded and the next acquire performs a fresh handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Reconnect attempts per failure. The default of one attempt keeps
    /// recovery bounded; raise it for flakier transports.
    pub attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { attempts: 1 }
    }
}

impl ReconnectPolicy {
    pub fn with_attempts(attempts: u32) -> Self {
        Self { attempts }
    }
}
