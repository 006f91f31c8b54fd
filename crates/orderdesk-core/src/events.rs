use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transitions reported by the watchdog state machine.
/// The presentation layer renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        idle_timeout_ms: u64,
        warning_lead_ms: u64,
        at: DateTime<Utc>,
    },
    /// Idle long enough that sign-out is `remaining_ms` away.
    IdleWarning {
        remaining_ms: u64,
        message: String,
        at: DateTime<Utc>,
    },
    /// Activity arrived while the warning was showing.
    WarningCleared {
        at: DateTime<Utc>,
    },
    AutoSignOut {
        idle_ms: u64,
        at: DateTime<Utc>,
    },
    /// The user signed out before the timeout.
    SignedOut {
        at: DateTime<Utc>,
    },
}
