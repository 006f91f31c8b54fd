use serde::{Deserialize, Serialize};

use super::ActivityKind;
use crate::error::ValidationError;

pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 5 * 60 * 1000;
pub const DEFAULT_WARNING_LEAD_MS: u64 = 30 * 1000;

/// Idle thresholds and the signals that reset them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogConfig {
    /// Total idle time before forced sign-out.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    /// How long before sign-out the warning fires.
    #[serde(default = "default_warning_lead_ms")]
    pub warning_lead_ms: u64,
    #[serde(default = "default_activity_events")]
    pub activity_events: Vec<ActivityKind>,
    /// Overrides the generated warning text.
    #[serde(default)]
    pub warning_message: Option<String>,
}

fn default_idle_timeout_ms() -> u64 {
    DEFAULT_IDLE_TIMEOUT_MS
}
fn default_warning_lead_ms() -> u64 {
    DEFAULT_WARNING_LEAD_MS
}
fn default_activity_events() -> Vec<ActivityKind> {
    ActivityKind::ALL.to_vec()
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            warning_lead_ms: default_warning_lead_ms(),
            activity_events: default_activity_events(),
            warning_message: None,
        }
    }
}

impl WatchdogConfig {
    pub fn with_timeouts(idle_timeout_ms: u64, warning_lead_ms: u64) -> Self {
        Self {
            idle_timeout_ms,
            warning_lead_ms,
            ..Self::default()
        }
    }

    /// Idle time before the warning fires.
    pub fn warning_delay_ms(&self) -> u64 {
        self.idle_timeout_ms.saturating_sub(self.warning_lead_ms)
    }

    pub fn recognizes(&self, kind: ActivityKind) -> bool {
        self.activity_events.contains(&kind)
    }

    pub fn warning_text(&self) -> String {
        match &self.warning_message {
            Some(message) => message.clone(),
            None => format!(
                "You will be signed out in {} seconds due to inactivity.",
                self.warning_lead_ms.div_ceil(1000)
            ),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.idle_timeout_ms == 0 {
            return Err(ValidationError::InvalidValue {
                field: "watchdog.idle_timeout_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.warning_lead_ms >= self.idle_timeout_ms {
            return Err(ValidationError::WarningLeadTooLong {
                lead_ms: self.warning_lead_ms,
                idle_ms: self.idle_timeout_ms,
            });
        }
        if self.activity_events.is_empty() {
            return Err(ValidationError::EmptyCollection(
                "watchdog.activity_events".into(),
            ));
        }
        Ok(())
    }
}
