//! Session inactivity watchdog.
//!
//! Signs an idle user out after `idle_timeout_ms`, warning them
//! `warning_lead_ms` beforehand. [`SessionWatchdog`] is the synchronous
//! state machine; [`InactivityWatchdog`] drives it on a tokio task and
//! talks to the outside world through [`Notifier`] and [`SignOutAction`].

mod activity;
mod config;
mod driver;
mod machine;

pub use activity::ActivityKind;
pub use config::{WatchdogConfig, DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_WARNING_LEAD_MS};
pub use driver::{InactivityWatchdog, Notifier, SessionOutcome, SignOutAction, WatchdogStatus};
pub use machine::{SessionActivity, SessionWatchdog, WatchdogState};
