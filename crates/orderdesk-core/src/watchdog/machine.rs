//! Inactivity state machine.
//!
//! Like the rest of the crate's timers this is a wall-clock state machine
//! with no thread of its own: the owner feeds it activity and calls
//! `tick(now)` at (or after) [`SessionWatchdog::next_deadline`].
//!
//! ## State Transitions
//!
//! ```text
//! Inactive -> Running <-> Warning -> Terminated -> Inactive
//!                 \__________________/
//!                    manual sign-out
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{ActivityKind, WatchdogConfig};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchdogState {
    /// No session.
    Inactive,
    /// Timers armed, no warning shown.
    Running,
    /// Warning shown, sign-out still armed.
    Warning,
    /// Session ended; waiting for teardown.
    Terminated,
}

/// Activity bookkeeping for the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionActivity {
    pub last_activity_at: DateTime<Utc>,
    pub warning_shown: bool,
}

/// Per-session idle watchdog.
///
/// Holds at most one warning deadline and one sign-out deadline. Arming
/// always drops the previous pair first.
#[derive(Debug, Clone)]
pub struct SessionWatchdog {
    config: WatchdogConfig,
    state: WatchdogState,
    session: Option<SessionActivity>,
    warning_at: Option<DateTime<Utc>>,
    logout_at: Option<DateTime<Utc>>,
}

impl SessionWatchdog {
    pub fn new(config: WatchdogConfig) -> Self {
        Self {
            config,
            state: WatchdogState::Inactive,
            session: None,
            warning_at: None,
            logout_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> WatchdogState {
        self.state
    }

    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&SessionActivity> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, WatchdogState::Running | WatchdogState::Warning)
    }

    /// Number of armed deadlines (0, 1 or 2).
    pub fn pending_timers(&self) -> usize {
        usize::from(self.warning_at.is_some()) + usize::from(self.logout_at.is_some())
    }

    pub fn warning_deadline(&self) -> Option<DateTime<Utc>> {
        self.warning_at
    }

    pub fn logout_deadline(&self) -> Option<DateTime<Utc>> {
        self.logout_at
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        match (self.warning_at, self.logout_at) {
            (Some(w), Some(l)) => Some(w.min(l)),
            (w, l) => w.or(l),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin watching a freshly authenticated session.
    ///
    /// A no-op while a session is already being watched. A terminated
    /// session is torn down first.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            WatchdogState::Running | WatchdogState::Warning => None,
            WatchdogState::Inactive | WatchdogState::Terminated => {
                self.teardown();
                self.arm(now);
                Some(Event::SessionStarted {
                    idle_timeout_ms: self.config.idle_timeout_ms,
                    warning_lead_ms: self.config.warning_lead_ms,
                    at: now,
                })
            }
        }
    }

    /// Observe one user interaction.
    ///
    /// Re-arms both deadlines from `now`. Returns `WarningCleared` when the
    /// warning was showing. Kinds outside the configured set are ignored.
    pub fn record_activity(&mut self, kind: ActivityKind, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_active() || !self.config.recognizes(kind) {
            return None;
        }
        let was_warning = self.state == WatchdogState::Warning;
        self.arm(now);
        was_warning.then_some(Event::WarningCleared { at: now })
    }

    /// Fire the deadlines that have passed.
    ///
    /// Returns at most one event per call. A caller that fell behind (both
    /// deadlines in the past) gets the warning first, then the sign-out on
    /// the next call.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            WatchdogState::Running => {
                let due = self.warning_at.is_some_and(|at| now >= at);
                if !due {
                    return None;
                }
                self.warning_at = None;
                self.state = WatchdogState::Warning;
                if let Some(session) = self.session.as_mut() {
                    session.warning_shown = true;
                }
                let remaining_ms = self
                    .logout_at
                    .map(|at| (at - now).num_milliseconds().max(0) as u64)
                    .unwrap_or(0);
                Some(Event::IdleWarning {
                    remaining_ms,
                    message: self.config.warning_text(),
                    at: now,
                })
            }
            WatchdogState::Warning => {
                let due = self.logout_at.is_some_and(|at| now >= at);
                if !due {
                    return None;
                }
                let idle_ms = self
                    .session
                    .as_ref()
                    .map(|s| (now - s.last_activity_at).num_milliseconds().max(0) as u64)
                    .unwrap_or(self.config.idle_timeout_ms);
                self.terminate();
                Some(Event::AutoSignOut { idle_ms, at: now })
            }
            WatchdogState::Inactive | WatchdogState::Terminated => None,
        }
    }

    /// The user signed out on their own. Cancels both deadlines at once.
    pub fn sign_out(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        self.terminate();
        Some(Event::SignedOut { at: now })
    }

    /// Release everything and go dormant until the next `start`.
    pub fn teardown(&mut self) {
        self.disarm();
        self.session = None;
        self.state = WatchdogState::Inactive;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn arm(&mut self, now: DateTime<Utc>) {
        self.disarm();
        self.warning_at = Some(after(now, self.config.warning_delay_ms()));
        self.logout_at = Some(after(now, self.config.idle_timeout_ms));
        self.session = Some(SessionActivity {
            last_activity_at: now,
            warning_shown: false,
        });
        self.state = WatchdogState::Running;
    }

    fn disarm(&mut self) {
        self.warning_at = None;
        self.logout_at = None;
    }

    fn terminate(&mut self) {
        self.disarm();
        self.session = None;
        self.state = WatchdogState::Terminated;
    }
}

fn after(now: DateTime<Utc>, ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .and_then(|delay| now.checked_add_signed(delay))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: i64) -> Duration {
        Duration::milliseconds(n)
    }

    fn started() -> (SessionWatchdog, DateTime<Utc>) {
        let mut wd = SessionWatchdog::new(WatchdogConfig::default());
        let t0 = Utc::now();
        assert!(matches!(wd.start(t0), Some(Event::SessionStarted { .. })));
        (wd, t0)
    }

    #[test]
    fn start_arms_both_deadlines() {
        let (wd, t0) = started();
        assert_eq!(wd.state(), WatchdogState::Running);
        assert_eq!(wd.pending_timers(), 2);
        assert_eq!(wd.warning_deadline(), Some(t0 + ms(270_000)));
        assert_eq!(wd.logout_deadline(), Some(t0 + ms(300_000)));
        assert_eq!(wd.next_deadline(), wd.warning_deadline());
    }

    #[test]
    fn start_while_running_is_noop() {
        let (mut wd, t0) = started();
        assert!(wd.start(t0 + ms(1_000)).is_none());
        assert_eq!(wd.warning_deadline(), Some(t0 + ms(270_000)));
    }

    #[test]
    fn warning_fires_once_at_threshold() {
        let (mut wd, t0) = started();
        assert!(wd.tick(t0 + ms(269_999)).is_none());
        match wd.tick(t0 + ms(270_000)) {
            Some(Event::IdleWarning { remaining_ms, message, .. }) => {
                assert_eq!(remaining_ms, 30_000);
                assert!(message.contains("30 seconds"));
            }
            other => panic!("expected IdleWarning, got {other:?}"),
        }
        assert_eq!(wd.state(), WatchdogState::Warning);
        assert!(wd.session().unwrap().warning_shown);
        assert!(wd.tick(t0 + ms(280_000)).is_none());
        assert_eq!(wd.pending_timers(), 1);
    }

    #[test]
    fn activity_before_warning_restarts_window() {
        let (mut wd, t0) = started();
        let t1 = t0 + ms(269_999);
        assert!(wd.record_activity(ActivityKind::MouseMove, t1).is_none());
        assert!(wd.tick(t0 + ms(270_000)).is_none());
        assert_eq!(wd.state(), WatchdogState::Running);
        assert_eq!(wd.warning_deadline(), Some(t1 + ms(270_000)));
        assert_eq!(wd.pending_timers(), 2);
    }

    #[test]
    fn activity_during_warning_returns_to_running() {
        let (mut wd, t0) = started();
        wd.tick(t0 + ms(270_000));
        let t1 = t0 + ms(290_000);
        assert!(matches!(
            wd.record_activity(ActivityKind::KeyPress, t1),
            Some(Event::WarningCleared { .. })
        ));
        assert_eq!(wd.state(), WatchdogState::Running);
        assert!(!wd.session().unwrap().warning_shown);
        assert!(wd.tick(t0 + ms(300_000)).is_none());
        assert_eq!(wd.logout_deadline(), Some(t1 + ms(300_000)));
    }

    #[test]
    fn full_idle_signs_out_exactly_once() {
        let (mut wd, t0) = started();
        assert!(matches!(wd.tick(t0 + ms(270_000)), Some(Event::IdleWarning { .. })));
        match wd.tick(t0 + ms(300_000)) {
            Some(Event::AutoSignOut { idle_ms, .. }) => assert_eq!(idle_ms, 300_000),
            other => panic!("expected AutoSignOut, got {other:?}"),
        }
        assert_eq!(wd.state(), WatchdogState::Terminated);
        assert_eq!(wd.pending_timers(), 0);
        assert!(wd.tick(t0 + ms(600_000)).is_none());
        assert!(wd.record_activity(ActivityKind::Click, t0 + ms(600_000)).is_none());
    }

    #[test]
    fn late_tick_catches_up_in_order() {
        let (mut wd, t0) = started();
        let late = t0 + ms(400_000);
        assert!(matches!(wd.tick(late), Some(Event::IdleWarning { remaining_ms: 0, .. })));
        assert!(matches!(wd.tick(late), Some(Event::AutoSignOut { .. })));
        assert!(wd.tick(late).is_none());
    }

    #[test]
    fn manual_sign_out_cancels_timers() {
        let (mut wd, t0) = started();
        wd.tick(t0 + ms(270_000));
        assert!(matches!(
            wd.sign_out(t0 + ms(271_000)),
            Some(Event::SignedOut { .. })
        ));
        assert_eq!(wd.pending_timers(), 0);
        assert!(wd.tick(t0 + ms(300_000)).is_none());
        assert!(wd.sign_out(t0 + ms(300_000)).is_none());
    }

    #[test]
    fn new_session_is_unaffected_by_previous() {
        let (mut wd, t0) = started();
        wd.tick(t0 + ms(270_000));
        wd.tick(t0 + ms(300_000));
        assert_eq!(wd.state(), WatchdogState::Terminated);

        let t1 = t0 + ms(1_000_000);
        assert!(wd.start(t1).is_some());
        assert_eq!(wd.state(), WatchdogState::Running);
        assert!(!wd.session().unwrap().warning_shown);
        assert_eq!(wd.warning_deadline(), Some(t1 + ms(270_000)));
        assert!(wd.tick(t1 + ms(269_999)).is_none());
    }

    #[test]
    fn unrecognized_activity_is_ignored() {
        let mut wd = SessionWatchdog::new(WatchdogConfig {
            activity_events: vec![ActivityKind::KeyPress],
            ..WatchdogConfig::default()
        });
        let t0 = Utc::now();
        wd.start(t0);
        wd.record_activity(ActivityKind::MouseMove, t0 + ms(200_000));
        assert!(wd.tick(t0 + ms(270_000)).is_some());
    }

    #[test]
    fn teardown_releases_everything() {
        let (mut wd, _) = started();
        wd.teardown();
        assert_eq!(wd.state(), WatchdogState::Inactive);
        assert_eq!(wd.pending_timers(), 0);
        assert!(wd.session().is_none());
        assert!(wd.next_deadline().is_none());
    }

    #[test]
    fn activity_without_session_is_ignored() {
        let mut wd = SessionWatchdog::new(WatchdogConfig::default());
        assert!(wd.record_activity(ActivityKind::Click, Utc::now()).is_none());
        assert_eq!(wd.state(), WatchdogState::Inactive);
        assert_eq!(wd.pending_timers(), 0);
    }
}
