//! Async driver for [`SessionWatchdog`].
//!
//! Each attached session runs on one tokio task that owns the state
//! machine. Activity, manual sign-out and detach arrive over an unbounded
//! channel and are handled in arrival order; between messages the task
//! sleeps until the next deadline. A reset replaces the deadline inside the
//! same loop iteration, so a stale timer can never fire after it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{ActivityKind, SessionWatchdog, WatchdogConfig, WatchdogState};
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result};
use crate::events::Event;

/// Toast sink for the pre-logout warning.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, message: &str);
}

/// Ends the user's session once the idle timeout expires.
///
/// Called at most once per session and never retried.
pub trait SignOutAction: Send + Sync + 'static {
    fn sign_out(&self) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// How an attached session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Idle timeout expired and the sign-out action ran.
    TimedOut,
    /// The user signed out.
    SignedOut,
    /// The owner detached the watchdog.
    Detached,
}

/// Published after every handled message or deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogStatus {
    pub state: WatchdogState,
    pub pending_timers: usize,
    pub warning_shown: bool,
}

impl WatchdogStatus {
    fn of(machine: &SessionWatchdog) -> Self {
        Self {
            state: machine.state(),
            pending_timers: machine.pending_timers(),
            warning_shown: machine.session().is_some_and(|s| s.warning_shown),
        }
    }

    const DORMANT: WatchdogStatus = WatchdogStatus {
        state: WatchdogState::Inactive,
        pending_timers: 0,
        warning_shown: false,
    };
}

enum Command {
    Activity(ActivityKind),
    SignOut,
    Detach,
}

struct SessionTask {
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<WatchdogStatus>,
    task: JoinHandle<Result<SessionOutcome>>,
}

/// Idle-session watchdog with an explicit attach/detach lifecycle.
///
/// Instances are independent; tests can run several side by side. Dropping
/// the watchdog aborts its session task, so no callback outlives it.
pub struct InactivityWatchdog {
    config: WatchdogConfig,
    notifier: Arc<dyn Notifier>,
    sign_out: Arc<dyn SignOutAction>,
    clock: Arc<dyn Clock>,
    session: Option<SessionTask>,
}

impl InactivityWatchdog {
    /// # Errors
    /// Returns a validation error when `config` would warn immediately or
    /// never recognize any activity.
    pub fn new(
        config: WatchdogConfig,
        notifier: Arc<dyn Notifier>,
        sign_out: Arc<dyn SignOutAction>,
    ) -> Result<Self> {
        Self::with_clock(config, notifier, sign_out, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: WatchdogConfig,
        notifier: Arc<dyn Notifier>,
        sign_out: Arc<dyn SignOutAction>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            notifier,
            sign_out,
            clock,
            session: None,
        })
    }

    /// Start watching a new session. Must be called inside a tokio runtime.
    ///
    /// Any session still attached is aborted first, so at most one timer
    /// pair exists per watchdog.
    pub fn attach(&mut self) {
        self.abort();

        let base = TimeBase::new(self.clock.now());
        let mut machine = SessionWatchdog::new(self.config.clone());
        if let Some(Event::SessionStarted {
            idle_timeout_ms,
            warning_lead_ms,
            ..
        }) = machine.start(base.wall)
        {
            tracing::info!(idle_timeout_ms, warning_lead_ms, "session watchdog attached");
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(WatchdogStatus::of(&machine));
        let task = tokio::spawn(run_session(
            machine,
            base,
            rx,
            status_tx,
            Arc::clone(&self.notifier),
            Arc::clone(&self.sign_out),
        ));
        self.session = Some(SessionTask { tx, status, task });
    }

    pub fn is_attached(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.task.is_finished())
    }

    /// Report one user interaction. Returns false when no session is live.
    pub fn record_activity(&self, kind: ActivityKind) -> bool {
        match &self.session {
            Some(session) => session.tx.send(Command::Activity(kind)).is_ok(),
            None => false,
        }
    }

    /// Latest published status; dormant when nothing is attached.
    pub fn status(&self) -> WatchdogStatus {
        self.session
            .as_ref()
            .map(|s| *s.status.borrow())
            .unwrap_or(WatchdogStatus::DORMANT)
    }

    /// Status updates for the attached session. The channel closes when
    /// the session task ends.
    pub fn subscribe(&self) -> Option<watch::Receiver<WatchdogStatus>> {
        self.session.as_ref().map(|s| s.status.clone())
    }

    pub fn state(&self) -> WatchdogState {
        self.status().state
    }

    pub fn pending_timers(&self) -> usize {
        self.status().pending_timers
    }

    /// Manual sign-out: cancels both timers and ends the session.
    ///
    /// The sign-out action is the caller's own; the watchdog does not run it.
    pub async fn sign_out(&mut self) -> Result<Option<SessionOutcome>> {
        self.finish(Command::SignOut).await
    }

    /// Stop watching and release every timer.
    pub async fn detach(&mut self) -> Result<Option<SessionOutcome>> {
        self.finish(Command::Detach).await
    }

    /// Wait for the attached session to end on its own.
    ///
    /// Returns `None` when nothing is attached. A failing sign-out action
    /// surfaces here as [`CoreError::SignOut`].
    pub async fn wait(&mut self) -> Result<Option<SessionOutcome>> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        let outcome = session.task.await??;
        Ok(Some(outcome))
    }

    async fn finish(&mut self, command: Command) -> Result<Option<SessionOutcome>> {
        let Some(session) = self.session.take() else {
            return Ok(None);
        };
        // A send error means the task already ended; its result is still joinable.
        let _ = session.tx.send(command);
        let outcome = session.task.await??;
        Ok(Some(outcome))
    }

    fn abort(&mut self) {
        if let Some(session) = self.session.take() {
            session.task.abort();
            tracing::debug!("previous watchdog session aborted");
        }
    }
}

impl Drop for InactivityWatchdog {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Maps wall-clock deadlines onto the tokio clock.
///
/// Anchored once per session, so paused tokio time in tests moves the
/// state machine's notion of "now" too.
#[derive(Debug, Clone, Copy)]
struct TimeBase {
    wall: DateTime<Utc>,
    instant: Instant,
}

impl TimeBase {
    fn new(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            instant: Instant::now(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.instant.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.wall + elapsed
    }

    fn instant_for(&self, at: DateTime<Utc>) -> Instant {
        let offset = (at - self.wall).to_std().unwrap_or(std::time::Duration::ZERO);
        self.instant + offset
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run_session(
    mut machine: SessionWatchdog,
    base: TimeBase,
    mut rx: mpsc::UnboundedReceiver<Command>,
    status: watch::Sender<WatchdogStatus>,
    notifier: Arc<dyn Notifier>,
    sign_out: Arc<dyn SignOutAction>,
) -> Result<SessionOutcome> {
    loop {
        let deadline = machine.next_deadline().map(|at| base.instant_for(at));

        tokio::select! {
            // Messages first: activity that arrived by the deadline wins.
            biased;

            command = rx.recv() => match command {
                Some(Command::Activity(kind)) => {
                    if let Some(Event::WarningCleared { .. }) = machine.record_activity(kind, base.now()) {
                        tracing::info!(%kind, "activity during warning, idle window restarted");
                    }
                }
                Some(Command::SignOut) => {
                    if machine.sign_out(base.now()).is_some() {
                        tracing::info!("manual sign-out, watchdog timers cancelled");
                    }
                    machine.teardown();
                    status.send_replace(WatchdogStatus::of(&machine));
                    return Ok(SessionOutcome::SignedOut);
                }
                Some(Command::Detach) | None => {
                    machine.teardown();
                    status.send_replace(WatchdogStatus::of(&machine));
                    tracing::debug!("session watchdog detached");
                    return Ok(SessionOutcome::Detached);
                }
            },

            _ = sleep_until(deadline) => {
                let now = base.now();
                while let Some(event) = machine.tick(now) {
                    match event {
                        Event::IdleWarning { remaining_ms, message, .. } => {
                            tracing::warn!(remaining_ms, "idle warning shown");
                            notifier.notify(&message);
                        }
                        Event::AutoSignOut { idle_ms, .. } => {
                            tracing::warn!(idle_ms, "idle timeout reached, signing out");
                            machine.teardown();
                            status.send_replace(WatchdogStatus::of(&machine));
                            return match sign_out.sign_out() {
                                Ok(()) => Ok(SessionOutcome::TimedOut),
                                Err(e) => {
                                    tracing::error!(error = %e, "sign-out action failed");
                                    Err(CoreError::SignOut { message: e.to_string() })
                                }
                            };
                        }
                        _ => {}
                    }
                }
            }
        }

        status.send_replace(WatchdogStatus::of(&machine));
    }
}
