use std::sync::Arc;

use clap::Subcommand;
use orderdesk_core::watchdog::WatchdogStatus;
use orderdesk_core::{
    ActivityKind, Config, InactivityWatchdog, Notifier, SessionOutcome, SignOutAction,
    WatchdogConfig, WatchdogState,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run a watchdog against stdin; each line counts as activity
    ///
    /// A line naming an activity kind (mousedown, mousemove, keypress,
    /// scroll, touchstart, click) is reported as that kind, anything else
    /// as a keypress. "logout" signs out; end of input detaches.
    Watch {
        /// Override watchdog.idle_timeout_ms
        #[arg(long)]
        idle_timeout_ms: Option<u64>,
        /// Override watchdog.warning_lead_ms
        #[arg(long)]
        warning_lead_ms: Option<u64>,
    },
    /// Print the effective watchdog settings as JSON
    Show,
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("warning: {message}");
    }
}

struct PrintSignOut;

impl SignOutAction for PrintSignOut {
    fn sign_out(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("signed out due to inactivity");
        Ok(())
    }
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default().watchdog;
    match action {
        SessionAction::Watch {
            idle_timeout_ms,
            warning_lead_ms,
        } => {
            if let Some(ms) = idle_timeout_ms {
                config.idle_timeout_ms = ms;
            }
            if let Some(ms) = warning_lead_ms {
                config.warning_lead_ms = ms;
            }
            let rt = super::runtime()?;
            let result = rt.block_on(watch_session(config));
            // stdin reads run on a blocking thread that would hold up a normal drop.
            rt.shutdown_background();
            result
        }
        SessionAction::Show => {
            let json = serde_json::json!({
                "idle_timeout_ms": config.idle_timeout_ms,
                "warning_lead_ms": config.warning_lead_ms,
                "warning_delay_ms": config.warning_delay_ms(),
                "activity_events": config.activity_events,
                "warning_message": config.warning_text(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
            Ok(())
        }
    }
}

async fn watch_session(config: WatchdogConfig) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!(
        "watching session: warning after {} ms idle, sign-out after {} ms",
        config.warning_delay_ms(),
        config.idle_timeout_ms
    );

    let mut wd = InactivityWatchdog::new(config, Arc::new(StderrNotifier), Arc::new(PrintSignOut))?;
    wd.attach();
    let mut status = wd.subscribe().ok_or("watchdog not attached")?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let outcome = loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == "logout" => break wd.sign_out().await?,
                Some(line) => {
                    let kind = line.trim().parse().unwrap_or(ActivityKind::KeyPress);
                    if !wd.record_activity(kind) {
                        break wd.wait().await?;
                    }
                }
                None => break wd.detach().await?,
            },
            changed = status.changed() => {
                let current: WatchdogStatus = *status.borrow();
                if changed.is_err() || current.state == WatchdogState::Inactive {
                    break wd.wait().await?;
                }
                tracing::debug!(state = ?current.state, timers = current.pending_timers, "watchdog status");
            }
        }
    };

    match outcome {
        Some(SessionOutcome::TimedOut) => eprintln!("session ended: idle timeout"),
        Some(SessionOutcome::SignedOut) => println!("signed out"),
        Some(SessionOutcome::Detached) | None => eprintln!("session ended: watchdog detached"),
    }
    Ok(())
}
