//! # OrderDesk Core Library
//!
//! Core logic behind the OrderDesk restaurant admin panel. The panel itself
//! (menus, customers, analytics screens) talks to the REST back end
//! directly; this crate holds the parts with temporal rules worth testing.
//!
//! ## Architecture
//!
//! - **Urgency**: pure classification of orders by state and age, plus the
//!   display ordering and dashboard board built on it
//! - **Watchdog**: a wall-clock state machine that warns, then signs out,
//!   an idle session, and an async driver that runs it on a tokio task
//! - **Storage**: TOML-based configuration
//! - **API**: order sources (HTTP, file) and a fixed-interval poller
//!
//! ## Key Components
//!
//! - [`classify`]: `(state, elapsed minutes) -> UrgencyLevel`
//! - [`OrderBoard`]: a classified, display-sorted snapshot
//! - [`SessionWatchdog`]: idle state machine
//! - [`InactivityWatchdog`]: attach/detach session watchdog
//! - [`Config`]: application configuration management

pub mod api;
pub mod clock;
pub mod error;
pub mod events;
pub mod order;
pub mod storage;
pub mod urgency;
pub mod watchdog;

pub use api::{FileSource, OrderPoller, OrderSource, OrdersClient, StaticSource};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ApiError, ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use order::{FulfillmentType, Order, OrderState};
pub use storage::Config;
pub use urgency::{classify, classify_order, display_order, sort_for_display, OrderBoard, UrgencyLevel};
pub use watchdog::{
    ActivityKind, InactivityWatchdog, Notifier, SessionOutcome, SessionWatchdog, SignOutAction,
    WatchdogConfig, WatchdogState,
};
