use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::{Args, Subcommand};
use orderdesk_core::urgency::BoardRow;
use orderdesk_core::{
    classify, Config, FileSource, OrderBoard, OrderPoller, OrderSource, OrderState, OrdersClient,
    UrgencyLevel,
};
use tokio::sync::watch;

#[derive(Subcommand)]
pub enum OrdersAction {
    /// Classify one order state at a given age
    Classify {
        /// Order state (unknown values are accepted and rank last)
        state: OrderState,
        /// Minutes since the order was created
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Classify and sort the current orders
    Board {
        #[command(flatten)]
        source: SourceArgs,
        /// Only show rows at or above this level
        #[arg(long)]
        min_level: Option<UrgencyLevel>,
        /// Print the board as JSON
        #[arg(long)]
        json: bool,
    },
    /// Refresh the board on the configured polling interval
    Watch {
        #[command(flatten)]
        source: SourceArgs,
        /// Override orders.poll_interval_secs
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[derive(Args)]
pub struct SourceArgs {
    /// Read orders from a JSON file instead of the API
    #[arg(long)]
    file: Option<PathBuf>,
}

pub fn run(action: OrdersAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        OrdersAction::Classify { state, minutes } => {
            let level = classify(state, minutes);
            println!("{level}");
        }
        OrdersAction::Board {
            source,
            min_level,
            json,
        } => {
            let config = Config::load_or_default();
            let rt = super::runtime()?;
            let board = match source.file {
                Some(path) => rt.block_on(fetch_board(FileSource::new(path)))?,
                None => rt.block_on(fetch_board(OrdersClient::from_config(&config.api)?))?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                print_board(&board, min_level.unwrap_or(UrgencyLevel::Normal));
            }
        }
        OrdersAction::Watch {
            source,
            interval_secs,
        } => {
            let config = Config::load_or_default();
            let interval = interval_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.orders.poll_interval());
            if interval.is_zero() {
                return Err("interval must be greater than zero".into());
            }
            let rt = super::runtime()?;
            match source.file {
                Some(path) => rt.block_on(watch_board(FileSource::new(path), interval)),
                None => rt.block_on(watch_board(
                    OrdersClient::from_config(&config.api)?,
                    interval,
                )),
            }
        }
    }
    Ok(())
}

async fn fetch_board<S: OrderSource>(source: S) -> orderdesk_core::error::Result<OrderBoard> {
    let orders = source.fetch_orders().await?;
    Ok(OrderBoard::build(&orders, Utc::now()))
}

async fn watch_board<S: OrderSource>(source: S, interval: Duration) {
    let poller = OrderPoller::new(source, interval);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let stop = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for ctrl-c, polling until killed");
            std::future::pending::<()>().await;
        }
        let _ = shutdown_tx.send(true);
    };

    tokio::join!(poller.run(|board| print_summary(&board), shutdown_rx), stop);
}

fn print_board(board: &OrderBoard, min_level: UrgencyLevel) {
    println!(
        "{:<12} {:<11} {:<9} {:>9}  URGENCY",
        "ID", "STATE", "TYPE", "AGE"
    );
    for row in board.at_least(min_level) {
        println!("{}", format_row(row));
    }
    print_summary(board);
}

fn format_row(row: &BoardRow) -> String {
    format!(
        "{:<12} {:<11} {:<9} {:>9}  {}",
        row.id,
        row.state.as_str(),
        row.fulfillment_type.as_str(),
        row.elapsed_label,
        row.urgency
    )
}

fn print_summary(board: &OrderBoard) {
    let counts: Vec<String> = board
        .by_urgency
        .iter()
        .map(|(level, count)| format!("{level}={count}"))
        .collect();
    println!(
        "[{}] {} orders, {}",
        board.generated_at.format("%H:%M:%S"),
        board.len(),
        counts.join(" ")
    );
}
