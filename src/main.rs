// src/main.rs - Print statistics host entry point
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::{mpsc, oneshot};

use printwatch_rs::clock::HostClock;
use printwatch_rs::config;
use printwatch_rs::motion::SharedGcodeMove;
use printwatch_rs::print_stats::PrintStats;
use printwatch_rs::web;
use printwatch_rs::web::stats_channel::{self, StatsRequest};

#[derive(Parser, Debug)]
#[command(name = "printwatch-host", about = "Print job statistics host")]
struct Args {
    /// Path to the host configuration file
    #[arg(short, long, default_value = "printwatch.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    tracing::info!("Starting printwatch print statistics host");
    tracing::info!("Loading configuration from: {}", args.config);

    let config = config::load_config(&args.config).map_err(|e| {
        tracing::error!("Failed to load config from '{}': {}", args.config, e);
        tracing::error!("Please ensure the configuration file exists and is properly formatted");
        Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
    })?;

    tracing::info!("Host: {}", config.host.name);
    tracing::info!("Status poll interval: {} ms", config.stats.status_interval_ms);

    // The motion subsystem attaches to the writer half of this handle;
    // the tracker only ever reads from it.
    let gcode_move = Arc::new(SharedGcodeMove::new());
    let tracker = PrintStats::new(Arc::new(HostClock::new()), gcode_move.clone());

    // All tracker access is funneled through this channel; the serve loop
    // owns the tracker and handles one request at a time.
    let (stats_tx, stats_rx) = mpsc::channel::<StatsRequest>(16);
    tokio::spawn(stats_channel::serve(tracker, stats_rx));

    if config.stats.log_status {
        start_status_poller(stats_tx.clone(), config.stats.status_interval_ms);
    }

    if config.web.enabled {
        let app = web::api::create_router(stats_tx.clone());
        let addr = format!("{}:{}", config.web.bind_address, config.web.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Web API listening on http://{}", listener.local_addr()?);
        axum::serve(listener, app).await?;
    } else {
        tracing::info!("Web API disabled; running status poller only");
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}

/// Periodically sample the tracker and write a one-line summary to the log.
fn start_status_poller(stats_tx: mpsc::Sender<StatsRequest>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let (resp_tx, resp_rx) = oneshot::channel();
            if stats_tx
                .send(StatsRequest::GetStatus {
                    respond_to: resp_tx,
                })
                .await
                .is_err()
            {
                tracing::info!("Status poller shutting down");
                break;
            }
            match resp_rx.await {
                Ok(status) => tracing::info!(
                    "print_stats: state={} file='{}' total={:.1}s print={:.1}s filament={:.2}mm",
                    status.state,
                    status.filename,
                    status.total_duration,
                    status.print_duration,
                    status.filament_used
                ),
                Err(_) => break,
            }
        }
    });
}
