//! linkwatch - Internet connection monitor
//!
//! Probes a fixed endpoint on a timer, keeps the outcomes in memory and
//! serves a dashboard of connectivity, latency and uptime.

mod config;
mod history;
mod monitor;
mod probe;
mod web;

use config::ServerConfig;
use monitor::Monitor;
use probe::HttpProber;
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("linkwatch=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting linkwatch on {}:{}...", cfg.bind_addr, cfg.http_port);
    tracing::info!("Probing {}", probe::TARGET_URL);

    let prober = Arc::new(HttpProber::new()?);
    let monitor = Arc::new(Monitor::new(prober));

    monitor.start().await?;

    // Serve until Ctrl-C
    let server = Server::new(cfg, monitor.clone());
    let served = server.start(shutdown_signal()).await;

    monitor.stop().await;

    let stats = monitor.stats();
    tracing::info!(
        "Recorded {} samples: uptime {}, downtime {}, average latency {}",
        monitor.log().len(),
        stats.uptime_label(),
        stats.downtime_label(),
        stats.avg_latency_label()
    );

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
