//! MonoTaur - Network Inventory & Monitoring Service
//!
//! Tracks devices, layouts, and links, and runs reachability checks
//! against monitored targets.

mod config;
mod probe;
mod runner;
mod scheduler;
mod store;
mod web;

use config::ServerConfig;
use probe::PingProber;
use runner::CheckRunner;
use scheduler::Scheduler;
use store::Store;
use web::Server;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("monotaur=info".parse()?),
        )
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("starting monotaur on port {}...", cfg.http_port);

    // Wire up the store and check execution pipeline
    let store = Arc::new(Store::new());
    let runner = Arc::new(CheckRunner::new(store.clone(), Arc::new(PingProber)));

    let scheduler = if cfg.scheduler_enabled {
        let scheduler = Arc::new(Scheduler::new(store.clone(), runner.clone()));
        scheduler.start().await;
        Some(scheduler)
    } else {
        tracing::info!("background scheduler disabled");
        None
    };

    // Start web server
    let server = Server::new(cfg, store, runner, scheduler);
    server.start().await?;

    Ok(())
}
