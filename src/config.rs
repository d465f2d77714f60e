//! Configuration module for monotaur.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for the web server (default: 8080)
    pub http_port: u16,
    /// Whether the background check scheduler runs (default: true)
    pub scheduler_enabled: bool,
    /// Seconds between websocket heartbeat frames (default: 5)
    pub heartbeat_interval_s: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            scheduler_enabled: true,
            heartbeat_interval_s: 5,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MONOTAUR_HTTP_PORT`: HTTP port (default: 8080)
    /// - `MONOTAUR_SCHEDULER`: set to "off", "false", or "0" to disable the
    ///   background scheduler
    /// - `MONOTAUR_HEARTBEAT_INTERVAL_S`: websocket heartbeat cadence
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("MONOTAUR_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }

        if let Ok(flag) = env::var("MONOTAUR_SCHEDULER") {
            cfg.scheduler_enabled = !matches!(flag.as_str(), "off" | "false" | "0");
        }

        if let Ok(interval_str) = env::var("MONOTAUR_HEARTBEAT_INTERVAL_S") {
            if let Ok(interval) = interval_str.parse::<u64>() {
                if interval >= 1 {
                    cfg.heartbeat_interval_s = interval;
                }
            }
        }

        cfg
    }
}
