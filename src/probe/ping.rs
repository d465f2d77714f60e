//! ICMP probe via the system ping binary.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::process::Command;

use super::{ProbeOutcome, Prober};

/// Convert a millisecond timeout into the ping tool's whole-second budget.
///
/// Floored, with a 1-second minimum: sub-second timeouts round up to a full
/// 1-second probe budget. This precision loss is a known limitation of
/// driving the external tool.
pub fn probe_budget_secs(timeout_ms: u32) -> u64 {
    u64::from(timeout_ms / 1000).max(1)
}

/// Probe implementation that shells out to the system `ping` binary.
///
/// Sends one echo request per invocation (`-c 1`) with the tool's own
/// deadline set from the floored budget (`-W`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PingProber;

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self, target: &str, timeout_ms: u32) -> ProbeOutcome {
        let budget_secs = probe_budget_secs(timeout_ms);
        let start = Instant::now();

        let output = Command::new("ping")
            .args(["-c", "1", "-W", &budget_secs.to_string(), target])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match output {
            Ok(output) => {
                let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                // Prefer stderr when the tool wrote to it, as ping reports
                // resolution and permission problems there.
                let text = if output.stderr.is_empty() {
                    output.stdout
                } else {
                    output.stderr
                };
                let text = String::from_utf8_lossy(&text).into_owned();

                ProbeOutcome::Completed {
                    success: output.status.success(),
                    latency_ms,
                    output: (!text.is_empty()).then_some(text),
                }
            }
            Err(error) => {
                tracing::warn!("failed to invoke ping for {}: {}", target, error);
                ProbeOutcome::Unavailable
            }
        }
    }
}
