//! Probe module for check execution.
//!
//! Only the "icmp" check type has a real probe implementation; any other
//! type classifies as "unknown" without dispatching anything.

mod ping;

pub use ping::*;

use async_trait::async_trait;
use chrono::Utc;

use crate::store::{CheckResult, CheckStatus};

/// Raw outcome of a single probe attempt, before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The probe tool ran to completion, successfully or not.
    Completed {
        success: bool,
        latency_ms: f64,
        output: Option<String>,
    },
    /// The probe mechanism could not be invoked at all.
    Unavailable,
}

/// A reachability probe capability.
///
/// Injectable so tests can exercise classification and orchestration with a
/// fake, without spawning processes or depending on network reachability.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Run exactly one probe attempt against the target.
    async fn probe(&self, target: &str, timeout_ms: u32) -> ProbeOutcome;
}

/// Map a raw probe outcome onto a classified result.
///
/// Latency, when present, is wall-clock elapsed time from dispatch to
/// completion, process overhead included.
pub fn classify(outcome: ProbeOutcome) -> CheckResult {
    match outcome {
        ProbeOutcome::Completed {
            success,
            latency_ms,
            output,
        } => CheckResult {
            status: if success {
                CheckStatus::Up
            } else {
                CheckStatus::Down
            },
            latency_ms: Some(latency_ms),
            message: output
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            checked_at: Utc::now(),
        },
        ProbeOutcome::Unavailable => unknown_result("ping binary not available".to_string()),
    }
}

/// Build an "unknown" result with the given message and no latency.
pub fn unknown_result(message: String) -> CheckResult {
    CheckResult {
        status: CheckStatus::Unknown,
        latency_ms: None,
        message: Some(message),
        checked_at: Utc::now(),
    }
}

/// Run a single probe for the given check type.
pub async fn run_probe(
    prober: &dyn Prober,
    check_type: &str,
    target: &str,
    timeout_ms: u32,
) -> CheckResult {
    match check_type {
        "icmp" => classify(prober.probe(target, timeout_ms).await),
        other => unknown_result(format!("unsupported check type: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProber {
        calls: AtomicUsize,
        outcome: ProbeOutcome,
    }

    impl CountingProber {
        fn new(outcome: ProbeOutcome) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                outcome,
            }
        }
    }

    #[async_trait]
    impl Prober for CountingProber {
        async fn probe(&self, _target: &str, _timeout_ms: u32) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[test]
    fn test_classify_success() {
        let result = classify(ProbeOutcome::Completed {
            success: true,
            latency_ms: 3.7,
            output: Some("64 bytes from 192.0.2.1\n".to_string()),
        });
        assert_eq!(result.status, CheckStatus::Up);
        assert_eq!(result.latency_ms, Some(3.7));
        assert_eq!(result.message.as_deref(), Some("64 bytes from 192.0.2.1"));
    }

    #[test]
    fn test_classify_failure_keeps_latency() {
        let result = classify(ProbeOutcome::Completed {
            success: false,
            latency_ms: 1002.4,
            output: Some("100% packet loss".to_string()),
        });
        assert_eq!(result.status, CheckStatus::Down);
        assert_eq!(result.latency_ms, Some(1002.4));
        assert_eq!(result.message.as_deref(), Some("100% packet loss"));
    }

    #[test]
    fn test_classify_blank_output_becomes_none() {
        let result = classify(ProbeOutcome::Completed {
            success: true,
            latency_ms: 0.9,
            output: Some("  \n".to_string()),
        });
        assert!(result.message.is_none());
    }

    #[test]
    fn test_classify_unavailable() {
        let result = classify(ProbeOutcome::Unavailable);
        assert_eq!(result.status, CheckStatus::Unknown);
        assert!(result.latency_ms.is_none());
        assert_eq!(result.message.as_deref(), Some("ping binary not available"));
    }

    #[tokio::test]
    async fn test_unsupported_type_never_dispatches() {
        let prober = CountingProber::new(ProbeOutcome::Unavailable);
        let result = run_probe(&prober, "snmp", "192.0.2.1", 1000).await;

        assert_eq!(result.status, CheckStatus::Unknown);
        assert_eq!(
            result.message.as_deref(),
            Some("unsupported check type: snmp")
        );
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_icmp_dispatches_to_prober() {
        let prober = CountingProber::new(ProbeOutcome::Completed {
            success: true,
            latency_ms: 1.0,
            output: None,
        });
        let result = run_probe(&prober, "icmp", "192.0.2.1", 1000).await;

        assert_eq!(result.status, CheckStatus::Up);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 1);
    }
}
