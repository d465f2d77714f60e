//! Check execution orchestration.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::probe::{probe_budget_secs, run_probe, Prober};
use crate::store::{CheckResult, CheckStatus, Store, StoreError};

/// Wall-clock allowance on top of the probe tool's own budget before the
/// runner stops waiting for it.
const DEADLINE_GRACE: Duration = Duration::from_millis(500);

/// Orchestrates a single check execution end-to-end: resolve the check,
/// probe its target, classify, and record the outcome.
pub struct CheckRunner {
    store: Arc<Store>,
    prober: Arc<dyn Prober>,
}

impl CheckRunner {
    pub fn new(store: Arc<Store>, prober: Arc<dyn Prober>) -> Self {
        Self { store, prober }
    }

    /// Execute the check once and record the outcome as its `last_result`.
    ///
    /// An unknown check id fails with `NotFound` before any probe is
    /// dispatched. Every probe-level outcome, including exhaustion of the
    /// outer deadline, is a normal recorded result rather than an error.
    /// The returned result and the stored one are identical in value.
    pub async fn run(&self, check_id: Uuid) -> Result<CheckResult, StoreError> {
        let check = self.store.get_check(check_id)?;

        // The outer deadline covers both the requested timeout and the
        // tool's floored whole-second budget, whichever is larger.
        let budget_ms = probe_budget_secs(check.timeout_ms) * 1000;
        let deadline =
            Duration::from_millis(budget_ms.max(u64::from(check.timeout_ms))) + DEADLINE_GRACE;

        let probe = run_probe(
            self.prober.as_ref(),
            &check.check_type,
            &check.target,
            check.timeout_ms,
        );
        let result = match tokio::time::timeout(deadline, probe).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "check {} against {} exceeded its {}ms deadline",
                    check_id,
                    check.target,
                    deadline.as_millis()
                );
                CheckResult {
                    status: CheckStatus::Down,
                    latency_ms: None,
                    message: Some(format!(
                        "probe deadline exceeded after {}ms",
                        deadline.as_millis()
                    )),
                    checked_at: Utc::now(),
                }
            }
        };

        self.store.record_result(check_id, result.clone())?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeOutcome;
    use crate::store::{CheckCreate, DeviceCreate};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProber(ProbeOutcome);

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, _target: &str, _timeout_ms: u32) -> ProbeOutcome {
            self.0.clone()
        }
    }

    struct HangingProber;

    #[async_trait]
    impl Prober for HangingProber {
        async fn probe(&self, _target: &str, _timeout_ms: u32) -> ProbeOutcome {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            ProbeOutcome::Unavailable
        }
    }

    struct CountingProber(AtomicUsize);

    #[async_trait]
    impl Prober for CountingProber {
        async fn probe(&self, _target: &str, _timeout_ms: u32) -> ProbeOutcome {
            self.0.fetch_add(1, Ordering::SeqCst);
            ProbeOutcome::Unavailable
        }
    }

    /// Deletes its own check from the store while the probe is in flight.
    struct DeletingProber {
        store: Arc<Store>,
        check_id: Uuid,
    }

    #[async_trait]
    impl Prober for DeletingProber {
        async fn probe(&self, _target: &str, _timeout_ms: u32) -> ProbeOutcome {
            self.store.delete_check(self.check_id);
            ProbeOutcome::Completed {
                success: true,
                latency_ms: 1.0,
                output: None,
            }
        }
    }

    fn seeded_store() -> (Arc<Store>, Uuid) {
        let store = Arc::new(Store::new());
        let device = store.create_device(DeviceCreate {
            name: "router-1".to_string(),
            ip_address: "192.0.2.1".parse().unwrap(),
            device_type: "router".to_string(),
            snmp_profile: None,
        });
        let check = store
            .create_check(CheckCreate {
                device_id: device.id,
                target: "192.0.2.1".to_string(),
                check_type: "icmp".to_string(),
                interval_s: 60,
                timeout_ms: 1000,
                params: None,
            })
            .unwrap();
        (store, check.id)
    }

    #[tokio::test]
    async fn test_run_missing_check_probes_nothing() {
        let store = Arc::new(Store::new());
        let prober = Arc::new(CountingProber(AtomicUsize::new(0)));
        let runner = CheckRunner::new(store.clone(), prober.clone());

        let err = runner.run(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("check"));
        assert_eq!(prober.0.load(Ordering::SeqCst), 0);
        assert!(store.list_checks().is_empty());
    }

    #[tokio::test]
    async fn test_run_records_what_it_returns() {
        let (store, check_id) = seeded_store();
        let prober = Arc::new(FixedProber(ProbeOutcome::Completed {
            success: true,
            latency_ms: 12.5,
            output: Some("64 bytes".to_string()),
        }));
        let runner = CheckRunner::new(store.clone(), prober);

        let returned = runner.run(check_id).await.unwrap();
        assert_eq!(returned.status, CheckStatus::Up);
        assert_eq!(returned.latency_ms, Some(12.5));

        let stored = store.get_check(check_id).unwrap().last_result.unwrap();
        assert_eq!(stored, returned);
    }

    #[tokio::test]
    async fn test_run_replaces_previous_result() {
        let (store, check_id) = seeded_store();

        let up = Arc::new(FixedProber(ProbeOutcome::Completed {
            success: true,
            latency_ms: 1.0,
            output: None,
        }));
        CheckRunner::new(store.clone(), up).run(check_id).await.unwrap();

        let down = Arc::new(FixedProber(ProbeOutcome::Completed {
            success: false,
            latency_ms: 1000.0,
            output: Some("100% packet loss".to_string()),
        }));
        let returned = CheckRunner::new(store.clone(), down)
            .run(check_id)
            .await
            .unwrap();

        assert_eq!(returned.status, CheckStatus::Down);
        let stored = store.get_check(check_id).unwrap().last_result.unwrap();
        assert_eq!(stored, returned);
    }

    #[tokio::test]
    async fn test_run_unsupported_type_skips_prober() {
        let (store, check_id) = seeded_store();
        store
            .update_check(
                check_id,
                crate::store::CheckUpdate {
                    check_type: Some("snmp".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let prober = Arc::new(CountingProber(AtomicUsize::new(0)));
        let runner = CheckRunner::new(store.clone(), prober.clone());

        let returned = runner.run(check_id).await.unwrap();
        assert_eq!(returned.status, CheckStatus::Unknown);
        assert_eq!(
            returned.message.as_deref(),
            Some("unsupported check type: snmp")
        );
        assert_eq!(prober.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_converts_hung_probe_to_down() {
        let (store, check_id) = seeded_store();
        let runner = CheckRunner::new(store.clone(), Arc::new(HangingProber));

        let returned = runner.run(check_id).await.unwrap();
        assert_eq!(returned.status, CheckStatus::Down);
        assert!(returned.latency_ms.is_none());
        assert!(returned
            .message
            .as_deref()
            .unwrap()
            .contains("deadline exceeded"));
        assert_eq!(
            store.get_check(check_id).unwrap().last_result,
            Some(returned)
        );
    }

    #[tokio::test]
    async fn test_run_reports_check_deleted_mid_flight() {
        let (store, check_id) = seeded_store();
        let prober = Arc::new(DeletingProber {
            store: store.clone(),
            check_id,
        });
        let runner = CheckRunner::new(store.clone(), prober);

        let err = runner.run(check_id).await.unwrap_err();
        assert_eq!(err, StoreError::NotFound("check"));
        assert!(store.get_check(check_id).is_err());
    }
}
