//! Dependency health checks for the `__health` and `__gtg` endpoints

use futures::future::join_all;
use metadata_notifier_domain::DependencyProbe;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Static description of a dependency check
#[derive(Debug, Clone)]
pub struct CheckInfo {
    pub name: &'static str,
    pub severity: u8,
    pub business_impact: &'static str,
    pub technical_summary: &'static str,
    pub panic_guide: &'static str,
}

impl CheckInfo {
    pub fn notifier_reachable() -> Self {
        Self {
            name: "CMS Metadata Notifier Reachable",
            severity: 1,
            business_impact: "Video metadata will not reach the content platform. Videos will not be annotated.",
            technical_summary: "CMS Metadata Notifier is not reachable/healthy",
            panic_guide: "Check the notifier service and the gateway routing for its host header.",
        }
    }

    pub fn catalog_available() -> Self {
        Self {
            name: "Mapping Catalog Available",
            severity: 1,
            business_impact: "Video metadata might not be generated.",
            technical_summary: "The spreadsheet containing the tag mappings is not available.",
            panic_guide: "Check that the mapping URL is reachable and returns 200.",
        }
    }
}

struct Check {
    info: CheckInfo,
    probe: Arc<dyn DependencyProbe>,
}

/// Result of a single check, as reported by `__health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub name: String,
    pub ok: bool,
    pub severity: u8,
    pub business_impact: String,
    pub technical_summary: String,
    pub panic_guide: String,
    pub check_output: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub schema_version: u8,
    pub name: String,
    pub description: String,
    pub checks: Vec<CheckResult>,
    pub ok: bool,
}

/// Runs the configured dependency checks
#[derive(Default)]
pub struct HealthChecker {
    checks: Vec<Check>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check(mut self, info: CheckInfo, probe: Arc<dyn DependencyProbe>) -> Self {
        self.checks.push(Check { info, probe });
        self
    }

    /// Run every check concurrently
    pub async fn report(&self) -> HealthReport {
        let checks = join_all(self.checks.iter().map(|check| async move {
            let outcome = check.probe.probe().await;
            if let Err(e) = &outcome {
                tracing::warn!(check = check.info.name, error = %e, "Health check failed");
            }
            CheckResult {
                name: check.info.name.to_string(),
                ok: outcome.is_ok(),
                severity: check.info.severity,
                business_impact: check.info.business_impact.to_string(),
                technical_summary: check.info.technical_summary.to_string(),
                panic_guide: check.info.panic_guide.to_string(),
                check_output: outcome.err().unwrap_or_default(),
                last_updated: now_rfc3339(),
            }
        }))
        .await;

        HealthReport {
            schema_version: 1,
            name: "Dependent services healthcheck".to_string(),
            description: "Checks if all the dependent services are reachable and healthy."
                .to_string(),
            ok: checks.iter().all(|c| c.ok),
            checks,
        }
    }

    /// Run the checks in order, stopping at the first failure
    pub async fn good_to_go(&self) -> bool {
        for check in &self.checks {
            if check.probe.probe().await.is_err() {
                return false;
            }
        }
        true
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProbe {
        result: Result<(), String>,
        calls: AtomicUsize,
    }

    impl FakeProbe {
        fn new(result: Result<(), String>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DependencyProbe for FakeProbe {
        async fn probe(&self) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_report_all_healthy() {
        let checker = HealthChecker::new()
            .with_check(CheckInfo::notifier_reachable(), FakeProbe::new(Ok(())))
            .with_check(CheckInfo::catalog_available(), FakeProbe::new(Ok(())));

        let report = checker.report().await;

        assert!(report.ok);
        assert_eq!(report.checks.len(), 2);
        assert_eq!(report.checks[0].name, "CMS Metadata Notifier Reachable");
        assert!(report.checks.iter().all(|c| c.check_output.is_empty()));
    }

    #[tokio::test]
    async fn test_report_includes_failure_output() {
        let checker = HealthChecker::new()
            .with_check(CheckInfo::notifier_reachable(), FakeProbe::new(Ok(())))
            .with_check(
                CheckInfo::catalog_available(),
                FakeProbe::new(Err("connection refused".to_string())),
            );

        let report = checker.report().await;

        assert!(!report.ok);
        assert!(!report.checks[1].ok);
        assert_eq!(report.checks[1].check_output, "connection refused");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["checks"][1]["checkOutput"], "connection refused");
    }

    #[tokio::test]
    async fn test_good_to_go_stops_at_first_failure() {
        let failing = FakeProbe::new(Err("down".to_string()));
        let healthy = FakeProbe::new(Ok(()));
        let checker = HealthChecker::new()
            .with_check(CheckInfo::notifier_reachable(), failing.clone())
            .with_check(CheckInfo::catalog_available(), healthy.clone());

        assert!(!checker.good_to_go().await);
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(healthy.calls.load(Ordering::SeqCst), 0);
    }
}
