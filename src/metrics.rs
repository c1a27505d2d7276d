use axum::{routing::get, Router};
use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

use crate::report::RiskTier;

static METRICS: OnceCell<Metrics> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and return the shared handle.
    pub fn install() -> anyhow::Result<&'static Metrics> {
        METRICS.get_or_try_init(|| {
            // Use default buckets to avoid API differences across crate versions.
            let handle = PrometheusBuilder::new().install_recorder()?;
            Ok::<_, anyhow::Error>(Self { handle })
        })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// No-ops when no recorder is installed.
pub fn record_assessment(tier: RiskTier, score: f64) {
    counter!("risk_assessments_total", "tier" => tier.label()).increment(1);
    histogram!("risk_score").record(score);
}

pub fn record_report() {
    counter!("risk_reports_total").increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!("risk_rejected_total", "reason" => reason).increment(1);
}
