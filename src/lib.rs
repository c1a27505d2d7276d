// src/lib.rs
// Public library surface for the server binary, demos, and integration tests.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod feature;
pub mod form;
pub mod metrics;
pub mod reference;
pub mod report;
pub mod scorer;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::engine::{assess, Assessment};
pub use crate::error::RiskError;
pub use crate::feature::{Category, Feature, FeatureRecord};
pub use crate::reference::{FeatureDef, ReferenceTable, ValidRange};
pub use crate::report::{Report, ReportRow, RiskTier, Severity};
pub use crate::scorer::{score, RiskScore};

use axum::Router;
use tracing::info;

/// Build the full application router from the environment.
///
/// Loads the reference table (env path → `config/reference.toml` → built-in)
/// and merges `/metrics` when `RISK_METRICS=1`.
pub fn app() -> anyhow::Result<Router> {
    let cfg = config::AppConfig::from_env()?;
    app_with_config(&cfg)
}

pub fn app_with_config(cfg: &config::AppConfig) -> anyhow::Result<Router> {
    let state = AppState::from_config(cfg);
    let mut router = api::router(state);
    if cfg.metrics_enabled {
        let m = metrics::Metrics::install()?;
        router = router.merge(m.router());
    }
    info!(
        features = cfg.reference.len(),
        metrics = cfg.metrics_enabled,
        "router ready"
    );
    Ok(router)
}
