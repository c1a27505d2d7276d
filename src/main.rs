//! Hypertension Risk Estimator — Binary Entrypoint
//! Boots the Axum HTTP server via Shuttle: loads `.env`, initializes dev
//! tracing, resolves the reference table, and mounts the router.

use shuttle_axum::ShuttleAxum;

use hypertension_risk::telemetry::enable_dev_tracing;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // Makes RISK_REFERENCE_PATH / RISK_METRICS / RISK_DEV_LOG visible below.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let router = hypertension_risk::app()?;

    Ok(router.into())
}
