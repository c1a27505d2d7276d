// src/telemetry.rs
//! Tracing setup and log-safe fingerprints.
//!
//! Health inputs are never logged. Assessments are identified by a short
//! SHA-256 prefix over the record instead.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::feature::{Feature, FeatureRecord};

pub const ENV_DEV_LOG: &str = "RISK_DEV_LOG";
const DEFAULT_FILTER: &str = "hypertension_risk=info,warn";

/// Dev logging gate: RISK_DEV_LOG=1 AND dev env (debug build or SHUTTLE_ENV in {local,development,dev})
pub fn dev_logging_enabled() -> bool {
    let on = std::env::var(ENV_DEV_LOG).ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("SHUTTLE_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Install a compact fmt subscriber when dev logging is enabled; no-op otherwise.
pub fn enable_dev_tracing() {
    if !dev_logging_enabled() {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init: tests and bins may race to install a global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// 12 hex chars of SHA-256 over the record's canonical `name=value;` encoding.
pub fn record_fingerprint(record: &FeatureRecord) -> String {
    let mut hasher = Sha256::new();
    for f in Feature::ALL {
        hasher.update(f.name().as_bytes());
        hasher.update(b"=");
        hasher.update(record.get(f).to_bits().to_le_bytes());
        hasher.update(b";");
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
