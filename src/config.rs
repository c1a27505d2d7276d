// src/config.rs
//! Process configuration from the environment (`.env` is loaded by the binary).
//!
//! - `RISK_REFERENCE_PATH`: TOML reference table (see `reference.rs` for fallbacks)
//! - `RISK_METRICS`: `1`/`true` exposes `/metrics`
//! - `RISK_DEV_LOG`: dev tracing (see `telemetry.rs`)

use anyhow::Result;

use crate::reference::ReferenceTable;

pub const ENV_METRICS: &str = "RISK_METRICS";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub reference: ReferenceTable,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            reference: ReferenceTable::load_default()?,
            metrics_enabled: parse_flag(std::env::var(ENV_METRICS).ok()),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reference: ReferenceTable::builtin(),
            metrics_enabled: false,
        }
    }
}

/// `1`, `true`, `yes`, `on` (case-insensitive) → true; anything else → false.
pub(crate) fn parse_flag(raw: Option<String>) -> bool {
    raw.map(|s| {
        matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
    .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{DEFAULT_REFERENCE_PATH, ENV_REFERENCE_PATH};
    use std::{env, fs};

    #[test]
    fn flag_parsing() {
        assert!(parse_flag(Some("1".into())));
        assert!(parse_flag(Some(" TRUE ".into())));
        assert!(!parse_flag(Some("0".into())));
        assert!(!parse_flag(Some("nope".into())));
        assert!(!parse_flag(None));
    }

    #[serial_test::serial]
    #[test]
    fn from_env_falls_back_to_builtin_in_empty_dir() {
        // Isolate CWD so the repo's config/ is not picked up.
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_REFERENCE_PATH);
        env::remove_var(ENV_METRICS);

        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg, AppConfig::default());

        // config/reference.toml in CWD wins over built-in
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        let halved: String = fs::read_to_string(old.join(DEFAULT_REFERENCE_PATH))
            .unwrap()
            .replace("weight = 0.076", "weight = 0.038");
        fs::write(tmp.path().join(DEFAULT_REFERENCE_PATH), halved).unwrap();
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.reference.get(crate::feature::Feature::Age).weight, 0.038);

        env::set_current_dir(&old).unwrap();
    }
}
