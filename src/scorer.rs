//! Risk scoring: z-score standardization, weighted sum, ±3σ → 0..100 rescale.
//!
//! Pure and deterministic; no I/O. `score` is what the pipeline uses,
//! `breakdown` exposes the intermediate values for explainability.

use serde::Serialize;
use std::fmt;

use crate::feature::{Feature, FeatureRecord};
use crate::reference::ReferenceTable;
use crate::report::RiskTier;

/// Half-width (in standard deviations) of the raw range mapped onto 0..100.
pub const RAW_SPAN_SIGMAS: f64 = 3.0;

/// Final score, clamped to [0, 100] and rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RiskScore(f64);

impl RiskScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    /// Clamp then round. NaN collapses to 0.
    pub fn new(scaled: f64) -> Self {
        let clamped = if scaled.is_nan() {
            Self::MIN
        } else {
            scaled.clamp(Self::MIN, Self::MAX)
        };
        Self(round2(clamped))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Fraction for a progress bar, 0.0..=1.0.
    pub fn progress(self) -> f64 {
        self.0 / Self::MAX
    }

    pub fn tier(self) -> RiskTier {
        RiskTier::classify(self.0)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// One feature's share of the raw sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: Feature,
    pub value: f64,
    pub z: f64,
    pub weight: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Table order.
    pub contributions: Vec<Contribution>,
    /// Σ z·w before rescaling.
    pub raw: f64,
    /// Rescaled, before clamp and rounding.
    pub scaled: f64,
    pub score: RiskScore,
}

/// `(value - mean) / std`, or 0 when `std == 0`.
#[inline]
pub fn standardize(value: f64, mean: f64, std: f64) -> f64 {
    if std == 0.0 {
        0.0
    } else {
        (value - mean) / std
    }
}

/// Map raw ∈ [-3, 3] onto [0, 100] (unclamped).
#[inline]
pub fn rescale(raw: f64) -> f64 {
    ((raw + RAW_SPAN_SIGMAS) / (2.0 * RAW_SPAN_SIGMAS)) * 100.0
}

pub fn score(table: &ReferenceTable, record: &FeatureRecord) -> RiskScore {
    breakdown(table, record).score
}

pub fn breakdown(table: &ReferenceTable, record: &FeatureRecord) -> ScoreBreakdown {
    let contributions: Vec<Contribution> = table
        .iter()
        .map(|def| {
            let value = record.get(def.feature);
            let z = standardize(value, def.mean, def.std);
            Contribution {
                feature: def.feature,
                value,
                z,
                weight: def.weight,
                contribution: z * def.weight,
            }
        })
        .collect();

    let raw: f64 = contributions.iter().map(|c| c.contribution).sum();
    let scaled = rescale(raw);

    ScoreBreakdown {
        contributions,
        raw,
        scaled,
        score: RiskScore::new(scaled),
    }
}

/// Correctly rounded to 2 decimals from the exact binary value.
/// `(x * 100.0).round()` would round twice: 72.81499.. * 100 is exactly 7281.5.
fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}
