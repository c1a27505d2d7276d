//! # Reference Table
//!
//! Per-feature calibration data: weight, reference mean, reference standard
//! deviation, display unit, and the valid input range used by the form.
//!
//! - Built-in placeholder constants via [`ReferenceTable::builtin`].
//! - TOML override (`[[features]]` rows) via [`ReferenceTable::from_toml_str`].
//! - Path resolution: `$RISK_REFERENCE_PATH` → `config/reference.toml` → built-in.
//!
//! The table is an immutable value handed to the scorer, form and report
//! explicitly; nothing here is global.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{Result, RiskError};
use crate::feature::{Feature, FeatureRecord};

pub const DEFAULT_REFERENCE_PATH: &str = "config/reference.toml";
pub const ENV_REFERENCE_PATH: &str = "RISK_REFERENCE_PATH";

/// Weight sums further than this from 1.0 are logged (not rejected).
const WEIGHT_SUM_TOLERANCE: f64 = 0.05;

/// Slider bounds and granularity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ValidRange {
    pub fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureDef {
    #[serde(rename = "name")]
    pub feature: Feature,
    pub weight: f64,
    pub mean: f64,
    pub std: f64,
    pub unit: String,
    #[serde(flatten)]
    pub range: ValidRange,
}

impl FeatureDef {
    pub fn name(&self) -> &'static str {
        self.feature.name()
    }
}

/// One `[[features]]` row as written in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeatureRow {
    name: String,
    weight: f64,
    mean: f64,
    std: f64,
    unit: String,
    min: f64,
    max: f64,
    step: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ReferenceFile {
    features: Vec<FeatureRow>,
}

/// Validated table covering each feature exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    defs: Vec<FeatureDef>,
    /// `Feature::index()` → position in `defs`.
    slot: [usize; Feature::COUNT],
}

impl ReferenceTable {
    /// Validate and index a list of definitions. List order becomes table order.
    pub fn from_defs(defs: Vec<FeatureDef>) -> Result<Self> {
        let mut slot = [usize::MAX; Feature::COUNT];
        for (pos, d) in defs.iter().enumerate() {
            if slot[d.feature.index()] != usize::MAX {
                return Err(RiskError::InvalidTable(format!(
                    "feature `{}` listed more than once",
                    d.feature
                )));
            }
            validate_def(d)?;
            slot[d.feature.index()] = pos;
        }
        if let Some(f) = Feature::ALL.into_iter().find(|f| slot[f.index()] == usize::MAX) {
            return Err(RiskError::InvalidTable(format!("feature `{f}` is missing")));
        }

        let table = Self { defs, slot };
        table.log_soft_warnings();
        Ok(table)
    }

    /// Placeholder constants. Not derived from any calibration dataset.
    pub fn builtin() -> Self {
        let row = |feature, weight, mean, std, unit: &str, min, max, step| FeatureDef {
            feature,
            weight,
            mean,
            std,
            unit: unit.to_string(),
            range: ValidRange::new(min, max, step),
        };
        let defs = vec![
            row(Feature::Age, 0.076, 45.0, 15.0, "years", 0.0, 100.0, 1.0),
            row(Feature::Bmi, 0.086, 25.0, 5.0, "kg/m²", 10.0, 50.0, 1.0),
            row(Feature::Cholesterol, 0.082, 190.0, 30.0, "mg/dL", 100.0, 300.0, 1.0),
            row(Feature::SystolicBp, 0.078, 120.0, 15.0, "mmHg", 90.0, 200.0, 1.0),
            row(Feature::DiastolicBp, 0.074, 80.0, 10.0, "mmHg", 60.0, 130.0, 1.0),
            row(Feature::SaltIntake, 0.082, 4.0, 1.0, "g/day", 0.0, 10.0, 0.5),
            row(Feature::SleepDuration, 0.075, 7.0, 1.5, "hrs/day", 0.0, 12.0, 0.5),
            row(Feature::StressLevel, 0.045, 3.0, 1.0, "/10", 0.0, 10.0, 0.5),
            row(Feature::HeartRate, 0.073, 75.0, 10.0, "bpm", 40.0, 150.0, 1.0),
            row(Feature::Glucose, 0.082, 100.0, 15.0, "mg/dL", 50.0, 200.0, 1.0),
            row(Feature::Ldl, 0.082, 120.0, 25.0, "mg/dL", 50.0, 250.0, 1.0),
            row(Feature::Triglycerides, 0.085, 150.0, 40.0, "mg/dL", 50.0, 300.0, 1.0),
            row(Feature::Hdl, 0.076, 50.0, 10.0, "mg/dL", 20.0, 100.0, 1.0),
        ];
        let mut slot = [0usize; Feature::COUNT];
        for (pos, d) in defs.iter().enumerate() {
            slot[d.feature.index()] = pos;
        }
        Self { defs, slot }
    }

    /// Parse `[[features]]` rows from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let file: ReferenceFile = toml::from_str(toml_str)?;
        let defs = file
            .features
            .into_iter()
            .map(|r| {
                Ok(FeatureDef {
                    feature: Feature::parse(&r.name)?,
                    weight: r.weight,
                    mean: r.mean,
                    std: r.std,
                    unit: r.unit,
                    range: ValidRange::new(r.min, r.max, r.step),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_defs(defs)?)
    }

    /// Load from an explicit TOML path.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading reference table from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing reference table {}", path.display()))
    }

    /// Resolve the table using env var + fallbacks:
    /// 1) $RISK_REFERENCE_PATH (must exist)
    /// 2) config/reference.toml
    /// 3) built-in constants
    pub fn load_default() -> anyhow::Result<Self> {
        if let Ok(p) = std::env::var(ENV_REFERENCE_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_REFERENCE_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            info!(path = %pb.display(), "reference table from env");
            return Self::from_path(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_REFERENCE_PATH);
        if default_p.exists() {
            info!(path = %default_p.display(), "reference table from config dir");
            return Self::from_path(&default_p);
        }
        info!("reference table: built-in constants");
        Ok(Self::builtin())
    }

    pub fn get(&self, feature: Feature) -> &FeatureDef {
        &self.defs[self.slot[feature.index()]]
    }

    /// Lookup by wire name; unknown names fail with a suggestion.
    pub fn lookup(&self, name: &str) -> Result<&FeatureDef> {
        Feature::parse(name).map(|f| self.get(f))
    }

    /// Definitions in table order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureDef> + '_ {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn weight_sum(&self) -> f64 {
        self.defs.iter().map(|d| d.weight).sum()
    }

    /// Every feature at its reference mean (also the form's default positions).
    pub fn mean_record(&self) -> FeatureRecord {
        FeatureRecord::from_fn(|f| self.get(f).mean)
    }

    pub fn min_record(&self) -> FeatureRecord {
        FeatureRecord::from_fn(|f| self.get(f).range.min)
    }

    pub fn max_record(&self) -> FeatureRecord {
        FeatureRecord::from_fn(|f| self.get(f).range.max)
    }

    fn log_soft_warnings(&self) {
        for d in self.defs.iter().filter(|d| d.std == 0.0) {
            warn!(feature = %d.feature, "reference std is 0; feature will contribute nothing");
        }
        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(weight_sum = sum, "reference weights do not sum to ~1.0");
        }
    }
}

impl Default for ReferenceTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_def(d: &FeatureDef) -> Result<()> {
    let bad = |what: &str| {
        Err(RiskError::InvalidTable(format!(
            "feature `{}`: {what}",
            d.feature
        )))
    };
    let numbers = [d.weight, d.mean, d.std, d.range.min, d.range.max, d.range.step];
    if numbers.iter().any(|x| !x.is_finite()) {
        return bad("all numbers must be finite");
    }
    if d.std < 0.0 {
        return bad("std must not be negative");
    }
    if d.range.min >= d.range.max {
        return bad("min must be below max");
    }
    if d.range.step <= 0.0 {
        return bad("step must be positive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_as_toml() -> String {
        let mut out = String::new();
        for d in ReferenceTable::builtin().iter() {
            out.push_str(&format!(
                "[[features]]\nname = \"{}\"\nweight = {:?}\nmean = {:?}\nstd = {:?}\nunit = \"{}\"\nmin = {:?}\nmax = {:?}\nstep = {:?}\n\n",
                d.name(),
                d.weight,
                d.mean,
                d.std,
                d.unit,
                d.range.min,
                d.range.max,
                d.range.step
            ));
        }
        out
    }

    #[test]
    fn builtin_covers_every_feature_in_canonical_order() {
        let t = ReferenceTable::builtin();
        assert_eq!(t.len(), Feature::COUNT);
        let order: Vec<Feature> = t.iter().map(|d| d.feature).collect();
        assert_eq!(order, Feature::ALL.to_vec());
        for f in Feature::ALL {
            assert_eq!(t.get(f).feature, f);
        }
    }

    #[test]
    fn builtin_passes_validation() {
        let t = ReferenceTable::builtin();
        let revalidated = ReferenceTable::from_defs(t.iter().cloned().collect()).unwrap();
        assert_eq!(revalidated, t);
    }

    #[test]
    fn builtin_weights_sum_to_about_one() {
        let sum = ReferenceTable::builtin().weight_sum();
        assert!((sum - 0.996).abs() < 1e-9, "sum = {sum}");
    }

    #[test]
    fn lookup_known_and_unknown() {
        let t = ReferenceTable::builtin();
        let d = t.lookup("Systolic_BP").unwrap();
        assert_eq!(d.unit, "mmHg");
        assert_eq!(d.mean, 120.0);
        assert_eq!(d.std, 15.0);

        let err = t.lookup("Systolic").unwrap_err();
        assert!(matches!(err, RiskError::UnknownFeature { .. }));
    }

    #[test]
    fn toml_round_trip_matches_builtin() {
        let t = ReferenceTable::from_toml_str(&builtin_as_toml()).unwrap();
        assert_eq!(t, ReferenceTable::builtin());
    }

    #[test]
    fn toml_file_order_defines_table_order() {
        let toml = builtin_as_toml();
        let mut blocks: Vec<&str> = toml.split("[[features]]").filter(|b| !b.trim().is_empty()).collect();
        blocks.reverse();
        let reversed: String = blocks.iter().map(|b| format!("[[features]]{b}")).collect();

        let t = ReferenceTable::from_toml_str(&reversed).unwrap();
        assert_eq!(t.iter().next().unwrap().feature, Feature::Hdl);
        assert_eq!(t.get(Feature::Age).mean, 45.0);
    }

    #[test]
    fn rejects_missing_feature() {
        let mut defs: Vec<FeatureDef> = ReferenceTable::builtin().iter().cloned().collect();
        defs.retain(|d| d.feature != Feature::Glucose);
        let err = ReferenceTable::from_defs(defs).unwrap_err();
        assert_eq!(
            err,
            RiskError::InvalidTable("feature `Glucose` is missing".into())
        );
    }

    #[test]
    fn rejects_duplicate_feature() {
        let mut defs: Vec<FeatureDef> = ReferenceTable::builtin().iter().cloned().collect();
        defs.push(defs[0].clone());
        assert!(ReferenceTable::from_defs(defs).is_err());
    }

    #[test]
    fn rejects_bad_numbers_but_accepts_zero_std() {
        let base: Vec<FeatureDef> = ReferenceTable::builtin().iter().cloned().collect();

        let mut neg = base.clone();
        neg[0].std = -1.0;
        assert!(ReferenceTable::from_defs(neg).is_err());

        let mut nan = base.clone();
        nan[1].mean = f64::NAN;
        assert!(ReferenceTable::from_defs(nan).is_err());

        let mut inverted = base.clone();
        inverted[2].range = ValidRange::new(300.0, 100.0, 1.0);
        assert!(ReferenceTable::from_defs(inverted).is_err());

        let mut zero = base;
        zero[3].std = 0.0;
        assert!(ReferenceTable::from_defs(zero).is_ok());
    }

    #[test]
    fn toml_with_unknown_feature_name_fails() {
        let toml = builtin_as_toml().replace("name = \"HDL\"", "name = \"HDL_C\"");
        let err = ReferenceTable::from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("HDL_C"), "{err}");
    }

    #[test]
    fn reference_rows_serialize_flat() {
        let t = ReferenceTable::builtin();
        let v = serde_json::to_value(t.get(Feature::SaltIntake)).unwrap();
        assert_eq!(v["name"], "Salt_Intake");
        assert_eq!(v["unit"], "g/day");
        assert_eq!(v["step"], 0.5);
    }
}
