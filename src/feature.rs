//! # Features
//!
//! The 13 health metrics the risk model consumes, the UI category each one is
//! shown under, and the strongly typed [`FeatureRecord`] holding one value per
//! feature for a single scoring session.
//!
//! Wire names (`"Systolic_BP"`, `"Salt_Intake"`, ...) are the canonical keys used
//! in config files, form submissions, JSON bodies and the CSV report.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, RiskError};

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_MIN_SIMILARITY: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    Age,
    #[serde(rename = "BMI")]
    Bmi,
    Cholesterol,
    #[serde(rename = "Systolic_BP")]
    SystolicBp,
    #[serde(rename = "Diastolic_BP")]
    DiastolicBp,
    #[serde(rename = "Salt_Intake")]
    SaltIntake,
    #[serde(rename = "Sleep_Duration")]
    SleepDuration,
    #[serde(rename = "Stress_Level")]
    StressLevel,
    #[serde(rename = "Heart_Rate")]
    HeartRate,
    Glucose,
    #[serde(rename = "LDL")]
    Ldl,
    Triglycerides,
    #[serde(rename = "HDL")]
    Hdl,
}

impl Feature {
    pub const COUNT: usize = 13;

    /// Canonical order (the order of the built-in reference table).
    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Age,
        Feature::Bmi,
        Feature::Cholesterol,
        Feature::SystolicBp,
        Feature::DiastolicBp,
        Feature::SaltIntake,
        Feature::SleepDuration,
        Feature::StressLevel,
        Feature::HeartRate,
        Feature::Glucose,
        Feature::Ldl,
        Feature::Triglycerides,
        Feature::Hdl,
    ];

    /// Canonical wire name.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Age => "Age",
            Feature::Bmi => "BMI",
            Feature::Cholesterol => "Cholesterol",
            Feature::SystolicBp => "Systolic_BP",
            Feature::DiastolicBp => "Diastolic_BP",
            Feature::SaltIntake => "Salt_Intake",
            Feature::SleepDuration => "Sleep_Duration",
            Feature::StressLevel => "Stress_Level",
            Feature::HeartRate => "Heart_Rate",
            Feature::Glucose => "Glucose",
            Feature::Ldl => "LDL",
            Feature::Triglycerides => "Triglycerides",
            Feature::Hdl => "HDL",
        }
    }

    /// Human label used by the form ("Systolic BP").
    pub fn display_name(self) -> &'static str {
        match self {
            Feature::SystolicBp => "Systolic BP",
            Feature::DiastolicBp => "Diastolic BP",
            Feature::SaltIntake => "Salt Intake",
            Feature::SleepDuration => "Sleep Duration",
            Feature::StressLevel => "Stress Level",
            Feature::HeartRate => "Heart Rate",
            other => other.name(),
        }
    }

    pub fn category(self) -> Category {
        match self {
            Feature::Age
            | Feature::Bmi
            | Feature::SystolicBp
            | Feature::DiastolicBp
            | Feature::HeartRate => Category::Vitals,
            Feature::SaltIntake | Feature::SleepDuration | Feature::StressLevel => {
                Category::Lifestyle
            }
            Feature::Cholesterol
            | Feature::Glucose
            | Feature::Ldl
            | Feature::Hdl
            | Feature::Triglycerides => Category::BloodTests,
        }
    }

    /// Position in [`Feature::ALL`]; used for fixed-size per-feature arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Exact (case-sensitive) wire-name lookup.
    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Wire-name lookup that fails with [`RiskError::UnknownFeature`],
    /// attaching the closest known name when one is similar enough.
    pub fn parse(name: &str) -> Result<Feature> {
        Feature::from_name(name).ok_or_else(|| RiskError::UnknownFeature {
            name: name.to_string(),
            suggestion: Feature::closest(name).map(Feature::name),
        })
    }

    /// Closest feature by Jaro-Winkler similarity on lowercased names.
    pub fn closest(name: &str) -> Option<Feature> {
        let needle = name.trim().to_ascii_lowercase();
        Feature::ALL
            .into_iter()
            .map(|f| {
                let sim = strsim::jaro_winkler(&needle, &f.name().to_ascii_lowercase());
                (f, sim)
            })
            .filter(|(_, sim)| *sim >= SUGGESTION_MIN_SIMILARITY)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Form grouping. Has no effect on scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Vitals,
    Lifestyle,
    BloodTests,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Vitals, Category::Lifestyle, Category::BloodTests];

    pub fn title(self) -> &'static str {
        match self {
            Category::Vitals => "Vitals",
            Category::Lifestyle => "Lifestyle",
            Category::BloodTests => "Blood Tests",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Vitals => "🫀",
            Category::Lifestyle => "🍽️",
            Category::BloodTests => "🧪",
        }
    }

    /// Controls in the order they appear inside this group.
    pub fn features(self) -> &'static [Feature] {
        match self {
            Category::Vitals => &[
                Feature::Age,
                Feature::Bmi,
                Feature::SystolicBp,
                Feature::DiastolicBp,
                Feature::HeartRate,
            ],
            Category::Lifestyle => &[
                Feature::SaltIntake,
                Feature::SleepDuration,
                Feature::StressLevel,
            ],
            Category::BloodTests => &[
                Feature::Cholesterol,
                Feature::Glucose,
                Feature::Ldl,
                Feature::Hdl,
                Feature::Triglycerides,
            ],
        }
    }
}

/// One complete set of inputs. Every field is required; serde rejects
/// bodies with missing or unknown keys.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    #[serde(rename = "Cholesterol")]
    pub cholesterol: f64,
    #[serde(rename = "Systolic_BP")]
    pub systolic_bp: f64,
    #[serde(rename = "Diastolic_BP")]
    pub diastolic_bp: f64,
    #[serde(rename = "Salt_Intake")]
    pub salt_intake: f64,
    #[serde(rename = "Sleep_Duration")]
    pub sleep_duration: f64,
    #[serde(rename = "Stress_Level")]
    pub stress_level: f64,
    #[serde(rename = "Heart_Rate")]
    pub heart_rate: f64,
    #[serde(rename = "Glucose")]
    pub glucose: f64,
    #[serde(rename = "LDL")]
    pub ldl: f64,
    #[serde(rename = "Triglycerides")]
    pub triglycerides: f64,
    #[serde(rename = "HDL")]
    pub hdl: f64,
}

impl FeatureRecord {
    /// Build a record by asking `value_of` for every feature.
    pub fn from_fn(mut value_of: impl FnMut(Feature) -> f64) -> Self {
        Self {
            age: value_of(Feature::Age),
            bmi: value_of(Feature::Bmi),
            cholesterol: value_of(Feature::Cholesterol),
            systolic_bp: value_of(Feature::SystolicBp),
            diastolic_bp: value_of(Feature::DiastolicBp),
            salt_intake: value_of(Feature::SaltIntake),
            sleep_duration: value_of(Feature::SleepDuration),
            stress_level: value_of(Feature::StressLevel),
            heart_rate: value_of(Feature::HeartRate),
            glucose: value_of(Feature::Glucose),
            ldl: value_of(Feature::Ldl),
            triglycerides: value_of(Feature::Triglycerides),
            hdl: value_of(Feature::Hdl),
        }
    }

    /// Convert a dynamic name → value map.
    ///
    /// Unknown names fail first (with a suggestion), then the first missing
    /// feature in canonical order. Nothing is defaulted.
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self> {
        let mut slots = [None; Feature::COUNT];
        for (name, &v) in values {
            let f = Feature::parse(name)?;
            slots[f.index()] = Some(v);
        }
        Self::from_slots(slots)
    }

    pub(crate) fn from_slots(slots: [Option<f64>; Feature::COUNT]) -> Result<Self> {
        if let Some(f) = Feature::ALL.into_iter().find(|f| slots[f.index()].is_none()) {
            return Err(RiskError::MissingValue(f));
        }
        Ok(Self::from_fn(|f| slots[f.index()].unwrap_or_default()))
    }

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Age => self.age,
            Feature::Bmi => self.bmi,
            Feature::Cholesterol => self.cholesterol,
            Feature::SystolicBp => self.systolic_bp,
            Feature::DiastolicBp => self.diastolic_bp,
            Feature::SaltIntake => self.salt_intake,
            Feature::SleepDuration => self.sleep_duration,
            Feature::StressLevel => self.stress_level,
            Feature::HeartRate => self.heart_rate,
            Feature::Glucose => self.glucose,
            Feature::Ldl => self.ldl,
            Feature::Triglycerides => self.triglycerides,
            Feature::Hdl => self.hdl,
        }
    }

    pub fn set(&mut self, feature: Feature, value: f64) {
        let slot = match feature {
            Feature::Age => &mut self.age,
            Feature::Bmi => &mut self.bmi,
            Feature::Cholesterol => &mut self.cholesterol,
            Feature::SystolicBp => &mut self.systolic_bp,
            Feature::DiastolicBp => &mut self.diastolic_bp,
            Feature::SaltIntake => &mut self.salt_intake,
            Feature::SleepDuration => &mut self.sleep_duration,
            Feature::StressLevel => &mut self.stress_level,
            Feature::HeartRate => &mut self.heart_rate,
            Feature::Glucose => &mut self.glucose,
            Feature::Ldl => &mut self.ldl,
            Feature::Triglycerides => &mut self.triglycerides,
            Feature::Hdl => &mut self.hdl,
        };
        *slot = value;
    }

    /// Builder-style `set`.
    pub fn with(mut self, feature: Feature, value: f64) -> Self {
        self.set(feature, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_lookup() {
        for f in Feature::ALL {
            assert_eq!(Feature::from_name(f.name()), Some(f));
        }
        assert_eq!(Feature::from_name("systolic_bp"), None);
    }

    #[test]
    fn index_matches_canonical_order() {
        for (i, f) in Feature::ALL.into_iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn every_feature_belongs_to_exactly_one_group() {
        let mut seen = Vec::new();
        for c in Category::ALL {
            for &f in c.features() {
                assert_eq!(f.category(), c);
                seen.push(f);
            }
        }
        seen.sort();
        assert_eq!(seen, Feature::ALL.to_vec());
    }

    #[test]
    fn parse_suggests_close_names() {
        match Feature::parse("Cholestrol") {
            Err(RiskError::UnknownFeature { suggestion, .. }) => {
                assert_eq!(suggestion, Some("Cholesterol"))
            }
            other => panic!("expected UnknownFeature, got {other:?}"),
        }
        match Feature::parse("Zinc") {
            Err(RiskError::UnknownFeature { suggestion, .. }) => assert_eq!(suggestion, None),
            other => panic!("expected UnknownFeature, got {other:?}"),
        }
    }

    #[test]
    fn from_map_reports_first_missing_feature() {
        let mut m: HashMap<String, f64> = Feature::ALL
            .into_iter()
            .map(|f| (f.name().to_string(), 1.0))
            .collect();
        m.remove("Heart_Rate");
        m.remove("HDL");
        assert_eq!(
            FeatureRecord::from_map(&m),
            Err(RiskError::MissingValue(Feature::HeartRate))
        );
    }

    #[test]
    fn from_map_rejects_unknown_names() {
        let mut m: HashMap<String, f64> = Feature::ALL
            .into_iter()
            .map(|f| (f.name().to_string(), 1.0))
            .collect();
        m.insert("Weight".into(), 80.0);
        assert!(matches!(
            FeatureRecord::from_map(&m),
            Err(RiskError::UnknownFeature { .. })
        ));
    }

    #[test]
    fn get_and_set_address_the_same_field() {
        let mut r = FeatureRecord::from_fn(|_| 0.0);
        for (i, f) in Feature::ALL.into_iter().enumerate() {
            r.set(f, i as f64 + 0.5);
        }
        for (i, f) in Feature::ALL.into_iter().enumerate() {
            assert_eq!(r.get(f), i as f64 + 0.5);
        }
    }

    #[test]
    fn json_requires_every_field() {
        let json = serde_json::json!({ "Age": 50, "BMI": 24 });
        assert!(serde_json::from_value::<FeatureRecord>(json).is_err());
    }
}
