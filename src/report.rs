//! report.rs — risk tier guidance and the downloadable CSV report.
//!
//! Tier bands are lower-inclusive: `[0, 30)` Low, `[30, 70)` Moderate, `[70, ∞)` High.
//! The report is one row per feature in reference-table order plus a trailing
//! `Risk Score` row.

use serde::{Deserialize, Serialize};

use crate::feature::FeatureRecord;
use crate::reference::ReferenceTable;
use crate::scorer::RiskScore;

pub const REPORT_FILE_NAME: &str = "hypertension_report.csv";
pub const REPORT_CONTENT_TYPE: &str = "text/csv";
pub const REPORT_HEADER: [&str; 3] = ["Feature", "Value", "Unit"];
pub const SCORE_ROW_NAME: &str = "Risk Score";
pub const SCORE_ROW_UNIT: &str = "/100";

pub const MODERATE_THRESHOLD: f64 = 30.0;
pub const HIGH_THRESHOLD: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

/// Visual weight of a tier message (maps to alert styling in the UI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl RiskTier {
    pub fn classify(score: f64) -> Self {
        if score < MODERATE_THRESHOLD {
            RiskTier::Low
        } else if score < HIGH_THRESHOLD {
            RiskTier::Moderate
        } else {
            RiskTier::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk — Great! Keep up the healthy habits.",
            RiskTier::Moderate => "Moderate Risk — Consider reviewing diet, activity, and stress.",
            RiskTier::High => "High Risk — Please consult a healthcare provider.",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            RiskTier::Low => "🟢",
            RiskTier::Moderate => "🟠",
            RiskTier::High => "🔴",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            RiskTier::Low => Severity::Success,
            RiskTier::Moderate => Severity::Warning,
            RiskTier::High => Severity::Error,
        }
    }
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub feature: String,
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn build(table: &ReferenceTable, record: &FeatureRecord, score: RiskScore) -> Self {
        let mut rows: Vec<ReportRow> = table
            .iter()
            .map(|def| ReportRow {
                feature: def.name().to_string(),
                value: record.get(def.feature),
                unit: def.unit.clone(),
            })
            .collect();
        rows.push(ReportRow {
            feature: SCORE_ROW_NAME.to_string(),
            value: score.value(),
            unit: SCORE_ROW_UNIT.to_string(),
        });
        Self { rows }
    }

    /// Header line + one line per row, `\n` terminated, no trailing metadata.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(32 * (self.rows.len() + 1));
        push_csv_line(&mut out, &REPORT_HEADER);
        for r in &self.rows {
            let value = format_value(r.value);
            push_csv_line(&mut out, &[r.feature.as_str(), value.as_str(), r.unit.as_str()]);
        }
        out
    }

    /// UTF-8 bytes for the download body.
    pub fn to_csv_bytes(&self) -> Vec<u8> {
        self.to_csv().into_bytes()
    }
}

/// Shortest round-trip decimal, always with a fraction (`45.0`, `6.5`).
fn format_value(v: f64) -> String {
    format!("{v:?}")
}

fn push_csv_line(out: &mut String, fields: &[&str]) {
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_csv_field(out, f);
    }
    out.push('\n');
}

fn push_csv_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}
