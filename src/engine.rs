//! # Assessment Engine
//! Pure, testable pipeline: `FeatureRecord` → score breakdown → tier → report.
//! No I/O; the HTTP layer handles logging and metrics around it.

use serde::Serialize;

use crate::feature::FeatureRecord;
use crate::reference::ReferenceTable;
use crate::report::{Report, RiskTier, Severity};
use crate::scorer::{self, RiskScore, ScoreBreakdown};

/// Outcome of one explicit "Calculate Risk Score" trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub record: FeatureRecord,
    pub breakdown: ScoreBreakdown,
    pub tier: RiskTier,
}

impl Assessment {
    pub fn score(&self) -> RiskScore {
        self.breakdown.score
    }

    pub fn report(&self, table: &ReferenceTable) -> Report {
        Report::build(table, &self.record, self.score())
    }

    pub fn view(&self) -> AssessmentView {
        let score = self.score();
        AssessmentView {
            score,
            progress: score.progress(),
            tier: self.tier,
            severity: self.tier.severity(),
            message: self.tier.message(),
            breakdown: self.breakdown.clone(),
        }
    }
}

/// JSON shape returned by `/api/score`.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub score: RiskScore,
    pub progress: f64,
    pub tier: RiskTier,
    pub severity: Severity,
    pub message: &'static str,
    pub breakdown: ScoreBreakdown,
}

pub fn assess(table: &ReferenceTable, record: FeatureRecord) -> Assessment {
    let breakdown = scorer::breakdown(table, &record);
    let tier = breakdown.score.tier();
    Assessment {
        record,
        breakdown,
        tier,
    }
}
