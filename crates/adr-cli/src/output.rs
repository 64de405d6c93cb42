//! JSON records written by `assess`.

use adr_model::{CausalityAssessment, CausalityLevel};
use serde::Serialize;

/// Outcome of one case: the assessment, or the reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseOutcome {
    /// Zero-based position of the case in the input file.
    pub case: usize,
    #[serde(flatten)]
    pub assessment: Option<CausalityAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaseOutcome {
    pub fn assessed(case: usize, assessment: CausalityAssessment) -> Self {
        Self {
            case,
            assessment: Some(assessment),
            error: None,
        }
    }

    pub fn failed(case: usize, error: impl ToString) -> Self {
        Self {
            case,
            assessment: None,
            error: Some(error.to_string()),
        }
    }

    pub fn level(&self) -> Option<CausalityLevel> {
        self.assessment.as_ref().map(|a| a.level)
    }
}

/// Case count per level, in scale order, followed by failures.
pub fn level_counts(outcomes: &[CaseOutcome]) -> (Vec<(CausalityLevel, usize)>, usize) {
    let counts = CausalityLevel::ALL
        .iter()
        .map(|level| {
            let count = outcomes
                .iter()
                .filter(|o| o.level() == Some(*level))
                .count();
            (*level, count)
        })
        .collect();
    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    (counts, failed)
}

pub fn to_json(outcomes: &[CaseOutcome]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcomes)
}
