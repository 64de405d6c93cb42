//! Preconditions a case must meet before it is sent to the classifier.

use std::fmt;

use adr_model::{CaseRecord, Dechallenge, Rechallenge};

/// Why a case is assessed as unclassified without running the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibleReason {
    /// No suspected flag is recorded for any of the four drugs.
    SuspectedFlagsMissing,
    /// Both rechallenge and dechallenge are unknown.
    ChallengesUnknown,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IneligibleReason::SuspectedFlagsMissing => "no suspected flag recorded",
            IneligibleReason::ChallengesUnknown => "rechallenge and dechallenge unknown",
        })
    }
}

/// Returns `Err` with the first failed precondition, if any.
///
/// A suspected flag counts as recorded whether it is true or false; only a
/// case with all four flags absent skips the classifier.
pub fn check_eligibility(case: &CaseRecord) -> Result<(), IneligibleReason> {
    if case.exposures().all(|exposure| exposure.suspected.is_none()) {
        return Err(IneligibleReason::SuspectedFlagsMissing);
    }
    if case.rechallenge == Rechallenge::Unknown && case.dechallenge == Dechallenge::Unknown {
        return Err(IneligibleReason::ChallengesUnknown);
    }
    Ok(())
}
