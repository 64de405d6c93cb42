//! Type-safe enumerations for ADR report fields.
//!
//! Every enumeration serializes to the exact string stored in the reporting
//! forms, which is also the category value the one-hot encoder was trained on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Declares a closed string enumeration with `as_str`, `Display` and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the canonical form value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| ModelError::ParseEnum {
                        kind: stringify!($name),
                        value: s.to_string(),
                    })
            }
        }
    };
}

string_enum! {
    Gender {
        Male => "male",
        Female => "female",
    }
}

string_enum! {
    PregnancyStatus {
        NotApplicable => "not applicable",
        NotPregnant => "not pregnant",
        FirstTrimester => "1st trimester",
        SecondTrimester => "2nd trimester",
        ThirdTrimester => "3rd trimester",
    }
}

string_enum! {
    KnownAllergy {
        Yes => "yes",
        No => "no",
    }
}

string_enum! {
    /// Outcome of re-exposing the patient to the suspect drug.
    Rechallenge {
        Yes => "yes",
        No => "no",
        Unknown => "unknown",
        NotApplicable => "na",
    }
}

string_enum! {
    /// Outcome of withdrawing the suspect drug.
    Dechallenge {
        Yes => "yes",
        No => "no",
        Unknown => "unknown",
        NotApplicable => "na",
    }
}

string_enum! {
    Severity {
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
        Fatal => "fatal",
        Unknown => "unknown",
    }
}

string_enum! {
    IsSerious {
        Yes => "yes",
        No => "no",
    }
}

string_enum! {
    CriteriaForSeriousness {
        Hospitalisation => "hospitalisation",
        Disability => "disability",
        CongenitalAnomaly => "congenital anomaly",
        LifeThreatening => "life-threatening",
        Death => "death",
    }
}

string_enum! {
    ActionTaken {
        DrugWithdrawn => "drug withdrawn",
        DoseReduced => "dose reduced",
        DoseIncreased => "dose increased",
        DoseNotChanged => "dose not changed",
        NotApplicable => "not applicable",
        Unknown => "unknown",
    }
}

string_enum! {
    Outcome {
        Recovered => "recovered",
        RecoveredWithSequelae => "recovered with sequelae",
        Recovering => "recovering",
        NotRecovered => "not recovered",
        Death => "death",
        Unknown => "unknown",
    }
}

string_enum! {
    /// First-line anti-tuberculosis drugs tracked on every report.
    Drug {
        Rifampicin => "rifampicin",
        Isoniazid => "isoniazid",
        Pyrazinamide => "pyrazinamide",
        Ethambutol => "ethambutol",
    }
}

impl Drug {
    /// Capitalized name for display.
    pub fn display_name(&self) -> &'static str {
        match self {
            Drug::Rifampicin => "Rifampicin",
            Drug::Isoniazid => "Isoniazid",
            Drug::Pyrazinamide => "Pyrazinamide",
            Drug::Ethambutol => "Ethambutol",
        }
    }
}

impl Default for Rechallenge {
    fn default() -> Self {
        Rechallenge::Unknown
    }
}

impl Default for Dechallenge {
    fn default() -> Self {
        Dechallenge::Unknown
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Unknown
    }
}

impl Default for ActionTaken {
    fn default() -> Self {
        ActionTaken::Unknown
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Outcome::Unknown
    }
}

/// Causality assessment level.
///
/// The first four levels are produced by the classifier. `Unclassified` and
/// `Unclassifiable` are sentinels: they are assigned when the case lacks the
/// information needed for a prediction, or by an operator override, and never
/// come out of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CausalityLevel {
    Certain,
    Likely,
    Possible,
    Unlikely,
    Unclassified,
    Unclassifiable,
}

impl CausalityLevel {
    /// All levels in scale order.
    pub const ALL: &'static [CausalityLevel] = &[
        CausalityLevel::Certain,
        CausalityLevel::Likely,
        CausalityLevel::Possible,
        CausalityLevel::Unlikely,
        CausalityLevel::Unclassified,
        CausalityLevel::Unclassifiable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CausalityLevel::Certain => "certain",
            CausalityLevel::Likely => "likely",
            CausalityLevel::Possible => "possible",
            CausalityLevel::Unlikely => "unlikely",
            CausalityLevel::Unclassified => "unclassified",
            CausalityLevel::Unclassifiable => "unclassifiable",
        }
    }

    /// Returns true for levels that bypass the classifier.
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            CausalityLevel::Unclassified | CausalityLevel::Unclassifiable
        )
    }

    /// Maps a position on the causality scale back to its level.
    pub fn from_index(index: usize) -> Result<Self, ModelError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ModelError::ClassIndex { index })
    }
}

impl fmt::Display for CausalityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CausalityLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::ParseEnum {
                kind: "CausalityLevel",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_values_case_insensitively() {
        assert_eq!(
            "Not Applicable".parse::<ActionTaken>().unwrap(),
            ActionTaken::NotApplicable
        );
        assert_eq!("na".parse::<Rechallenge>().unwrap(), Rechallenge::NotApplicable);
        assert_eq!(
            "1st trimester".parse::<PregnancyStatus>().unwrap(),
            PregnancyStatus::FirstTrimester
        );
    }

    #[test]
    fn rejects_unknown_values() {
        let err = "sometimes".parse::<Severity>().unwrap_err();
        assert_eq!(
            err,
            ModelError::ParseEnum {
                kind: "Severity",
                value: "sometimes".to_string()
            }
        );
    }

    #[test]
    fn causality_index_round_trips_scale_order() {
        assert_eq!(CausalityLevel::from_index(0).unwrap(), CausalityLevel::Certain);
        assert_eq!(
            CausalityLevel::from_index(5).unwrap(),
            CausalityLevel::Unclassifiable
        );
        assert!(CausalityLevel::from_index(6).is_err());
    }

    #[test]
    fn sentinels() {
        assert!(CausalityLevel::Unclassified.is_sentinel());
        assert!(CausalityLevel::Unclassifiable.is_sentinel());
        assert!(!CausalityLevel::Possible.is_sentinel());
    }
}
