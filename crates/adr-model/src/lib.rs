//! Data model for ADR causality assessment.
//!
//! - **case**: raw case records and the typed field registry
//! - **enums**: reporting-form vocabularies and the causality scale
//! - **metadata**: training-time column metadata
//! - **assessment**: verdicts and additive explanations
//! - **lenient**: forgiving deserializers for exported case data

pub mod assessment;
pub mod case;
pub mod enums;
pub mod error;
pub mod lenient;
pub mod metadata;

pub use assessment::{
    CausalityAssessment, ClassRanking, DEFAULT_MODEL_ID, ExplanationBundle, FeatureContribution,
    ReconstructedValue,
};
pub use case::{
    CaseField, CaseRecord, DerivedField, DrugExposure, ExposureField, FieldKind, FieldValue,
    column_kind,
};
pub use enums::{
    ActionTaken, CausalityLevel, CriteriaForSeriousness, Dechallenge, Drug, Gender, IsSerious,
    KnownAllergy, Outcome, PregnancyStatus, Rechallenge, Severity,
};
pub use error::{ModelError, Result};
pub use metadata::ColumnMetadata;
