//! Feature engineering for ADR causality assessment.
//!
//! The pipeline runs in three steps that mirror the training-time
//! preprocessing exactly:
//!
//! 1. [`build_case_frame`] lays raw case records out as a polars frame;
//! 2. [`derive_features`] computes derived columns and fills missing values;
//! 3. [`FeatureCodec::encode`] one-hot encodes, scales and reorders into the
//!    classifier's input layout.
//!
//! [`reconstruct_values`] maps encoded values back to display values.

pub mod codec;
pub mod derive;
pub mod error;
pub mod frame;
pub mod reconstruct;

pub use codec::{FeatureCodec, FeatureMatrix, MISSING_CATEGORY};
pub use derive::{FeatureOptions, MISSING_SENTINEL, derive_features};
pub use error::{FeatureError, Result};
pub use frame::build_case_frame;
pub use reconstruct::{reconstruct_value, reconstruct_values};

use adr_model::{CaseRecord, ColumnMetadata};
use polars::prelude::DataFrame;

/// Builds the case frame and applies the derivation steps.
pub fn prepare_features(
    cases: &[CaseRecord],
    metadata: &ColumnMetadata,
    options: &FeatureOptions,
) -> Result<DataFrame> {
    let frame = build_case_frame(cases)?;
    derive_features(frame, metadata, options)
}
