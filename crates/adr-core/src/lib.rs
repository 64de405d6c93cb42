//! ADR causality assessment.
//!
//! [`AssessmentContext::initialize`] loads the trained artifacts and builds
//! an additive explainer over a k-means summary of training-format data.
//! [`AssessmentContext::assess`] then takes a single case through the
//! eligibility gate, feature encoding, classification and explanation.

pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod labels;
pub mod pipeline;
pub mod predictor;

pub use config::{AssessmentConfig, ExplainerConfig, FeatureConfig};
pub use context::{AssessmentContext, ClassifierModel};
pub use error::{AssessmentError, Result};
pub use gate::{IneligibleReason, check_eligibility};
pub use labels::feature_label;
pub use pipeline::encode_cases;
pub use predictor::{Prediction, predict};
