//! Trained model artifacts for ADR causality assessment.
//!
//! The training pipeline exports column metadata, a one-hot encoder, an
//! ordinal encoder, a min-max scaler and the classifier as JSON files under a
//! single directory. [`ArtifactBundle::load`] reads them, verifies their
//! SHA-256 digests against `manifest.toml` when one is present, and checks
//! that the pieces agree with each other before anything is predicted.

#![deny(unsafe_code)]

pub mod bundle;
pub mod classifier;
pub mod encoders;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod metadata;
pub mod model_info;
pub mod scaler;

pub use bundle::{ArtifactBundle, ArtifactSummary};
pub use classifier::{Classifier, DecisionTree, LogisticRegression, RandomForest, TreeNode};
pub use encoders::{OneHotColumn, OneHotEncoder, OrdinalEncoder};
pub use error::{ConfigurationError, Result};
pub use manifest::{ArtifactLocator, ArtifactRole, MANIFEST_FILE, Manifest, ModelPin};
pub use model_info::ModelInfo;
pub use scaler::MinMaxScaler;
