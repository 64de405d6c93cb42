//! Additive feature attribution for black-box classifiers.
//!
//! [`KernelExplainer`] decomposes each model output into one contribution
//! per feature plus a base value, the expected output over a weighted
//! background sample. The background is usually a [`kmeans::summarize`]
//! summary of training-format data. Clustering and coalition sampling are
//! seeded, so the same inputs always produce the same explanation.

mod background;
mod error;
pub mod kernel;
pub mod kmeans;
mod linalg;

pub use background::Background;
pub use error::{ExplainError, Result};
pub use kernel::{Attribution, KernelConfig, KernelExplainer, ProbabilityModel};
pub use kmeans::summarize;
