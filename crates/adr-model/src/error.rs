use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid {kind} value '{value}'")]
    ParseEnum { kind: &'static str, value: String },

    #[error("explanation shape mismatch: {message}")]
    BundleShape { message: String },

    #[error("class index {index} is outside the causality scale")]
    ClassIndex { index: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
