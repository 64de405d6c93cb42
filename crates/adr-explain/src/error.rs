use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExplainError {
    #[error("background sample is empty")]
    EmptyBackground,

    #[error("background row {row} has {found} features, expected {expected}")]
    BackgroundWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("background weights are invalid: {message}")]
    InvalidWeights { message: String },

    #[error("instance has {found} features, expected {expected}")]
    InputWidth { expected: usize, found: usize },

    #[error("model returned {found} outputs, expected {expected}")]
    ModelOutputs { expected: usize, found: usize },

    #[error("weighted least squares system is singular")]
    Singular,
}

pub type Result<T> = std::result::Result<T, ExplainError>;
