//! Error types for Mailscreen

/// Result type alias using Mailscreen's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Mailscreen operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No resolvable text or label column, or an invalid override
    #[error("configuration error: {0}")]
    Config(String),

    /// A malformed dataset file, row, or label value
    #[error("data quality error: {0}")]
    DataQuality(String),

    /// Training corpus is empty or contains a single class
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// Empty or non-text input handed to the scorer
    #[error("inference input error: {0}")]
    InferenceInput(String),

    /// Training run failures (split, fit, calibration)
    #[error("training error: {0}")]
    Training(String),

    /// Model artifact persistence or loading errors
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new data quality error
    pub fn data_quality(msg: impl Into<String>) -> Self {
        Self::DataQuality(msg.into())
    }

    /// Create a new insufficient data error
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// Create a new inference input error
    pub fn inference_input(msg: impl Into<String>) -> Self {
        Self::InferenceInput(msg.into())
    }

    /// Create a new training error
    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    /// Create a new artifact error
    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }
}
