/// Convenience result type used across silkflow.
pub type SilkflowResult<T> = Result<T, SilkflowError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only construction-time problems surface as errors. Per-frame conditions (missing surface,
/// failed resize, storage denied) are tolerated and logged instead.
#[derive(thiserror::Error, Debug)]
pub enum SilkflowError {
    /// Invalid user-provided configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Drawing surface could not be created or resized.
    #[error("surface error: {0}")]
    Surface(String),

    /// Session storage refused a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SilkflowError {
    /// Build a [`SilkflowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SilkflowError::Surface`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }

    /// Build a [`SilkflowError::Storage`] value.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Build a [`SilkflowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
