/// Convenience result type used across the baking pipeline.
pub type WavyteResult<T> = Result<T, WavyteError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Script-authoring faults are not represented here: they are contained by the bake
/// orchestrator and surfaced on the artifact instead of being returned to the caller.
#[derive(thiserror::Error, Debug)]
pub enum WavyteError {
    /// Invalid user-provided options or inputs.
    #[error("validation error: {0}")]
    Validation(String),

    /// The per-frame delta was read outside of an active frame advance.
    #[error("invalid time access: {0}")]
    InvalidTimeAccess(String),

    /// A scene edit referenced something the scene cannot satisfy.
    #[error("scene error: {0}")]
    Scene(String),

    /// A mutation was attempted while no recording boundary was open.
    #[error("recording error: {0}")]
    Recording(String),

    /// The builtin error behavior itself failed; there is no further fallback.
    #[error("fallback behavior fault: {message}")]
    FallbackFault {
        /// Message of the fault raised by the fallback behavior.
        message: String,
        /// Message of the original script fault that triggered the fallback.
        original: String,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WavyteError {
    /// Build a [`WavyteError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`WavyteError::InvalidTimeAccess`] value.
    pub fn invalid_time_access(msg: impl Into<String>) -> Self {
        Self::InvalidTimeAccess(msg.into())
    }

    /// Build a [`WavyteError::Scene`] value.
    pub fn scene(msg: impl Into<String>) -> Self {
        Self::Scene(msg.into())
    }

    /// Build a [`WavyteError::Recording`] value.
    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording(msg.into())
    }

    /// Build a [`WavyteError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
