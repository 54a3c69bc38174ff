/// Convenience result type used across ledtrack.
pub type LedResult<T> = Result<T, LedError>;

/// Top-level error taxonomy used by core APIs.
///
/// Every fallible operation fails closed: when one of these is returned, the pattern it was
/// called on has not been mutated.
#[derive(thiserror::Error, Debug)]
pub enum LedError {
    /// A precondition was violated (dimension mismatch, duplicate keyframe, last track removal, ...).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Automation action parameters are outside their valid range.
    #[error("transform error: {0}")]
    Transform(String),

    /// Errors while editing or sampling keyframe animations.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors when serializing or deserializing project state.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LedError {
    /// Build a [`LedError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`LedError::Transform`] value.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Build a [`LedError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`LedError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
