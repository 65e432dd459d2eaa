//! Harness error types.

/// Result type alias for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Harness errors.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Harness error.
    #[error("harness error: {0}")]
    Harness(String),

    /// Assertion failed inside a test body.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Core fixture error.
    #[error("fixture error: {0}")]
    Fixture(#[from] fixtura_core::FixtureError),
}

impl HarnessError {
    /// Creates a harness error.
    #[must_use]
    pub fn harness(msg: impl Into<String>) -> Self {
        Self::Harness(msg.into())
    }

    /// Creates an assertion error.
    #[must_use]
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }

    /// Returns the underlying fixture error, if any.
    #[must_use]
    pub const fn as_fixture(&self) -> Option<&fixtura_core::FixtureError> {
        match self {
            Self::Fixture(e) => Some(e),
            _ => None,
        }
    }
}
