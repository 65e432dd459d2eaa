//! Error types for fixtura-core.
//!
//! All failure modes are explicit; resolution never panics.

/// Result type alias for fixture operations.
pub type Result<T> = std::result::Result<T, FixtureError>;

/// Error type for fixture resolution, deployment and teardown.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// No deployed, pending or default supplier satisfies a dependency.
    #[error("dependency not found: {value_type}{}", fmt_reference(.reference.as_deref()))]
    DependencyNotFound {
        /// Requested value type.
        value_type: String,
        /// Requested reference name.
        reference: Option<String>,
    },

    /// A supplier failed to produce its value.
    #[error("produce failed for {supplier}: {message}")]
    Produce {
        /// Supplier alias.
        supplier: String,
        /// Failure description.
        message: String,
    },

    /// A supplier failed to close its value.
    #[error("close failed for {supplier}: {message}")]
    Close {
        /// Supplier alias.
        supplier: String,
        /// Failure description.
        message: String,
    },

    /// A supplier's per-test hook failed.
    #[error("before-each hook failed for {supplier}: {message}")]
    Hook {
        /// Supplier alias.
        supplier: String,
        /// Failure description.
        message: String,
    },

    /// One or more isolated close failures during a teardown.
    #[error("teardown finished with {} failure(s): {}", .0.len(), join_errors(.0))]
    Teardown(Vec<FixtureError>),

    /// A resolved value was not of the expected type.
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Expected type name.
        expected: String,
        /// Actual type name.
        actual: String,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn fmt_reference(reference: Option<&str>) -> String {
    reference.map(|r| format!(" (ref: {r})")).unwrap_or_default()
}

fn join_errors(errors: &[FixtureError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FixtureError {
    /// Creates a dependency-not-found error.
    #[must_use]
    pub fn dependency_not_found(value_type: impl Into<String>, reference: Option<&str>) -> Self {
        Self::DependencyNotFound {
            value_type: value_type.into(),
            reference: reference.map(str::to_string),
        }
    }

    /// Creates a produce error.
    #[must_use]
    pub fn produce(supplier: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Produce {
            supplier: supplier.into(),
            message: msg.into(),
        }
    }

    /// Creates a close error.
    #[must_use]
    pub fn close(supplier: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Close {
            supplier: supplier.into(),
            message: msg.into(),
        }
    }

    /// Creates a hook error.
    #[must_use]
    pub fn hook(supplier: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Hook {
            supplier: supplier.into(),
            message: msg.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if this error aborts setup of the current test.
    #[must_use]
    pub const fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::DependencyNotFound { .. }
                | Self::Produce { .. }
                | Self::Hook { .. }
                | Self::TypeMismatch { .. }
        )
    }

    /// Returns true if this error was raised while tearing fixtures down.
    #[must_use]
    pub const fn is_teardown_failure(&self) -> bool {
        matches!(self, Self::Close { .. } | Self::Teardown(_))
    }

    /// Collapses isolated teardown failures into a single result.
    pub(crate) fn from_failures(mut failures: Vec<Self>) -> Result<()> {
        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(Self::Teardown(failures)),
        }
    }
}
