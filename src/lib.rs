//! Fixtura: Fixture Dependency-Injection and Lifecycle Framework
//!
//! Test fixtures (servers, clients, environments) are produced by plugin
//! suppliers, shared between tests while compatible, and torn down in
//! dependency order.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use fixtura::prelude::*;
//!
//! fixtura::logging::init("fixtura=info");
//! let config = FrameworkConfig::from_env()?;
//! # Ok::<(), FixtureError>(())
//! ```

pub use fixtura_core as core;
#[cfg(feature = "testing")]
pub use fixtura_test as testing;

/// Prelude module for common imports.
pub mod prelude {
    pub use fixtura_core::{
        Extension, FixtureError, FixtureValue, FrameworkConfig, InstanceContext, InstanceId,
        LifeCycle, Marker, MarkerKind, MemberDescriptor, PluginCatalog, ProduceContext, Registry,
        RequestedInstance, Supplier, TestContext, TestInstance, ValueType,
    };
}

/// Log subscriber installation.
pub mod logging {
    use tracing_subscriber::EnvFilter;

    use fixtura_core::FixtureError;
    use fixtura_core::config::LOG_ENV;

    /// Installs a `fmt` subscriber filtered by `FIXTURA_LOG`, then `RUST_LOG`,
    /// then `default_filter`.
    ///
    /// # Errors
    /// Returns an error if the filter is invalid or a global subscriber is
    /// already installed.
    pub fn try_init(default_filter: &str) -> Result<(), FixtureError> {
        let directive = std::env::var(LOG_ENV)
            .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
            .unwrap_or_else(|_| default_filter.to_string());
        let filter = EnvFilter::try_new(&directive)
            .map_err(|e| FixtureError::config(format!("invalid log filter '{directive}': {e}")))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .map_err(|e| FixtureError::config(format!("failed to install subscriber: {e}")))
    }

    /// Like [`try_init`], but ignores failures. Safe to call more than once.
    pub fn init(default_filter: &str) {
        if let Err(e) = try_init(default_filter) {
            tracing::debug!(error = %e, "log subscriber not installed");
        }
    }

}
