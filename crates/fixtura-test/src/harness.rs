//! Class harness.
//!
//! Sequences a [`Registry`] the way a test runner would:
//!
//! ```text
//! for each method:  reset slots → before_each → body → after_each
//! after the class:  after_all
//! ```

use std::sync::Arc;

use fixtura_core::{
    FrameworkConfig, PluginCatalog, Registry, Supplier, TestContext, TestInstance as _,
    ValueTypeAliases,
};

use crate::class::TestClass;
use crate::error::{HarnessError, Result};

/// Test body run by the harness.
pub type TestBody<'a> = Box<dyn FnOnce(&TestClass) -> Result<()> + 'a>;

/// Drives one registry through test classes.
#[derive(Debug)]
pub struct ClassHarness {
    registry: Registry,
}

impl ClassHarness {
    /// Creates a harness around an existing registry.
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Creates a harness over `suppliers`, in discovery order.
    #[must_use]
    pub fn from_suppliers(suppliers: Vec<Arc<dyn Supplier>>, config: &FrameworkConfig) -> Self {
        let catalog = PluginCatalog::new(suppliers, ValueTypeAliases::new());
        Self::new(Registry::new(Arc::new(catalog), config))
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the registry mutably.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Runs one test method.
    ///
    /// `after_each` runs even when setup or the body fails; the first
    /// failure is returned.
    ///
    /// # Errors
    /// Returns the setup, body or teardown failure.
    pub fn run_method<F>(&mut self, class: &mut TestClass, method: &str, body: F) -> Result<()>
    where
        F: FnOnce(&TestClass) -> Result<()>,
    {
        tracing::info!(class = class.class_name(), method, "running test method");
        class.reset();
        self.registry.set_current_context(Some(
            TestContext::class(class.class_name()).with_method(method),
        ));

        let outcome = self
            .registry
            .before_each(class)
            .map_err(HarnessError::from)
            .and_then(|()| body(class));
        let teardown = self.registry.after_each().map_err(HarnessError::from);
        self.registry.set_current_context(None);

        if let Err(e) = &outcome {
            tracing::debug!(method, error = %e, "test method failed");
        }
        outcome.and(teardown)
    }

    /// Runs every method of a class, then `after_all`.
    ///
    /// Failing methods do not stop the class.
    pub fn run_class<'a>(
        &mut self,
        class: &mut TestClass,
        methods: impl IntoIterator<Item = (&'a str, TestBody<'a>)>,
    ) -> ClassReport {
        let outcomes = methods
            .into_iter()
            .map(|(method, body)| MethodOutcome {
                method: method.to_string(),
                result: self.run_method(class, method, body),
            })
            .collect();

        let after_all = self.registry.after_all().map_err(HarnessError::from);
        ClassReport {
            outcomes,
            after_all,
        }
    }

    /// Closes every remaining instance.
    ///
    /// # Errors
    /// Returns the close failures collected along the way.
    pub fn finish(mut self) -> Result<()> {
        self.registry.close().map_err(HarnessError::from)
    }
}

/// Result of one test method.
#[derive(Debug)]
pub struct MethodOutcome {
    /// Method name.
    pub method: String,
    /// Setup, body and teardown result.
    pub result: Result<()>,
}

/// Result of a whole test class.
#[derive(Debug)]
pub struct ClassReport {
    /// Per-method results, in run order.
    pub outcomes: Vec<MethodOutcome>,
    /// `after_all` result.
    pub after_all: Result<()>,
}

impl ClassReport {
    /// Returns true if every method and `after_all` succeeded.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.after_all.is_ok() && self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Returns the names of failed methods.
    #[must_use]
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.method.as_str())
            .collect()
    }
}
