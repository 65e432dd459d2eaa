//! Supplier contract and production context.
//!
//! A supplier is the factory for one kind of fixture. Plugins provide
//! suppliers; the [`Registry`] stays polymorphic over them through this
//! trait alone.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fixtura_core::{
//!     FixtureValue, InstanceContext, MarkerKind, ProduceContext, Result, Supplier, ValueType,
//! };
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct DatabaseSupplier;
//!
//! impl Supplier for DatabaseSupplier {
//!     fn value_type(&self) -> ValueType {
//!         ValueType::of::<Database>()
//!     }
//!
//!     fn marker_kind(&self) -> MarkerKind {
//!         MarkerKind::new("database")
//!     }
//!
//!     fn alias(&self) -> &str {
//!         "in-memory"
//!     }
//!
//!     fn produce(&self, ctx: &mut ProduceContext<'_>) -> Result<FixtureValue> {
//!         let name = ctx.marker().get_str("name").unwrap_or("test");
//!         Ok(Arc::new(Database { url: format!("mem://{name}") }))
//!     }
//!
//!     fn close(&self, instance: InstanceContext) -> Result<()> {
//!         drop(instance.into_value());
//!         Ok(())
//!     }
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::error::{FixtureError, Result};
use crate::instance::{InstanceContext, InstanceDraft, RequestedInstance};
use crate::marker::{Marker, MarkerKind};
use crate::registry::Registry;
use crate::types::{FixtureValue, InstanceId, LifeCycle, TestContext, ValueType};

/// Factory capability for one kind of fixture.
///
/// # Implementation Guidelines
///
/// 1. **produce**: Build the value. Pull other fixtures through
///    [`ProduceContext::dependency`] so the registry can order teardown.
///
/// 2. **compatible**: Decide whether a deployed instance can serve a new
///    request. The default compares marker configurations.
///
/// 3. **on_before_each**: Refresh per-test state. Called for every
///    deployed instance before each test, reused or not.
///
/// 4. **close**: Release the value. Called exactly once per instance, and
///    only after every dependent instance has been closed.
pub trait Supplier: Send + Sync + 'static {
    /// Returns the type of the values this supplier produces.
    fn value_type(&self) -> ValueType;

    /// Returns the marker kind that triggers this supplier.
    fn marker_kind(&self) -> MarkerKind;

    /// Returns the alias distinguishing this supplier among suppliers of
    /// the same value type.
    fn alias(&self) -> &str;

    /// Returns the lifecycle used when a marker does not override it.
    fn default_lifecycle(&self) -> LifeCycle {
        LifeCycle::Class
    }

    /// Resolves the lifecycle for a marker.
    ///
    /// # Errors
    /// Returns an error if the marker carries an invalid lifecycle.
    fn lifecycle(&self, marker: &Marker) -> Result<LifeCycle> {
        Ok(marker
            .lifecycle()?
            .unwrap_or_else(|| self.default_lifecycle()))
    }

    /// Resolves the reference name for a marker.
    fn reference(&self, marker: &Marker) -> Option<String> {
        marker.reference()
    }

    /// Returns the marker synthesized for unconfigured dependencies.
    fn default_marker(&self) -> Marker {
        Marker::new(self.marker_kind())
    }

    /// Produces a value.
    ///
    /// # Errors
    /// Returns an error if the value cannot be produced; the instance is
    /// then never deployed.
    fn produce(&self, ctx: &mut ProduceContext<'_>) -> Result<FixtureValue>;

    /// Returns true if `deployed` can serve `requested`.
    fn compatible(&self, deployed: &InstanceContext, requested: &RequestedInstance) -> bool {
        deployed.marker().same_config(requested.marker())
    }

    /// Per-test hook.
    ///
    /// # Errors
    /// Returns an error to abort setup of the current test.
    fn on_before_each(&self, _instance: &InstanceContext) -> Result<()> {
        Ok(())
    }

    /// Releases an instance. The context is consumed.
    ///
    /// # Errors
    /// Returns an error if the value could not be released cleanly. The
    /// instance is already undeployed at this point.
    fn close(&self, instance: InstanceContext) -> Result<()>;
}

/// Context handed to [`Supplier::produce`].
///
/// Describes the instance being produced and gives access to the registry
/// for dependency resolution. Dependencies obtained here are recorded so
/// that they outlive the instance being produced.
pub struct ProduceContext<'a> {
    registry: &'a mut Registry,
    draft: &'a InstanceDraft,
}

impl<'a> ProduceContext<'a> {
    pub(crate) fn new(registry: &'a mut Registry, draft: &'a InstanceDraft) -> Self {
        Self { registry, draft }
    }

    /// Returns the ID the instance will be deployed under.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.draft.id
    }

    /// Returns the originating marker.
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.draft.marker
    }

    /// Returns the declared value type, if any.
    #[must_use]
    pub fn value_type(&self) -> Option<ValueType> {
        self.draft.value_type
    }

    /// Returns the reference name.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.draft.reference.as_deref()
    }

    /// Returns the lifecycle.
    #[must_use]
    pub fn lifecycle(&self) -> LifeCycle {
        self.draft.lifecycle
    }

    /// Returns the test currently being set up.
    #[must_use]
    pub fn current_test(&self) -> Option<&TestContext> {
        self.registry.current_context()
    }

    /// Resolves a dependency and records this instance as its dependent.
    ///
    /// # Errors
    /// Returns [`FixtureError::DependencyNotFound`] if nothing can supply it,
    /// or the dependency's own production error.
    pub fn dependency(
        &mut self,
        value_type: ValueType,
        reference: Option<&str>,
    ) -> Result<FixtureValue> {
        self.registry
            .get_dependency(value_type, reference, self.draft.id)
    }

    /// Typed variant of [`dependency`](Self::dependency).
    ///
    /// # Errors
    /// Returns [`FixtureError::TypeMismatch`] if the resolved value is not a `T`.
    pub fn dependency_as<T: Any + Send + Sync>(
        &mut self,
        reference: Option<&str>,
    ) -> Result<Arc<T>> {
        let expected = ValueType::of::<T>();
        self.dependency(expected, reference)?
            .downcast::<T>()
            .map_err(|_| FixtureError::TypeMismatch {
                expected: expected.name().to_string(),
                actual: "value of an undeclared type".to_string(),
            })
    }
}
