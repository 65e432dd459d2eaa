//! Requested and deployed fixture instances.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::marker::Marker;
use crate::supplier::Supplier;
use crate::types::{FixtureValue, InstanceId, LifeCycle, ValueType};

/// A pending fixture request discovered on a test class or member.
///
/// Lives only between discovery and deployment (or reuse) within one
/// setup pass.
#[derive(Clone)]
pub struct RequestedInstance {
    supplier: Arc<dyn Supplier>,
    marker: Marker,
    value_type: Option<ValueType>,
    reference: Option<String>,
    lifecycle: LifeCycle,
}

impl RequestedInstance {
    /// Creates a request, resolving reference and lifecycle through the supplier.
    ///
    /// # Errors
    /// Returns an error if the marker carries an invalid lifecycle.
    pub fn new(
        supplier: Arc<dyn Supplier>,
        marker: Marker,
        value_type: Option<ValueType>,
    ) -> Result<Self> {
        let reference = supplier.reference(&marker);
        let lifecycle = supplier.lifecycle(&marker)?;
        Ok(Self {
            supplier,
            marker,
            value_type,
            reference,
            lifecycle,
        })
    }

    /// Returns the supplier answering this request.
    #[must_use]
    pub const fn supplier(&self) -> &Arc<dyn Supplier> {
        &self.supplier
    }

    /// Returns the originating marker.
    #[must_use]
    pub const fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Returns the declared member type, if the request came from a member.
    #[must_use]
    pub const fn value_type(&self) -> Option<ValueType> {
        self.value_type
    }

    /// Returns the reference name.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Returns the resolved lifecycle.
    #[must_use]
    pub const fn lifecycle(&self) -> LifeCycle {
        self.lifecycle
    }

    /// Returns true if this request asks for `value_type` under `reference`.
    #[must_use]
    pub fn is_for(&self, value_type: ValueType, reference: Option<&str>) -> bool {
        self.supplier.value_type() == value_type && self.reference() == reference
    }
}

impl fmt::Debug for RequestedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestedInstance")
            .field("supplier", &self.supplier.alias())
            .field("marker", &self.marker)
            .field("value_type", &self.value_type)
            .field("reference", &self.reference)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

/// Everything known about an instance before its value exists.
pub(crate) struct InstanceDraft {
    pub(crate) id: InstanceId,
    pub(crate) supplier: Arc<dyn Supplier>,
    pub(crate) marker: Marker,
    pub(crate) value_type: Option<ValueType>,
    pub(crate) reference: Option<String>,
    pub(crate) lifecycle: LifeCycle,
}

impl InstanceDraft {
    pub(crate) fn from_request(request: RequestedInstance) -> Self {
        Self {
            id: InstanceId::new(),
            supplier: request.supplier,
            marker: request.marker,
            value_type: request.value_type,
            reference: request.reference,
            lifecycle: request.lifecycle,
        }
    }

    pub(crate) fn into_context(self, value: FixtureValue) -> InstanceContext {
        InstanceContext {
            id: self.id,
            supplier: self.supplier,
            marker: self.marker,
            value_type: self.value_type,
            value,
            reference: self.reference,
            lifecycle: self.lifecycle,
            dependents: Vec::new(),
        }
    }
}

/// A deployed fixture: the produced value plus its bookkeeping.
///
/// The context exclusively owns the value handle. Dependents are recorded
/// by ID only and never keep another instance alive.
pub struct InstanceContext {
    id: InstanceId,
    supplier: Arc<dyn Supplier>,
    marker: Marker,
    value_type: Option<ValueType>,
    value: FixtureValue,
    reference: Option<String>,
    lifecycle: LifeCycle,
    dependents: Vec<InstanceId>,
}

impl InstanceContext {
    /// Returns the instance ID.
    #[must_use]
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// Returns the supplier that produced this instance.
    #[must_use]
    pub const fn supplier(&self) -> &Arc<dyn Supplier> {
        &self.supplier
    }

    /// Returns the originating marker.
    #[must_use]
    pub const fn marker(&self) -> &Marker {
        &self.marker
    }

    /// Returns the declared value type, if any.
    #[must_use]
    pub const fn value_type(&self) -> Option<ValueType> {
        self.value_type
    }

    /// Returns the produced value.
    #[must_use]
    pub const fn value(&self) -> &FixtureValue {
        &self.value
    }

    /// Returns the produced value as `T`, if it is one.
    #[must_use]
    pub fn value_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Consumes the context, releasing the value.
    #[must_use]
    pub fn into_value(self) -> FixtureValue {
        self.value
    }

    /// Returns the reference name.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Returns the lifecycle.
    #[must_use]
    pub const fn lifecycle(&self) -> LifeCycle {
        self.lifecycle
    }

    /// Returns the instances that consumed this one as a dependency.
    #[must_use]
    pub fn dependents(&self) -> &[InstanceId] {
        &self.dependents
    }

    /// Records `dependent` as a consumer of this instance.
    pub(crate) fn register_dependency(&mut self, dependent: InstanceId) {
        if dependent != self.id && !self.dependents.contains(&dependent) {
            self.dependents.push(dependent);
        }
    }

    /// Forgets `dependent`, used when its production failed.
    pub(crate) fn forget_dependent(&mut self, dependent: InstanceId) {
        self.dependents.retain(|d| *d != dependent);
    }

    /// Returns true if this instance was produced for `value_type` under `reference`.
    #[must_use]
    pub fn is_for(&self, value_type: ValueType, reference: Option<&str>) -> bool {
        self.supplier.value_type() == value_type && self.reference() == reference
    }
}

impl fmt::Debug for InstanceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceContext")
            .field("id", &self.id)
            .field("supplier", &self.supplier.alias())
            .field("marker", &self.marker)
            .field("reference", &self.reference)
            .field("lifecycle", &self.lifecycle)
            .field("dependents", &self.dependents)
            .finish_non_exhaustive()
    }
}
