//! Registry - resolves, shares and tears down fixture instances.
//!
//! One registry serves one test-class lifecycle. It owns the deployed
//! instances and the pending requests outright; nothing outside it holds
//! a mutable view of either.
//!
//! ```text
//! before_each:  discover → match (reuse | destroy) → deploy → inject → hooks
//! after_each:   destroy METHOD instances
//! after_all:    destroy CLASS instances
//! close:        destroy everything
//! ```

use std::sync::Arc;

use crate::catalog::{PluginCatalog, SupplierSelection};
use crate::config::FrameworkConfig;
use crate::error::{FixtureError, Result};
use crate::instance::{InstanceContext, InstanceDraft, RequestedInstance};
use crate::marker::Marker;
use crate::structure::{MemberDescriptor, TestInstance};
use crate::supplier::{ProduceContext, Supplier};
use crate::types::{
    FixtureValue, InstanceId, LifeCycle, TestContext, ValueType, normalize_reference,
};

/// Fixture registry for one test class.
pub struct Registry {
    /// Discovery result this registry was built from.
    catalog: Arc<PluginCatalog>,
    /// Active suppliers, at most one per value type.
    suppliers: Vec<Arc<dyn Supplier>>,
    /// Suppliers passed over at construction.
    skipped: Vec<Arc<dyn Supplier>>,
    /// Deployed instances, in deployment order.
    deployed: Vec<InstanceContext>,
    /// Requests discovered for the current setup pass.
    requested: Vec<RequestedInstance>,
    /// Test currently being set up.
    current: Option<TestContext>,
}

impl Registry {
    /// Creates a registry, selecting active suppliers from `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<PluginCatalog>, config: &FrameworkConfig) -> Self {
        let SupplierSelection { active, skipped } = catalog.select(config);

        tracing::info!(
            active = active.len(),
            skipped = skipped.len(),
            "registry created"
        );

        Self {
            catalog,
            suppliers: active,
            skipped,
            deployed: Vec::new(),
            requested: Vec::new(),
            current: None,
        }
    }

    /// Creates a registry from the process-wide catalog.
    ///
    /// # Errors
    /// Returns an error if no catalog has been installed.
    pub fn from_installed(config: &FrameworkConfig) -> Result<Self> {
        let catalog = PluginCatalog::installed()
            .ok_or_else(|| FixtureError::config("no plugin catalog installed"))?;
        Ok(Self::new(catalog, config))
    }

    /// Returns the catalog this registry was built from.
    #[must_use]
    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    /// Returns the active suppliers.
    #[must_use]
    pub fn suppliers(&self) -> &[Arc<dyn Supplier>] {
        &self.suppliers
    }

    /// Returns the suppliers skipped at construction.
    #[must_use]
    pub fn skipped_suppliers(&self) -> &[Arc<dyn Supplier>] {
        &self.skipped
    }

    /// Returns the deployed instances, in deployment order.
    #[must_use]
    pub fn deployed(&self) -> &[InstanceContext] {
        &self.deployed
    }

    /// Returns a deployed instance by ID.
    #[must_use]
    pub fn instance(&self, id: InstanceId) -> Option<&InstanceContext> {
        self.deployed.iter().find(|i| i.id() == id)
    }

    /// Returns true if `id` is currently deployed.
    #[must_use]
    pub fn is_deployed(&self, id: InstanceId) -> bool {
        self.instance(id).is_some()
    }

    /// Returns the deployed instance produced for `value_type` under `reference`.
    #[must_use]
    pub fn find_deployed(
        &self,
        value_type: ValueType,
        reference: Option<&str>,
    ) -> Option<&InstanceContext> {
        let reference = normalize_reference(reference);
        self.deployed
            .iter()
            .find(|i| i.is_for(value_type, reference.as_deref()))
    }

    /// Returns the number of requests still pending.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.requested.len()
    }

    /// Returns the test currently being set up.
    #[must_use]
    pub const fn current_context(&self) -> Option<&TestContext> {
        self.current.as_ref()
    }

    /// Sets the test currently being set up.
    pub fn set_current_context(&mut self, context: Option<TestContext>) {
        self.current = context;
    }

    // -------------------------------------------------------------------------
    // Dependency resolution
    // -------------------------------------------------------------------------

    /// Resolves a dependency on behalf of `dependent`.
    ///
    /// Resolution order: a deployed instance, then a pending request for
    /// this test, then the first active supplier of `value_type` with a
    /// default marker. Whatever is found records `dependent` so it is
    /// destroyed first.
    ///
    /// # Errors
    /// Returns [`FixtureError::DependencyNotFound`] if none applies, or the
    /// error of a supplier deployed along the way.
    pub fn get_dependency(
        &mut self,
        value_type: ValueType,
        reference: Option<&str>,
        dependent: InstanceId,
    ) -> Result<FixtureValue> {
        let reference = normalize_reference(reference);
        let reference = reference.as_deref();

        if let Some(value) = self.deployed_dependency(value_type, reference, dependent) {
            return Ok(value);
        }
        if let Some(value) = self.requested_dependency(value_type, reference, dependent)? {
            return Ok(value);
        }
        if let Some(value) = self.unconfigured_dependency(value_type, reference, dependent)? {
            return Ok(value);
        }

        Err(FixtureError::dependency_not_found(
            value_type.name(),
            reference,
        ))
    }

    fn deployed_dependency(
        &mut self,
        value_type: ValueType,
        reference: Option<&str>,
        dependent: InstanceId,
    ) -> Option<FixtureValue> {
        let dependency = self
            .deployed
            .iter_mut()
            .find(|i| i.is_for(value_type, reference))?;
        dependency.register_dependency(dependent);

        tracing::debug!(
            supplier = dependency.supplier().alias(),
            dependent = %dependent,
            "injecting existing dependency"
        );

        Some(Arc::clone(dependency.value()))
    }

    fn requested_dependency(
        &mut self,
        value_type: ValueType,
        reference: Option<&str>,
        dependent: InstanceId,
    ) -> Result<Option<FixtureValue>> {
        let Some(index) = self
            .requested
            .iter()
            .position(|r| r.is_for(value_type, reference))
        else {
            return Ok(None);
        };

        let request = self.requested.remove(index);
        let dependency = self.deploy(InstanceDraft::from_request(request))?;
        dependency.register_dependency(dependent);

        tracing::debug!(
            supplier = dependency.supplier().alias(),
            dependent = %dependent,
            "injecting requested dependency"
        );

        Ok(Some(Arc::clone(dependency.value())))
    }

    fn unconfigured_dependency(
        &mut self,
        value_type: ValueType,
        reference: Option<&str>,
        dependent: InstanceId,
    ) -> Result<Option<FixtureValue>> {
        let Some(supplier) = self
            .suppliers
            .iter()
            .find(|s| s.value_type() == value_type)
            .map(Arc::clone)
        else {
            return Ok(None);
        };

        let mut marker = supplier.default_marker();
        if let Some(reference) = reference {
            marker = marker.with_ref(reference);
        }
        let request = RequestedInstance::new(supplier, marker, Some(value_type))?;
        let dependency = self.deploy(InstanceDraft::from_request(request))?;
        dependency.register_dependency(dependent);

        tracing::debug!(
            supplier = dependency.supplier().alias(),
            dependent = %dependent,
            "injecting un-configured dependency"
        );

        Ok(Some(Arc::clone(dependency.value())))
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    /// Prepares fixtures for one test and injects them into `test`.
    ///
    /// # Errors
    /// Returns the first resolution, production or hook failure. Pending
    /// requests never survive a failed pass.
    pub fn before_each(&mut self, test: &mut dyn TestInstance) -> Result<()> {
        if let Err(e) = self.resolve(&*test) {
            if !self.requested.is_empty() {
                tracing::debug!(
                    abandoned = self.requested.len(),
                    "discarding pending requests after failed setup"
                );
                self.requested.clear();
            }
            return Err(e);
        }
        self.inject_members(test);
        self.invoke_before_each_on_suppliers()
    }

    fn resolve(&mut self, test: &dyn TestInstance) -> Result<()> {
        self.find_requested_instances(test)?;
        self.match_deployed_instances_with_requested_instances()?;
        self.deploy_requested_instances()
    }

    fn find_requested_instances(&mut self, test: &dyn TestInstance) -> Result<()> {
        if let Some(request) = self.create_requested_instance(&test.class_markers(), None)? {
            self.requested.push(request);
        }

        for member in test.members() {
            if let Some(request) =
                self.create_requested_instance(&member.markers, Some(member.value_type))?
            {
                self.requested.push(request);
            }
        }

        if tracing::enabled!(tracing::Level::DEBUG) {
            let requested = self
                .requested
                .iter()
                .map(|r| r.supplier().alias())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::debug!(class = test.class_name(), requested = %requested, "requested suppliers");
        }

        Ok(())
    }

    fn create_requested_instance(
        &self,
        markers: &[Marker],
        value_type: Option<ValueType>,
    ) -> Result<Option<RequestedInstance>> {
        for marker in markers {
            if let Some(supplier) = self
                .suppliers
                .iter()
                .find(|s| s.marker_kind() == *marker.kind())
            {
                if let Some(declared) = value_type {
                    if !declared.accepts(&supplier.value_type()) {
                        return Err(FixtureError::TypeMismatch {
                            expected: declared.name().to_string(),
                            actual: supplier.value_type().name().to_string(),
                        });
                    }
                }
                return RequestedInstance::new(Arc::clone(supplier), marker.clone(), value_type)
                    .map(Some);
            }
        }
        Ok(None)
    }

    fn match_deployed_instances_with_requested_instances(&mut self) -> Result<()> {
        let mut reused: Vec<(RequestedInstance, InstanceId)> = Vec::new();
        let mut index = 0;
        while index < self.requested.len() {
            let request = &self.requested[index];
            let Some(deployed) = self.deployed_for_request(request) else {
                index += 1;
                continue;
            };

            let reusable = request.lifecycle() == deployed.lifecycle()
                && deployed.supplier().compatible(deployed, request);
            let id = deployed.id();

            if reusable {
                tracing::debug!(
                    supplier = deployed.supplier().alias(),
                    id = %id,
                    "reusing compatible"
                );
                reused.push((self.requested.remove(index), id));
            } else {
                tracing::debug!(
                    supplier = deployed.supplier().alias(),
                    id = %id,
                    "destroying non-compatible"
                );
                self.destroy(id)?;
                index += 1;
            }
        }

        // A later invalidation may have cascaded into an instance reused earlier.
        for (request, id) in reused {
            if !self.is_deployed(id) {
                tracing::debug!(
                    supplier = request.supplier().alias(),
                    id = %id,
                    "re-requesting instance lost to cascade"
                );
                self.requested.push(request);
            }
        }
        Ok(())
    }

    fn deploy_requested_instances(&mut self) -> Result<()> {
        while !self.requested.is_empty() {
            let request = self.requested.remove(0);
            if self.deployed_for_request(&request).is_none() {
                self.deploy(InstanceDraft::from_request(request))?;
            }
        }
        Ok(())
    }

    /// Produces and deploys an instance. A failed production leaves no trace.
    fn deploy(&mut self, draft: InstanceDraft) -> Result<&mut InstanceContext> {
        let supplier = Arc::clone(&draft.supplier);
        let produced = supplier
            .produce(&mut ProduceContext::new(self, &draft))
            .and_then(|value| {
                if supplier.value_type().accepts_value(&value) {
                    Ok(value)
                } else {
                    Err(FixtureError::TypeMismatch {
                        expected: supplier.value_type().name().to_string(),
                        actual: format!("value produced by '{}'", supplier.alias()),
                    })
                }
            });

        let value = match produced {
            Ok(value) => value,
            Err(e) => {
                for instance in &mut self.deployed {
                    instance.forget_dependent(draft.id);
                }
                tracing::debug!(supplier = supplier.alias(), error = %e, "failed to produce instance");
                return Err(e);
            }
        };

        tracing::debug!(
            supplier = supplier.alias(),
            id = %draft.id,
            lifecycle = %draft.lifecycle,
            reference = draft.reference.as_deref().unwrap_or(""),
            "created instance"
        );

        let index = self.deployed.len();
        self.deployed.push(draft.into_context(value));
        Ok(&mut self.deployed[index])
    }

    fn deployed_for_request(&self, request: &RequestedInstance) -> Option<&InstanceContext> {
        self.deployed.iter().find(|i| {
            i.reference() == request.reference()
                && match request.value_type() {
                    Some(value_type) => value_type.accepts_value(i.value()),
                    None => Arc::ptr_eq(i.supplier(), request.supplier()),
                }
        })
    }

    fn deployed_for_member(&self, member: &MemberDescriptor) -> Option<&InstanceContext> {
        member.markers.iter().find_map(|marker| {
            self.deployed.iter().find(|i| {
                let supplier = i.supplier();
                supplier.marker_kind() == *marker.kind()
                    && member.value_type.accepts_value(i.value())
                    && supplier.reference(marker).as_deref() == i.reference()
            })
        })
    }

    fn inject_members(&self, test: &mut dyn TestInstance) {
        for member in test.members() {
            // Unmarked members are not meant for injection.
            let Some(instance) = self.deployed_for_member(&member) else {
                continue;
            };
            test.inject(&member.name, Arc::clone(instance.value()));
        }
    }

    fn invoke_before_each_on_suppliers(&self) -> Result<()> {
        for instance in &self.deployed {
            instance.supplier().on_before_each(instance)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    /// Destroys every METHOD-scoped instance.
    ///
    /// # Errors
    /// Returns the close failures collected along the way; every eligible
    /// instance is undeployed regardless.
    pub fn after_each(&mut self) -> Result<()> {
        tracing::debug!("closing instances with method lifecycle");
        self.destroy_where(|i| i.lifecycle() == LifeCycle::Method)
    }

    /// Destroys every CLASS-scoped instance.
    ///
    /// # Errors
    /// Returns the close failures collected along the way.
    pub fn after_all(&mut self) -> Result<()> {
        tracing::debug!("closing instances with class lifecycle");
        self.destroy_where(|i| i.lifecycle() == LifeCycle::Class)
    }

    /// Destroys every deployed instance.
    ///
    /// # Errors
    /// Returns the close failures collected along the way.
    pub fn close(&mut self) -> Result<()> {
        tracing::debug!("closing all instances");
        self.destroy_where(|_| true)
    }

    /// Destroys one instance after its dependents. Unknown or already
    /// destroyed IDs are ignored.
    ///
    /// # Errors
    /// Returns the close failures of the cascade.
    pub fn destroy(&mut self, id: InstanceId) -> Result<()> {
        let mut failures = Vec::new();
        self.destroy_into(id, &mut failures);
        FixtureError::from_failures(failures)
    }

    fn destroy_where(&mut self, predicate: impl Fn(&InstanceContext) -> bool) -> Result<()> {
        let ids: Vec<InstanceId> = self
            .deployed
            .iter()
            .filter(|i| predicate(i))
            .map(InstanceContext::id)
            .collect();

        let mut failures = Vec::new();
        for id in ids {
            self.destroy_into(id, &mut failures);
        }
        FixtureError::from_failures(failures)
    }

    fn destroy_into(&mut self, id: InstanceId, failures: &mut Vec<FixtureError>) {
        let Some(index) = self.deployed.iter().position(|i| i.id() == id) else {
            return;
        };
        let instance = self.deployed.remove(index);

        for dependent in instance.dependents().to_vec() {
            self.destroy_into(dependent, failures);
        }

        let supplier = Arc::clone(instance.supplier());
        match supplier.close(instance) {
            Ok(()) => {
                tracing::debug!(supplier = supplier.alias(), id = %id, "closed instance");
            }
            Err(e) => {
                tracing::warn!(supplier = supplier.alias(), id = %id, error = %e, "failed to close instance");
                failures.push(e);
            }
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if self.deployed.is_empty() {
            return;
        }
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "failures while closing registry on drop");
        }
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "suppliers",
                &self.suppliers.iter().map(|s| s.alias()).collect::<Vec<_>>(),
            )
            .field("deployed", &self.deployed)
            .field("requested", &self.requested)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}
