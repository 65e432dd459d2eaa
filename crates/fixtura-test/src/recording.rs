//! Recording supplier with fault injection.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fixtura_core::{
    FixtureError, FixtureValue, InstanceContext, LifeCycle, Marker, MarkerKind, ProduceContext,
    RequestedInstance, Result, Supplier, ValueType,
};

use crate::journal::{EventJournal, JournalEvent};

type Factory = Box<dyn Fn(&Marker) -> FixtureValue + Send + Sync>;

/// Supplier that records every call in an [`EventJournal`].
///
/// Configurable behavior:
/// - Default lifecycle
/// - Dependencies pulled during produce
/// - Produce / hook / close failure
/// - Forced incompatibility with deployed instances
pub struct RecordingSupplier {
    value_type: ValueType,
    kind: MarkerKind,
    alias: String,
    default_lifecycle: LifeCycle,
    dependencies: Vec<(ValueType, Option<String>)>,
    factory: Factory,
    journal: EventJournal,
    faults: Faults,
}

/// Injected failures, switchable while the supplier is in use.
#[derive(Debug, Default)]
struct Faults {
    produce: AtomicBool,
    hook: AtomicBool,
    close: AtomicBool,
    incompatible: AtomicBool,
}

impl RecordingSupplier {
    /// Creates a supplier of `T`, triggered by markers of kind `kind`.
    ///
    /// `factory` builds the value from the originating marker.
    pub fn new<T, F>(
        kind: impl Into<MarkerKind>,
        alias: impl Into<String>,
        journal: &EventJournal,
        factory: F,
    ) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Marker) -> T + Send + Sync + 'static,
    {
        Self {
            value_type: ValueType::of::<T>(),
            kind: kind.into(),
            alias: alias.into(),
            default_lifecycle: LifeCycle::Class,
            dependencies: Vec::new(),
            factory: Box::new(move |marker: &Marker| Arc::new(factory(marker)) as FixtureValue),
            journal: journal.clone(),
            faults: Faults::default(),
        }
    }

    /// Sets the lifecycle used when markers do not override it.
    #[must_use]
    pub fn with_lifecycle(mut self, lifecycle: LifeCycle) -> Self {
        self.default_lifecycle = lifecycle;
        self
    }

    /// Pulls a `D` under `reference` every time a value is produced.
    #[must_use]
    pub fn depends_on<D: Any>(mut self, reference: Option<&str>) -> Self {
        self.dependencies
            .push((ValueType::of::<D>(), reference.map(str::to_string)));
        self
    }

    /// Wraps the supplier for registration.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Makes `produce` fail.
    pub fn fail_produce(&self, fail: bool) {
        self.faults.produce.store(fail, Ordering::SeqCst);
    }

    /// Makes `on_before_each` fail.
    pub fn fail_hook(&self, fail: bool) {
        self.faults.hook.store(fail, Ordering::SeqCst);
    }

    /// Makes `close` fail. The instance is still released.
    pub fn fail_close(&self, fail: bool) {
        self.faults.close.store(fail, Ordering::SeqCst);
    }

    /// Makes every deployed instance incompatible with new requests.
    pub fn force_incompatible(&self, incompatible: bool) {
        self.faults.incompatible.store(incompatible, Ordering::SeqCst);
    }
}

impl Supplier for RecordingSupplier {
    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn marker_kind(&self) -> MarkerKind {
        self.kind.clone()
    }

    fn alias(&self) -> &str {
        &self.alias
    }

    fn default_lifecycle(&self) -> LifeCycle {
        self.default_lifecycle
    }

    fn produce(&self, ctx: &mut ProduceContext<'_>) -> Result<FixtureValue> {
        self.journal.record(JournalEvent::Produce {
            supplier: self.alias.clone(),
            id: ctx.id(),
        });

        for (value_type, reference) in &self.dependencies {
            ctx.dependency(*value_type, reference.as_deref())?;
        }

        if self.faults.produce.load(Ordering::SeqCst) {
            return Err(FixtureError::produce(&self.alias, "injected produce failure"));
        }
        Ok((self.factory)(ctx.marker()))
    }

    fn compatible(&self, deployed: &InstanceContext, requested: &RequestedInstance) -> bool {
        !self.faults.incompatible.load(Ordering::SeqCst)
            && deployed.marker().same_config(requested.marker())
    }

    fn on_before_each(&self, instance: &InstanceContext) -> Result<()> {
        self.journal.record(JournalEvent::BeforeEach {
            supplier: self.alias.clone(),
            id: instance.id(),
        });
        if self.faults.hook.load(Ordering::SeqCst) {
            return Err(FixtureError::hook(&self.alias, "injected hook failure"));
        }
        Ok(())
    }

    fn close(&self, instance: InstanceContext) -> Result<()> {
        self.journal.record(JournalEvent::Close {
            supplier: self.alias.clone(),
            id: instance.id(),
        });
        drop(instance.into_value());
        if self.faults.close.load(Ordering::SeqCst) {
            return Err(FixtureError::close(&self.alias, "injected close failure"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RecordingSupplier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSupplier")
            .field("value_type", &self.value_type)
            .field("kind", &self.kind)
            .field("alias", &self.alias)
            .field("default_lifecycle", &self.default_lifecycle)
            .field("dependencies", &self.dependencies)
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}
