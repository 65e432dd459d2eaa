//! Ordered record of supplier calls.
//!
//! Every [`RecordingSupplier`](crate::RecordingSupplier) sharing a journal
//! appends to the same sequence, so ordering across suppliers can be
//! asserted after the fact.

use std::sync::Arc;

use fixtura_core::InstanceId;
use parking_lot::Mutex;

/// One recorded supplier call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalEvent {
    /// `produce` was entered for the instance about to be deployed.
    Produce {
        /// Supplier alias.
        supplier: String,
        /// Instance being produced.
        id: InstanceId,
    },
    /// `on_before_each` was called.
    BeforeEach {
        /// Supplier alias.
        supplier: String,
        /// Deployed instance.
        id: InstanceId,
    },
    /// `close` was called.
    Close {
        /// Supplier alias.
        supplier: String,
        /// Instance being closed.
        id: InstanceId,
    },
}

impl JournalEvent {
    /// Returns the alias of the supplier that recorded this event.
    #[must_use]
    pub fn supplier(&self) -> &str {
        match self {
            Self::Produce { supplier, .. }
            | Self::BeforeEach { supplier, .. }
            | Self::Close { supplier, .. } => supplier,
        }
    }

    /// Returns the instance this event concerns.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        match self {
            Self::Produce { id, .. } | Self::BeforeEach { id, .. } | Self::Close { id, .. } => *id,
        }
    }
}

/// Shared, thread-safe event journal.
#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    events: Arc<Mutex<Vec<JournalEvent>>>,
}

impl EventJournal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&self, event: JournalEvent) {
        tracing::trace!(?event, "journal");
        self.events.lock().push(event);
    }

    /// Returns a snapshot of every event, in order.
    #[must_use]
    pub fn events(&self) -> Vec<JournalEvent> {
        self.events.lock().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Forgets every recorded event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Returns the number of `produce` calls made by `supplier`.
    #[must_use]
    pub fn produced(&self, supplier: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, JournalEvent::Produce { .. }) && e.supplier() == supplier)
            .count()
    }

    /// Returns the number of hook calls made by `supplier`.
    #[must_use]
    pub fn hooks(&self, supplier: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, JournalEvent::BeforeEach { .. }) && e.supplier() == supplier)
            .count()
    }

    /// Returns the instances closed by `supplier`, in order.
    #[must_use]
    pub fn closed(&self, supplier: &str) -> Vec<InstanceId> {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, JournalEvent::Close { .. }) && e.supplier() == supplier)
            .map(JournalEvent::id)
            .collect()
    }

    /// Returns the supplier alias of every close call, in order.
    #[must_use]
    pub fn close_order(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, JournalEvent::Close { .. }))
            .map(|e| e.supplier().to_string())
            .collect()
    }

    /// Returns the number of times `id` was closed.
    #[must_use]
    pub fn close_count(&self, id: InstanceId) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, JournalEvent::Close { .. }) && e.id() == id)
            .count()
    }

    /// Returns the index of the first event matching `predicate`.
    #[must_use]
    pub fn position(&self, predicate: impl Fn(&JournalEvent) -> bool) -> Option<usize> {
        self.events.lock().iter().position(predicate)
    }
}
