//! Slot-based test class.

use std::any::Any;
use std::sync::Arc;

use fixtura_core::{FixtureValue, Marker, MemberDescriptor, TestInstance, ValueType};

/// A test class described at runtime.
///
/// Each slot is a declared member; injected values land in the slot with
/// the matching name.
#[derive(Debug, Clone, Default)]
pub struct TestClass {
    name: String,
    markers: Vec<Marker>,
    slots: Vec<Slot>,
}

#[derive(Clone)]
struct Slot {
    member: MemberDescriptor,
    value: Option<FixtureValue>,
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("member", &self.member)
            .field("injected", &self.value.is_some())
            .finish()
    }
}

impl TestClass {
    /// Creates a test class without markers or slots.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a class-level marker.
    #[must_use]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    /// Declares a slot of type `T` carrying `markers`.
    #[must_use]
    pub fn with_slot<T: Any>(
        mut self,
        name: impl Into<String>,
        markers: impl IntoIterator<Item = Marker>,
    ) -> Self {
        let mut member = MemberDescriptor::new(name, ValueType::of::<T>());
        member.markers.extend(markers);
        self.slots.push(Slot {
            member,
            value: None,
        });
        self
    }

    /// Returns the typed value of a slot, if injected.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, slot: &str) -> Option<Arc<T>> {
        self.value(slot)
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Returns the raw value of a slot, if injected.
    #[must_use]
    pub fn value(&self, slot: &str) -> Option<&FixtureValue> {
        self.slots
            .iter()
            .find(|s| s.member.name == slot)
            .and_then(|s| s.value.as_ref())
    }

    /// Returns true if a value was injected into `slot`.
    #[must_use]
    pub fn is_set(&self, slot: &str) -> bool {
        self.value(slot).is_some()
    }

    /// Empties every slot, as a fresh instance of the class would be.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.value = None;
        }
    }
}

impl TestInstance for TestClass {
    fn class_name(&self) -> &str {
        &self.name
    }

    fn class_markers(&self) -> Vec<Marker> {
        self.markers.clone()
    }

    fn members(&self) -> Vec<MemberDescriptor> {
        self.slots.iter().map(|s| s.member.clone()).collect()
    }

    fn inject(&mut self, member: &str, value: FixtureValue) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.member.name == member) {
            slot.value = Some(value);
        }
    }
}
