//! Test-instance introspection and member injection.
//!
//! The registry never looks inside a test type. It asks the test instance
//! for its markers and members, and hands resolved values back through
//! [`TestInstance::inject`].

use crate::marker::Marker;
use crate::types::{FixtureValue, ValueType};

/// A declared member of a test type.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    /// Member name, passed back to [`TestInstance::inject`].
    pub name: String,
    /// Declared member type.
    pub value_type: ValueType,
    /// Markers attached to the member.
    pub markers: Vec<Marker>,
}

impl MemberDescriptor {
    /// Creates a member descriptor without markers.
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            markers: Vec::new(),
        }
    }

    /// Adds a marker.
    #[must_use]
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}

/// Structural view of a test instance.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use fixtura_core::{FixtureValue, Marker, MemberDescriptor, TestInstance, ValueType};
///
/// struct Server;
///
/// #[derive(Default)]
/// struct LoginTest {
///     server: Option<Arc<Server>>,
/// }
///
/// impl TestInstance for LoginTest {
///     fn class_name(&self) -> &str {
///         "LoginTest"
///     }
///
///     fn class_markers(&self) -> Vec<Marker> {
///         Vec::new()
///     }
///
///     fn members(&self) -> Vec<MemberDescriptor> {
///         vec![MemberDescriptor::new("server", ValueType::of::<Server>())
///             .with_marker(Marker::new("server"))]
///     }
///
///     fn inject(&mut self, member: &str, value: FixtureValue) {
///         if member == "server" {
///             self.server = value.downcast().ok();
///         }
///     }
/// }
/// ```
pub trait TestInstance {
    /// Returns the test type name.
    fn class_name(&self) -> &str;

    /// Returns markers attached to the test type itself.
    fn class_markers(&self) -> Vec<Marker>;

    /// Returns every declared member, marked or not.
    fn members(&self) -> Vec<MemberDescriptor>;

    /// Writes a resolved value into a member. Unknown members are ignored.
    fn inject(&mut self, member: &str, value: FixtureValue);
}
