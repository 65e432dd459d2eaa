//! Core types for fixture lifecycle resolution.
//!
//! UUIDs for stable instance IDs, an explicit two-valued scope, and a
//! runtime type descriptor standing in for the produced value's type.

use std::any::{Any, TypeId};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::FixtureError;

/// A produced fixture value.
///
/// The owning [`InstanceContext`](crate::InstanceContext) holds the handle;
/// injected members receive clones of it.
pub type FixtureValue = Arc<dyn Any + Send + Sync>;

/// Unique identifier for a deployed fixture instance.
///
/// Dependency edges refer to instances by ID, never by ownership, so an
/// ID may outlive the instance it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(uuid::Uuid);

impl InstanceId {
    /// Creates a new random instance ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates an instance ID from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixture scope.
///
/// ```text
/// Class  : deployed on first request, destroyed by after_all()
/// Method : deployed on first request, destroyed by after_each()
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeCycle {
    /// Shared across every test method of a class.
    #[default]
    Class,
    /// Recreated for each test method.
    Method,
}

impl LifeCycle {
    /// Returns the lowercase name used in marker configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Method => "method",
        }
    }
}

impl fmt::Display for LifeCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifeCycle {
    type Err = FixtureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "class" => Ok(Self::Class),
            "method" => Ok(Self::Method),
            other => Err(FixtureError::config(format!("unknown lifecycle: {other}"))),
        }
    }
}

/// Runtime descriptor of a fixture value type.
///
/// Two descriptors are equal when they describe the same Rust type; the
/// name is carried only for diagnostics.
#[derive(Clone, Copy)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    /// Returns the descriptor for `T`.
    #[must_use]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the full type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the last path segment of the type name.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Returns true if a value described by `other` may be assigned to a
    /// member declared with this type.
    #[must_use]
    pub fn accepts(&self, other: &Self) -> bool {
        self.id == other.id
    }

    /// Returns true if `value` is an instance of this type.
    #[must_use]
    pub fn accepts_value(&self, value: &FixtureValue) -> bool {
        (**value).type_id() == self.id
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ValueType {}

impl std::hash::Hash for ValueType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueType({})", self.name)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Descriptor of the test currently being set up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestContext {
    /// Test class name.
    pub class_name: String,
    /// Test method name, if a method is running.
    #[serde(default)]
    pub method_name: Option<String>,
}

impl TestContext {
    /// Creates a context for a test class.
    #[must_use]
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: None,
        }
    }

    /// Sets the running method.
    #[must_use]
    pub fn with_method(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }
}

/// Treats an empty reference as no reference.
#[must_use]
pub fn normalize_reference(reference: Option<&str>) -> Option<String> {
    reference.filter(|r| !r.is_empty()).map(str::to_string)
}
