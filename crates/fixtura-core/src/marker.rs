//! Declarative fixture markers.
//!
//! A marker is the tag a test class or member carries to ask for a fixture:
//! a kind (which supplier answers it) plus a free-form configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::{LifeCycle, normalize_reference};

/// Configuration payload carried by a marker.
pub type MarkerConfig = Map<String, Value>;

/// Configuration key holding the reference name.
pub const REF_KEY: &str = "ref";

/// Configuration key holding a lifecycle override.
pub const LIFECYCLE_KEY: &str = "lifecycle";

/// Kind of a marker; a supplier answers exactly one kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerKind(String);

impl MarkerKind {
    /// Creates a marker kind.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the kind name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MarkerKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A declarative fixture request attached to a test class or member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    kind: MarkerKind,
    #[serde(default)]
    config: MarkerConfig,
}

impl Marker {
    /// Creates a marker with an empty configuration.
    #[must_use]
    pub fn new(kind: impl Into<MarkerKind>) -> Self {
        Self {
            kind: kind.into(),
            config: MarkerConfig::new(),
        }
    }

    /// Sets a configuration entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Sets the reference name.
    #[must_use]
    pub fn with_ref(self, reference: impl Into<String>) -> Self {
        let reference: String = reference.into();
        self.with(REF_KEY, reference)
    }

    /// Sets a lifecycle override.
    #[must_use]
    pub fn with_lifecycle(self, lifecycle: LifeCycle) -> Self {
        self.with(LIFECYCLE_KEY, lifecycle.as_str())
    }

    /// Returns the marker kind.
    #[must_use]
    pub const fn kind(&self) -> &MarkerKind {
        &self.kind
    }

    /// Returns the configuration payload.
    #[must_use]
    pub const fn config(&self) -> &MarkerConfig {
        &self.config
    }

    /// Returns a configuration entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Returns a string configuration entry.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    /// Returns the reference name; empty references count as absent.
    #[must_use]
    pub fn reference(&self) -> Option<String> {
        normalize_reference(self.get_str(REF_KEY))
    }

    /// Returns the lifecycle override, if the marker carries one.
    ///
    /// # Errors
    /// Returns an error if the entry is present but not a known lifecycle.
    pub fn lifecycle(&self) -> Result<Option<LifeCycle>> {
        self.get_str(LIFECYCLE_KEY).map(str::parse::<LifeCycle>).transpose()
    }

    /// Returns true if both markers carry equal configurations.
    #[must_use]
    pub fn same_config(&self, other: &Self) -> bool {
        self.config == other.config
    }
}
