// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # fixtura-core
//!
//! Fixture resolution and lifecycle primitives for the Fixtura test framework.
//!
//! This crate provides the pieces a test runner needs to give tests their
//! fixtures:
//!
//! - [`Supplier`] trait for implementing a fixture factory
//! - [`PluginCatalog`] for discovering suppliers and choosing one per type
//! - [`Registry`] for deploying, sharing and tearing down instances
//! - [`TestInstance`] for describing a test's markers and members
//!
//! ## Lifecycle
//!
//! ```text
//! Registry::new ─► before_each ─► (test) ─► after_each ─► ... ─► after_all ─► close
//! ```
//!
//! Instances live for one test ([`LifeCycle::Method`]) or for the whole
//! test class ([`LifeCycle::Class`]). A deployed instance is reused while
//! its supplier deems it compatible with what the next test asks for, and
//! is always destroyed after every instance that depends on it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fixtura_core::{FrameworkConfig, PluginCatalog, Registry};
//!
//! let catalog = PluginCatalog::discover([&my_extension as &dyn Extension]);
//! let mut registry = Registry::new(Arc::new(catalog), &FrameworkConfig::from_env()?);
//!
//! registry.before_each(&mut test)?;
//! // ... run the test ...
//! registry.after_each()?;
//! registry.after_all()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod instance;
pub mod marker;
pub mod registry;
pub mod structure;
pub mod supplier;
#[cfg(test)]
pub mod tests;
pub mod types;

pub use catalog::{Extension, PluginCatalog, SupplierSelection, ValueTypeAliases};
pub use config::FrameworkConfig;
pub use error::{FixtureError, Result};
pub use instance::{InstanceContext, RequestedInstance};
pub use marker::{Marker, MarkerConfig, MarkerKind};
pub use registry::Registry;
pub use structure::{MemberDescriptor, TestInstance};
pub use supplier::{ProduceContext, Supplier};
pub use types::{FixtureValue, InstanceId, LifeCycle, TestContext, ValueType};
