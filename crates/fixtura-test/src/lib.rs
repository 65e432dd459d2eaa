//! # fixtura-test
//!
//! Testing infrastructure for the Fixtura fixture framework.
//!
//! This crate provides:
//! - **Event journal**: ordered record of every produce, hook and close call
//! - **Recording supplier**: configurable supplier with fault injection
//! - **Test class**: slot-based [`TestInstance`](fixtura_core::TestInstance)
//! - **Class harness**: drives a registry through a test class's methods
//! - **Falsification tests**: refutation attempts for the registry's guarantees
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use fixtura_core::{FrameworkConfig, Marker, Supplier};
//! use fixtura_test::{ClassHarness, EventJournal, RecordingSupplier, TestClass};
//!
//! struct Server;
//!
//! let journal = EventJournal::new();
//! let server = RecordingSupplier::new("server", "embedded", &journal, |_| Server);
//! let mut harness = ClassHarness::from_suppliers(
//!     vec![Arc::new(server) as Arc<dyn Supplier>],
//!     &FrameworkConfig::new(),
//! );
//!
//! let mut class = TestClass::new("ServerTest").with_slot::<Server>("server", [Marker::new("server")]);
//! harness
//!     .run_method(&mut class, "starts", |class| {
//!         assert!(class.get::<Server>("server").is_some());
//!         Ok(())
//!     })
//!     .unwrap();
//! harness.finish().unwrap();
//!
//! assert_eq!(journal.produced("embedded"), 1);
//! assert_eq!(journal.closed("embedded").len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod class;
pub mod error;
pub mod harness;
pub mod journal;
pub mod recording;

pub use class::TestClass;
pub use error::{HarnessError, Result};
pub use harness::{ClassHarness, ClassReport, MethodOutcome, TestBody};
pub use journal::{EventJournal, JournalEvent};
pub use recording::RecordingSupplier;
