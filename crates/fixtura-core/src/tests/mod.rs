//! Registry behaviour tests.
//!
//! Each test tries to DISPROVE one property of fixture resolution. The
//! mocks record every supplier call so ordering can be checked after the
//! fact.
//!
//! | Module | Properties |
//! |--------|------------|
//! | `resolution` | discovery, injection, reuse, reference isolation |
//! | `dependency` | deployed / pending / un-configured resolution |
//! | `teardown` | lifecycle scoping, dependents-first order, failure isolation |
//! | `selection` | supplier selection from discovery order and config |
//! | `property` | uniqueness and exactly-once close over random schedules |


pub use mocks::{Event, Journal, MockSupplier, MockTest, registry};
