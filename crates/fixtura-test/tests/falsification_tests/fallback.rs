//! Falsification Tests: Category E - Default Fallback (F024-F029)

use std::sync::Arc;

use fixtura_core::{
    FixtureError, FixtureValue, InstanceContext, InstanceId, Marker, MarkerKind, ProduceContext,
    Supplier, TestContext, ValueType,
};
use parking_lot::Mutex;
use fixtura_test::{EventJournal, HarnessError, RecordingSupplier, TestClass};

use super::support::{Client, Server, client, harness, pass, server};

fn client_class() -> TestClass {
    TestClass::new("ClientTest").with_slot::<Client>("client", [Marker::new("client")])
}

/// F024: An unrequested dependency is deployed from its supplier's default marker
///
/// # Falsification Attempt
/// Request only a client, verify a server appears with the synthesized
/// marker.
#[test]
fn f024_unconfigured_dependency_deployed() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared(), client(&journal).shared()]);

    harness.registry_mut().before_each(&mut client_class()).unwrap();

    let server = harness
        .registry()
        .find_deployed(ValueType::of::<Server>(), None)
        .expect("F024 FALSIFIED: no default dependency deployed");
    assert_eq!(server.marker(), &Marker::new("server"));
    assert_eq!(server.value_as::<Server>().unwrap().name, "default");
}

/// F025: With no supplier for a type, resolution fails
#[test]
fn f025_missing_supplier_is_not_found() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![client(&journal).shared()]);
    let mut class = client_class();

    let err = harness.run_method(&mut class, "orphan", pass).unwrap_err();

    assert!(
        matches!(
            err,
            HarnessError::Fixture(FixtureError::DependencyNotFound { .. })
        ),
        "F025 FALSIFIED: expected dependency-not-found, got {err}"
    );
    assert!(!class.is_set("client"));
    assert_eq!(harness.registry().pending_len(), 0);
}

/// F026: A pending request beats the default marker
#[test]
fn f026_pending_request_preferred_over_default() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared(), client(&journal).shared()]);
    let mut class =
        client_class().with_slot::<Server>("server", [Marker::new("server").with("name", "tuned")]);

    harness.registry_mut().before_each(&mut class).unwrap();

    assert_eq!(
        journal.produced("embedded"),
        1,
        "F026 FALSIFIED: default instance deployed beside the requested one"
    );
    assert_eq!(class.get::<Server>("server").unwrap().name, "tuned");
}

/// F027: A deployed instance beats everything
#[test]
fn f027_deployed_instance_preferred() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared(), client(&journal).shared()]);

    let mut servers =
        TestClass::new("ServerTest").with_slot::<Server>("server", [Marker::new("server")]);
    harness.registry_mut().before_each(&mut servers).unwrap();
    harness.registry_mut().before_each(&mut client_class()).unwrap();

    assert_eq!(
        journal.produced("embedded"),
        1,
        "F027 FALSIFIED: deployed dependency was not reused"
    );
}

/// F028: A referenced dependency keeps its reference when defaulted
#[test]
fn f028_default_dependency_keeps_reference() {
    let journal = EventJournal::new();
    let tagged =
        RecordingSupplier::new("client", "http", &journal, |_| Client).depends_on::<Server>(Some("primary"));
    let mut harness = harness(vec![server(&journal).shared(), tagged.shared()]);

    harness.registry_mut().before_each(&mut client_class()).unwrap();

    let registry = harness.registry();
    assert!(
        registry
            .find_deployed(ValueType::of::<Server>(), Some("primary"))
            .is_some(),
        "F028 FALSIFIED: reference dropped from default dependency"
    );
    assert!(
        registry
            .find_deployed(ValueType::of::<Server>(), None)
            .is_none()
    );
}

/// F029: Suppliers see the running test while producing
///
/// # Falsification Attempt
/// Produce from inside a harness-run method, verify the produce context
/// names that method.
#[test]
fn f029_current_test_visible_during_produce() {
    struct Probe {
        seen: Arc<Mutex<Option<TestContext>>>,
    }

    impl Supplier for Probe {
        fn value_type(&self) -> ValueType {
            ValueType::of::<Server>()
        }

        fn marker_kind(&self) -> MarkerKind {
            MarkerKind::new("server")
        }

        fn alias(&self) -> &str {
            "probe"
        }

        fn produce(&self, ctx: &mut ProduceContext<'_>) -> fixtura_core::Result<FixtureValue> {
            *self.seen.lock() = ctx.current_test().cloned();
            Ok(Arc::new(Server {
                name: "probe".to_string(),
            }))
        }

        fn close(&self, _instance: InstanceContext) -> fixtura_core::Result<()> {
            Ok(())
        }
    }

    let seen = Arc::new(Mutex::new(None));
    let probe: Arc<dyn Supplier> = Arc::new(Probe {
        seen: Arc::clone(&seen),
    });
    let mut harness = harness(vec![probe]);
    let mut class =
        TestClass::new("ProbeTest").with_slot::<Server>("server", [Marker::new("server")]);

    harness.run_method(&mut class, "observes", pass).unwrap();

    assert_eq!(
        *seen.lock(),
        Some(TestContext::class("ProbeTest").with_method("observes")),
        "F029 FALSIFIED: produce did not see the running test"
    );
    assert!(harness.registry().current_context().is_none());
}

/// F029b: Direct resolution works outside any test
#[test]
fn f029b_direct_resolution_outside_test() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared()]);

    let value = harness
        .registry_mut()
        .get_dependency(ValueType::of::<Server>(), None, InstanceId::new())
        .unwrap();

    assert!(value.downcast::<Server>().is_ok());
    assert_eq!(journal.produced("embedded"), 1);
}
