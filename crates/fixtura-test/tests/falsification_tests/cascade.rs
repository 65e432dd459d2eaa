//! Falsification Tests: Category C - Cascade Ordering (F013-F018)

use fixtura_core::{LifeCycle, Marker, ValueType};
use fixtura_test::{EventJournal, JournalEvent, RecordingSupplier, TestClass};

use super::support::{Client, Server, client, harness, pass, server};

fn client_class() -> TestClass {
    TestClass::new("ClientTest").with_slot::<Client>("client", [Marker::new("client")])
}

/// F013: Destroying a dependency destroys its dependent first
///
/// # Falsification Attempt
/// Destroy the server a client was built from, verify the client's close
/// precedes the server's.
#[test]
fn f013_dependent_closed_before_dependency() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared(), client(&journal).shared()]);
    harness.registry_mut().before_each(&mut client_class()).unwrap();

    let server_id = harness
        .registry()
        .find_deployed(ValueType::of::<Server>(), None)
        .unwrap()
        .id();
    harness.registry_mut().destroy(server_id).unwrap();

    assert_eq!(
        journal.close_order(),
        vec!["http", "embedded"],
        "F013 FALSIFIED: dependency closed while dependent deployed"
    );
}

/// F014: Full close respects dependency order regardless of deploy order
#[test]
fn f014_close_respects_dependency_order() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared(), client(&journal).shared()]);
    // Client first: the server is pulled in during the client's produce.
    let mut class = client_class().with_slot::<Server>("server", [Marker::new("server")]);
    harness.registry_mut().before_each(&mut class).unwrap();

    harness.finish().unwrap();

    assert_eq!(
        journal.close_order(),
        vec!["http", "embedded"],
        "F014 FALSIFIED: close order ignored dependency"
    );
}

/// F015: A dependency is never closed while a dependent is deployed
///
/// # Falsification Attempt
/// Chain gateway → client → server, destroy the server, verify every close
/// happens after its dependents'.
#[test]
fn f015_transitive_cascade() {
    struct Gateway;

    let journal = EventJournal::new();
    let gateway =
        RecordingSupplier::new("gateway", "edge", &journal, |_| Gateway).depends_on::<Client>(None);
    let mut harness = harness(vec![
        server(&journal).shared(),
        client(&journal).shared(),
        gateway.shared(),
    ]);
    let mut class =
        TestClass::new("GatewayTest").with_slot::<Gateway>("gw", [Marker::new("gateway")]);
    harness.registry_mut().before_each(&mut class).unwrap();
    assert_eq!(harness.registry().deployed().len(), 3);

    let server_id = harness
        .registry()
        .find_deployed(ValueType::of::<Server>(), None)
        .unwrap()
        .id();
    harness.registry_mut().destroy(server_id).unwrap();

    assert_eq!(
        journal.close_order(),
        vec!["edge", "http", "embedded"],
        "F015 FALSIFIED: transitive dependents not closed first"
    );
    assert!(harness.registry().deployed().is_empty());
}

/// F016: A shared dependency outlives every dependent
#[test]
fn f016_shared_dependency_closed_last() {
    struct Admin;

    let journal = EventJournal::new();
    let admin =
        RecordingSupplier::new("admin", "cli", &journal, |_| Admin).depends_on::<Server>(None);
    let mut harness = harness(vec![
        server(&journal).shared(),
        client(&journal).shared(),
        admin.shared(),
    ]);
    let mut class = client_class().with_slot::<Admin>("admin", [Marker::new("admin")]);
    harness.registry_mut().before_each(&mut class).unwrap();

    let server = harness
        .registry()
        .find_deployed(ValueType::of::<Server>(), None)
        .unwrap();
    assert_eq!(server.dependents().len(), 2);

    harness.finish().unwrap();

    let order = journal.close_order();
    assert_eq!(
        order.last().map(String::as_str),
        Some("embedded"),
        "F016 FALSIFIED: shared dependency closed before a dependent"
    );
}

/// F017: A METHOD dependency takes its CLASS dependent down with it
#[test]
fn f017_method_dependency_cascades_into_class_dependent() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![
        server(&journal).with_lifecycle(LifeCycle::Method).shared(),
        client(&journal).shared(),
    ]);
    let mut class = client_class();

    harness.run_method(&mut class, "once", pass).unwrap();

    assert_eq!(
        journal.close_order(),
        vec!["http", "embedded"],
        "F017 FALSIFIED: class dependent survived its method dependency"
    );
    assert!(harness.registry().deployed().is_empty());
}

/// F018: A failed dependent leaves no edge behind
#[test]
fn f018_failed_produce_leaves_no_dependent() {
    let journal = EventJournal::new();
    let failing = client(&journal).shared();
    failing.fail_produce(true);
    let mut harness = harness(vec![server(&journal).shared(), failing.clone()]);

    let result = harness.registry_mut().before_each(&mut client_class());
    assert!(result.is_err());

    let server = harness
        .registry()
        .find_deployed(ValueType::of::<Server>(), None)
        .unwrap();
    assert!(
        server.dependents().is_empty(),
        "F018 FALSIFIED: failed instance recorded as dependent"
    );
    assert!(
        !journal
            .events()
            .iter()
            .any(|e| matches!(e, JournalEvent::Close { supplier, .. } if supplier == "http")),
        "F018 FALSIFIED: never-deployed instance was closed"
    );
}
