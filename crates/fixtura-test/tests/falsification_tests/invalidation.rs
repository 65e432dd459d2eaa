//! Falsification Tests: Category B - Invalidation (F009-F012b)

use fixtura_core::{LifeCycle, Marker};
use fixtura_test::TestClass;
use fixtura_test::{EventJournal, JournalEvent};

use super::support::{Client, Server, client, harness, server, server_class};

/// F009: An incompatible configuration replaces the deployed instance
///
/// # Falsification Attempt
/// Deploy `{x:1}`, request `{x:2}` for the same slot, verify the old close
/// is observed before the new produce.
#[test]
fn f009_incompatible_config_closes_before_produce() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared()]);

    harness
        .registry_mut()
        .before_each(&mut server_class(Marker::new("server").with("x", 1)))
        .unwrap();
    let old = harness.registry().deployed()[0].id();

    harness
        .registry_mut()
        .before_each(&mut server_class(Marker::new("server").with("x", 2)))
        .unwrap();
    let new = harness.registry().deployed()[0].id();

    let closed_at = journal
        .position(|e| *e == JournalEvent::Close { supplier: "embedded".into(), id: old })
        .expect("F009 FALSIFIED: old instance never closed");
    let produced_at = journal
        .position(|e| *e == JournalEvent::Produce { supplier: "embedded".into(), id: new })
        .expect("F009 FALSIFIED: new instance never produced");
    assert!(
        closed_at < produced_at,
        "F009 FALSIFIED: new instance produced before the old one closed"
    );
    assert_eq!(harness.registry().deployed().len(), 1);
}

/// F010: A supplier-declared incompatibility replaces the instance even
/// with equal configuration
#[test]
fn f010_supplier_incompatibility_replaces() {
    let journal = EventJournal::new();
    let supplier = server(&journal).shared();
    let mut harness = harness(vec![supplier.clone()]);

    harness
        .registry_mut()
        .before_each(&mut server_class(Marker::new("server")))
        .unwrap();
    supplier.force_incompatible(true);
    harness
        .registry_mut()
        .before_each(&mut server_class(Marker::new("server")))
        .unwrap();

    assert_eq!(
        journal.closed("embedded").len(),
        1,
        "F010 FALSIFIED: incompatible instance survived"
    );
    assert_eq!(journal.produced("embedded"), 2);
}

/// F011: The replacement carries the new configuration
#[test]
fn f011_replacement_uses_new_config() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared()]);

    harness
        .registry_mut()
        .before_each(&mut server_class(Marker::new("server").with("name", "old")))
        .unwrap();
    let mut class = server_class(Marker::new("server").with("name", "new"));
    harness.registry_mut().before_each(&mut class).unwrap();

    assert_eq!(
        class.get::<Server>("server").unwrap().name,
        "new",
        "F011 FALSIFIED: stale instance injected"
    );
}

/// F012: Invalidation leaves other slots untouched
#[test]
fn f012_invalidation_is_per_slot() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared()]);

    let mut first = server_class(Marker::new("server").with("x", 1)).with_slot::<Server>(
        "other",
        [Marker::new("server")
            .with_ref("other")
            .with_lifecycle(LifeCycle::Class)],
    );
    harness.registry_mut().before_each(&mut first).unwrap();

    let mut second = server_class(Marker::new("server").with("x", 2)).with_slot::<Server>(
        "other",
        [Marker::new("server")
            .with_ref("other")
            .with_lifecycle(LifeCycle::Class)],
    );
    harness.registry_mut().before_each(&mut second).unwrap();

    assert_eq!(
        journal.produced("embedded"),
        3,
        "F012 FALSIFIED: untouched slot was replaced"
    );
    assert_eq!(journal.closed("embedded").len(), 1);
}

/// F012b: A reused instance lost to a later invalidation is redeployed
///
/// # Falsification Attempt
/// Declare the client before the server it depends on, then change the
/// server's configuration. The client is matched (and reused) first, so the
/// server's replacement cascades into an instance already marked as reused.
#[test]
fn f012b_reused_dependent_survives_later_invalidation() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared(), client(&journal).shared()]);

    let class = |x: i64| {
        TestClass::new("ClientFirstTest")
            .with_slot::<Client>("client", [Marker::new("client")])
            .with_slot::<Server>("server", [Marker::new("server").with("x", x)])
    };

    harness.registry_mut().before_each(&mut class(1)).unwrap();

    let mut second = class(2);
    harness.registry_mut().before_each(&mut second).unwrap();

    assert!(
        second.get::<Client>("client").is_some(),
        "F012b FALSIFIED: marked client left without a value"
    );
    assert!(second.get::<Server>("server").is_some());
    assert_eq!(
        journal.closed("http").len(),
        1,
        "F012b FALSIFIED: stale client was not destroyed"
    );
    assert_eq!(
        journal.produced("http"),
        2,
        "F012b FALSIFIED: client was not redeployed"
    );
    assert_eq!(harness.registry().deployed().len(), 2);
    assert_eq!(harness.registry().pending_len(), 0);
}
