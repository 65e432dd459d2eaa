//! Falsification Tests: Category D - Scope Partition (F019-F023)

use fixtura_core::{LifeCycle, Marker};
use fixtura_test::{EventJournal, TestBody, TestClass};

use super::support::{Database, Server, database, harness, pass, server};

fn mixed_class() -> TestClass {
    TestClass::new("MixedTest")
        .with_slot::<Server>("server", [Marker::new("server")])
        .with_slot::<Database>("db", [Marker::new("database")])
}

/// F019: after_each destroys all METHOD instances and nothing else
///
/// # Falsification Attempt
/// Deploy one CLASS and one METHOD instance, run after_each, verify only the
/// METHOD one is closed.
#[test]
fn f019_after_each_destroys_only_method_scope() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![
        server(&journal).shared(),
        database(&journal).with_lifecycle(LifeCycle::Method).shared(),
    ]);
    let mut class = mixed_class();
    harness.registry_mut().before_each(&mut class).unwrap();

    harness.registry_mut().after_each().unwrap();

    assert_eq!(
        journal.close_order(),
        vec!["mem"],
        "F019 FALSIFIED: after_each closed the wrong instances"
    );
    assert!(
        harness
            .registry()
            .deployed()
            .iter()
            .all(|i| i.lifecycle() == LifeCycle::Class)
    );
}

/// F020: A CLASS instance survives consecutive after_each calls
#[test]
fn f020_class_instance_survives_after_each() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared()]);
    let mut class = TestClass::new("ServerTest").with_slot::<Server>("server", [Marker::new("server")]);

    for method in ["a", "b", "c"] {
        harness.run_method(&mut class, method, pass).unwrap();
    }
    harness.registry_mut().after_each().unwrap();

    assert!(
        journal.closed("embedded").is_empty(),
        "F020 FALSIFIED: class instance died before after_all"
    );

    harness.registry_mut().after_all().unwrap();
    assert_eq!(journal.closed("embedded").len(), 1);
}

/// F021: after_all destroys all CLASS instances
#[test]
fn f021_after_all_destroys_class_scope() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared(), database(&journal).shared()]);
    let mut class = mixed_class();

    let report = harness.run_class(&mut class, [("only", Box::new(pass) as TestBody<'_>)]);

    assert!(report.passed());
    assert!(
        harness.registry().deployed().is_empty(),
        "F021 FALSIFIED: class instances survived after_all"
    );
    assert_eq!(journal.close_order().len(), 2);
}

/// F022: A METHOD instance is produced fresh for every test
#[test]
fn f022_method_instance_fresh_per_test() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).with_lifecycle(LifeCycle::Method).shared()]);
    let mut class = TestClass::new("ServerTest").with_slot::<Server>("server", [Marker::new("server")]);

    for method in ["a", "b", "c", "d"] {
        harness.run_method(&mut class, method, pass).unwrap();
    }

    assert_eq!(
        journal.produced("embedded"),
        4,
        "F022 FALSIFIED: method instance leaked across tests"
    );
    assert_eq!(journal.closed("embedded").len(), 4);
}

/// F023: A marker lifecycle overrides the supplier default
#[test]
fn f023_marker_lifecycle_overrides_default() {
    let journal = EventJournal::new();
    let mut harness = harness(vec![server(&journal).shared()]);
    let mut class = TestClass::new("ServerTest").with_slot::<Server>(
        "server",
        [Marker::new("server").with_lifecycle(LifeCycle::Method)],
    );

    harness.run_method(&mut class, "a", pass).unwrap();

    assert_eq!(
        journal.closed("embedded").len(),
        1,
        "F023 FALSIFIED: marker lifecycle ignored"
    );
}
