//! Full pipeline with in-process handlers: manifest on disk, contract on
//! disk, handler functions registered in a `HandlerRegistry`.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;
use skilltest::HarnessError;
use skilltest::handler::HandlerRegistry;
use skilltest::skill::{SkillHarness, SkillOptions};
use skilltest::test_utils::{SkillProjectFixture, TestLogger};

struct Counters {
    started: AtomicUsize,
    stopped: AtomicUsize,
}

fn registry(counters: &Arc<Counters>) -> HandlerRegistry {
    let started = Arc::clone(counters);
    let stopped = Arc::clone(counters);
    let mut registry = HandlerRegistry::new();
    registry
        .register_evaluate("handler", "evaluate", |payload, _| {
            let data = payload["data"].as_str().unwrap_or_default();
            Ok(json!({ "text": format!("some {data} output") }))
        })
        .register_lifecycle("handler", "on_started", move |_| {
            started.started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .register_lifecycle("handler", "on_stopped", move |_| {
            stopped.stopped.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    registry
}

fn harness(fixture: &SkillProjectFixture, registry: HandlerRegistry) -> SkillHarness {
    SkillHarness::new(Arc::new(registry))
        .with_manifest_path(fixture.manifest_path())
        .with_contract_path(fixture.contract_path())
}

#[test]
fn evaluate_returns_contract_conformant_output() {
    let log = TestLogger::new("evaluate_returns_contract_conformant_output");
    let fixture = SkillProjectFixture::new();
    let counters = Arc::new(Counters {
        started: AtomicUsize::new(0),
        stopped: AtomicUsize::new(0),
    });

    log.step("bind skill");
    let skill = harness(&fixture, registry(&counters))
        .get_skill(SkillOptions::new().param("LANGUAGE", "en"))
        .unwrap();

    let payload = json!({ "data": "test" });
    log.log_input("payload", &payload);
    let expected = json!({ "text": "some test output" });
    log.log_expected(&expected);

    let actual = skill.evaluate_default(&payload).unwrap();
    log.log_actual(&actual);
    assert_eq!(actual, expected);
    log.pass();
}

#[test]
fn on_started_runs_exactly_once() {
    let fixture = SkillProjectFixture::new();
    let counters = Arc::new(Counters {
        started: AtomicUsize::new(0),
        stopped: AtomicUsize::new(0),
    });
    let skill = harness(&fixture, registry(&counters))
        .get_skill(SkillOptions::new())
        .unwrap();

    skill.on_started().unwrap();
    assert_eq!(counters.started.load(Ordering::SeqCst), 1);
    assert_eq!(counters.stopped.load(Ordering::SeqCst), 0);

    skill.on_stopped().unwrap();
    assert_eq!(counters.started.load(Ordering::SeqCst), 1);
    assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
}

#[test]
fn contract_edits_apply_to_the_next_call() {
    let fixture = SkillProjectFixture::new();
    let counters = Arc::new(Counters {
        started: AtomicUsize::new(0),
        stopped: AtomicUsize::new(0),
    });
    let skill = harness(&fixture, registry(&counters))
        .get_skill(SkillOptions::new())
        .unwrap();

    assert!(skill.evaluate_default(&json!({ "data": "test" })).is_ok());

    fixture.write_contract(
        r"namespaces:
  incoming:
    fields:
      - { name: data, type: int }
  outgoing:
    fields:
      - { name: text, type: string }
",
    );
    let err = skill.evaluate_default(&json!({ "data": "test" })).unwrap_err();
    assert!(matches!(err, HarnessError::ContractViolation(_)));
}

#[test]
fn missing_entry_point_is_a_resolution_error() {
    let fixture = SkillProjectFixture::new();
    let skill = harness(&fixture, HandlerRegistry::new())
        .get_skill(SkillOptions::new())
        .unwrap();

    let err = skill.evaluate_default(&json!({ "data": "test" })).unwrap_err();
    assert!(matches!(
        err,
        HarnessError::Resolution { ref function, ref module } if function == "evaluate" && module == "handler"
    ));
}

#[test]
fn manifest_errors_stop_binding() {
    let fixture = SkillProjectFixture::new();
    fixture.write_manifest(
        &fixture
            .manifest()
            .replace("jane.doe@example.com", "Jane Doe <jane@example.com>"),
    );
    let err = harness(&fixture, HandlerRegistry::new())
        .get_skill(SkillOptions::new())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "Invalid value for key 'authors' in {}",
            fixture.manifest_path().display()
        )
    );
}
