//! Pipeline driven through executables via `ProcessResolver`.
#![cfg(unix)]

use serde_json::json;
use skilltest::HarnessError;
use skilltest::config::Config;
use skilltest::skill::{SkillHarness, SkillOptions};
use skilltest::test_utils::SkillProjectFixture;

fn harness(fixture: &SkillProjectFixture) -> SkillHarness {
    let mut config = Config::default();
    config.paths.manifest = fixture.manifest_path();
    config.paths.contract = fixture.contract_path();
    config.paths.handler_root = fixture.handler_root();
    config.handler.launcher = vec!["sh".to_string()];
    SkillHarness::from_config(&config)
}

#[test]
fn shell_handler_output_is_filtered_by_the_contract() {
    let fixture = SkillProjectFixture::new();
    let skill = harness(&fixture)
        .get_skill(SkillOptions::new().param("LANGUAGE", "en"))
        .unwrap();

    let out = skill.evaluate_default(&json!({ "data": "test" })).unwrap();
    assert_eq!(out, json!({ "text": "some test output" }));
}

#[test]
fn lifecycle_hooks_see_provisioning_parameters() {
    let fixture = SkillProjectFixture::new();
    let log = fixture.path().join("hooks.log");
    let skill = harness(&fixture)
        .get_skill(SkillOptions::new().param("LIFECYCLE_LOG", log.display().to_string()))
        .unwrap();

    skill.on_started().unwrap();
    skill.on_stopped().unwrap();
    assert_eq!(std::fs::read_to_string(&log).unwrap(), "on_started\non_stopped\n");
}

#[test]
fn handler_override_replaces_the_module() {
    let fixture = SkillProjectFixture::new();
    let alt = fixture.write_handler(
        "alt.sh",
        "#!/bin/sh\ncat > /dev/null\necho '{\"text\":\"from alt\"}'\n",
    );
    let skill = harness(&fixture)
        .get_skill(SkillOptions::new().handler(alt.display().to_string()))
        .unwrap();

    let out = skill.evaluate_default(&json!({ "data": "test" })).unwrap();
    assert_eq!(out["text"], "from alt");
}

#[test]
fn failing_handler_surfaces_stderr() {
    let fixture = SkillProjectFixture::new();
    fixture.write_handler(
        "handler.sh",
        "#!/bin/sh\necho 'model not loaded' >&2\nexit 2\n",
    );
    let skill = harness(&fixture).get_skill(SkillOptions::new()).unwrap();

    let err = skill.evaluate_default(&json!({ "data": "test" })).unwrap_err();
    match err {
        HarnessError::HandlerFailed { function, reason, .. } => {
            assert_eq!(function, "evaluate");
            assert!(reason.contains("model not loaded"));
        }
        other => panic!("expected HandlerFailed, got {other:?}"),
    }
}
