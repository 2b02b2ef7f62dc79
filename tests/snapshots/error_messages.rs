use insta::assert_snapshot;

use skilltest::HarnessError;
use skilltest::manifest;
use skilltest::test_utils::MANIFEST;

fn validate(manifest_text: &str) -> HarnessError {
    let doc = manifest::parse_manifest(manifest_text, "skill.yml").unwrap();
    manifest::validate(&doc, "skill.yml").unwrap_err()
}

#[test]
fn test_error_missing_key() {
    let err = HarnessError::missing_key("owner", "skill.yml");
    assert_snapshot!(err.to_string(), @"Missing mandatory key 'owner' in skill.yml");
}

#[test]
fn test_error_invalid_value() {
    let err = HarnessError::invalid_value("license.url", "skill.yml");
    assert_snapshot!(err.to_string(), @"Invalid value for key 'license.url' in skill.yml");
}

#[test]
fn test_error_resolution() {
    let err = HarnessError::resolution("on_stopped", "handler");
    assert_snapshot!(err.to_string(), @"Failed to resolve function 'on_stopped' from module 'handler'");
}

#[test]
fn test_error_handler_failed() {
    let err = HarnessError::HandlerFailed {
        function: "evaluate".into(),
        module: "handler".into(),
        reason: "exit status 2: boom".into(),
    };
    assert_snapshot!(err.to_string(), @"Handler 'evaluate' in module 'handler' failed: exit status 2: boom");
}

#[test]
fn test_nested_missing_key_uses_dotted_path() {
    let err = validate(&MANIFEST.replace("  memory:\n    min: 128\n", "  memory: {}\n"));
    assert_snapshot!(err.to_string(), @"Missing mandatory key 'resources.memory.min' in skill.yml");
}

#[test]
fn test_unknown_property_key() {
    let err = validate(&MANIFEST.replace("    default: en\n", "    default: en\n    secret: x\n"));
    assert_snapshot!(err.to_string(), @"Invalid value for key 'properties.secret' in skill.yml");
}

#[test]
fn test_structured_error_display() {
    let structured = HarnessError::invalid_value("image", "skill.yml").to_structured();
    assert_snapshot!(structured.to_string(), @"[E102] Invalid value for key 'image' in skill.yml");
    assert_snapshot!(
        structured.suggestion,
        @"`image` must reference a skill-runtime-python-<2|3>.<minor>:<x>.<y>.<z> image"
    );
}
