//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! name the offending key, field or handler.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::ManifestMissingKey => suggest_missing_key(context),
        ErrorCode::ManifestInvalidValue => suggest_invalid_value(context),
        ErrorCode::HandlerUnresolved => suggest_unresolved(context),
        _ => code.suggestion().to_string(),
    }
}

fn context_str<'a>(context: Option<&'a Value>, field: &str) -> Option<&'a str> {
    context.and_then(|c| c.get(field)).and_then(Value::as_str)
}

fn suggest_missing_key(context: Option<&Value>) -> String {
    match context_str(context, "key") {
        Some(key) => format!(
            "Add `{key}` to the manifest. Nested keys are written as indented mappings (e.g. `resources:` / `  cpu:` / `    min: 100`)"
        ),
        None => ErrorCode::ManifestMissingKey.suggestion().to_string(),
    }
}

fn suggest_invalid_value(context: Option<&Value>) -> String {
    let Some(key) = context_str(context, "key") else {
        return ErrorCode::ManifestInvalidValue.suggestion().to_string();
    };

    let hint = match key {
        "scm" | "license.url" => "must be an absolute URL such as https://example.com/repo",
        "authors" => "every author must be a plain email address such as jane.doe@example.com",
        "image" => "must reference a skill-runtime-python-<2|3>.<minor>:<x>.<y>.<z> image",
        "composable" | "network_access" => "must be true or false",
        "resources.cpu.min" => "must be a whole number of at least 100",
        "resources.memory.min" => "must be a whole number of at least 128",
        k if k.starts_with("properties") => {
            "properties entries may only use the keys name, desc, default, pattern"
        }
        _ => "must be present and non-empty",
    };
    format!("`{key}` {hint}")
}

fn suggest_unresolved(context: Option<&Value>) -> String {
    match (
        context_str(context, "function"),
        context_str(context, "module"),
    ) {
        (Some(function), Some(module)) => format!(
            "Make sure module '{module}' exists and defines '{function}'. Use --handler-path if the handler lives outside the handler root"
        ),
        _ => ErrorCode::HandlerUnresolved.suggestion().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_key_names_key() {
        let ctx = json!({ "key": "resources.memory.min" });
        let suggestion = suggest_for_error(ErrorCode::ManifestMissingKey, Some(&ctx));
        assert!(suggestion.contains("resources.memory.min"));
    }

    #[test]
    fn invalid_value_gives_key_specific_hint() {
        let ctx = json!({ "key": "resources.cpu.min" });
        let suggestion = suggest_for_error(ErrorCode::ManifestInvalidValue, Some(&ctx));
        assert!(suggestion.contains("100"));

        let ctx = json!({ "key": "properties.color" });
        let suggestion = suggest_for_error(ErrorCode::ManifestInvalidValue, Some(&ctx));
        assert!(suggestion.contains("pattern"));
    }

    #[test]
    fn falls_back_to_static_suggestion() {
        assert_eq!(
            suggest_for_error(ErrorCode::ManifestInvalidValue, None),
            ErrorCode::ManifestInvalidValue.suggestion()
        );
        assert_eq!(
            suggest_for_error(ErrorCode::IoError, Some(&json!({}))),
            ErrorCode::IoError.suggestion()
        );
    }

    #[test]
    fn unresolved_names_module() {
        let ctx = json!({ "function": "evaluate", "module": "handler" });
        let suggestion = suggest_for_error(ErrorCode::HandlerUnresolved, Some(&ctx));
        assert!(suggestion.contains("handler"));
        assert!(suggestion.contains("evaluate"));
    }
}
