//! Skill manifest (`skill.yml`) validation.
//!
//! A manifest is validated by running [`MANIFEST_RULES`] in order against
//! the raw YAML document. The first failing rule aborts validation with a
//! [`HarnessError::MissingKey`] or [`HarnessError::InvalidValue`] naming the
//! dotted key path. Only a manifest that passes every rule yields a
//! [`HandlerBinding`].

mod rules;
mod value;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, trace};

use crate::error::{HarnessError, Result};

pub use rules::{
    CPU_MIN_FLOOR, MANIFEST_RULES, MEMORY_MIN_FLOOR, ManifestRule, PROPERTY_KEYS,
};

/// What a valid manifest tells the harness about the skill's code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerBinding {
    /// Handler module identifier (`handler.file`).
    pub module: String,
    /// Entry-point function name (`handler.function`).
    pub function: String,
    /// First declared contract label (`contract[0]`).
    pub contract: String,
}

/// Read-only view of a manifest document used by the rules.
#[derive(Debug, Clone, Copy)]
pub struct ManifestView<'a> {
    root: &'a Value,
    document: &'a str,
}

impl<'a> ManifestView<'a> {
    #[must_use]
    pub const fn new(root: &'a Value, document: &'a str) -> Self {
        Self { root, document }
    }

    /// Identifier used in error messages (usually the manifest path).
    #[must_use]
    pub const fn document(&self) -> &'a str {
        self.document
    }

    /// Top-level value; `Some(Null)` when the key is present but empty.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        match value::untagged(self.root) {
            Value::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    pub(crate) fn missing(&self, key: impl Into<String>) -> HarnessError {
        HarnessError::missing_key(key, self.document)
    }

    pub(crate) fn invalid(&self, key: impl Into<String>) -> HarnessError {
        HarnessError::invalid_value(key, self.document)
    }

    /// Top-level key that must exist (its value may still be empty).
    pub(crate) fn require(&self, key: &str) -> Result<&'a Value> {
        self.get(key).ok_or_else(|| self.missing(key))
    }

    /// Top-level key that must exist and be non-empty.
    pub(crate) fn require_truthy(&self, key: &str) -> Result<&'a Value> {
        let value = self.require(key)?;
        if value::is_truthy(value) {
            Ok(value)
        } else {
            Err(self.invalid(key))
        }
    }

    /// Nested key below `parent`, which lives at `parent_path`.
    ///
    /// A parent that is not a mapping is an invalid value of the parent
    /// itself; an absent child is a missing `parent_path.key`.
    pub(crate) fn require_at(
        &self,
        parent: &'a Value,
        parent_path: &str,
        key: &str,
    ) -> Result<&'a Value> {
        let Value::Mapping(map) = value::untagged(parent) else {
            return Err(self.invalid(parent_path));
        };
        map.get(key)
            .ok_or_else(|| self.missing(format!("{parent_path}.{key}")))
    }

    fn binding(&self) -> Result<HandlerBinding> {
        let handler = self.require("handler")?;
        let text = |key: &str| -> Result<String> {
            let value = self.require_at(handler, "handler", key)?;
            value::non_empty_str(value)
                .map(str::to_string)
                .ok_or_else(|| self.invalid(format!("handler.{key}")))
        };
        let contract = match value::untagged(self.require("contract")?) {
            Value::Sequence(labels) => labels.first().and_then(value::scalar_string),
            _ => None,
        }
        .ok_or_else(|| self.invalid("contract"))?;

        Ok(HandlerBinding {
            module: text("file")?,
            function: text("function")?,
            contract,
        })
    }
}

/// Validate a parsed manifest and extract its handler binding.
///
/// `document_id` only feeds error messages.
pub fn validate(document: &Value, document_id: &str) -> Result<HandlerBinding> {
    let view = ManifestView::new(document, document_id);
    for rule in MANIFEST_RULES {
        (rule.check)(&view)?;
        trace!(rule = rule.id, document = document_id, "manifest rule passed");
    }
    let binding = view.binding()?;
    debug!(
        document = document_id,
        module = %binding.module,
        function = %binding.function,
        contract = %binding.contract,
        "manifest validated"
    );
    Ok(binding)
}

/// Parse manifest YAML text.
pub fn parse_manifest(input: &str, document_id: &str) -> Result<Value> {
    serde_yaml::from_str(input)
        .map_err(|err| HarnessError::ManifestParse(format!("{document_id}: {err}")))
}

/// Read and parse a manifest file.
pub fn load_manifest(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)?;
    parse_manifest(&raw, &path.display().to_string())
}

/// Load and validate a manifest file in one step.
pub fn validate_file(path: &Path) -> Result<HandlerBinding> {
    let document = load_manifest(path)?;
    validate(&document, &path.display().to_string())
}
