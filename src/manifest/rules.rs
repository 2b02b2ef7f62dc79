//! The fixed manifest rule set.
//!
//! Rules run in the order of [`MANIFEST_RULES`] and stop at the first
//! failure. Later rules may rely on keys checked by earlier ones, so the
//! order is part of the contract, not a detail.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use super::ManifestView;
use super::value::{integer_like, is_truthy, is_url, non_empty_str, scalar_string, untagged};
use crate::error::Result;

/// Conservative author address: alphanumeric local part with at most one
/// `.` or `_`, a single-word domain, and a two or three letter TLD.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+[._]?[a-z0-9]+@\w+\.\w{2,3}$").unwrap());

/// Supported runtime images: python 2 or 3 with a single-digit minor and a
/// three-part single-digit version tag.
static IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+skill-runtime-python-[23]\.\d:\d\.\d\.\d").unwrap());

/// Keys a `properties` entry may use.
pub const PROPERTY_KEYS: &[&str] = &["name", "desc", "default", "pattern"];

pub const CPU_MIN_FLOOR: u64 = 100;
pub const MEMORY_MIN_FLOOR: u64 = 128;

/// A named manifest check.
#[derive(Debug, Clone, Copy)]
pub struct ManifestRule {
    /// Stable identifier, used in logs and `skilltest validate --rules`.
    pub id: &'static str,
    pub description: &'static str,
    pub check: fn(&ManifestView<'_>) -> Result<()>,
}

/// All rules in evaluation order.
pub const MANIFEST_RULES: &[ManifestRule] = &[
    ManifestRule {
        id: "identity",
        description: "owner and name are present and non-empty",
        check: identity,
    },
    ManifestRule {
        id: "version-control",
        description: "scm is a valid URL",
        check: version_control,
    },
    ManifestRule {
        id: "licensing",
        description: "license.name, license.url and visibility are set",
        check: licensing,
    },
    ManifestRule {
        id: "metadata",
        description: "labels are non-empty and authors are email addresses",
        check: metadata,
    },
    ManifestRule {
        id: "image",
        description: "image is a supported skill-runtime-python image",
        check: image,
    },
    ManifestRule {
        id: "properties",
        description: "optional properties only use name, desc, default, pattern",
        check: properties,
    },
    ManifestRule {
        id: "contract",
        description: "at least one non-empty contract label is declared",
        check: contract,
    },
    ManifestRule {
        id: "composable",
        description: "composable is true or false",
        check: composable,
    },
    ManifestRule {
        id: "network-access",
        description: "network_access is true or false",
        check: network_access,
    },
    ManifestRule {
        id: "resources",
        description: "resources.cpu.min >= 100 and resources.memory.min >= 128",
        check: resources,
    },
    ManifestRule {
        id: "permissions",
        description: "at least one non-empty permission is declared",
        check: permissions,
    },
    ManifestRule {
        id: "handler",
        description: "handler.file and handler.function are set",
        check: handler,
    },
];

fn identity(view: &ManifestView<'_>) -> Result<()> {
    view.require_truthy("owner")?;
    view.require_truthy("name")?;
    Ok(())
}

fn version_control(view: &ManifestView<'_>) -> Result<()> {
    let scm = view.require("scm")?;
    require_url(view, scm, "scm")
}

fn licensing(view: &ManifestView<'_>) -> Result<()> {
    let license = view.require("license")?;

    let name = view.require_at(license, "license", "name")?;
    if !is_truthy(name) {
        return Err(view.invalid("license.name"));
    }

    let url = view.require_at(license, "license", "url")?;
    require_url(view, url, "license.url")?;

    view.require_truthy("visibility")?;
    Ok(())
}

fn metadata(view: &ManifestView<'_>) -> Result<()> {
    let labels = non_empty_sequence(view, view.require("labels")?, "labels")?;
    if !labels.iter().all(is_truthy) {
        return Err(view.invalid("labels"));
    }

    let authors = non_empty_sequence(view, view.require("authors")?, "authors")?;
    let valid = authors
        .iter()
        .all(|author| non_empty_str(author).is_some_and(|a| EMAIL_REGEX.is_match(a)));
    if !valid {
        return Err(view.invalid("authors"));
    }
    Ok(())
}

fn image(view: &ManifestView<'_>) -> Result<()> {
    let image = view.require("image")?;
    match non_empty_str(image) {
        Some(reference) if IMAGE_REGEX.is_match(reference) => Ok(()),
        _ => Err(view.invalid("image")),
    }
}

fn properties(view: &ManifestView<'_>) -> Result<()> {
    let Some(block) = view.get("properties") else {
        return Ok(());
    };
    if !is_truthy(block) {
        return Ok(());
    }
    let Value::Sequence(entries) = untagged(block) else {
        return Err(view.invalid("properties"));
    };

    for entry in entries {
        let Value::Mapping(property) = untagged(entry) else {
            return Err(view.invalid("properties"));
        };
        if property.is_empty() {
            return Err(view.invalid("properties"));
        }
        for key in property.keys() {
            let Some(key) = untagged(key).as_str() else {
                return Err(view.invalid("properties"));
            };
            if !PROPERTY_KEYS.contains(&key) {
                return Err(view.invalid(format!("properties.{key}")));
            }
        }
    }
    Ok(())
}

fn contract(view: &ManifestView<'_>) -> Result<()> {
    non_empty_truthy_list(view, "contract")
}

fn composable(view: &ManifestView<'_>) -> Result<()> {
    boolean_flag(view, "composable")
}

fn network_access(view: &ManifestView<'_>) -> Result<()> {
    boolean_flag(view, "network_access")
}

fn resources(view: &ManifestView<'_>) -> Result<()> {
    let resources = view.require("resources")?;
    resource_minimum(view, resources, "cpu", CPU_MIN_FLOOR)?;
    resource_minimum(view, resources, "memory", MEMORY_MIN_FLOOR)?;
    Ok(())
}

fn permissions(view: &ManifestView<'_>) -> Result<()> {
    non_empty_truthy_list(view, "permissions")
}

fn handler(view: &ManifestView<'_>) -> Result<()> {
    let handler = view.require("handler")?;
    for field in ["file", "function"] {
        let value = view.require_at(handler, "handler", field)?;
        if non_empty_str(value).is_none() {
            return Err(view.invalid(format!("handler.{field}")));
        }
    }
    Ok(())
}

fn require_url(view: &ManifestView<'_>, value: &Value, key: &str) -> Result<()> {
    match non_empty_str(value) {
        Some(candidate) if is_url(candidate) => Ok(()),
        _ => Err(view.invalid(key)),
    }
}

fn non_empty_sequence<'a>(
    view: &ManifestView<'_>,
    value: &'a Value,
    key: &str,
) -> Result<&'a Vec<Value>> {
    match untagged(value) {
        Value::Sequence(items) if !items.is_empty() => Ok(items),
        _ => Err(view.invalid(key)),
    }
}

fn non_empty_truthy_list(view: &ManifestView<'_>, key: &str) -> Result<()> {
    let items = non_empty_sequence(view, view.require(key)?, key)?;
    if items.iter().all(is_truthy) {
        Ok(())
    } else {
        Err(view.invalid(key))
    }
}

fn boolean_flag(view: &ManifestView<'_>, key: &str) -> Result<()> {
    let flag = view.require(key)?;
    match scalar_string(flag).map(|s| s.to_lowercase()).as_deref() {
        Some("true" | "false") => Ok(()),
        _ => Err(view.invalid(key)),
    }
}

fn resource_minimum(
    view: &ManifestView<'_>,
    resources: &Value,
    resource: &str,
    floor: u64,
) -> Result<()> {
    let block = view.require_at(resources, "resources", resource)?;
    let block_path = format!("resources.{resource}");
    let minimum = view.require_at(block, &block_path, "min")?;
    match integer_like(minimum) {
        Some(value) if value >= floor => Ok(()),
        _ => Err(view.invalid(format!("{block_path}.min"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern() {
        assert!(EMAIL_REGEX.is_match("jane.doe@example.com"));
        assert!(EMAIL_REGEX.is_match("dev_ops@corp.io"));
        assert!(EMAIL_REGEX.is_match("ab@x.de"));
        assert!(!EMAIL_REGEX.is_match("a@example.com"));
        assert!(!EMAIL_REGEX.is_match("jane..doe@example.com"));
        assert!(!EMAIL_REGEX.is_match("jane.doe@example.info"));
        assert!(!EMAIL_REGEX.is_match("Jane <jane@example.com>"));
        assert!(!EMAIL_REGEX.is_match("jane@sub.example.com"));
    }

    #[test]
    fn image_pattern() {
        assert!(IMAGE_REGEX.is_match("registry/skill-runtime-python-3.9:1.0.0"));
        assert!(IMAGE_REGEX.is_match("eu.gcr.io/acme/skill-runtime-python-2.7:0.3.1"));
        assert!(!IMAGE_REGEX.is_match("registry/other-runtime-3.9:1.0.0"));
        assert!(!IMAGE_REGEX.is_match("skill-runtime-python-3.9:1.0.0"));
        assert!(!IMAGE_REGEX.is_match("registry/skill-runtime-python-4.0:1.0.0"));
        assert!(!IMAGE_REGEX.is_match("registry/skill-runtime-python-3.9:latest"));
    }

    #[test]
    fn rule_ids_are_unique_and_ordered() {
        let ids: Vec<_> = MANIFEST_RULES.iter().map(|r| r.id).collect();
        assert_eq!(ids.first(), Some(&"identity"));
        assert_eq!(ids.last(), Some(&"handler"));
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
