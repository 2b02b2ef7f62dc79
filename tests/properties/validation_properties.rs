//! Property-based tests for the manifest rules.

use proptest::prelude::*;
use serde_yaml::Value;

use skilltest::HarnessError;
use skilltest::manifest::{self, CPU_MIN_FLOOR, MEMORY_MIN_FLOOR};
use skilltest::test_utils::MANIFEST;

const MANDATORY_KEYS: &[&str] = &[
    "owner",
    "name",
    "scm",
    "license",
    "visibility",
    "labels",
    "authors",
    "image",
    "contract",
    "composable",
    "network_access",
    "resources",
    "permissions",
    "handler",
];

fn manifest() -> Value {
    serde_yaml::from_str(MANIFEST).unwrap()
}

fn invalid_key(result: skilltest::Result<manifest::HandlerBinding>) -> Option<String> {
    match result {
        Err(HarnessError::InvalidValue { key, .. }) => Some(key),
        _ => None,
    }
}

proptest! {
    #[test]
    fn cpu_minimum_threshold(min in 0u64..10_000) {
        let mut doc = manifest();
        doc["resources"]["cpu"]["min"] = Value::from(min);
        let result = manifest::validate(&doc, "skill.yml");
        if min >= CPU_MIN_FLOOR {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(invalid_key(result), Some("resources.cpu.min".to_string()));
        }
    }

    #[test]
    fn memory_minimum_threshold_accepts_digit_strings(min in 0u64..10_000) {
        let mut doc = manifest();
        doc["resources"]["memory"]["min"] = Value::from(min.to_string());
        let result = manifest::validate(&doc, "skill.yml");
        if min >= MEMORY_MIN_FLOOR {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(invalid_key(result), Some("resources.memory.min".to_string()));
        }
    }

    #[test]
    fn flags_accept_any_case_of_true_or_false(
        word in prop_oneof![Just("true"), Just("false")],
        mask in any::<u8>(),
    ) {
        let cased: String = word
            .chars()
            .enumerate()
            .map(|(i, c)| if mask >> (i % 8) & 1 == 1 { c.to_ascii_uppercase() } else { c })
            .collect();
        let mut doc = manifest();
        doc["composable"] = Value::from(cased.clone());
        doc["network_access"] = Value::from(cased);
        prop_assert!(manifest::validate(&doc, "skill.yml").is_ok());
    }

    #[test]
    fn flags_reject_other_words(word in "[a-z]{1,8}") {
        prop_assume!(word != "true" && word != "false");
        let mut doc = manifest();
        doc["composable"] = Value::from(word);
        prop_assert_eq!(
            invalid_key(manifest::validate(&doc, "skill.yml")),
            Some("composable".to_string())
        );
    }

    #[test]
    fn removing_a_mandatory_key_names_it(index in 0..MANDATORY_KEYS.len()) {
        let key = MANDATORY_KEYS[index];
        let mut doc = manifest();
        if let Value::Mapping(map) = &mut doc {
            map.remove(key);
        }
        match manifest::validate(&doc, "skill.yml") {
            Err(HarnessError::MissingKey { key: missing, document }) => {
                prop_assert_eq!(missing, key);
                prop_assert_eq!(document, "skill.yml");
            }
            other => prop_assert!(false, "expected MissingKey({}), got {:?}", key, other),
        }
    }

    #[test]
    fn unknown_property_keys_are_named(key in "[a-z]{3,10}") {
        prop_assume!(!["name", "desc", "default", "pattern"].contains(&key.as_str()));
        let mut doc = manifest();
        doc["properties"][0][key.as_str()] = Value::from("x");
        prop_assert_eq!(
            invalid_key(manifest::validate(&doc, "skill.yml")),
            Some(format!("properties.{key}"))
        );
    }
}
