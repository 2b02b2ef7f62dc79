//! Property-based tests for contract round trips.

use proptest::prelude::*;
use serde_json::{Value, json};

use skilltest::contract::{SchemaContract, namespace_path, round_trip};

const CONTRACT: &str = r#"
records:
  Point:
    - { name: x, type: float }
    - { name: label, type: string, optional: true }
namespaces:
  incoming:
    fields:
      - { name: id, type: int }
      - { name: name, type: string }
      - { name: tags, type: "[string]" }
      - { name: weights, type: "map<int>", optional: true }
      - { name: origin, type: Point, optional: true }
      - { name: active, type: bool, default: true }
"#;

fn contract() -> SchemaContract {
    SchemaContract::from_yaml_str(CONTRACT, "contract.dbs").unwrap()
}

proptest! {
    #[test]
    fn conformant_values_survive_unchanged(
        id in any::<i64>(),
        name in ".{0,40}",
        tags in prop::collection::vec(".{0,12}", 0..6),
        weights in prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..4),
        active in any::<bool>(),
    ) {
        let value = json!({
            "id": id,
            "name": name,
            "tags": tags,
            "weights": weights,
            "active": active,
        });
        let parsed = round_trip(&contract(), &value, &namespace_path(&["incoming"])).unwrap();
        prop_assert_eq!(parsed, value);
    }

    #[test]
    fn undeclared_keys_never_survive(extra in "[a-z]{1,8}", payload in any::<i64>()) {
        prop_assume!(!["id", "name", "tags", "weights", "origin", "active"].contains(&extra.as_str()));
        let mut value = json!({ "id": 1, "name": "n", "tags": [] });
        value[extra.as_str()] = json!(payload);
        let parsed = round_trip(&contract(), &value, &namespace_path(&["incoming"])).unwrap();
        prop_assert!(parsed.get(&extra).is_none());
        prop_assert_eq!(&parsed["active"], &Value::Bool(true));
    }

    #[test]
    fn wrongly_typed_ids_are_rejected(text in "[a-z]{1,8}") {
        let value = json!({ "id": text, "name": "n", "tags": [] });
        prop_assert!(round_trip(&contract(), &value, &namespace_path(&["incoming"])).is_err());
    }
}
