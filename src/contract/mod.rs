//! Skill data contracts.
//!
//! The evaluation pipeline only depends on [`ContractSerializer`] and
//! [`ContractLoader`]: a value is serialized into the contract's binary form
//! under a namespace path and deserialized straight back. Whatever survives
//! that round trip is, by definition, contract-conformant.
//!
//! [`SchemaContract`] is the bundled backend; see [`schema`] for its
//! document format and [`codec`] for the wire layout.

pub mod codec;
pub mod schema;

use std::path::Path;

use serde_json::Value;
use tracing::trace;

use crate::error::{HarnessError, Result};

pub use schema::{Field, FieldType, Namespace, Schema};

/// Namespace used for payloads sent to a handler.
pub const DEFAULT_INCOMING: &str = "incoming";
/// Namespace used for handler responses.
pub const DEFAULT_OUTGOING: &str = "outgoing";

/// Serialize and deserialize values under a contract.
pub trait ContractSerializer {
    /// Encode `value` under the namespace path, rejecting non-conforming data.
    fn serialize(&self, value: &Value, namespaces: &[String]) -> Result<Vec<u8>>;

    /// Decode bytes produced by [`serialize`](Self::serialize) for the same path.
    fn deserialize(&self, bytes: &[u8], namespaces: &[String]) -> Result<Value>;
}

/// Produce a serializer from a contract file.
pub trait ContractLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Box<dyn ContractSerializer>>;
}

/// Enforce the contract on `value`: serialize, then deserialize.
///
/// The returned value is the parsed form, not the input.
pub fn round_trip(
    contract: &dyn ContractSerializer,
    value: &Value,
    namespaces: &[String],
) -> Result<Value> {
    let bytes = contract.serialize(value, namespaces)?;
    trace!(namespaces = ?namespaces, bytes = bytes.len(), "contract serialized");
    contract.deserialize(&bytes, namespaces)
}

/// Namespace path from borrowed segments.
#[must_use]
pub fn namespace_path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| (*s).to_string()).collect()
}

/// Contract backed by a YAML [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaContract {
    schema: Schema,
}

impl SchemaContract {
    /// Parse a contract document and check every field default against its type.
    pub fn from_yaml_str(input: &str, origin: &str) -> Result<Self> {
        let schema = Schema::from_yaml_str(input, origin)?;
        check_defaults(&schema, origin)?;
        Ok(Self { schema })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw, &path.display().to_string())
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl ContractSerializer for SchemaContract {
    fn serialize(&self, value: &Value, namespaces: &[String]) -> Result<Vec<u8>> {
        let namespace = self.schema.namespace(namespaces)?;
        codec::Encoder::new(&self.schema).encode_root(&namespace.fields, value)
    }

    fn deserialize(&self, bytes: &[u8], namespaces: &[String]) -> Result<Value> {
        let namespace = self.schema.namespace(namespaces)?;
        codec::Decoder::new(&self.schema, bytes).decode_root(&namespace.fields)
    }
}

/// Loads [`SchemaContract`]s from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaContractLoader;

impl ContractLoader for SchemaContractLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn ContractSerializer>> {
        Ok(Box::new(SchemaContract::load(path)?))
    }
}

fn check_defaults(schema: &Schema, origin: &str) -> Result<()> {
    let mut pending: Vec<(String, &[Field])> = schema
        .records
        .iter()
        .map(|(name, fields)| (format!("record {name}"), fields.as_slice()))
        .collect();
    let mut namespaces: Vec<(String, &Namespace)> = schema
        .namespaces
        .iter()
        .map(|(name, ns)| (name.clone(), ns))
        .collect();
    while let Some((path, ns)) = namespaces.pop() {
        pending.push((format!("namespace {path}"), ns.fields.as_slice()));
        namespaces.extend(
            ns.namespaces
                .iter()
                .map(|(name, child)| (format!("{path}.{name}"), child)),
        );
    }

    for (owner, fields) in pending {
        for field in fields {
            if let Some(default) = &field.default {
                codec::Encoder::check(schema, &field.ty, default, &field.name).map_err(|err| {
                    HarnessError::ContractInvalid(format!(
                        "{origin}: {owner}: bad default for '{}': {err}",
                        field.name
                    ))
                })?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CONTRACT: &str = r#"
namespaces:
  incoming:
    fields:
      - { name: data, type: string }
  outgoing:
    fields:
      - { name: text, type: string }
      - { name: score, type: float, default: 0.0 }
"#;

    #[test]
    fn round_trip_returns_parsed_value() {
        let contract = SchemaContract::from_yaml_str(CONTRACT, "c").unwrap();
        let parsed = round_trip(
            &contract,
            &json!({ "data": "test", "noise": 1 }),
            &namespace_path(&[DEFAULT_INCOMING]),
        )
        .unwrap();
        assert_eq!(parsed, json!({ "data": "test" }));

        let response = round_trip(
            &contract,
            &json!({ "text": "some test output" }),
            &namespace_path(&[DEFAULT_OUTGOING]),
        )
        .unwrap();
        assert_eq!(response, json!({ "text": "some test output", "score": 0.0 }));
    }

    #[test]
    fn namespaces_select_the_record() {
        let contract = SchemaContract::from_yaml_str(CONTRACT, "c").unwrap();
        let err = round_trip(
            &contract,
            &json!({ "data": "test" }),
            &namespace_path(&[DEFAULT_OUTGOING]),
        )
        .unwrap_err();
        assert!(matches!(err, HarnessError::ContractViolation(ref m) if m.contains("text")));
    }

    #[test]
    fn bad_defaults_are_rejected_at_load() {
        let doc = "namespaces: { incoming: { fields: [ { name: n, type: int, default: nope } ] } }";
        let err = SchemaContract::from_yaml_str(doc, "c").unwrap_err();
        assert!(matches!(err, HarnessError::ContractInvalid(ref m) if m.contains("bad default")));
    }

    #[test]
    fn loader_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contract.dbs");
        std::fs::write(&path, CONTRACT).unwrap();

        let contract = SchemaContractLoader.load(&path).unwrap();
        let parsed = round_trip(
            contract.as_ref(),
            &json!({ "data": "x" }),
            &namespace_path(&[DEFAULT_INCOMING]),
        )
        .unwrap();
        assert_eq!(parsed["data"], "x");

        let missing = SchemaContractLoader.load(&dir.path().join("nope.dbs"));
        assert!(matches!(missing, Err(HarnessError::Io(_))));
    }
}
