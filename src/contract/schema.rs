//! Contract schema documents.
//!
//! A contract declares named record types and a tree of namespaces, each
//! holding the field list used for one direction of traffic:
//!
//! ```yaml
//! records:
//!   Address:
//!     - { name: street, type: string }
//! namespaces:
//!   incoming:
//!     fields:
//!       - { name: data, type: string }
//!       - { name: tags, type: "[string]", optional: true }
//!   outgoing:
//!     fields:
//!       - { name: text, type: string, default: "" }
//! ```

use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{HarnessError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawContract {
    #[serde(default)]
    records: BTreeMap<String, Vec<RawField>>,
    namespaces: BTreeMap<String, RawNamespace>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNamespace {
    #[serde(default)]
    fields: Vec<RawField>,
    #[serde(default)]
    namespaces: BTreeMap<String, RawNamespace>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    default: Option<serde_yaml::Value>,
}

/// Wire type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// `[T]`
    List(Box<FieldType>),
    /// `map<T>`, string keys
    Map(Box<FieldType>),
    /// Reference into the contract's `records`.
    Record(String),
}

impl FieldType {
    /// Parse a type expression such as `int`, `[string]` or `map<Address>`.
    pub fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        if let Some(inner) = expr.strip_prefix('[').and_then(|e| e.strip_suffix(']')) {
            return Self::parse(inner).map(|t| Self::List(Box::new(t)));
        }
        if let Some(inner) = expr.strip_prefix("map<").and_then(|e| e.strip_suffix('>')) {
            return Self::parse(inner).map(|t| Self::Map(Box::new(t)));
        }
        match expr {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            name if is_identifier(name) => Some(Self::Record(name.to_string())),
            _ => None,
        }
    }

    fn record_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::List(inner) | Self::Map(inner) => inner.record_names(out),
            Self::Record(name) => out.push(name),
            _ => {}
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::List(inner) => write!(f, "[{inner}]"),
            Self::Map(inner) => write!(f, "map<{inner}>"),
            Self::Record(name) => f.write_str(name),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub optional: bool,
    pub default: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    pub fields: Vec<Field>,
    pub namespaces: BTreeMap<String, Namespace>,
}

/// A parsed and cross-checked contract.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub records: BTreeMap<String, Vec<Field>>,
    pub namespaces: BTreeMap<String, Namespace>,
}

impl Schema {
    /// Parse a contract document. `origin` names it in error messages.
    pub fn from_yaml_str(input: &str, origin: &str) -> Result<Self> {
        let raw: RawContract = serde_yaml::from_str(input)
            .map_err(|err| HarnessError::ContractInvalid(format!("{origin}: {err}")))?;

        let mut records = BTreeMap::new();
        for (name, fields) in raw.records {
            if !is_identifier(&name) {
                return Err(invalid(origin, format!("record name '{name}' is not an identifier")));
            }
            let fields = compile_fields(fields, &format!("record {name}"), origin)?;
            records.insert(name, fields);
        }

        let mut namespaces = BTreeMap::new();
        for (name, ns) in raw.namespaces {
            let compiled = compile_namespace(ns, &name, origin)?;
            namespaces.insert(name, compiled);
        }

        let schema = Self {
            records,
            namespaces,
        };
        schema.check_references(origin)?;
        Ok(schema)
    }

    /// Walk a namespace path such as `["incoming"]` or `["incoming", "v2"]`.
    pub fn namespace(&self, path: &[String]) -> Result<&Namespace> {
        let (first, rest) = path.split_first().ok_or_else(|| {
            HarnessError::ContractViolation("namespace path is empty".to_string())
        })?;
        let mut current = self.namespaces.get(first).ok_or_else(|| unknown_namespace(path))?;
        for segment in rest {
            current = current
                .namespaces
                .get(segment)
                .ok_or_else(|| unknown_namespace(path))?;
        }
        Ok(current)
    }

    pub fn record(&self, name: &str) -> Option<&[Field]> {
        self.records.get(name).map(Vec::as_slice)
    }

    fn check_references(&self, origin: &str) -> Result<()> {
        let mut names = Vec::new();
        for fields in self.records.values() {
            fields.iter().for_each(|f| f.ty.record_names(&mut names));
        }
        let mut stack: Vec<&Namespace> = self.namespaces.values().collect();
        while let Some(ns) = stack.pop() {
            ns.fields.iter().for_each(|f| f.ty.record_names(&mut names));
            stack.extend(ns.namespaces.values());
        }
        match names.into_iter().find(|name| !self.records.contains_key(*name)) {
            Some(name) => Err(invalid(origin, format!("unknown record type '{name}'"))),
            None => Ok(()),
        }
    }
}

fn compile_namespace(raw: RawNamespace, path: &str, origin: &str) -> Result<Namespace> {
    let fields = compile_fields(raw.fields, &format!("namespace {path}"), origin)?;
    let mut namespaces = BTreeMap::new();
    for (name, child) in raw.namespaces {
        let compiled = compile_namespace(child, &format!("{path}.{name}"), origin)?;
        namespaces.insert(name, compiled);
    }
    Ok(Namespace { fields, namespaces })
}

fn compile_fields(raw: Vec<RawField>, owner: &str, origin: &str) -> Result<Vec<Field>> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(raw.len());
    for field in raw {
        if field.name.is_empty() {
            return Err(invalid(origin, format!("{owner} has a field without a name")));
        }
        if !seen.insert(field.name.clone()) {
            return Err(invalid(origin, format!("{owner} declares '{}' twice", field.name)));
        }
        let ty = FieldType::parse(&field.ty).ok_or_else(|| {
            invalid(origin, format!("{owner}: unknown type '{}' for '{}'", field.ty, field.name))
        })?;
        let default = field
            .default
            .map(|d| {
                serde_json::to_value(d).map_err(|err| {
                    invalid(origin, format!("{owner}: default of '{}': {err}", field.name))
                })
            })
            .transpose()?;
        fields.push(Field {
            name: field.name,
            ty,
            optional: field.optional,
            default,
        });
    }
    Ok(fields)
}

fn invalid(origin: &str, reason: String) -> HarnessError {
    HarnessError::ContractInvalid(format!("{origin}: {reason}"))
}

fn unknown_namespace(path: &[String]) -> HarnessError {
    HarnessError::ContractViolation(format!("unknown namespace '{}'", path.join(".")))
}
