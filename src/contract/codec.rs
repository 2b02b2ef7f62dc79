//! Schema-driven binary codec.
//!
//! Field names are not written; the reader walks the same field list as the
//! writer. Layout: one format byte, then the root record. Strings, lists and
//! maps carry a little-endian `u32` length, ints are `i64` LE, floats `f64`
//! LE, bools one byte, optional fields a one-byte presence flag.

use serde_json::{Map, Number, Value};

use super::schema::{Field, FieldType, Schema};
use crate::error::{HarnessError, Result};

pub const FORMAT_VERSION: u8 = 1;

/// Nesting limit for recursive record types.
const MAX_DEPTH: usize = 128;

fn violation(path: &str, reason: impl std::fmt::Display) -> HarnessError {
    if path.is_empty() {
        HarnessError::ContractViolation(reason.to_string())
    } else {
        HarnessError::ContractViolation(format!("{path}: {reason}"))
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

pub struct Encoder<'s> {
    schema: &'s Schema,
    buf: Vec<u8>,
}

impl<'s> Encoder<'s> {
    pub const fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            buf: Vec::new(),
        }
    }

    /// Encode `value` as the record described by `fields`, with header.
    pub fn encode_root(mut self, fields: &[Field], value: &Value) -> Result<Vec<u8>> {
        self.buf.push(FORMAT_VERSION);
        self.record(fields, value, "", 0)?;
        Ok(self.buf)
    }

    /// Check that a single value fits `ty`, discarding the bytes.
    pub fn check(schema: &'s Schema, ty: &FieldType, value: &Value, path: &str) -> Result<()> {
        Self::new(schema).value(ty, value, path, 0)
    }

    fn record(&mut self, fields: &[Field], value: &Value, path: &str, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(violation(path, "nesting too deep"));
        }
        let Value::Object(object) = value else {
            return Err(violation(path, format!("expected object, got {}", kind(value))));
        };

        for field in fields {
            let field_path = child_path(path, &field.name);
            let present = object.get(&field.name).filter(|v| !v.is_null());
            let resolved = present.or(field.default.as_ref());
            match resolved {
                Some(inner) => {
                    if field.optional {
                        self.buf.push(1);
                    }
                    self.value(&field.ty, inner, &field_path, depth + 1)?;
                }
                None if field.optional => self.buf.push(0),
                None => return Err(violation(&field_path, "required field is missing")),
            }
        }
        Ok(())
    }

    fn value(&mut self, ty: &FieldType, value: &Value, path: &str, depth: usize) -> Result<()> {
        match (ty, value) {
            (FieldType::String, Value::String(s)) => self.string(s, path),
            (FieldType::Int, Value::Number(n)) => {
                let int = n
                    .as_i64()
                    .ok_or_else(|| violation(path, format!("expected int, got {n}")))?;
                self.buf.extend_from_slice(&int.to_le_bytes());
                Ok(())
            }
            (FieldType::Float, Value::Number(n)) => {
                let float = n
                    .as_f64()
                    .ok_or_else(|| violation(path, format!("expected float, got {n}")))?;
                self.buf.extend_from_slice(&float.to_le_bytes());
                Ok(())
            }
            (FieldType::Bool, Value::Bool(b)) => {
                self.buf.push(u8::from(*b));
                Ok(())
            }
            (FieldType::List(inner), Value::Array(items)) => {
                self.length(items.len(), path)?;
                for (index, item) in items.iter().enumerate() {
                    self.value(inner, item, &format!("{path}[{index}]"), depth + 1)?;
                }
                Ok(())
            }
            (FieldType::Map(inner), Value::Object(entries)) => {
                self.length(entries.len(), path)?;
                for (key, item) in entries {
                    self.string(key, path)?;
                    self.value(inner, item, &child_path(path, key), depth + 1)?;
                }
                Ok(())
            }
            (FieldType::Record(name), _) => {
                let fields = self
                    .schema
                    .record(name)
                    .ok_or_else(|| violation(path, format!("unknown record type '{name}'")))?;
                self.record(fields, value, path, depth)
            }
            (expected, actual) => Err(violation(
                path,
                format!("expected {expected}, got {}", kind(actual)),
            )),
        }
    }

    fn length(&mut self, len: usize, path: &str) -> Result<()> {
        let len = u32::try_from(len).map_err(|_| violation(path, "collection too large"))?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        Ok(())
    }

    fn string(&mut self, s: &str, path: &str) -> Result<()> {
        self.length(s.len(), path)?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

pub struct Decoder<'s, 'b> {
    schema: &'s Schema,
    bytes: &'b [u8],
    pos: usize,
}

impl<'s, 'b> Decoder<'s, 'b> {
    pub const fn new(schema: &'s Schema, bytes: &'b [u8]) -> Self {
        Self {
            schema,
            bytes,
            pos: 0,
        }
    }

    /// Decode a full buffer written by [`Encoder::encode_root`].
    pub fn decode_root(mut self, fields: &[Field]) -> Result<Value> {
        let version = self.byte("")?;
        if version != FORMAT_VERSION {
            return Err(violation("", format!("unsupported format version {version}")));
        }
        let value = self.record(fields, "", 0)?;
        if self.pos != self.bytes.len() {
            return Err(violation(
                "",
                format!("{} trailing bytes", self.bytes.len() - self.pos),
            ));
        }
        Ok(value)
    }

    fn record(&mut self, fields: &[Field], path: &str, depth: usize) -> Result<Value> {
        if depth > MAX_DEPTH {
            return Err(violation(path, "nesting too deep"));
        }
        let mut object = Map::new();
        for field in fields {
            let field_path = child_path(path, &field.name);
            if field.optional && self.byte(&field_path)? == 0 {
                continue;
            }
            let value = self.value(&field.ty, &field_path, depth + 1)?;
            object.insert(field.name.clone(), value);
        }
        Ok(Value::Object(object))
    }

    fn value(&mut self, ty: &FieldType, path: &str, depth: usize) -> Result<Value> {
        match ty {
            FieldType::String => self.string(path).map(Value::String),
            FieldType::Int => {
                let raw = self.take(8, path)?;
                let mut word = [0u8; 8];
                word.copy_from_slice(raw);
                Ok(Value::Number(i64::from_le_bytes(word).into()))
            }
            FieldType::Float => {
                let raw = self.take(8, path)?;
                let mut word = [0u8; 8];
                word.copy_from_slice(raw);
                Number::from_f64(f64::from_le_bytes(word))
                    .map(Value::Number)
                    .ok_or_else(|| violation(path, "float is not finite"))
            }
            FieldType::Bool => match self.byte(path)? {
                0 => Ok(Value::Bool(false)),
                1 => Ok(Value::Bool(true)),
                other => Err(violation(path, format!("invalid bool byte {other}"))),
            },
            FieldType::List(inner) => {
                let len = self.length(path)?;
                let mut items = Vec::new();
                for index in 0..len {
                    items.push(self.value(inner, &format!("{path}[{index}]"), depth + 1)?);
                }
                Ok(Value::Array(items))
            }
            FieldType::Map(inner) => {
                let len = self.length(path)?;
                let mut entries = Map::new();
                for _ in 0..len {
                    let key = self.string(path)?;
                    let item = self.value(inner, &child_path(path, &key), depth + 1)?;
                    entries.insert(key, item);
                }
                Ok(Value::Object(entries))
            }
            FieldType::Record(name) => {
                let fields = self
                    .schema
                    .record(name)
                    .ok_or_else(|| violation(path, format!("unknown record type '{name}'")))?;
                self.record(fields, path, depth)
            }
        }
    }

    fn take(&mut self, n: usize, path: &str) -> Result<&'b [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| violation(path, "unexpected end of input"))?;
        let bytes = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self, path: &str) -> Result<u8> {
        Ok(self.take(1, path)?[0])
    }

    fn length(&mut self, path: &str) -> Result<usize> {
        let raw = self.take(4, path)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(raw);
        Ok(u32::from_le_bytes(word) as usize)
    }

    fn string(&mut self, path: &str) -> Result<String> {
        let len = self.length(path)?;
        let raw = self.take(len, path)?;
        String::from_utf8(raw.to_vec()).map_err(|_| violation(path, "string is not valid UTF-8"))
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
