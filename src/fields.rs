//! Typed field declarations and per-instance value snapshots.
//!
//! A service definition declares its inputs once, at the type level. Each
//! invocation resolves caller attributes against those declarations (defaults
//! for omitted fields, coercion for typed ones) and captures the result in an
//! immutable snapshot the implementer can introspect later.
use crate::error::Error;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute values supplied by the caller at construction time.
pub type Attributes = Map<String, Value>;

/// Primitive types a declared field may coerce to.
///
/// The supported set is closed; an unsupported type is unrepresentable at
/// declaration time rather than failing at use time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// A single named input declared on a service definition.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    name: String,
    ty: Option<FieldType>,
    default: Option<Value>,
}

impl FieldDefinition {
    /// Typed field: input values are coerced to `ty` at assignment.
    pub fn typed(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            default: None,
        }
    }

    /// Untyped field: values pass through without coercion or casting.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            default: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::typed(name, FieldType::String)
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::typed(name, FieldType::Integer)
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::typed(name, FieldType::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::typed(name, FieldType::Boolean)
    }

    /// Default applied when the caller omits this field.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Per-definition registry of declared fields.
///
/// Populated once when the definition is built; read at every instance
/// construction.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<FieldDefinition>,
}

impl FieldRegistry {
    /// Register a field. Re-declaring a name replaces the earlier definition.
    pub fn declare(&mut self, field: FieldDefinition) {
        if let Some(existing) = self.fields.iter_mut().find(|f| f.name == field.name) {
            *existing = field;
        } else {
            self.fields.push(field);
        }
    }

    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Resolve caller attributes into a snapshot.
    ///
    /// Per declared field: take the caller value, falling back to the default,
    /// assign it (coercing typed fields), then read the assigned value back
    /// into the snapshot. The read-back matters because coercion may transform
    /// the raw input.
    pub fn snapshot(&self, attributes: &Attributes) -> Result<FieldSnapshot, Error> {
        let mut resolved = BTreeMap::new();
        for field in &self.fields {
            let raw = attributes
                .get(&field.name)
                .cloned()
                .or_else(|| field.default.clone())
                .unwrap_or(Value::Null);
            let assigned = match field.ty {
                Some(ty) => coerce(&field.name, ty, raw)?,
                None => raw,
            };
            resolved.insert(field.name.clone(), assigned);
        }
        Ok(FieldSnapshot { resolved })
    }
}

/// Immutable record of the values one invocation was constructed with, after
/// defaults and coercion.
#[derive(Debug, Clone, Default)]
pub struct FieldSnapshot {
    resolved: BTreeMap<String, Value>,
}

impl FieldSnapshot {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.resolved.get(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.resolved
    }
}

/// Coerce a raw input value to the declared type. `null` passes through so
/// presence validation can report it instead.
fn coerce(field: &str, ty: FieldType, value: Value) -> Result<Value, Error> {
    if value.is_null() {
        return Ok(value);
    }
    let coerced = match ty {
        FieldType::String => match &value {
            Value::String(_) => Some(value.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        FieldType::Integer => coerce_integer(&value),
        FieldType::Float => coerce_float(&value),
        FieldType::Boolean => coerce_boolean(&value),
    };
    coerced.ok_or(Error::TypeCoercion {
        field: field.to_string(),
        ty,
        value,
    })
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => {
            let float = n.as_f64()?;
            if float.fract() == 0.0 {
                Some(Value::Number(Number::from(float as i64)))
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_float(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "on" => Some(Value::Bool(true)),
            "false" | "f" | "0" | "off" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}
