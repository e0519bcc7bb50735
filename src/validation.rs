//! Declared validation rules and step-level error accumulation.
//!
//! Validity checking is two-phase: declared rules run against the field
//! snapshot every time, while step errors added during execution are drained
//! out of the local store exactly once and retained in the merged result.
//! Keeping the drain explicit makes its one-shot nature visible: re-checking
//! never duplicates an already-merged entry and never loses it.
use crate::fields::FieldSnapshot;
use crate::util::is_blank;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name to ordered error messages, as rendered to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorSet(BTreeMap<String, Vec<String>>);

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Messages recorded for one field, empty when the field is clean.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn messages(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(field, messages)| {
                    let list = messages.iter().cloned().map(Value::String).collect();
                    (field.clone(), Value::Array(list))
                })
                .collect(),
        )
    }

    /// Parse a caller-supplied errors mapping: field name to one message or a
    /// list of messages. Anything else is not an error collection.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let mut set = Self::new();
        for (field, entry) in map {
            match entry {
                Value::String(message) => set.add(field, message),
                Value::Array(items) => {
                    for item in items {
                        set.add(field, item.as_str()?);
                    }
                }
                _ => return None,
            }
        }
        Some(set)
    }
}

/// Errors added imperatively during execution, pending a merge.
///
/// Entries carry optional validator-style options; options are framework
/// metadata and are normalized away when the entry is drained.
#[derive(Debug, Clone, Default)]
pub struct LocalErrorStore {
    entries: Vec<LocalError>,
}

#[derive(Debug, Clone)]
struct LocalError {
    field: String,
    message: String,
    options: Option<Map<String, Value>>,
}

impl LocalErrorStore {
    pub fn add(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        options: Option<Map<String, Value>>,
    ) {
        self.entries.push(LocalError {
            field: field.into(),
            message: message.into(),
            options,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Remove and return every pending entry in insertion order, normalized
    /// to bare `(field, message)` pairs.
    pub fn drain(&mut self) -> Vec<(String, String)> {
        self.entries
            .drain(..)
            .map(|entry| (entry.field, entry.message))
            .collect()
    }
}

/// A declared rule bound to one field.
#[derive(Debug, Clone)]
pub struct Validator {
    field: String,
    rule: Rule,
}

/// Schema-level validation rules run against the snapshot on every check.
///
/// Rules other than `Presence` skip blank values; pair them with `Presence`
/// when the field is mandatory.
#[derive(Debug, Clone)]
pub enum Rule {
    Presence,
    Inclusion { choices: Vec<Value> },
    Length { min: Option<usize>, max: Option<usize> },
    Format(Regex),
}

impl Validator {
    pub fn new(field: impl Into<String>, rule: Rule) -> Self {
        Self {
            field: field.into(),
            rule,
        }
    }

    pub fn presence(field: impl Into<String>) -> Self {
        Self::new(field, Rule::Presence)
    }

    pub fn inclusion(field: impl Into<String>, choices: Vec<Value>) -> Self {
        Self::new(field, Rule::Inclusion { choices })
    }

    pub fn length(field: impl Into<String>, min: Option<usize>, max: Option<usize>) -> Self {
        Self::new(field, Rule::Length { min, max })
    }

    pub fn format(field: impl Into<String>, pattern: Regex) -> Self {
        Self::new(field, Rule::Format(pattern))
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    fn check(&self, value: Option<&Value>) -> Option<String> {
        let blank = value.is_none_or(is_blank);
        match &self.rule {
            Rule::Presence => blank.then(|| "can't be blank".to_string()),
            _ if blank => None,
            Rule::Inclusion { choices } => {
                let value = value?;
                (!choices.contains(value)).then(|| "is not included in the list".to_string())
            }
            Rule::Length { min, max } => {
                let text = value?.as_str()?;
                let chars = text.chars().count();
                if let Some(min) = min {
                    if chars < *min {
                        return Some(format!("is too short (minimum is {min} characters)"));
                    }
                }
                if let Some(max) = max {
                    if chars > *max {
                        return Some(format!("is too long (maximum is {max} characters)"));
                    }
                }
                None
            }
            Rule::Format(pattern) => {
                let text = value?.as_str()?;
                (!pattern.is_match(text)).then(|| "is invalid".to_string())
            }
        }
    }
}

/// Run every declared validator against the snapshot, collecting failures in
/// declaration order.
pub fn run_declared_validators(validators: &[Validator], fields: &FieldSnapshot) -> ErrorSet {
    let mut set = ErrorSet::new();
    for validator in validators {
        if let Some(message) = validator.check(fields.get(validator.field())) {
            set.add(validator.field(), message);
        }
    }
    set
}
