//! Service definitions and the invocation lifecycle.
//!
//! A [`Definition`] is the declarative half of a service: named fields,
//! validators, and the logger collaborator. An [`Invocation`] is one call in
//! flight; it owns its field snapshot, output envelope, and step-level error
//! store exclusively, so invocations never share mutable state.
//!
//! The lifecycle is: snapshot fields, check validity, run `perform` once,
//! infer the final status, return the envelope. An invalid invocation is
//! rejected with a `validation failure` envelope before `perform` runs;
//! failures raised inside `perform` propagate to the caller uncaught.
use crate::error::Error;
use crate::fields::{Attributes, FieldDefinition, FieldRegistry, FieldSnapshot};
use crate::logger::{default_logger, ServiceLogger};
use crate::output::Output;
use crate::response::ErrorsArg;
use crate::validation::{run_declared_validators, ErrorSet, LocalErrorStore, Validator};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub(crate) const VALIDATION_FAILURE_MESSAGE: &str = "validation failure";

/// Declarative description of a service: fields, validators, collaborators.
#[derive(Clone)]
pub struct Definition {
    name: String,
    registry: FieldRegistry,
    validators: Vec<Validator>,
    logger: Arc<dyn ServiceLogger>,
}

impl Definition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: FieldRegistry::default(),
            validators: Vec::new(),
            logger: default_logger(),
        }
    }

    /// Declare one input field. Re-declaring a name replaces it.
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.registry.declare(field);
        self
    }

    /// Attach a declared validator; validators run in attachment order.
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Replace the default logger collaborator.
    pub fn with_logger(mut self, logger: Arc<dyn ServiceLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    /// Run one full invocation with the given attributes and perform logic.
    ///
    /// Coercion failures and `perform` failures propagate; a validation
    /// failure is returned as a normal `error` envelope and `perform` never
    /// runs.
    pub fn invoke(
        &self,
        attributes: Attributes,
        perform: impl FnOnce(&mut Invocation) -> Result<(), Error>,
    ) -> Result<Output, Error> {
        let fields = self.registry.snapshot(&attributes)?;
        let mut invocation = Invocation::new(self, fields);

        if !invocation.is_valid() {
            let errors = invocation.errors().clone();
            invocation
                .output
                .error(VALIDATION_FAILURE_MESSAGE, Some(errors.into()))?;
            return Ok(invocation.into_output());
        }

        perform(&mut invocation)?;

        invocation.output.finalize_status();
        Ok(invocation.into_output())
    }
}

/// One in-flight call of a service definition.
///
/// Handed mutably to `perform` implementations, which read the field
/// snapshot, build the response, and record step-level errors through it.
pub struct Invocation {
    definition_name: String,
    fields: FieldSnapshot,
    output: Output,
    local_errors: LocalErrorStore,
    merged_local: ErrorSet,
    errors: ErrorSet,
    validators: Vec<Validator>,
    logger: Arc<dyn ServiceLogger>,
}

impl Invocation {
    fn new(definition: &Definition, fields: FieldSnapshot) -> Self {
        Self {
            definition_name: definition.name.clone(),
            fields,
            output: Output::new(),
            local_errors: LocalErrorStore::default(),
            merged_local: ErrorSet::new(),
            errors: ErrorSet::new(),
            validators: definition.validators.clone(),
            logger: Arc::clone(&definition.logger),
        }
    }

    /// Values this invocation was constructed with, after defaults and
    /// coercion.
    pub fn fields(&self) -> &FieldSnapshot {
        &self.fields
    }

    /// The envelope as built so far.
    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Write one envelope key directly.
    pub fn set_output(&mut self, key: &str, value: Value) -> Result<(), Error> {
        self.output.set(key, value)
    }

    /// Write a canonical success response.
    pub fn success(&mut self, message: Option<&str>, data: Option<Value>) -> Result<(), Error> {
        self.output.success(message, data)
    }

    /// Write a canonical error response.
    pub fn error(&mut self, message: &str, errors: Option<ErrorsArg>) -> Result<(), Error> {
        self.output.error(message, errors)
    }

    /// Write a canonical pending response.
    pub fn pending(
        &mut self,
        message: Option<&str>,
        data: Option<Value>,
        errors: Option<ErrorsArg>,
    ) -> Result<(), Error> {
        self.output.pending(message, data, errors)
    }

    /// Record a step-level error. Does not trigger validation by itself.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.local_errors.add(field, message, None);
    }

    /// `add_error` variant carrying validator-style metadata. Options are
    /// never rendered; merged entries are always bare messages.
    pub fn add_error_with_options(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        options: Map<String, Value>,
    ) {
        self.local_errors.add(field, message, Some(options));
    }

    /// Record a step-level error and immediately re-check validity.
    pub fn add_error_and_validate(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> bool {
        self.add_error(field, message);
        self.is_valid()
    }

    /// Re-run declared validators, drain pending step errors, and merge both
    /// into the unified error set.
    ///
    /// Declared messages come first, then step errors in the order they were
    /// added. Draining is one-shot: a repeated check neither duplicates nor
    /// loses previously merged step errors.
    pub fn is_valid(&mut self) -> bool {
        let mut unified = run_declared_validators(&self.validators, &self.fields);
        for (field, message) in self.local_errors.drain() {
            self.merged_local.add(field, message);
        }
        for (field, messages) in self.merged_local.messages() {
            for message in messages {
                unified.add(field.clone(), message.clone());
            }
        }
        self.errors = unified;
        self.errors.is_empty()
    }

    /// Unified errors from the most recent validity check.
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Report a failure through the logger collaborator, prefixed with the
    /// definition name.
    pub fn log_error(&self, failure: impl fmt::Display) {
        self.logger
            .error(&format!("{}: {failure}", self.definition_name));
    }

    fn into_output(self) -> Output {
        self.output
    }
}

/// A service object: a definition plus one unit of work.
///
/// `perform` has a default body that fails with [`Error::NotImplemented`], so
/// a definition that never overrides it cannot complete an invocation.
pub trait Service: Default {
    /// Fields, validators, and collaborators for this service.
    fn definition() -> Definition;

    /// The unit of work. Runs at most once per invocation, only after
    /// validation passes.
    fn perform(&self, invocation: &mut Invocation) -> Result<(), Error> {
        let _ = invocation;
        Err(Error::NotImplemented)
    }

    /// Construct an instance and run the full lifecycle.
    fn call(attributes: Attributes) -> Result<Output, Error> {
        let service = Self::default();
        Self::definition().invoke(attributes, |invocation| service.perform(invocation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap_or_default()
    }

    fn invocation_for(definition: &Definition, attributes: Attributes) -> Invocation {
        let fields = definition.registry().snapshot(&attributes).unwrap();
        Invocation::new(definition, fields)
    }

    #[test]
    fn merge_orders_declared_before_step_errors() {
        let definition = Definition::new("orders")
            .field(FieldDefinition::string("name"))
            .validate(Validator::presence("name"));
        let mut invocation = invocation_for(&definition, attrs(json!({})));

        invocation.add_error("name", "taken");
        assert!(!invocation.is_valid());
        assert_eq!(invocation.errors().get("name"), ["can't be blank", "taken"]);
    }

    #[test]
    fn repeated_checks_do_not_duplicate_drained_entries() {
        let definition = Definition::new("drain").field(FieldDefinition::string("name"));
        let mut invocation = invocation_for(&definition, attrs(json!({"name": "x"})));

        assert!(!invocation.add_error_and_validate("name", "taken"));
        assert!(!invocation.is_valid());
        assert_eq!(invocation.errors().get("name"), ["taken"]);
    }

    #[test]
    fn step_errors_survive_a_later_check() {
        let definition = Definition::new("retain").field(FieldDefinition::string("name"));
        let mut invocation = invocation_for(&definition, attrs(json!({"name": "x"})));

        invocation.add_error("base", "boom");
        assert!(!invocation.is_valid());
        invocation.add_error("base", "again");
        assert!(!invocation.is_valid());
        assert_eq!(invocation.errors().get("base"), ["boom", "again"]);
    }

    #[test]
    fn options_are_normalized_to_bare_messages() {
        let definition = Definition::new("options").field(FieldDefinition::string("name"));
        let mut invocation = invocation_for(&definition, attrs(json!({"name": "x"})));

        let mut options = Map::new();
        options.insert("count".to_string(), json!(3));
        invocation.add_error_with_options("name", "taken", options);
        assert!(!invocation.is_valid());
        assert_eq!(invocation.errors().get("name"), ["taken"]);
    }

    #[test]
    fn valid_invocation_has_empty_errors() {
        let definition = Definition::new("ok")
            .field(FieldDefinition::string("name"))
            .validate(Validator::presence("name"));
        let mut invocation = invocation_for(&definition, attrs(json!({"name": "x"})));

        assert!(invocation.is_valid());
        assert!(invocation.errors().is_empty());
    }
}
