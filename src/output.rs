//! The response envelope with dirty tracking and status inference.
//!
//! An envelope starts as `{status: "initialized"}` and is mutated only
//! through [`Output::set`], which records whether anything was explicitly
//! written (and whether `status` specifically was). [`Output::finalize_status`]
//! uses those flags to infer a final status when the implementer never set
//! one, without ever clobbering an explicit status.
use crate::error::Error;
use crate::util::is_blank;
use crate::validation::ErrorSet;
use serde::Serialize;
use serde_json::Value;

pub const STATUS_INITIALIZED: &str = "initialized";
pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";
pub const STATUS_PENDING: &str = "pending";

#[derive(Debug, Clone, Copy)]
enum OutputKey {
    Status,
    Data,
    Message,
    Errors,
}

impl OutputKey {
    fn parse(key: &str) -> Result<Self, Error> {
        match key {
            "status" => Ok(Self::Status),
            "data" => Ok(Self::Data),
            "message" => Ok(Self::Message),
            "errors" => Ok(Self::Errors),
            _ => Err(Error::InvalidKey {
                key: key.to_string(),
            }),
        }
    }
}

/// The structured result of one invocation.
///
/// Serializes to the wire shape: `status` always present, the other three
/// keys only when set.
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ErrorSet>,
    #[serde(skip)]
    output_dirty: bool,
    #[serde(skip)]
    status_dirty: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            status: STATUS_INITIALIZED.to_string(),
            message: None,
            data: None,
            errors: None,
            output_dirty: false,
            status_dirty: false,
        }
    }
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one envelope key.
    ///
    /// A blank value is a silent no-op, which keeps "not set" distinguishable
    /// from "set to empty". An unrecognized key fails even for blank values.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), Error> {
        let key = OutputKey::parse(key)?;
        if is_blank(&value) {
            return Ok(());
        }
        match key {
            OutputKey::Status => {
                let status = value.as_str().ok_or(Error::InvalidValue {
                    key: "status",
                    expected: "a string",
                })?;
                self.status = status.to_string();
                self.status_dirty = true;
            }
            OutputKey::Message => {
                let message = value.as_str().ok_or(Error::InvalidValue {
                    key: "message",
                    expected: "a string",
                })?;
                self.message = Some(message.to_string());
            }
            OutputKey::Data => self.data = Some(value),
            OutputKey::Errors => {
                let errors = ErrorSet::from_value(&value).ok_or(Error::InvalidValue {
                    key: "errors",
                    expected: "a mapping from field name to messages",
                })?;
                self.errors = Some(errors);
            }
        }
        self.output_dirty = true;
        Ok(())
    }

    /// Infer the final status. Called once per invocation, after implementer
    /// logic runs.
    ///
    /// A clean envelope becomes `success`; a dirty envelope with no explicit
    /// status becomes `error` when errors are present, else `success`; an
    /// explicit status always wins.
    pub fn finalize_status(&mut self) {
        if self.status_dirty {
            return;
        }
        let status = if self.output_dirty && self.has_errors() {
            STATUS_ERROR
        } else {
            STATUS_SUCCESS
        };
        self.status = status.to_string();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn errors(&self) -> Option<&ErrorSet> {
        self.errors.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    pub fn is_error(&self) -> bool {
        self.status == STATUS_ERROR
    }

    fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn starts_initialized_with_nothing_else() {
        let output = Output::new();
        assert_eq!(output.status(), STATUS_INITIALIZED);
        assert_eq!(serde_json::to_value(&output).unwrap(), json!({"status": "initialized"}));
    }

    #[test]
    fn set_writes_value_without_touching_status() {
        let mut output = Output::new();
        output.set("data", json!("payload")).unwrap();
        assert_eq!(output.data(), Some(&json!("payload")));
        assert_eq!(output.status(), STATUS_INITIALIZED);
    }

    #[test]
    fn set_rejects_unknown_keys_naming_the_allowed_set() {
        let mut output = Output::new();
        let err = output.set("bogus", json!("value")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid key `bogus`; allowed keys are: status, data, message, errors"
        );
        // The key check wins even when the value would have been dropped.
        assert!(output.set("bogus", Value::Null).is_err());
    }

    #[test]
    fn blank_values_are_a_no_op() {
        let mut output = Output::new();
        output.set("message", Value::Null).unwrap();
        output.set("message", json!("")).unwrap();
        output.set("errors", json!({})).unwrap();
        assert_eq!(output.message(), None);
        assert!(output.errors().is_none());
        output.finalize_status();
        assert_eq!(output.status(), STATUS_SUCCESS);
    }

    #[test]
    fn mistyped_values_are_programmer_errors() {
        let mut output = Output::new();
        assert!(matches!(
            output.set("status", json!(5)),
            Err(Error::InvalidValue { key: "status", .. })
        ));
        assert!(matches!(
            output.set("errors", json!("boom")),
            Err(Error::InvalidValue { key: "errors", .. })
        ));
    }

    #[test]
    fn finalize_clean_envelope_is_success() {
        let mut output = Output::new();
        output.finalize_status();
        assert_eq!(output.status(), STATUS_SUCCESS);
    }

    #[test]
    fn finalize_dirty_without_errors_is_success() {
        let mut output = Output::new();
        output.set("data", json!("payload")).unwrap();
        output.finalize_status();
        assert_eq!(output.status(), STATUS_SUCCESS);
    }

    #[test]
    fn finalize_dirty_with_errors_is_error() {
        let mut output = Output::new();
        output.set("errors", json!({"name": ["can't be blank"]})).unwrap();
        output.finalize_status();
        assert_eq!(output.status(), STATUS_ERROR);
    }

    #[test]
    fn explicit_status_always_wins() {
        let mut output = Output::new();
        output.set("status", json!("pending")).unwrap();
        output.set("errors", json!({"name": ["can't be blank"]})).unwrap();
        output.finalize_status();
        assert_eq!(output.status(), STATUS_PENDING);
    }

    #[test]
    fn custom_status_values_are_allowed() {
        let mut output = Output::new();
        output.set("status", json!("queued")).unwrap();
        output.finalize_status();
        assert_eq!(output.status(), "queued");
    }

    #[test]
    fn serializes_only_keys_that_were_set() {
        let mut output = Output::new();
        output.set("status", json!("success")).unwrap();
        output.set("message", json!("done")).unwrap();
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({"status": "success", "message": "done"})
        );
    }
}
