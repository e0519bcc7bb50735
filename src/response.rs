//! Canonical `success` / `error` / `pending` response construction.
//!
//! All three write through [`Output::set`], so dirty tracking and the blank
//! no-op rule apply exactly as they do for direct writes.
use crate::error::Error;
use crate::output::{Output, STATUS_ERROR, STATUS_PENDING, STATUS_SUCCESS};
use crate::validation::ErrorSet;
use serde_json::Value;

/// Errors argument accepted by the response builders.
///
/// A validation collection is rendered as its messages-by-field map; a raw
/// value passes through unchanged.
#[derive(Debug, Clone)]
pub enum ErrorsArg {
    Set(ErrorSet),
    Raw(Value),
}

impl From<ErrorSet> for ErrorsArg {
    fn from(set: ErrorSet) -> Self {
        Self::Set(set)
    }
}

impl From<Value> for ErrorsArg {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl ErrorsArg {
    fn normalize(self) -> Value {
        match self {
            Self::Set(set) => set.to_value(),
            Self::Raw(value) => value,
        }
    }
}

impl Output {
    /// Write a canonical success response.
    pub fn success(&mut self, message: Option<&str>, data: Option<Value>) -> Result<(), Error> {
        self.respond(STATUS_SUCCESS, message, data, None)
    }

    /// Write a canonical error response. The message is required.
    pub fn error(&mut self, message: &str, errors: Option<ErrorsArg>) -> Result<(), Error> {
        self.respond(STATUS_ERROR, Some(message), None, errors)
    }

    /// Write a canonical pending response.
    pub fn pending(
        &mut self,
        message: Option<&str>,
        data: Option<Value>,
        errors: Option<ErrorsArg>,
    ) -> Result<(), Error> {
        self.respond(STATUS_PENDING, message, data, errors)
    }

    fn respond(
        &mut self,
        status: &str,
        message: Option<&str>,
        data: Option<Value>,
        errors: Option<ErrorsArg>,
    ) -> Result<(), Error> {
        self.set("status", Value::String(status.to_string()))?;
        if let Some(message) = message {
            self.set("message", Value::String(message.to_string()))?;
        }
        if let Some(data) = data {
            self.set("data", data)?;
        }
        if let Some(errors) = errors {
            self.set("errors", errors.normalize())?;
        }
        Ok(())
    }
}
