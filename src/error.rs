//! Crate error type.
//!
//! Validation failures are not represented here: they surface as a normal
//! `error` envelope. These variants are programmer errors or failures raised
//! from implementer logic, and they propagate to the host uncaught.
use crate::fields::FieldType;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An envelope write used a key outside the allowed set.
    #[error("invalid key `{key}`; allowed keys are: status, data, message, errors")]
    InvalidKey { key: String },

    /// An envelope write supplied a value of the wrong shape for its key.
    #[error("invalid value for `{key}`: expected {expected}")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },

    /// A declared field could not coerce its input to the declared type.
    #[error("cannot coerce value {value} for field `{field}` to {ty}")]
    TypeCoercion {
        field: String,
        ty: FieldType,
        value: Value,
    },

    /// The service definition never overrode `perform`.
    #[error("perform method not implemented")]
    NotImplemented,

    /// Failure raised by implementer `perform` logic; never caught by the
    /// lifecycle.
    #[error(transparent)]
    Perform(#[from] anyhow::Error),
}
