//! Service objects with typed inputs, two-phase validation, and structured
//! response envelopes.
//!
//! A service definition declares named, typed fields and validators; each
//! invocation snapshots its resolved inputs, checks validity, runs the
//! implementer's `perform` logic, and returns an envelope of up to four keys
//! (`status`, `message`, `data`, `errors`). When `perform` never sets a
//! status explicitly, the envelope infers one from what was written.
//!
//! ```
//! use serde_json::json;
//! use service_core::{
//!     Attributes, Definition, Error, FieldDefinition, Invocation, Service, Validator,
//! };
//!
//! #[derive(Default)]
//! struct Greet;
//!
//! impl Service for Greet {
//!     fn definition() -> Definition {
//!         Definition::new("greet")
//!             .field(FieldDefinition::string("name"))
//!             .field(FieldDefinition::untyped("active").default_value(json!(true)))
//!             .validate(Validator::presence("name"))
//!     }
//!
//!     fn perform(&self, invocation: &mut Invocation) -> Result<(), Error> {
//!         let name = invocation.fields().str("name").unwrap_or("stranger").to_string();
//!         invocation.set_output("message", json!(format!("Hello, {name}")))
//!     }
//! }
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("name".to_string(), json!("World"));
//! let output = Greet::call(attributes)?;
//! assert_eq!(output.status(), "success");
//! assert_eq!(output.message(), Some("Hello, World"));
//! # Ok::<(), service_core::Error>(())
//! ```
mod error;
mod fields;
mod logger;
mod output;
mod response;
mod service;
mod util;
mod validation;

pub use error::Error;
pub use fields::{Attributes, FieldDefinition, FieldRegistry, FieldSnapshot, FieldType};
pub use logger::{ServiceLogger, TracingLogger};
pub use output::{
    Output, STATUS_ERROR, STATUS_INITIALIZED, STATUS_PENDING, STATUS_SUCCESS,
};
pub use response::ErrorsArg;
pub use service::{Definition, Invocation, Service};
pub use validation::{run_declared_validators, ErrorSet, LocalErrorStore, Rule, Validator};
