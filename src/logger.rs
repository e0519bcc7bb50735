//! Logger collaborator contract.
//!
//! The framework needs exactly one operation from its host's logging setup.
//! Concrete loggers are injected per definition; the default forwards to
//! `tracing` so a host with a subscriber installed gets structured output
//! with no extra wiring.
use std::sync::Arc;

/// One-method logging contract.
pub trait ServiceLogger: Send + Sync {
    fn error(&self, message: &str);
}

/// Default collaborator, backed by the `tracing` error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl ServiceLogger for TracingLogger {
    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

pub(crate) fn default_logger() -> Arc<dyn ServiceLogger> {
    Arc::new(TracingLogger)
}
