//! Audit logging backends.
//!
//! This module provides the [`AuditLogger`] trait and default implementations.
//! A logger sees each event once, after the store accepted it.

use crate::event::AuditEvent;

/// Trait for audit logging backends.
pub trait AuditLogger: Send + Sync {
    /// Logs a persisted audit event.
    fn log(&self, event: &AuditEvent);
}

/// Audit logger that uses the `tracing` infrastructure.
///
/// Every event is logged at `info` under the `mkt_audit` target. Metadata has
/// already been redacted by the time it gets here.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditLogger {
    /// Optional prefix for all log messages.
    prefix: Option<String>,
}

impl TracingAuditLogger {
    /// Creates a new tracing-based audit logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new tracing-based audit logger with a prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl AuditLogger for TracingAuditLogger {
    fn log(&self, event: &AuditEvent) {
        let guid = event.guid();
        let event_type = event.event_type();
        let actor_type = event.actor_type();
        let actor = &event.actor().id;
        let actee = event.actee();
        let actee_type = event.actee_type();

        // Serialize to JSON for structured logging (ignore errors)
        let json = event.to_json().unwrap_or_else(|_| "{}".to_string());

        let prefix = self.prefix.as_deref().unwrap_or("AUDIT");

        tracing::info!(
            target: "mkt_audit",
            %guid,
            %event_type,
            %actor_type,
            %actor,
            %actee,
            %actee_type,
            event_json = %json,
            "[{prefix}] {event_type}"
        );
    }
}

/// A no-op audit logger for testing or disabled scenarios.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditLogger;

impl NoopAuditLogger {
    /// Creates a new no-op audit logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditLogger for NoopAuditLogger {
    fn log(&self, _event: &AuditEvent) {}
}
