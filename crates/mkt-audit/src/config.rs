//! Recording configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Placeholder written in place of sensitive values.
pub const DEFAULT_REDACTION_MARKER: &str = "[REDACTED]";

/// Metadata key catalog diffs are nested under.
pub const DEFAULT_CATALOG_CHANGES_KEY: &str = "changes_from_broker_catalog";

/// Default prefix for tracing output.
pub const DEFAULT_LOG_PREFIX: &str = "AUDIT";

/// Settings shared by every recording operation of an
/// [`EventRepository`](crate::EventRepository).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Value substituted for redacted fields.
    pub redaction_marker: String,
    /// Top-level metadata key for catalog diffs.
    pub catalog_changes_key: String,
    /// Prefix used by the tracing logger.
    pub log_prefix: String,
    /// Whether persisted events are also emitted through `tracing`.
    pub log_events: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            redaction_marker: DEFAULT_REDACTION_MARKER.to_string(),
            catalog_changes_key: DEFAULT_CATALOG_CHANGES_KEY.to_string(),
            log_prefix: DEFAULT_LOG_PREFIX.to_string(),
            log_events: true,
        }
    }
}

impl AuditConfig {
    /// Parses a configuration from JSON. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the result fails
    /// [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::InvalidConfig`] if the redaction marker or the
    /// catalog changes key is empty.
    pub fn validate(&self) -> Result<()> {
        if self.redaction_marker.is_empty() {
            return Err(AuditError::InvalidConfig(
                "redaction_marker cannot be empty".to_string(),
            ));
        }
        if self.catalog_changes_key.is_empty() {
            return Err(AuditError::InvalidConfig(
                "catalog_changes_key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = AuditConfig::default();
        assert_eq!(config.redaction_marker, "[REDACTED]");
        assert_eq!(config.catalog_changes_key, "changes_from_broker_catalog");
        assert_eq!(config.log_prefix, "AUDIT");
        assert!(config.log_events);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_json_fills_missing_keys() {
        let config = AuditConfig::from_json(r#"{"log_events": false}"#).expect("valid config");
        assert!(!config.log_events);
        assert_eq!(config.redaction_marker, DEFAULT_REDACTION_MARKER);
    }

    #[test]
    fn from_json_overrides_marker() {
        let config =
            AuditConfig::from_json(r#"{"redaction_marker": "***"}"#).expect("valid config");
        assert_eq!(config.redaction_marker, "***");
    }

    #[test]
    fn empty_marker_is_rejected() {
        let result = AuditConfig::from_json(r#"{"redaction_marker": ""}"#);
        assert!(matches!(result, Err(AuditError::InvalidConfig(_))));
    }

    #[test]
    fn empty_changes_key_is_rejected() {
        let config = AuditConfig {
            catalog_changes_key: String::new(),
            ..AuditConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let result = AuditConfig::from_json("{not json");
        assert!(matches!(result, Err(AuditError::Serialization(_))));
    }
}
