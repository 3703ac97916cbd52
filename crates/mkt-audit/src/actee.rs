//! Target classification.
//!
//! Each entity kind maps to an [`Actee`] through its own constructor:
//!
//! | kind                       | id         | name            | space |
//! |----------------------------|------------|-----------------|-------|
//! | `service`                  | guid       | label           | no    |
//! | `service_plan`             | guid       | name            | no    |
//! | `service_instance`         | guid       | name            | yes   |
//! | `service_binding`          | guid       | `N/A`           | yes   |
//! | `broker`                   | guid       | name            | no    |
//! | `service_dashboard_client` | client id  | client id       | no    |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::entities::{ServiceBinding, ServiceBroker, ServiceInstance};
use crate::error::{AuditError, Result};
use crate::tracking::FieldMap;

/// Name recorded for actees that have no name of their own.
pub const UNNAMED_ACTEE: &str = "N/A";

/// Kind of entity an event is recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A catalog service.
    Service,
    /// A catalog service plan.
    ServicePlan,
    /// A provisioned service instance.
    ServiceInstance,
    /// A service binding.
    ServiceBinding,
    /// A service broker.
    Broker,
    /// A broker's dashboard SSO client.
    ServiceDashboardClient,
}

impl EntityKind {
    /// Returns the string representation of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::ServicePlan => "service_plan",
            Self::ServiceInstance => "service_instance",
            Self::ServiceBinding => "service_binding",
            Self::Broker => "broker",
            Self::ServiceDashboardClient => "service_dashboard_client",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The entity an event was recorded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actee {
    /// Identifier after the operation.
    pub id: String,
    /// Kind of entity.
    pub kind: EntityKind,
    /// Name at the time of the operation.
    pub name: String,
    /// Owning space, for space-scoped kinds.
    pub space: Option<String>,
}

impl Actee {
    /// Classifies a service instance.
    #[must_use]
    pub fn service_instance(instance: &ServiceInstance) -> Self {
        Self {
            id: instance.guid.clone(),
            kind: EntityKind::ServiceInstance,
            name: instance.name.clone(),
            space: Some(instance.space_guid.clone()),
        }
    }

    /// Classifies a service binding. Bindings are unnamed.
    #[must_use]
    pub fn service_binding(binding: &ServiceBinding) -> Self {
        Self {
            id: binding.guid.clone(),
            kind: EntityKind::ServiceBinding,
            name: UNNAMED_ACTEE.to_string(),
            space: Some(binding.space_guid.clone()),
        }
    }

    /// Classifies a service broker.
    #[must_use]
    pub fn broker(broker: &ServiceBroker) -> Self {
        Self {
            id: broker.guid.clone(),
            kind: EntityKind::Broker,
            name: broker.name.clone(),
            space: None,
        }
    }

    /// Classifies a dashboard client from its catalog attributes.
    ///
    /// Numeric and boolean ids are rendered as text.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::MissingField`] if `attrs` has no scalar `id`.
    pub fn dashboard_client(attrs: &FieldMap) -> Result<Self> {
        let id = match attrs.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(id @ (Value::Number(_) | Value::Bool(_))) => id.to_string(),
            _ => return Err(AuditError::MissingField("id")),
        };
        Ok(Self {
            name: id.clone(),
            id,
            kind: EntityKind::ServiceDashboardClient,
            space: None,
        })
    }

    /// Classifies an unscoped entity by explicit id and name.
    ///
    /// Used for services and plans, whose id may only be known after save.
    #[must_use]
    pub fn unscoped(kind: EntityKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            space: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(EntityKind::Service, "service")]
    #[test_case(EntityKind::ServicePlan, "service_plan")]
    #[test_case(EntityKind::ServiceInstance, "service_instance")]
    #[test_case(EntityKind::ServiceBinding, "service_binding")]
    #[test_case(EntityKind::Broker, "broker")]
    #[test_case(EntityKind::ServiceDashboardClient, "service_dashboard_client")]
    fn kind_names(kind: EntityKind, expected: &str) {
        assert_eq!(kind.as_str(), expected);
        assert_eq!(kind.to_string(), expected);
    }

    #[test]
    fn instance_is_space_scoped() {
        let instance = ServiceInstance::new("si-1", "my-db", "space-1");
        let actee = Actee::service_instance(&instance);

        assert_eq!(actee.id, "si-1");
        assert_eq!(actee.name, "my-db");
        assert_eq!(actee.kind, EntityKind::ServiceInstance);
        assert_eq!(actee.space.as_deref(), Some("space-1"));
    }

    #[test]
    fn binding_has_placeholder_name() {
        let binding = ServiceBinding {
            guid: "sb-1".to_string(),
            service_instance_guid: "si-1".to_string(),
            app_guid: "app-1".to_string(),
            space_guid: "space-1".to_string(),
        };
        let actee = Actee::service_binding(&binding);

        assert_eq!(actee.name, "N/A");
        assert_eq!(actee.space.as_deref(), Some("space-1"));
    }

    #[test]
    fn broker_is_unscoped() {
        let actee = Actee::broker(&ServiceBroker::new("b-1", "mysql"));
        assert_eq!(actee.id, "b-1");
        assert_eq!(actee.name, "mysql");
        assert!(actee.space.is_none());
    }

    #[test]
    fn dashboard_client_uses_id_for_name() {
        let attrs = json!({"id": "client-1", "secret": "s"});
        let attrs = attrs.as_object().expect("object");
        let actee = Actee::dashboard_client(attrs).expect("has id");

        assert_eq!(actee.id, "client-1");
        assert_eq!(actee.name, "client-1");
        assert!(actee.space.is_none());
    }

    #[test_case(json!({"id": 42}), "42" ; "numeric id")]
    #[test_case(json!({"id": true}), "true" ; "boolean id")]
    #[test_case(json!({"id": "c-9"}), "c-9" ; "string id")]
    fn dashboard_client_scalar_ids(attrs: Value, expected: &str) {
        let attrs = attrs.as_object().expect("object");
        let actee = Actee::dashboard_client(attrs).expect("has id");
        assert_eq!(actee.id, expected);
        assert_eq!(actee.name, expected);
    }

    #[test_case(json!({}) ; "absent")]
    #[test_case(json!({"id": null}) ; "null")]
    #[test_case(json!({"id": ["a"]}) ; "array")]
    #[test_case(json!({"id": {"nested": 1}}) ; "object")]
    fn dashboard_client_without_id_is_rejected(attrs: Value) {
        let attrs = attrs.as_object().expect("object");
        assert!(matches!(
            Actee::dashboard_client(attrs),
            Err(AuditError::MissingField("id"))
        ));
    }
}
