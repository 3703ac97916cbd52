//! Marketplace entities that audit events are recorded against.
//!
//! These are plain data carriers. Persistence, validation and guid
//! assignment belong to the caller; the audit engine only reads them.

use serde::{Deserialize, Serialize};

use crate::actee::EntityKind;

/// A registered service broker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBroker {
    /// Stable identifier.
    pub guid: String,
    /// Display name.
    pub name: String,
    /// Endpoint the broker is reached at.
    pub broker_url: String,
    /// Basic-auth user for the broker endpoint.
    pub auth_username: Option<String>,
}

impl ServiceBroker {
    /// Creates a broker with the given identity and no endpoint details.
    #[must_use]
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A service offered by a broker's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Service {
    /// Assigned on first save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Display name.
    pub label: String,
    /// Identifier the broker uses for this service.
    pub unique_id: String,
    /// Human-readable description.
    pub description: String,
    /// Whether instances can be bound to apps.
    pub bindable: bool,
    /// Whether the service is offered for new instances.
    pub active: bool,
    /// Whether instances may switch plans.
    pub plan_updateable: bool,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Opaque broker-supplied JSON.
    pub extra: Option<String>,
    /// Owning broker.
    pub service_broker_guid: String,
    #[serde(skip)]
    broker: ServiceBroker,
}

impl Service {
    /// Creates an unsaved service owned by `broker`.
    #[must_use]
    pub fn new(
        broker: &ServiceBroker,
        unique_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            guid: None,
            label: label.into(),
            unique_id: unique_id.into(),
            description: String::new(),
            bindable: true,
            active: true,
            plan_updateable: false,
            tags: Vec::new(),
            extra: None,
            service_broker_guid: broker.guid.clone(),
            broker: broker.clone(),
        }
    }

    /// The broker that offers this service.
    #[must_use]
    pub fn service_broker(&self) -> &ServiceBroker {
        &self.broker
    }
}

/// A plan of a catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePlan {
    /// Assigned on first save.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// Display name.
    pub name: String,
    /// Identifier the broker uses for this plan.
    pub unique_id: String,
    /// Human-readable description.
    pub description: String,
    /// Whether the plan is free of charge.
    pub free: bool,
    /// Whether the plan is visible to every organization.
    pub public: bool,
    /// Whether the plan is offered for new instances.
    pub active: bool,
    /// Owning service.
    pub service_guid: String,
    #[serde(skip)]
    broker: ServiceBroker,
}

impl ServicePlan {
    /// Creates an unsaved plan of `service`.
    #[must_use]
    pub fn new(service: &Service, unique_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: None,
            name: name.into(),
            unique_id: unique_id.into(),
            description: String::new(),
            free: true,
            public: true,
            active: true,
            service_guid: service.guid.clone().unwrap_or_default(),
            broker: service.service_broker().clone(),
        }
    }

    /// The broker that offers this plan's service.
    #[must_use]
    pub fn service_broker(&self) -> &ServiceBroker {
        &self.broker
    }
}

/// A provisioned instance of a service plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Stable identifier.
    pub guid: String,
    /// Display name.
    pub name: String,
    /// Owning space.
    pub space_guid: String,
}

impl ServiceInstance {
    /// Creates an instance record.
    #[must_use]
    pub fn new(
        guid: impl Into<String>,
        name: impl Into<String>,
        space_guid: impl Into<String>,
    ) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            space_guid: space_guid.into(),
        }
    }
}

/// A binding between a service instance and an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBinding {
    /// Stable identifier.
    pub guid: String,
    /// Bound instance.
    pub service_instance_guid: String,
    /// Bound app.
    pub app_guid: String,
    /// Space the binding lives in.
    pub space_guid: String,
}

/// Entities whose changes are replayed from a broker catalog.
pub trait CatalogEntity: Serialize {
    /// Kind recorded as the actee type.
    const KIND: EntityKind;

    /// Identifier, once assigned.
    fn guid(&self) -> Option<&str>;

    /// Name recorded as the actee name.
    fn display_name(&self) -> &str;

    /// Broker credited with the change.
    fn service_broker(&self) -> &ServiceBroker;
}

impl CatalogEntity for Service {
    const KIND: EntityKind = EntityKind::Service;

    fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    fn display_name(&self) -> &str {
        &self.label
    }

    fn service_broker(&self) -> &ServiceBroker {
        &self.broker
    }
}

impl CatalogEntity for ServicePlan {
    const KIND: EntityKind = EntityKind::ServicePlan;

    fn guid(&self) -> Option<&str> {
        self.guid.as_deref()
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn service_broker(&self) -> &ServiceBroker {
        &self.broker
    }
}
