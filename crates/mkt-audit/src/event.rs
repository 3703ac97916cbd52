//! The persisted audit record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::actee::{Actee, EntityKind};
use crate::actor::{Actor, ActorType};
use crate::error::{AuditError, Result};
use crate::tracking::{FieldMap, field_map};

/// Dot-namespaced event type, `audit.<kind>.<action>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(String);

impl EventType {
    /// Builds `audit.<kind>.<action>`.
    #[must_use]
    pub fn new(kind: EntityKind, action: &str) -> Self {
        Self(format!("audit.{kind}.{action}"))
    }

    /// `create` for a never-saved entity, `update` otherwise.
    #[must_use]
    pub fn for_catalog_change(kind: EntityKind, is_new: bool) -> Self {
        Self::new(kind, if is_new { "create" } else { "update" })
    }

    /// Returns the type as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Space placement of the actee.
///
/// Unscoped actees are written with empty `space_guid` and
/// `organization_guid` rather than with the fields left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpaceScope {
    /// The actee belongs to a space.
    Space {
        /// Owning space.
        space: String,
    },
    /// The actee belongs to no space.
    Unscoped {
        /// Always empty.
        space_guid: String,
        /// Always empty.
        organization_guid: String,
    },
}

impl SpaceScope {
    /// Scope for an optional owning space.
    #[must_use]
    pub fn from_space(space: Option<String>) -> Self {
        match space {
            Some(space) => Self::Space { space },
            None => Self::Unscoped {
                space_guid: String::new(),
                organization_guid: String::new(),
            },
        }
    }

    /// The owning space, if any.
    #[must_use]
    pub fn space(&self) -> Option<&str> {
        match self {
            Self::Space { space } => Some(space),
            Self::Unscoped { .. } => None,
        }
    }
}

/// An assembled audit event.
///
/// Fields are read-only once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    guid: Uuid,
    #[serde(rename = "type")]
    event_type: EventType,
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    actor: Actor,
    actee: String,
    actee_type: EntityKind,
    actee_name: String,
    #[serde(flatten)]
    scope: SpaceScope,
    metadata: FieldMap,
}

impl AuditEvent {
    /// Assembles an event from its parts.
    #[must_use]
    pub fn assemble(
        event_type: EventType,
        timestamp: DateTime<Utc>,
        actor: Actor,
        actee: Actee,
        metadata: FieldMap,
    ) -> Self {
        Self {
            guid: Uuid::new_v4(),
            event_type,
            timestamp,
            actor,
            actee: actee.id,
            actee_type: actee.kind,
            actee_name: actee.name,
            scope: SpaceScope::from_space(actee.space),
            metadata,
        }
    }

    /// Unique identifier of this record.
    #[must_use]
    pub const fn guid(&self) -> Uuid {
        self.guid
    }

    /// The event type.
    #[must_use]
    pub const fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// When the event was assembled.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Who performed the action.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Kind of actor.
    #[must_use]
    pub const fn actor_type(&self) -> ActorType {
        self.actor.actor_type
    }

    /// Identifier of the target entity.
    #[must_use]
    pub fn actee(&self) -> &str {
        &self.actee
    }

    /// Kind of the target entity.
    #[must_use]
    pub const fn actee_type(&self) -> EntityKind {
        self.actee_type
    }

    /// Name of the target entity.
    #[must_use]
    pub fn actee_name(&self) -> &str {
        &self.actee_name
    }

    /// Space placement.
    #[must_use]
    pub const fn scope(&self) -> &SpaceScope {
        &self.scope
    }

    /// The metadata mapping.
    #[must_use]
    pub const fn metadata(&self) -> &FieldMap {
        &self.metadata
    }

    /// Converts the event to the field map handed to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_record(&self) -> Result<FieldMap> {
        field_map(self)
    }

    /// Serializes the event to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(AuditError::from)
    }
}
