//! Actor attribution.
//!
//! An actor is either the signed-in user taken from a [`SecurityContext`]
//! or a service broker acting on its own behalf.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entities::ServiceBroker;
use crate::error::{AuditError, Result};

/// Source of the identity of the user performing a request.
pub trait SecurityContext: Send + Sync {
    /// Identifier of the signed-in user, if any.
    fn current_user_id(&self) -> Option<String>;

    /// Email of the signed-in user, if known.
    fn current_user_email(&self) -> Option<String>;
}

/// A security context with fixed contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSecurityContext {
    user_id: Option<String>,
    email: Option<String>,
}

impl StaticSecurityContext {
    /// A context with no signed-in user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context for a signed-in user.
    #[must_use]
    pub fn signed_in(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: Some(email.into()),
        }
    }

    /// A context for a signed-in user without a known email.
    #[must_use]
    pub fn without_email(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            email: None,
        }
    }
}

impl SecurityContext for StaticSecurityContext {
    fn current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn current_user_email(&self) -> Option<String> {
        self.email.clone()
    }
}

/// Kind of identity credited with an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// An authenticated user.
    User,
    /// A service broker acting on its own behalf.
    ServiceBroker,
}

impl ActorType {
    /// Returns the string representation of this actor type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::ServiceBroker => "service_broker",
        }
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who performed an audited action.
///
/// The name is captured at the time of the action and never re-resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Kind of actor.
    pub actor_type: ActorType,
    /// Stable identifier of the actor.
    #[serde(rename = "actor")]
    pub id: String,
    /// Email or name of the actor.
    #[serde(rename = "actor_name")]
    pub name: String,
}

impl Actor {
    /// Attributes an action to the signed-in user.
    ///
    /// A user without a recorded email gets an empty name.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Unauthenticated`] if the context has no user.
    pub fn user(context: &dyn SecurityContext) -> Result<Self> {
        let id = context
            .current_user_id()
            .ok_or(AuditError::Unauthenticated)?;
        Ok(Self {
            actor_type: ActorType::User,
            id,
            name: context.current_user_email().unwrap_or_default(),
        })
    }

    /// Attributes an action to a service broker.
    #[must_use]
    pub fn broker(broker: &ServiceBroker) -> Self {
        Self {
            actor_type: ActorType::ServiceBroker,
            id: broker.guid.clone(),
            name: broker.name.clone(),
        }
    }
}
