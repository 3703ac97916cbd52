//! # mkt-audit
//!
//! Audit event recording for service marketplace resources.
//!
//! Every mutation of a service, plan, broker, instance, binding or dashboard
//! client is recorded as one [`AuditEvent`]: who did it, to what, when, and
//! what changed. Credentials are redacted before the record is written.
//!
//! ## Features
//!
//! - [`EventRepository`] — One recording operation per entity and action
//! - [`EventStore`] — Pluggable persistence, with [`MemoryEventStore`]
//! - [`Tracked`] — Change tracking for catalog diffs
//! - [`AuditLogger`] — Structured logging of persisted events via `tracing`
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use mkt_audit::{
//!     EventRepository, MemoryEventStore, Service, ServiceBroker, StaticSecurityContext, Tracked,
//! };
//!
//! let store = Arc::new(MemoryEventStore::new());
//! let context = Arc::new(StaticSecurityContext::signed_in("user-1", "dev@example.com"));
//! let repo = EventRepository::new(store.clone(), context);
//!
//! let broker = ServiceBroker::new("broker-1", "mysql-broker");
//! let mut service = Tracked::new(Service::new(&broker, "mysql-uid", "mysql"));
//!
//! let result = repo.record_service_catalog_change(&mut service, |service| {
//!     service.entity_mut().guid = Some("service-1".to_string());
//!     service.mark_saved()
//! });
//!
//! assert!(result.is_ok());
//! assert_eq!(store.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actee;
pub mod actor;
pub mod clock;
pub mod config;
pub mod entities;
pub mod error;
pub mod event;
pub mod logger;
pub mod metadata;
pub mod repository;
pub mod store;
pub mod tracking;

// Re-export main types
pub use actee::{Actee, EntityKind};
pub use actor::{Actor, ActorType, SecurityContext, StaticSecurityContext};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AuditConfig;
pub use entities::{
    CatalogEntity, Service, ServiceBinding, ServiceBroker, ServiceInstance, ServicePlan,
};
pub use error::{AuditError, BoxError, Result};
pub use event::{AuditEvent, EventType, SpaceScope};
pub use logger::{AuditLogger, NoopAuditLogger, TracingAuditLogger};
pub use metadata::EventMetadata;
pub use repository::EventRepository;
pub use store::{EventStore, MemoryEventStore};
pub use tracking::{ChangeTracked, FieldMap, Tracked};
