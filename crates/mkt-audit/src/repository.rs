//! Recording operations.
//!
//! [`EventRepository`] offers one operation per entity and action. Each
//! resolves an actor, classifies the actee, builds metadata and hands the
//! assembled event to the [`EventStore`]. Failures are returned to the
//! caller unchanged and nothing is retried.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::actee::{Actee, EntityKind};
use crate::actor::{Actor, SecurityContext};
use crate::clock::{Clock, SystemClock};
use crate::config::AuditConfig;
use crate::entities::{
    CatalogEntity, Service, ServiceBinding, ServiceBroker, ServiceInstance, ServicePlan,
};
use crate::error::{AuditError, BoxError, Result};
use crate::event::{AuditEvent, EventType};
use crate::logger::{AuditLogger, TracingAuditLogger};
use crate::metadata::EventMetadata;
use crate::store::EventStore;
use crate::tracking::{ChangeTracked, FieldMap, Tracked};

/// Records audit events for marketplace mutations.
pub struct EventRepository {
    store: Arc<dyn EventStore>,
    context: Arc<dyn SecurityContext>,
    clock: Arc<dyn Clock>,
    /// Set through [`EventRepository::with_logger`]; survives `with_config`.
    logger: Option<Arc<dyn AuditLogger>>,
    default_logger: TracingAuditLogger,
    config: AuditConfig,
}

impl EventRepository {
    /// Creates a repository with the system clock, the tracing logger and
    /// default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>, context: Arc<dyn SecurityContext>) -> Self {
        let config = AuditConfig::default();
        Self {
            store,
            context,
            clock: Arc::new(SystemClock),
            logger: None,
            default_logger: TracingAuditLogger::with_prefix(config.log_prefix.clone()),
            config,
        }
    }

    /// Replaces the clock used for event timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the logger that sees persisted events.
    ///
    /// The logger is kept across later [`with_config`](Self::with_config)
    /// calls, which only decide whether it runs.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn AuditLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Applies a configuration.
    ///
    /// `log_events` gates whichever logger is active. `log_prefix` applies to
    /// the default tracing logger only.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_config(mut self, config: AuditConfig) -> Result<Self> {
        config.validate()?;
        self.default_logger = TracingAuditLogger::with_prefix(config.log_prefix.clone());
        self.config = config;
        Ok(self)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Saves a service replayed from a broker catalog and records
    /// `audit.service.create` or `audit.service.update`.
    ///
    /// Returns whatever `save` returns.
    ///
    /// # Errors
    ///
    /// Fails if `save` fails (no event is written), if the service still
    /// has no guid afterwards, or if the event cannot be persisted.
    pub fn record_service_catalog_change<F, T, E>(
        &self,
        service: &mut Tracked<Service>,
        save: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut Tracked<Service>) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.with_audit_event(service, save)
    }

    /// Saves a plan replayed from a broker catalog and records
    /// `audit.service_plan.create` or `audit.service_plan.update`.
    ///
    /// # Errors
    ///
    /// Same as [`record_service_catalog_change`](Self::record_service_catalog_change).
    pub fn record_service_plan_catalog_change<F, T, E>(
        &self,
        plan: &mut Tracked<ServicePlan>,
        save: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut Tracked<ServicePlan>) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.with_audit_event(plan, save)
    }

    /// Records a user action on a service instance, echoing the request.
    ///
    /// # Errors
    ///
    /// Fails if no user is signed in or the event cannot be persisted.
    pub fn record_service_instance_event(
        &self,
        event_type: impl Into<EventType>,
        instance: &ServiceInstance,
        request_params: FieldMap,
    ) -> Result<AuditEvent> {
        let actor = Actor::user(self.context.as_ref())?;
        self.assemble_and_persist(
            event_type.into(),
            actor,
            Actee::service_instance(instance),
            EventMetadata::request(request_params),
        )
    }

    /// Records a broker-initiated event on a service.
    ///
    /// # Errors
    ///
    /// Fails if the service has no guid or the event cannot be persisted.
    pub fn record_service_event(
        &self,
        event_type: impl Into<EventType>,
        service: &Service,
    ) -> Result<AuditEvent> {
        let actee = Actee::unscoped(EntityKind::Service, saved_guid(service)?, &service.label);
        self.assemble_and_persist(
            event_type.into(),
            Actor::broker(service.service_broker()),
            actee,
            EventMetadata::Empty,
        )
    }

    /// Records `audit.service_plan.delete`, credited to the plan's broker.
    ///
    /// # Errors
    ///
    /// Fails if the plan has no guid or the event cannot be persisted.
    pub fn record_service_plan_delete_event(&self, plan: &ServicePlan) -> Result<AuditEvent> {
        let actee = Actee::unscoped(EntityKind::ServicePlan, saved_guid(plan)?, &plan.name);
        self.assemble_and_persist(
            EventType::new(EntityKind::ServicePlan, "delete"),
            Actor::broker(plan.service_broker()),
            actee,
            EventMetadata::Empty,
        )
    }

    /// Records `audit.service.delete` for a purge by the signed-in user.
    ///
    /// # Errors
    ///
    /// Fails if no user is signed in, the service has no guid, or the
    /// event cannot be persisted.
    pub fn record_service_purge_event(&self, service: &Service) -> Result<AuditEvent> {
        let actor = Actor::user(self.context.as_ref())?;
        let actee = Actee::unscoped(EntityKind::Service, saved_guid(service)?, &service.label);
        self.assemble_and_persist(
            EventType::new(EntityKind::Service, "delete"),
            actor,
            actee,
            EventMetadata::Purge,
        )
    }

    /// Records a user action on a broker. Credentials are redacted.
    ///
    /// # Errors
    ///
    /// Fails if no user is signed in or the event cannot be persisted.
    pub fn record_broker_event(
        &self,
        event_type: impl Into<EventType>,
        broker: &ServiceBroker,
        request_params: &FieldMap,
    ) -> Result<AuditEvent> {
        let actor = Actor::user(self.context.as_ref())?;
        self.assemble_and_persist(
            event_type.into(),
            actor,
            Actee::broker(broker),
            EventMetadata::broker_request(request_params),
        )
    }

    /// Records a user action on a service binding.
    ///
    /// # Errors
    ///
    /// Fails if no user is signed in or the event cannot be persisted.
    pub fn record_service_binding_event(
        &self,
        event_type: impl Into<EventType>,
        binding: &ServiceBinding,
    ) -> Result<AuditEvent> {
        let actor = Actor::user(self.context.as_ref())?;
        let mut request = FieldMap::new();
        request.insert(
            "service_instance_guid".to_string(),
            Value::String(binding.service_instance_guid.clone()),
        );
        request.insert(
            "app_guid".to_string(),
            Value::String(binding.app_guid.clone()),
        );
        self.assemble_and_persist(
            event_type.into(),
            actor,
            Actee::service_binding(binding),
            EventMetadata::request(request),
        )
    }

    /// Records a change to a broker's dashboard client. The client secret is
    /// always written as the redaction marker.
    ///
    /// # Errors
    ///
    /// Fails if `client_attrs` has no `id` or the event cannot be persisted.
    pub fn record_dashboard_client_event(
        &self,
        event_type: impl Into<EventType>,
        broker: &ServiceBroker,
        client_attrs: &FieldMap,
    ) -> Result<AuditEvent> {
        let actee = Actee::dashboard_client(client_attrs)?;
        self.assemble_and_persist(
            event_type.into(),
            Actor::broker(broker),
            actee,
            EventMetadata::dashboard_client(client_attrs),
        )
    }

    /// Assembles an event stamped with the current time and writes it.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Store`] with the store's own error if the write
    /// is rejected.
    pub fn assemble_and_persist(
        &self,
        event_type: EventType,
        actor: Actor,
        actee: Actee,
        metadata: EventMetadata,
    ) -> Result<AuditEvent> {
        let metadata = metadata.into_map(&self.config);
        let event = AuditEvent::assemble(event_type, self.clock.now(), actor, actee, metadata);
        let record = event.to_record()?;

        if let Err(error) = self.store.create_record(record) {
            warn!(
                event_type = %event.event_type(),
                actee = %event.actee(),
                error = %error,
                "failed to persist audit event"
            );
            return Err(AuditError::Store(error));
        }

        self.log_persisted(&event);
        Ok(event)
    }

    fn log_persisted(&self, event: &AuditEvent) {
        if !self.config.log_events {
            return;
        }
        match &self.logger {
            Some(logger) => logger.log(event),
            None => self.default_logger.log(event),
        }
    }

    /// Diff before `save`, read the guid after it.
    fn with_audit_event<M, F, T, E>(&self, object: &mut Tracked<M>, save: F) -> Result<T>
    where
        M: CatalogEntity,
        F: FnOnce(&mut Tracked<M>) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let kind = M::KIND;
        let event_type = EventType::for_catalog_change(kind, object.is_new());
        let name = object.display_name().to_string();
        let actor = Actor::broker(CatalogEntity::service_broker(&**object));
        let metadata = EventMetadata::catalog_diff(&*object)?;

        debug!(%event_type, actee_name = %name, "recording catalog change");

        let result = save(&mut *object).map_err(|error| AuditError::Mutation(error.into()))?;

        let actee = Actee::unscoped(kind, saved_guid(&**object)?, name);
        self.assemble_and_persist(event_type, actor, actee, metadata)?;
        Ok(result)
    }
}

fn saved_guid<E: CatalogEntity>(entity: &E) -> Result<String> {
    entity
        .guid()
        .map(str::to_string)
        .ok_or(AuditError::MissingField("guid"))
}

impl std::fmt::Debug for EventRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRepository")
            .field("config", &self.config)
            .field("custom_logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}
