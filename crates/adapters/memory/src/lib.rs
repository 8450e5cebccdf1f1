//! # lightpresets-adapter-memory
//!
//! In-memory host that stands in for a real home-automation hub.
//!
//! ## Provided pieces
//!
//! | Piece | Behaviour |
//! |-------|-----------|
//! | State store | `set_state` records a value and publishes `StateChanged` |
//! | Service registry | register / remove / dispatch, publishing `ServiceRegistered` |
//! | Virtual lights | `light.turn_on` / `light.turn_off` flip light states and keep their attributes |
//!
//! ## Dependency rule
//!
//! Depends on `lightpresets-app` (port traits) and `lightpresets-domain` only.

mod light;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use lightpresets_app::event_bus::InProcessEventBus;
use lightpresets_app::ports::{EventPublisher, HostAdapter, ServiceHandler};
use lightpresets_domain::attribute::Attributes;
use lightpresets_domain::error::{NotFoundError, PresetsError};
use lightpresets_domain::event::HostEvent;
use lightpresets_domain::service::{LIGHT_DOMAIN, ServiceCall, TURN_OFF, TURN_ON};
use lightpresets_domain::state::StateSnapshot;

pub use light::{Power, VirtualLightService};

/// Default capacity of the host event bus.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

type ServiceKey = (String, String);

/// Host keeping every state, service and light attribute in memory.
pub struct InMemoryHost {
    states: Mutex<HashMap<String, StateSnapshot>>,
    attributes: Mutex<HashMap<String, Attributes>>,
    services: Mutex<HashMap<ServiceKey, Arc<dyn ServiceHandler>>>,
    service_log: Mutex<Vec<ServiceCall>>,
    bus: InProcessEventBus,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl InMemoryHost {
    /// Create an empty host whose event bus holds `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            attributes: Mutex::new(HashMap::new()),
            services: Mutex::new(HashMap::new()),
            service_log: Mutex::new(Vec::new()),
            bus: InProcessEventBus::new(capacity),
        }
    }

    /// Register virtual `light.turn_on` and `light.turn_off` services that
    /// drive the light states of this host.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying registration.
    pub async fn install_virtual_lights(self: &Arc<Self>) -> Result<(), PresetsError> {
        for (service, power) in [(TURN_ON, Power::On), (TURN_OFF, Power::Off)] {
            let handler = VirtualLightService::new(Arc::downgrade(self), power);
            self.register_service(LIGHT_DOMAIN, service, Arc::new(handler))
                .await?;
        }
        Ok(())
    }

    /// Record `value` for `entity_id` and publish the change.
    ///
    /// # Errors
    ///
    /// Returns the event bus error, if any.
    pub async fn set_state(
        &self,
        entity_id: &str,
        value: impl Into<String>,
    ) -> Result<(), PresetsError> {
        let new = StateSnapshot::new(entity_id, value);
        let old = lock(&self.states).insert(entity_id.to_string(), new.clone());
        tracing::debug!(entity = %entity_id, value = %new.value, "state recorded");
        self.bus
            .publish(HostEvent::state_changed(entity_id, old, Some(new)))
            .await
    }

    /// Attributes last applied to `light_id` by `light.turn_on`.
    #[must_use]
    pub fn light_attributes(&self, light_id: &str) -> Option<Attributes> {
        lock(&self.attributes).get(light_id).cloned()
    }

    /// Every call dispatched so far, in order.
    #[must_use]
    pub fn service_log(&self) -> Vec<ServiceCall> {
        lock(&self.service_log).clone()
    }

    fn set_light_attributes(&self, light_id: &str, attributes: Option<Attributes>) {
        let mut store = lock(&self.attributes);
        match attributes {
            Some(attributes) => store.insert(light_id.to_string(), attributes),
            None => store.remove(light_id),
        };
    }
}

impl HostAdapter for InMemoryHost {
    async fn get_state(&self, entity_id: &str) -> Result<Option<StateSnapshot>, PresetsError> {
        Ok(lock(&self.states).get(entity_id).cloned())
    }

    async fn call_service(&self, call: ServiceCall) -> Result<(), PresetsError> {
        lock(&self.service_log).push(call.clone());
        let handler = self
            .service_handler(&call.domain, &call.service)
            .ok_or_else(|| NotFoundError {
                entity: "Service",
                id: call.to_string(),
            })?;
        handler.handle(call).await
    }

    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.bus.subscribe()
    }

    fn service_handler(&self, domain: &str, service: &str) -> Option<Arc<dyn ServiceHandler>> {
        lock(&self.services)
            .get(&(domain.to_string(), service.to_string()))
            .cloned()
    }

    fn remove_service(&self, domain: &str, service: &str) -> Option<Arc<dyn ServiceHandler>> {
        lock(&self.services).remove(&(domain.to_string(), service.to_string()))
    }

    async fn register_service(
        &self,
        domain: &str,
        service: &str,
        handler: Arc<dyn ServiceHandler>,
    ) -> Result<(), PresetsError> {
        lock(&self.services).insert((domain.to_string(), service.to_string()), handler);
        tracing::debug!(%domain, %service, "service registered");
        self.bus
            .publish(HostEvent::service_registered(domain, service))
            .await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
