//! Host port — everything the hub needs from the home-automation host.
//!
//! The host owns the state store, the service registry and the event bus.
//! The reaction engine only ever talks to it through [`HostAdapter`], so
//! tests can substitute a fake.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use lightpresets_domain::error::PresetsError;
use lightpresets_domain::event::HostEvent;
use lightpresets_domain::service::ServiceCall;
use lightpresets_domain::state::StateSnapshot;

/// A callable host service such as `light.turn_on`.
///
/// Handlers are swapped at runtime, so they are stored as
/// `Arc<dyn ServiceHandler>`.
#[async_trait]
pub trait ServiceHandler: Send + Sync {
    /// Run the service for `call`.
    async fn handle(&self, call: ServiceCall) -> Result<(), PresetsError>;
}

/// State lookup, event subscription and service dispatch on the host.
pub trait HostAdapter: Send + Sync {
    /// Current state of `entity_id`, or `None` if it never reported one.
    fn get_state(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<StateSnapshot>, PresetsError>> + Send;

    /// Dispatch `call` to the handler registered for its domain and service.
    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), PresetsError>> + Send;

    /// Receive every event published after this call, in order.
    fn subscribe(&self) -> broadcast::Receiver<HostEvent>;

    /// The handler currently registered for `domain.service`.
    fn service_handler(&self, domain: &str, service: &str) -> Option<Arc<dyn ServiceHandler>>;

    /// Unregister `domain.service`, returning the removed handler.
    fn remove_service(&self, domain: &str, service: &str) -> Option<Arc<dyn ServiceHandler>>;

    /// Register `handler` for `domain.service` and announce it with a
    /// [`HostEvent::ServiceRegistered`].
    fn register_service(
        &self,
        domain: &str,
        service: &str,
        handler: Arc<dyn ServiceHandler>,
    ) -> impl Future<Output = Result<(), PresetsError>> + Send;
}

impl<T: HostAdapter> HostAdapter for Arc<T> {
    fn get_state(
        &self,
        entity_id: &str,
    ) -> impl Future<Output = Result<Option<StateSnapshot>, PresetsError>> + Send {
        (**self).get_state(entity_id)
    }

    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), PresetsError>> + Send {
        (**self).call_service(call)
    }

    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        (**self).subscribe()
    }

    fn service_handler(&self, domain: &str, service: &str) -> Option<Arc<dyn ServiceHandler>> {
        (**self).service_handler(domain, service)
    }

    fn remove_service(&self, domain: &str, service: &str) -> Option<Arc<dyn ServiceHandler>> {
        (**self).remove_service(domain, service)
    }

    fn register_service(
        &self,
        domain: &str,
        service: &str,
        handler: Arc<dyn ServiceHandler>,
    ) -> impl Future<Output = Result<(), PresetsError>> + Send {
        (**self).register_service(domain, service, handler)
    }
}
