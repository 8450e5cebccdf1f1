//! Event bus port — publish host events to interested subscribers.

use std::future::Future;

use lightpresets_domain::error::PresetsError;
use lightpresets_domain::event::HostEvent;

/// Publishes host events to all subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: HostEvent) -> impl Future<Output = Result<(), PresetsError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: HostEvent) -> impl Future<Output = Result<(), PresetsError>> + Send {
        (**self).publish(event)
    }
}
