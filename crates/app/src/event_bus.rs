//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use lightpresets_domain::error::PresetsError;
use lightpresets_domain::event::HostEvent;

use crate::ports::EventPublisher;

/// Host event fan-out over a tokio [`broadcast`] channel.
///
/// Each subscriber sees events published after it subscribed. An event
/// published with no subscriber is lost.
pub struct InProcessEventBus {
    sender: broadcast::Sender<HostEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: HostEvent) -> impl Future<Output = Result<(), PresetsError>> + Send {
        match self.sender.send(event) {
            Ok(receivers) => tracing::trace!(receivers, "host event published"),
            // No subscriber yet: the event is dropped.
            Err(broadcast::error::SendError(event)) => {
                tracing::trace!(%event, "host event dropped");
            }
        }
        async { Ok(()) }
    }
}
