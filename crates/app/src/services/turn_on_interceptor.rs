//! `light.turn_on` interceptor — fills in preset defaults for bare turn-ons.

use std::sync::{Arc, Weak};

use async_trait::async_trait;

use lightpresets_domain::error::PresetsError;
use lightpresets_domain::service::ServiceCall;

use crate::ports::{HostAdapter, ServiceHandler};
use crate::reaction_engine::ReactionEngine;

/// Replaces the host's `light.turn_on` and forwards every request to the
/// original handler, exactly once, after adding preset defaults.
pub struct TurnOnInterceptor<H> {
    engine: Weak<ReactionEngine<H>>,
    original: Arc<dyn ServiceHandler>,
}

impl<H> TurnOnInterceptor<H> {
    /// Wrap `original`, the handler that was registered before.
    pub fn new(engine: Weak<ReactionEngine<H>>, original: Arc<dyn ServiceHandler>) -> Self {
        Self { engine, original }
    }
}

#[async_trait]
impl<H> ServiceHandler for TurnOnInterceptor<H>
where
    H: HostAdapter + 'static,
{
    async fn handle(&self, call: ServiceCall) -> Result<(), PresetsError> {
        tracing::debug!(data = ?call.data, "intercepted light turn on");
        let call = match self.engine.upgrade() {
            Some(engine) => engine.apply_turn_on_defaults(call).await,
            None => call,
        };
        self.original.handle(call).await
    }
}
