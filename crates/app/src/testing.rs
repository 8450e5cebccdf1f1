//! Test doubles shared by the unit tests of this crate.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use lightpresets_domain::attribute::Attributes;
use lightpresets_domain::error::PresetsError;
use lightpresets_domain::event::HostEvent;
use lightpresets_domain::group::GroupDefinition;
use lightpresets_domain::preset::PresetSpec;
use lightpresets_domain::registry::GroupRegistry;
use lightpresets_domain::service::ServiceCall;
use lightpresets_domain::state::StateSnapshot;

use crate::ports::{HostAdapter, ServiceHandler};

// ── Recording host ─────────────────────────────────────────────

/// Host that records every dispatched call and forwards it to a
/// registered handler when there is one.
pub struct FakeHost {
    states: Mutex<HashMap<String, StateSnapshot>>,
    services: Mutex<HashMap<(String, String), Arc<dyn ServiceHandler>>>,
    calls: Mutex<Vec<ServiceCall>>,
    sender: broadcast::Sender<HostEvent>,
}

impl Default for FakeHost {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            states: Mutex::new(HashMap::new()),
            services: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            sender,
        }
    }
}

impl FakeHost {
    pub fn with_states(states: &[(&str, &str)]) -> Self {
        let host = Self::default();
        for (entity_id, value) in states {
            host.set_state(entity_id, value);
        }
        host
    }

    pub fn set_state(&self, entity_id: &str, value: &str) {
        self.states.lock().unwrap().insert(
            entity_id.to_string(),
            StateSnapshot::new(entity_id, value),
        );
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl HostAdapter for FakeHost {
    async fn get_state(&self, entity_id: &str) -> Result<Option<StateSnapshot>, PresetsError> {
        Ok(self.states.lock().unwrap().get(entity_id).cloned())
    }

    async fn call_service(&self, call: ServiceCall) -> Result<(), PresetsError> {
        self.calls.lock().unwrap().push(call.clone());
        let handler = self.service_handler(&call.domain, &call.service);
        match handler {
            Some(handler) => handler.handle(call).await,
            None => Ok(()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<HostEvent> {
        self.sender.subscribe()
    }

    fn service_handler(&self, domain: &str, service: &str) -> Option<Arc<dyn ServiceHandler>> {
        self.services
            .lock()
            .unwrap()
            .get(&(domain.to_string(), service.to_string()))
            .cloned()
    }

    fn remove_service(&self, domain: &str, service: &str) -> Option<Arc<dyn ServiceHandler>> {
        self.services
            .lock()
            .unwrap()
            .remove(&(domain.to_string(), service.to_string()))
    }

    async fn register_service(
        &self,
        domain: &str,
        service: &str,
        handler: Arc<dyn ServiceHandler>,
    ) -> Result<(), PresetsError> {
        self.services
            .lock()
            .unwrap()
            .insert((domain.to_string(), service.to_string()), handler);
        let _ = self
            .sender
            .send(HostEvent::service_registered(domain, service));
        Ok(())
    }
}

// ── Recording handler ──────────────────────────────────────────

/// Handler that remembers every call it receives.
#[derive(Default)]
pub struct RecordingHandler {
    received: Mutex<Vec<ServiceCall>>,
}

impl RecordingHandler {
    pub fn received(&self) -> Vec<ServiceCall> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceHandler for RecordingHandler {
    async fn handle(&self, call: ServiceCall) -> Result<(), PresetsError> {
        self.received.lock().unwrap().push(call);
        Ok(())
    }
}

// ── Helpers ────────────────────────────────────────────────────

pub const SELECTOR: &str = "input_select.living_preset";

pub fn attrs(value: serde_json::Value) -> Attributes {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

pub fn preset(value: serde_json::Value) -> PresetSpec {
    serde_json::from_value(value).unwrap()
}

/// `living` with lights `light.a` and `light.b` and the given presets.
pub fn living(presets: &[(&str, PresetSpec)]) -> GroupDefinition {
    presets
        .iter()
        .fold(
            GroupDefinition::builder()
                .id("living")
                .preset_selector(SELECTOR)
                .lights(["light.a", "light.b"]),
            |builder, (name, spec)| builder.preset(name, spec.clone()),
        )
        .build()
        .unwrap()
}

pub fn registry(groups: Vec<GroupDefinition>) -> Arc<GroupRegistry> {
    Arc::new(GroupRegistry::new(groups).unwrap())
}

/// Entity ids targeted by each recorded call, with the service name.
pub fn summary(calls: &[ServiceCall]) -> Vec<(String, serde_json::Value)> {
    calls
        .iter()
        .map(|call| (call.service.clone(), call.data["entity_id"].clone()))
        .collect()
}

// ── Failing handler ────────────────────────────────────────────

/// Handler that fails every call targeting one light.
pub struct FailingHandler {
    light_id: String,
}

impl FailingHandler {
    pub fn for_light(light_id: &str) -> Self {
        Self {
            light_id: light_id.to_string(),
        }
    }
}

#[async_trait]
impl ServiceHandler for FailingHandler {
    async fn handle(&self, call: ServiceCall) -> Result<(), PresetsError> {
        if call.first_entity_id().as_deref() == Some(self.light_id.as_str()) {
            return Err(PresetsError::Host("light unreachable".into()));
        }
        Ok(())
    }
}
