//! Virtual lights — answer `light.turn_on` and `light.turn_off`.

use std::sync::Weak;

use async_trait::async_trait;

use lightpresets_app::ports::ServiceHandler;
use lightpresets_domain::error::{PresetsError, ValidationError};
use lightpresets_domain::service::{ENTITY_ID, ServiceCall};
use lightpresets_domain::state::{STATE_OFF, STATE_ON};

use crate::InMemoryHost;

/// What a virtual light service does to its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Power {
    On,
    Off,
}

/// A light service that records the resulting state on the host.
pub struct VirtualLightService {
    host: Weak<InMemoryHost>,
    power: Power,
}

impl VirtualLightService {
    #[must_use]
    pub fn new(host: Weak<InMemoryHost>, power: Power) -> Self {
        Self { host, power }
    }
}

#[async_trait]
impl ServiceHandler for VirtualLightService {
    async fn handle(&self, call: ServiceCall) -> Result<(), PresetsError> {
        let Some(host) = self.host.upgrade() else {
            return Ok(());
        };
        let target = call
            .target()
            .ok_or(ValidationError::MissingField(ENTITY_ID))?;

        let mut attributes = call.data.clone();
        attributes.remove(ENTITY_ID);

        for light in target.ids() {
            match self.power {
                Power::On => {
                    tracing::info!(light = %light, ?attributes, "virtual light on");
                    host.set_light_attributes(light, Some(attributes.clone()));
                    host.set_state(light, STATE_ON).await?;
                }
                Power::Off => {
                    tracing::info!(light = %light, "virtual light off");
                    host.set_light_attributes(light, None);
                    host.set_state(light, STATE_OFF).await?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lightpresets_app::ports::HostAdapter;
    use lightpresets_domain::attribute::Attributes;
    use lightpresets_domain::service::EntityTarget;
    use serde_json::json;

    async fn host() -> Arc<InMemoryHost> {
        let host = Arc::new(InMemoryHost::default());
        host.install_virtual_lights().await.unwrap();
        host
    }

    async fn value(host: &InMemoryHost, light: &str) -> Option<String> {
        host.get_state(light).await.unwrap().map(|state| state.value)
    }

    #[tokio::test]
    async fn should_turn_light_on_and_keep_attributes() {
        let host = host().await;
        let mut attrs = Attributes::new();
        attrs.insert("brightness".to_string(), json!(120));

        host.call_service(ServiceCall::light_turn_on("light.a", attrs.clone()))
            .await
            .unwrap();

        assert_eq!(value(&host, "light.a").await.as_deref(), Some("on"));
        assert_eq!(host.light_attributes("light.a"), Some(attrs));
    }

    #[tokio::test]
    async fn should_turn_every_listed_light_off() {
        let host = host().await;
        host.call_service(ServiceCall::light_turn_on("light.a", Attributes::new()))
            .await
            .unwrap();

        host.call_service(ServiceCall::light_turn_off(EntityTarget::Many(vec![
            "light.a".to_string(),
            "light.b".to_string(),
        ])))
        .await
        .unwrap();

        assert_eq!(value(&host, "light.a").await.as_deref(), Some("off"));
        assert_eq!(value(&host, "light.b").await.as_deref(), Some("off"));
        assert!(host.light_attributes("light.a").is_none());
    }

    #[tokio::test]
    async fn should_reject_call_without_target() {
        let host = host().await;
        let call = ServiceCall::new("light", "turn_on", Attributes::new());

        let result = host.call_service(call).await;

        assert!(matches!(
            result,
            Err(PresetsError::Validation(ValidationError::MissingField(
                ENTITY_ID
            )))
        ));
    }
}
