//! Reaction engine — applies presets in response to commands and host events.
//!
//! The engine subscribes to the host's event bus and, for each incoming
//! event, decides which lights of which groups need a `light.turn_on` or
//! `light.turn_off`. It holds no state of its own beyond the read-only
//! registry and the "interceptor installed" flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use lightpresets_domain::attribute::{has_light_attributes, scale_brightness};
use lightpresets_domain::error::{NotFoundError, PresetsError};
use lightpresets_domain::event::HostEvent;
use lightpresets_domain::group::GroupDefinition;
use lightpresets_domain::policy::Policy;
use lightpresets_domain::registry::GroupRegistry;
use lightpresets_domain::service::{
    EntityTarget, GROUP_OFF, GROUP_ON, GROUP_TOGGLE, LIGHT_DOMAIN, PRESETS_DOMAIN, ServiceCall,
    TURN_ON,
};
use lightpresets_domain::state::StateSnapshot;

use crate::ports::HostAdapter;
use crate::resolver::{resolve_preset_value, settings_for_light, settings_for_preset};
use crate::services::group_commands::{GroupCommandKind, GroupCommandService};
use crate::services::turn_on_interceptor::TurnOnInterceptor;

/// Optional parameters of a group turn-on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TurnOnParams {
    /// Scale every light's preset brightness by this percentage.
    pub preset_brightness_pct: Option<f64>,
}

/// Reactive engine driving light groups from their preset selectors.
pub struct ReactionEngine<H> {
    registry: Arc<GroupRegistry>,
    host: H,
    override_installed: AtomicBool,
}

impl<H> ReactionEngine<H>
where
    H: HostAdapter + 'static,
{
    /// Create a new engine.
    pub fn new(registry: Arc<GroupRegistry>, host: H) -> Self {
        Self {
            registry,
            host,
            override_installed: AtomicBool::new(false),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether the `light.turn_on` interceptor is in place.
    pub fn is_override_installed(&self) -> bool {
        self.override_installed.load(Ordering::Acquire)
    }

    /// Register the group command services and, if the light service is
    /// already there, intercept `light.turn_on`.
    ///
    /// # Errors
    ///
    /// Returns the host error if a service cannot be registered.
    pub async fn setup(self: &Arc<Self>) -> Result<(), PresetsError> {
        for (service, kind) in [
            (GROUP_ON, GroupCommandKind::On),
            (GROUP_OFF, GroupCommandKind::Off),
            (GROUP_TOGGLE, GroupCommandKind::Toggle),
        ] {
            let handler = GroupCommandService::new(Arc::downgrade(self), kind);
            self.host
                .register_service(PRESETS_DOMAIN, service, Arc::new(handler))
                .await?;
        }

        if self.host.service_handler(LIGHT_DOMAIN, TURN_ON).is_some() {
            self.install_turn_on_override().await;
        }
        Ok(())
    }

    /// Consume `events` in order until the bus closes.
    pub async fn run(self: Arc<Self>, mut events: broadcast::Receiver<HostEvent>) {
        tracing::info!(groups = self.registry.len(), "reaction engine started");
        loop {
            match events.recv().await {
                Ok(event) => self.handle_event(&event).await,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event receiver lagged, events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::info!("reaction engine stopped");
    }

    /// React to a single host event. Failures are logged, never returned.
    pub async fn handle_event(self: &Arc<Self>, event: &HostEvent) {
        match event {
            HostEvent::StateChanged {
                entity_id,
                old_state,
                ..
            } => self.on_state_changed(entity_id, old_state.as_ref()).await,
            HostEvent::ServiceRegistered { domain, service } => {
                if domain == LIGHT_DOMAIN && service == TURN_ON {
                    self.install_turn_on_override().await;
                }
            }
        }
    }

    async fn on_state_changed(&self, entity_id: &str, old_state: Option<&StateSnapshot>) {
        // The first state ever recorded is not a change.
        if old_state.is_none() || !self.registry.is_preset_selector(entity_id) {
            return;
        }
        let groups = self.registry.find_by_preset_selector(entity_id);

        tracing::info!(selector = %entity_id, "preset changed");
        for group in groups {
            tracing::info!(group = %group.id(), "updating group");
            if let Err(err) = self.update_group(group).await {
                tracing::warn!(%err, group = %group.id(), "group update aborted");
            }
        }
    }

    /// Re-apply the active preset to every light of `group`.
    ///
    /// Lights that are on get the new attributes, or are turned off when
    /// their policy is `off`. Lights that are off are turned on when their
    /// policy is `on`, or `on_if_anything_on` while another light is on.
    ///
    /// # Errors
    ///
    /// Returns [`PresetsError::PresetUnavailable`] when the selector has no
    /// state, or the host error of the first failing call.
    pub async fn update_group(&self, group: &GroupDefinition) -> Result<(), PresetsError> {
        let preset_name = resolve_preset_value(&self.host, group).await?;
        let anything_on = self.is_anything_on(group).await?;

        for light in group.light_ids() {
            let settings = settings_for_preset(group, &preset_name, light);
            tracing::debug!(light = %light, policy = %settings.policy, "updating light");

            if self.is_light_on(light).await? {
                if settings.policy == Policy::Off {
                    self.host
                        .call_service(ServiceCall::light_turn_off(EntityTarget::One(
                            light.clone(),
                        )))
                        .await?;
                } else {
                    self.host
                        .call_service(ServiceCall::light_turn_on(light, settings.attributes))
                        .await?;
                }
            } else if settings.policy == Policy::On
                || (settings.policy == Policy::OnIfAnythingOn && anything_on)
            {
                self.host
                    .call_service(ServiceCall::light_turn_on(light, settings.attributes))
                    .await?;
            }
        }
        Ok(())
    }

    /// Turn on every light of the group whose policy is not `off`.
    ///
    /// # Errors
    ///
    /// Returns [`PresetsError::NotFound`] for an unknown group,
    /// [`PresetsError::PresetUnavailable`] when the selector has no state,
    /// or the host error of the first failing call.
    #[tracing::instrument(skip(self))]
    pub async fn turn_on(&self, group_name: &str, params: TurnOnParams) -> Result<(), PresetsError> {
        let group = self.group(group_name)?;
        let preset_name = resolve_preset_value(&self.host, group).await?;

        for light in group.light_ids() {
            let mut settings = settings_for_preset(group, &preset_name, light);
            if settings.policy == Policy::Off {
                continue;
            }
            if let Some(pct) = params.preset_brightness_pct {
                scale_brightness(&mut settings.attributes, pct);
            }
            self.host
                .call_service(ServiceCall::light_turn_on(light, settings.attributes))
                .await?;
        }
        Ok(())
    }

    /// Turn off every light of the group in one call.
    ///
    /// # Errors
    ///
    /// Returns [`PresetsError::NotFound`] for an unknown group, or the host
    /// error.
    #[tracing::instrument(skip(self))]
    pub async fn turn_off(&self, group_name: &str) -> Result<(), PresetsError> {
        let group = self.group(group_name)?;
        self.host
            .call_service(ServiceCall::light_turn_off(EntityTarget::Many(
                group.light_ids().to_vec(),
            )))
            .await
    }

    /// Turn the group off if any light is on, otherwise turn it on.
    ///
    /// # Errors
    ///
    /// Same as [`turn_on`](Self::turn_on) and [`turn_off`](Self::turn_off).
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, group_name: &str) -> Result<(), PresetsError> {
        let group = self.group(group_name)?;
        if self.is_anything_on(group).await? {
            self.turn_off(group_name).await
        } else {
            self.turn_on(group_name, TurnOnParams::default()).await
        }
    }

    /// Add the preset defaults of the light's group to a bare turn-on.
    ///
    /// Only the first targeted light is considered. Calls that already set
    /// a light attribute, or target a light outside every group, come back
    /// unchanged. Fields supplied by the caller always win.
    pub async fn apply_turn_on_defaults(&self, call: ServiceCall) -> ServiceCall {
        let Some(light) = call.first_entity_id() else {
            return call;
        };
        if has_light_attributes(&call.data) {
            return call;
        }
        let Some(group) = self.registry.find_by_member_light(&light) else {
            return call;
        };

        let settings = match settings_for_light(&self.host, group, &light).await {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(%err, light = %light, group = %group.id(), "no preset defaults applied");
                return call;
            }
        };
        tracing::debug!(light = %light, attributes = ?settings.attributes, "adding turn on defaults");

        let mut data = settings.attributes;
        for (key, value) in call.data {
            data.insert(key, value);
        }
        ServiceCall { data, ..call }
    }

    /// Replace `light.turn_on` with the preset-aware interceptor.
    ///
    /// Runs at most once per engine, however many times the light service
    /// is announced. Returns whether the interceptor was installed by this
    /// call.
    pub async fn install_turn_on_override(self: &Arc<Self>) -> bool {
        if self
            .override_installed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let Some(original) = self.host.service_handler(LIGHT_DOMAIN, TURN_ON) else {
            tracing::warn!("light service not found, not overriding");
            self.override_installed.store(false, Ordering::Release);
            return false;
        };

        self.host.remove_service(LIGHT_DOMAIN, TURN_ON);
        tracing::debug!("removed light service");

        let interceptor = TurnOnInterceptor::new(Arc::downgrade(self), Arc::clone(&original));
        if let Err(err) = self
            .host
            .register_service(LIGHT_DOMAIN, TURN_ON, Arc::new(interceptor))
            .await
        {
            tracing::error!(%err, "failed to register light service override, restoring original");
            if let Err(err) = self
                .host
                .register_service(LIGHT_DOMAIN, TURN_ON, original)
                .await
            {
                tracing::error!(%err, "failed to restore light service");
            }
            return false;
        }

        tracing::info!("registered light service override");
        true
    }

    /// Whether the host reports `light_id` as on.
    ///
    /// # Errors
    ///
    /// Returns the host error if the lookup fails.
    pub async fn is_light_on(&self, light_id: &str) -> Result<bool, PresetsError> {
        Ok(self
            .host
            .get_state(light_id)
            .await?
            .is_some_and(|state| state.is_on()))
    }

    /// Whether any light of `group` is on.
    ///
    /// # Errors
    ///
    /// Returns the host error if a lookup fails.
    pub async fn is_anything_on(&self, group: &GroupDefinition) -> Result<bool, PresetsError> {
        for light in group.light_ids() {
            if self.is_light_on(light).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn group(&self, name: &str) -> Result<&GroupDefinition, PresetsError> {
        self.registry.find_by_name(name).ok_or_else(|| {
            NotFoundError {
                entity: "Group",
                id: name.to_string(),
            }
            .into()
        })
    }
}
