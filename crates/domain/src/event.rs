//! Host events the hub reacts to.

use crate::state::StateSnapshot;

/// Something that happened on the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// An entity's state was recorded. `old_state` is `None` the first time
    /// the entity ever reports a state.
    StateChanged {
        entity_id: String,
        old_state: Option<StateSnapshot>,
        new_state: Option<StateSnapshot>,
    },
    /// A service handler was registered under `domain.service`.
    ServiceRegistered { domain: String, service: String },
}

impl HostEvent {
    /// A state change from `old` (if any) to `new`.
    #[must_use]
    pub fn state_changed(
        entity_id: impl Into<String>,
        old: Option<StateSnapshot>,
        new: Option<StateSnapshot>,
    ) -> Self {
        Self::StateChanged {
            entity_id: entity_id.into(),
            old_state: old,
            new_state: new,
        }
    }

    /// A registration of `domain.service`.
    #[must_use]
    pub fn service_registered(domain: impl Into<String>, service: impl Into<String>) -> Self {
        Self::ServiceRegistered {
            domain: domain.into(),
            service: service.into(),
        }
    }
}

impl std::fmt::Display for HostEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StateChanged {
                entity_id,
                old_state,
                new_state,
            } => write!(
                f,
                "state_changed({entity_id}: {} -> {})",
                old_state.as_ref().map_or("-", |s| s.value.as_str()),
                new_state.as_ref().map_or("-", |s| s.value.as_str()),
            ),
            Self::ServiceRegistered { domain, service } => {
                write!(f, "service_registered({domain}.{service})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_state_change() {
        let event = HostEvent::state_changed(
            "input_select.scene",
            Some(StateSnapshot::new("input_select.scene", "relax")),
            Some(StateSnapshot::new("input_select.scene", "bright")),
        );
        assert_eq!(
            event.to_string(),
            "state_changed(input_select.scene: relax -> bright)"
        );
    }

    #[test]
    fn should_display_first_state_with_placeholder() {
        let event = HostEvent::state_changed(
            "light.a",
            None,
            Some(StateSnapshot::new("light.a", "on")),
        );
        assert_eq!(event.to_string(), "state_changed(light.a: - -> on)");
    }

    #[test]
    fn should_display_service_registration() {
        let event = HostEvent::service_registered("light", "turn_on");
        assert_eq!(event.to_string(), "service_registered(light.turn_on)");
    }
}
