//! Commands dispatched through the host.
//!
//! Examples: `light.turn_on`, `light.turn_off`, `light_presets.light_toggle`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attribute::Attributes;

/// Domain of the host's light services.
pub const LIGHT_DOMAIN: &str = "light";
/// Light service turning lights on.
pub const TURN_ON: &str = "turn_on";
/// Light service turning lights off.
pub const TURN_OFF: &str = "turn_off";

/// Domain under which the group commands are exposed.
pub const PRESETS_DOMAIN: &str = "light_presets";
/// Group command turning a group on.
pub const GROUP_ON: &str = "light_on";
/// Group command turning a group off.
pub const GROUP_OFF: &str = "light_off";
/// Group command toggling a group.
pub const GROUP_TOGGLE: &str = "light_toggle";

/// Payload key naming the targeted entities.
pub const ENTITY_ID: &str = "entity_id";

/// Entities targeted by a call: a single id or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityTarget {
    One(String),
    Many(Vec<String>),
}

impl EntityTarget {
    /// Every targeted id, in order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::One(id) => vec![id.as_str()],
            Self::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

impl From<EntityTarget> for Value {
    fn from(target: EntityTarget) -> Self {
        match target {
            EntityTarget::One(id) => Value::String(id),
            EntityTarget::Many(ids) => Value::from(ids),
        }
    }
}

/// A request to run `domain.service` with `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub data: Attributes,
}

impl ServiceCall {
    #[must_use]
    pub fn new(domain: impl Into<String>, service: impl Into<String>, data: Attributes) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            data,
        }
    }

    /// `light.turn_on` for a single light with `attributes`.
    #[must_use]
    pub fn light_turn_on(light_id: &str, attributes: Attributes) -> Self {
        let mut data = attributes;
        data.insert(ENTITY_ID.to_string(), Value::from(light_id));
        Self::new(LIGHT_DOMAIN, TURN_ON, data)
    }

    /// `light.turn_off` for one or several lights, in a single call.
    #[must_use]
    pub fn light_turn_off(target: EntityTarget) -> Self {
        let mut data = Attributes::new();
        data.insert(ENTITY_ID.to_string(), target.into());
        Self::new(LIGHT_DOMAIN, TURN_OFF, data)
    }

    /// Whether this call is `domain.service`.
    #[must_use]
    pub fn is(&self, domain: &str, service: &str) -> bool {
        self.domain == domain && self.service == service
    }

    /// The targeted entities, if the payload names any.
    #[must_use]
    pub fn target(&self) -> Option<EntityTarget> {
        self.data
            .get(ENTITY_ID)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// The first targeted entity. Calls naming several entities only
    /// honour the first one.
    #[must_use]
    pub fn first_entity_id(&self) -> Option<String> {
        match self.target()? {
            EntityTarget::One(id) => Some(id),
            EntityTarget::Many(ids) => ids.into_iter().next(),
        }
    }
}

impl std::fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.domain, self.service)
    }
}
