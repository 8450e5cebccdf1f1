//! On/off policies carried by the `state` key of a preset.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attribute::Attributes;

/// On/off directive attached to a light's effective settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// The light is turned on whenever the preset is applied.
    On,
    /// The light is kept off.
    Off,
    /// The light follows the rest of the group: on if any member is on.
    #[default]
    OnIfAnythingOn,
}

impl Policy {
    /// The policy's configuration spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::OnIfAnythingOn => "on_if_anything_on",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value is not one of `on`, `off` or `on_if_anything_on`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized light state policy {0:?}")]
pub struct UnknownPolicy(pub String);

impl FromStr for Policy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "on_if_anything_on" => Ok(Self::OnIfAnythingOn),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Attributes and policy to apply to one light under the active preset.
///
/// Always computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectiveSettings {
    /// Attributes to send with `light.turn_on`, without the `state` key.
    pub attributes: Attributes,
    pub policy: Policy,
}
