//! Named attribute profiles applied to every light of a group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::attribute::{Attributes, merge_attributes};

/// Defaults for the whole group plus per-light exceptions.
///
/// In configuration the overrides sit next to `defaults`, keyed by light id:
///
/// ```toml
/// defaults = { brightness = 100, state = "on" }
/// "light.reading" = { state = "off" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetSpec {
    #[serde(default)]
    pub defaults: Attributes,
    #[serde(flatten)]
    pub overrides: BTreeMap<String, Attributes>,
}

impl PresetSpec {
    /// Create a builder for constructing a [`PresetSpec`].
    #[must_use]
    pub fn builder() -> PresetSpecBuilder {
        PresetSpecBuilder::default()
    }

    /// Per-light attributes for `light_id`, if any.
    #[must_use]
    pub fn overrides_for(&self, light_id: &str) -> Option<&Attributes> {
        self.overrides.get(light_id)
    }

    /// Defaults merged with the overrides of `light_id`, `state` key included.
    #[must_use]
    pub fn merged_for(&self, light_id: &str) -> Attributes {
        match self.overrides_for(light_id) {
            Some(overrides) => merge_attributes(&self.defaults, overrides),
            None => self.defaults.clone(),
        }
    }
}

/// Step-by-step builder for [`PresetSpec`].
#[derive(Debug, Default)]
pub struct PresetSpecBuilder {
    spec: PresetSpec,
}

impl PresetSpecBuilder {
    #[must_use]
    pub fn default_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.spec.defaults.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn override_attr(
        mut self,
        light_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.spec
            .overrides
            .entry(light_id.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn build(self) -> PresetSpec {
        self.spec
    }
}
