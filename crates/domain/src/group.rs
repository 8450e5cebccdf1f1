//! Light groups: lights sharing one preset selector.

use std::collections::BTreeMap;

use crate::error::{PresetsError, ValidationError};
use crate::preset::PresetSpec;

/// A named collection of lights whose defaults follow a preset selector.
///
/// `id` and the selector are fixed once built; fields are only readable
/// through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDefinition {
    id: String,
    preset_selector_id: String,
    light_ids: Vec<String>,
    presets: BTreeMap<String, PresetSpec>,
}

impl GroupDefinition {
    /// Create a builder for constructing a [`GroupDefinition`].
    #[must_use]
    pub fn builder() -> GroupDefinitionBuilder {
        GroupDefinitionBuilder::default()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Entity whose current value names the active preset.
    #[must_use]
    pub fn preset_selector_id(&self) -> &str {
        &self.preset_selector_id
    }

    #[must_use]
    pub fn light_ids(&self) -> &[String] {
        &self.light_ids
    }

    /// Whether `light_id` is a member of this group.
    #[must_use]
    pub fn contains_light(&self, light_id: &str) -> bool {
        self.light_ids.iter().any(|id| id == light_id)
    }

    /// Preset registered under the lower-cased `name`.
    #[must_use]
    pub fn preset(&self, name: &str) -> Option<&PresetSpec> {
        self.presets.get(name)
    }

    /// Names of every configured preset, lower-cased.
    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PresetsError::Validation`] when:
    /// - `id` is empty ([`ValidationError::EmptyGroupId`]) or not a slug
    /// - the selector is empty ([`ValidationError::EmptySelector`])
    /// - there are no lights ([`ValidationError::NoLights`])
    pub fn validate(&self) -> Result<(), PresetsError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyGroupId.into());
        }
        if !is_slug(&self.id) {
            return Err(ValidationError::InvalidSlug(self.id.clone()).into());
        }
        if self.preset_selector_id.is_empty() {
            return Err(ValidationError::EmptySelector(self.id.clone()).into());
        }
        if self.light_ids.is_empty() {
            return Err(ValidationError::NoLights(self.id.clone()).into());
        }
        Ok(())
    }
}

/// Whether `value` only holds lowercase ASCII alphanumerics and underscores.
#[must_use]
pub fn is_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Step-by-step builder for [`GroupDefinition`].
#[derive(Debug, Default)]
pub struct GroupDefinitionBuilder {
    id: Option<String>,
    preset_selector_id: Option<String>,
    light_ids: Vec<String>,
    presets: BTreeMap<String, PresetSpec>,
}

impl GroupDefinitionBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn preset_selector(mut self, entity_id: impl Into<String>) -> Self {
        self.preset_selector_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn light(mut self, light_id: impl Into<String>) -> Self {
        self.light_ids.push(light_id.into());
        self
    }

    #[must_use]
    pub fn lights<I, S>(mut self, light_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.light_ids.extend(light_ids.into_iter().map(Into::into));
        self
    }

    /// Register a preset. The name is lower-cased so that it matches the
    /// lower-cased selector value.
    #[must_use]
    pub fn preset(mut self, name: &str, spec: PresetSpec) -> Self {
        self.presets.insert(name.to_lowercase(), spec);
        self
    }

    /// Consume the builder, validate, and return a [`GroupDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`PresetsError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<GroupDefinition, PresetsError> {
        let group = GroupDefinition {
            id: self.id.unwrap_or_default(),
            preset_selector_id: self.preset_selector_id.unwrap_or_default(),
            light_ids: self.light_ids,
            presets: self.presets,
        };
        group.validate()?;
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn living() -> GroupDefinitionBuilder {
        GroupDefinition::builder()
            .id("living")
            .preset_selector("input_select.living_preset")
            .lights(["light.a", "light.b"])
    }

    #[test]
    fn should_build_valid_group() {
        let group = living().build().unwrap();
        assert_eq!(group.id(), "living");
        assert_eq!(group.preset_selector_id(), "input_select.living_preset");
        assert_eq!(group.light_ids(), ["light.a", "light.b"]);
        assert!(group.contains_light("light.b"));
        assert!(!group.contains_light("light.c"));
    }

    #[test]
    fn should_return_validation_error_when_id_is_missing() {
        let result = GroupDefinition::builder()
            .preset_selector("input_select.x")
            .light("light.a")
            .build();
        assert!(matches!(
            result,
            Err(PresetsError::Validation(ValidationError::EmptyGroupId))
        ));
    }

    #[test]
    fn should_return_validation_error_when_id_is_not_a_slug() {
        let result = living().id("Living Room").build();
        assert!(matches!(
            result,
            Err(PresetsError::Validation(ValidationError::InvalidSlug(_)))
        ));
    }

    #[test]
    fn should_return_validation_error_when_selector_is_missing() {
        let result = GroupDefinition::builder()
            .id("living")
            .light("light.a")
            .build();
        assert!(matches!(
            result,
            Err(PresetsError::Validation(ValidationError::EmptySelector(_)))
        ));
    }

    #[test]
    fn should_return_validation_error_when_no_lights() {
        let result = GroupDefinition::builder()
            .id("living")
            .preset_selector("input_select.x")
            .build();
        assert!(matches!(
            result,
            Err(PresetsError::Validation(ValidationError::NoLights(_)))
        ));
    }

    #[test]
    fn should_lowercase_preset_names() {
        let group = living()
            .preset("Relax", PresetSpec::default())
            .build()
            .unwrap();
        assert!(group.preset("relax").is_some());
        assert!(group.preset("Relax").is_none());
        assert_eq!(group.preset_names().collect::<Vec<_>>(), ["relax"]);
    }

    #[test]
    fn should_recognise_slugs() {
        assert!(is_slug("living_room_2"));
        assert!(!is_slug("living-room"));
        assert!(!is_slug(""));
    }
}
