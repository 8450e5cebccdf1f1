//! Attribute resolver — effective settings of one light under the active preset.
//!
//! Everything here is recomputed on each call: the selector value and the
//! preset it names can change between two events.

use lightpresets_domain::attribute::STATE_KEY;
use lightpresets_domain::error::PresetsError;
use lightpresets_domain::group::GroupDefinition;
use lightpresets_domain::policy::{EffectiveSettings, Policy};
use lightpresets_domain::preset::PresetSpec;

use crate::ports::HostAdapter;

/// Lower-cased current value of the group's preset selector.
///
/// # Errors
///
/// Returns [`PresetsError::PresetUnavailable`] when the selector has no
/// state, or the host error if the lookup itself fails.
pub async fn resolve_preset_value<H: HostAdapter>(
    host: &H,
    group: &GroupDefinition,
) -> Result<String, PresetsError> {
    let selector = group.preset_selector_id();
    let state = host
        .get_state(selector)
        .await?
        .ok_or_else(|| PresetsError::PresetUnavailable {
            selector: selector.to_string(),
        })?;
    Ok(state.value.to_lowercase())
}

/// Settings of `light_id` under `spec`.
///
/// The `state` key is stripped from the attributes and turned into the
/// policy. A missing or unrecognised `state` yields
/// [`Policy::OnIfAnythingOn`]; the latter is logged.
#[must_use]
pub fn compute_effective_settings(spec: &PresetSpec, light_id: &str) -> EffectiveSettings {
    let mut attributes = spec.merged_for(light_id);
    let policy = match attributes.remove(STATE_KEY) {
        None => Policy::default(),
        Some(value) => match value.as_str().map(str::parse::<Policy>) {
            Some(Ok(policy)) => policy,
            Some(Err(err)) => {
                tracing::warn!(%err, light = %light_id, "falling back to on_if_anything_on");
                Policy::default()
            }
            None => {
                tracing::warn!(
                    %value,
                    light = %light_id,
                    "state is not a string, falling back to on_if_anything_on"
                );
                Policy::default()
            }
        },
    };
    EffectiveSettings { attributes, policy }
}

/// Settings of `light_id` under the preset named `preset_name`.
///
/// An unknown preset behaves like an empty one.
#[must_use]
pub fn settings_for_preset(
    group: &GroupDefinition,
    preset_name: &str,
    light_id: &str,
) -> EffectiveSettings {
    match group.preset(preset_name) {
        Some(spec) => compute_effective_settings(spec, light_id),
        None => {
            tracing::debug!(
                group = %group.id(),
                preset = %preset_name,
                known = ?group.preset_names().collect::<Vec<_>>(),
                "unknown preset, no defaults"
            );
            compute_effective_settings(&PresetSpec::default(), light_id)
        }
    }
}

/// Settings of `light_id` under the group's currently selected preset.
///
/// # Errors
///
/// Propagates [`resolve_preset_value`] failures.
pub async fn settings_for_light<H: HostAdapter>(
    host: &H,
    group: &GroupDefinition,
    light_id: &str,
) -> Result<EffectiveSettings, PresetsError> {
    let preset_name = resolve_preset_value(host, group).await?;
    Ok(settings_for_preset(group, &preset_name, light_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHost, SELECTOR, attrs, living, preset};
    use serde_json::json;

    #[tokio::test]
    async fn should_lowercase_selector_value() {
        let host = FakeHost::with_states(&[(SELECTOR, "Relax")]);
        let value = resolve_preset_value(&host, &living(&[])).await.unwrap();
        assert_eq!(value, "relax");
    }

    #[tokio::test]
    async fn should_fail_when_selector_has_no_state() {
        let host = FakeHost::default();
        let result = resolve_preset_value(&host, &living(&[])).await;
        assert!(matches!(
            result,
            Err(PresetsError::PresetUnavailable { selector }) if selector == SELECTOR
        ));
    }

    #[test]
    fn should_extract_state_into_policy() {
        let spec = preset(json!({"defaults": {"brightness": 100, "state": "on"}}));
        let settings = compute_effective_settings(&spec, "light.a");
        assert_eq!(settings.policy, Policy::On);
        assert_eq!(settings.attributes, attrs(json!({"brightness": 100})));
    }

    #[test]
    fn should_let_light_override_the_policy() {
        let spec = preset(json!({
            "defaults": {"brightness": 100, "state": "on"},
            "light.b": {"state": "off"}
        }));
        let settings = compute_effective_settings(&spec, "light.b");
        assert_eq!(settings.policy, Policy::Off);
        assert_eq!(settings.attributes, attrs(json!({"brightness": 100})));
    }

    #[test]
    fn should_default_policy_when_state_is_missing() {
        let spec = preset(json!({"defaults": {"effect": "colorloop"}}));
        let settings = compute_effective_settings(&spec, "light.a");
        assert_eq!(settings.policy, Policy::OnIfAnythingOn);
    }

    #[test]
    fn should_default_policy_when_state_is_unrecognised() {
        let spec = preset(json!({"defaults": {"state": "blink"}}));
        let settings = compute_effective_settings(&spec, "light.a");
        assert_eq!(settings.policy, Policy::OnIfAnythingOn);
        assert!(settings.attributes.is_empty());
    }

    #[test]
    fn should_default_policy_when_state_is_not_a_string() {
        let spec = preset(json!({"defaults": {"state": true}}));
        let settings = compute_effective_settings(&spec, "light.a");
        assert_eq!(settings.policy, Policy::OnIfAnythingOn);
    }

    #[test]
    fn should_yield_empty_settings_for_unknown_preset() {
        let group = living(&[("relax", preset(json!({"defaults": {"brightness": 1}})))]);
        let settings = settings_for_preset(&group, "party", "light.a");
        assert!(settings.attributes.is_empty());
        assert_eq!(settings.policy, Policy::OnIfAnythingOn);
    }

    #[tokio::test]
    async fn should_resolve_settings_through_selector() {
        let group = living(&[(
            "bright",
            preset(json!({"defaults": {"brightness": 255, "color_temp": 250}})),
        )]);
        let host = FakeHost::with_states(&[(SELECTOR, "BRIGHT")]);

        let settings = settings_for_light(&host, &group, "light.b").await.unwrap();
        assert_eq!(
            settings.attributes,
            attrs(json!({"brightness": 255, "color_temp": 250}))
        );
    }
}
