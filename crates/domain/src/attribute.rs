//! Light attributes and the rules for combining them.
//!
//! Attributes are kept as a JSON object so that they can be forwarded to
//! the host's light service verbatim, whatever the light integration
//! understands.

use serde_json::{Map, Value};

/// Attribute name → value, as sent to `light.turn_on`.
pub type Attributes = Map<String, Value>;

/// Reserved key carrying the on/off [`Policy`](crate::policy::Policy).
pub const STATE_KEY: &str = "state";

/// Keys that count as the caller customising a light when turning it on.
pub const LIGHT_ATTRIBUTES: [&str; 9] = [
    "brightness",
    "kelvin",
    "rgb_color",
    "white_value",
    "color_temp",
    "color_name",
    "brightness_pct",
    "effect",
    "hs_color",
];

/// Keys that each describe the colour of a light. Two of them must never be
/// sent together.
pub const COLOR_ATTRIBUTES: [&str; 6] = [
    "kelvin",
    "rgb_color",
    "white_value",
    "color_temp",
    "color_name",
    "hs_color",
];

/// Brightness assumed when a preset does not set one.
pub const FULL_BRIGHTNESS: f64 = 255.0;

/// Whether `attrs` sets any colour attribute.
#[must_use]
pub fn sets_color(attrs: &Attributes) -> bool {
    COLOR_ATTRIBUTES.iter().any(|key| attrs.contains_key(*key))
}

/// Whether `attrs` sets any recognised light attribute.
#[must_use]
pub fn has_light_attributes(attrs: &Attributes) -> bool {
    LIGHT_ATTRIBUTES.iter().any(|key| attrs.contains_key(*key))
}

/// Layer `overrides` on top of `defaults`.
///
/// When both sides set a colour attribute, every colour attribute of
/// `defaults` is dropped first so the override's colour is the only one
/// left. When only one side sets a colour, it is kept.
#[must_use]
pub fn merge_attributes(defaults: &Attributes, overrides: &Attributes) -> Attributes {
    let drop_default_color = sets_color(defaults) && sets_color(overrides);

    let mut merged: Attributes = defaults
        .iter()
        .filter(|(key, _)| !(drop_default_color && COLOR_ATTRIBUTES.contains(&key.as_str())))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Scale the `brightness` attribute by `pct` percent.
///
/// A missing or non-numeric brightness counts as full brightness. The
/// result is rounded and clamped to `0..=255`.
pub fn scale_brightness(attrs: &mut Attributes, pct: f64) {
    let base = attrs
        .get("brightness")
        .and_then(Value::as_f64)
        .unwrap_or(FULL_BRIGHTNESS);
    let scaled = (base * pct / 100.0).round().clamp(0.0, FULL_BRIGHTNESS);
    // Clamped to 0..=255 above, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = scaled as u64;
    attrs.insert("brightness".to_string(), Value::from(scaled));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn should_drop_default_color_when_override_sets_another_color() {
        let merged = merge_attributes(
            &attrs(json!({"color_temp": 300})),
            &attrs(json!({"hs_color": [1, 2]})),
        );
        assert_eq!(merged, attrs(json!({"hs_color": [1, 2]})));
    }

    #[test]
    fn should_keep_default_color_when_override_sets_no_color() {
        let merged = merge_attributes(
            &attrs(json!({"color_temp": 300, "brightness": 10})),
            &attrs(json!({"brightness": 50})),
        );
        assert_eq!(merged, attrs(json!({"color_temp": 300, "brightness": 50})));
    }

    #[test]
    fn should_keep_everything_when_only_override_sets_color() {
        let merged = merge_attributes(
            &attrs(json!({"brightness": 100})),
            &attrs(json!({"hs_color": [1, 2]})),
        );
        assert_eq!(
            merged,
            attrs(json!({"brightness": 100, "hs_color": [1, 2]}))
        );
    }

    #[test]
    fn should_keep_non_color_defaults_when_colors_collide() {
        let merged = merge_attributes(
            &attrs(json!({"rgb_color": [255, 0, 0], "kelvin": 2700, "effect": "colorloop"})),
            &attrs(json!({"color_name": "blue"})),
        );
        assert_eq!(
            merged,
            attrs(json!({"effect": "colorloop", "color_name": "blue"}))
        );
    }

    #[test]
    fn should_merge_two_empty_maps_into_empty_map() {
        let merged = merge_attributes(&Attributes::new(), &Attributes::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn should_let_override_win_for_plain_attributes() {
        let merged = merge_attributes(
            &attrs(json!({"state": "on", "transition": 2})),
            &attrs(json!({"state": "off"})),
        );
        assert_eq!(merged, attrs(json!({"state": "off", "transition": 2})));
    }

    #[test]
    fn should_detect_light_attributes() {
        assert!(has_light_attributes(&attrs(json!({"brightness_pct": 20}))));
        assert!(!has_light_attributes(&attrs(
            json!({"entity_id": "light.a", "transition": 3})
        )));
    }

    #[test]
    fn should_scale_existing_brightness() {
        let mut map = attrs(json!({"brightness": 200}));
        scale_brightness(&mut map, 50.0);
        assert_eq!(map["brightness"], json!(100));
    }

    #[test]
    fn should_scale_full_brightness_when_unset() {
        let mut map = Attributes::new();
        scale_brightness(&mut map, 10.0);
        assert_eq!(map["brightness"], json!(26));
    }

    #[test]
    fn should_clamp_scaled_brightness() {
        let mut map = attrs(json!({"brightness": 200}));
        scale_brightness(&mut map, 300.0);
        assert_eq!(map["brightness"], json!(255));
    }
}
