//! Group registry — read-only index over every configured group.

use std::collections::HashMap;

use crate::error::{PresetsError, ValidationError};
use crate::group::GroupDefinition;

/// All groups, indexed by name, by preset selector and by member light.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: Vec<GroupDefinition>,
    by_name: HashMap<String, usize>,
    by_selector: HashMap<String, Vec<usize>>,
    by_light: HashMap<String, usize>,
}

impl GroupRegistry {
    /// Index `groups`, keeping their order as the iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateGroup`] when two groups share an id.
    pub fn new(groups: Vec<GroupDefinition>) -> Result<Self, PresetsError> {
        let mut by_name = HashMap::with_capacity(groups.len());
        let mut by_selector: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_light = HashMap::new();

        for (index, group) in groups.iter().enumerate() {
            if by_name.insert(group.id().to_string(), index).is_some() {
                return Err(ValidationError::DuplicateGroup(group.id().to_string()).into());
            }
            by_selector
                .entry(group.preset_selector_id().to_string())
                .or_default()
                .push(index);
            for light in group.light_ids() {
                // First group listing a light wins.
                by_light.entry(light.clone()).or_insert(index);
            }
        }

        Ok(Self {
            groups,
            by_name,
            by_selector,
            by_light,
        })
    }

    /// Group whose id is exactly `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&GroupDefinition> {
        self.by_name.get(name).map(|&index| &self.groups[index])
    }

    /// Every group driven by the selector `entity_id`, in registry order.
    #[must_use]
    pub fn find_by_preset_selector(&self, entity_id: &str) -> Vec<&GroupDefinition> {
        self.by_selector
            .get(entity_id)
            .map(|indexes| indexes.iter().map(|&index| &self.groups[index]).collect())
            .unwrap_or_default()
    }

    /// First group, in registry order, listing `light_id` as a member.
    ///
    /// A light listed by several groups only ever resolves to the first one.
    #[must_use]
    pub fn find_by_member_light(&self, light_id: &str) -> Option<&GroupDefinition> {
        self.by_light.get(light_id).map(|&index| &self.groups[index])
    }

    /// Whether `entity_id` drives at least one group.
    #[must_use]
    pub fn is_preset_selector(&self, entity_id: &str) -> bool {
        self.by_selector.contains_key(entity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupDefinition> {
        self.groups.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
