//! Host state snapshots.

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, now};

/// Value the host reports for a light that is on.
pub const STATE_ON: &str = "on";

/// Value the host reports for a light that is off.
pub const STATE_OFF: &str = "off";

/// The current value of one host entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub entity_id: String,
    pub value: String,
    pub last_changed: Timestamp,
}

impl StateSnapshot {
    /// Snapshot of `entity_id` holding `value`, changed now.
    #[must_use]
    pub fn new(entity_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            value: value.into(),
            last_changed: now(),
        }
    }

    /// Whether the entity reports [`STATE_ON`].
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.value == STATE_ON
    }
}
