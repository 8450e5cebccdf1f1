//! Group command services — `light_presets.light_on`, `light_off`, `light_toggle`.

use std::sync::Weak;

use async_trait::async_trait;

use lightpresets_domain::attribute::Attributes;
use lightpresets_domain::error::{PresetsError, ValidationError};
use lightpresets_domain::service::ServiceCall;

use crate::ports::{HostAdapter, ServiceHandler};
use crate::reaction_engine::{ReactionEngine, TurnOnParams};

/// Payload key naming the targeted group.
pub const LIGHT_GROUP: &str = "light_group";
/// Payload key scaling the preset brightness of a group turn-on.
pub const PRESET_BRIGHTNESS_PCT: &str = "preset_brightness_pct";

/// Which group command a service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCommandKind {
    On,
    Off,
    Toggle,
}

/// A parsed group command payload.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupCommand {
    pub light_group: String,
    pub params: TurnOnParams,
}

impl GroupCommand {
    /// Parse `light_group` and the optional `preset_brightness_pct`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] without a group, or
    /// [`ValidationError::InvalidField`] when a field has the wrong type.
    pub fn parse(data: &Attributes) -> Result<Self, ValidationError> {
        let light_group = data
            .get(LIGHT_GROUP)
            .ok_or(ValidationError::MissingField(LIGHT_GROUP))?
            .as_str()
            .ok_or(ValidationError::InvalidField(LIGHT_GROUP))?
            .to_string();

        let preset_brightness_pct = data
            .get(PRESET_BRIGHTNESS_PCT)
            .map(|value| {
                value
                    .as_f64()
                    .ok_or(ValidationError::InvalidField(PRESET_BRIGHTNESS_PCT))
            })
            .transpose()?;

        Ok(Self {
            light_group,
            params: TurnOnParams {
                preset_brightness_pct,
            },
        })
    }
}

/// Host service running one group command on the engine.
pub struct GroupCommandService<H> {
    engine: Weak<ReactionEngine<H>>,
    kind: GroupCommandKind,
}

impl<H> GroupCommandService<H> {
    pub fn new(engine: Weak<ReactionEngine<H>>, kind: GroupCommandKind) -> Self {
        Self { engine, kind }
    }
}

#[async_trait]
impl<H> ServiceHandler for GroupCommandService<H>
where
    H: HostAdapter + 'static,
{
    async fn handle(&self, call: ServiceCall) -> Result<(), PresetsError> {
        tracing::info!(command = ?self.kind, data = ?call.data, "group command");

        let command = GroupCommand::parse(&call.data).inspect_err(|err| {
            tracing::warn!(%err, service = %call, "rejected group command");
        })?;
        let Some(engine) = self.engine.upgrade() else {
            tracing::warn!(group = %command.light_group, "reaction engine is gone, ignoring group command");
            return Ok(());
        };

        let result = match self.kind {
            GroupCommandKind::On => engine.turn_on(&command.light_group, command.params).await,
            GroupCommandKind::Off => engine.turn_off(&command.light_group).await,
            GroupCommandKind::Toggle => engine.toggle(&command.light_group).await,
        };
        result.inspect_err(|err| {
            tracing::warn!(%err, group = %command.light_group, "group command failed");
        })
    }
}
