//! Service handlers the hub registers on the host.
//!
//! Each handler holds a weak reference to the [`ReactionEngine`](crate::reaction_engine::ReactionEngine)
//! so that the host's service registry never keeps the engine alive.

pub mod group_commands;
pub mod turn_on_interceptor;
