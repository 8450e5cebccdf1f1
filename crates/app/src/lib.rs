//! # lightpresets-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `HostAdapter` — state lookup, service dispatch and registration
//!   - `ServiceHandler` — a callable host service
//!   - `EventPublisher` — publish host events
//! - Resolve the **effective settings** of a light under the active preset
//! - Run the **reaction engine**: group commands, preset changes and the
//!   `light.turn_on` interceptor
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `lightpresets-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod reaction_engine;
pub mod resolver;
pub mod services;

#[cfg(test)]
mod testing;
