//! # lightpresetsd — light presets daemon
//!
//! Composition root that wires the host adapter and the reaction engine
//! together and runs until interrupted.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize tracing
//! - Build the group registry from the configured groups
//! - Construct the in-memory host and its virtual lights
//! - Construct the reaction engine and register its services
//! - Seed the configured entity states
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use lightpresets_adapter_memory::InMemoryHost;
use lightpresets_app::ports::HostAdapter;
use lightpresets_app::reaction_engine::ReactionEngine;

use crate::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.logging.filter).context("invalid logging filter")?,
        )
        .init();

    let registry = Arc::new(config.registry().context("invalid light groups")?);
    tracing::info!(groups = registry.len(), "light groups loaded");

    // Host
    let host = Arc::new(InMemoryHost::new(config.host.event_capacity));
    let events = host.subscribe();
    host.install_virtual_lights()
        .await
        .context("failed to register virtual lights")?;

    // Engine
    let engine = Arc::new(ReactionEngine::new(registry, Arc::clone(&host)));
    engine
        .setup()
        .await
        .context("failed to register group services")?;
    let reactions = tokio::spawn(Arc::clone(&engine).run(events));

    for (entity_id, value) in &config.states {
        host.set_state(entity_id, value.as_str())
            .await
            .with_context(|| format!("failed to seed state of {entity_id}"))?;
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");
    reactions.abort();

    Ok(())
}
