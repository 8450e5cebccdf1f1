//! # lightpresets-domain
//!
//! Pure domain model for light group presets.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define **Attributes** and the merge rule between preset defaults and
//!   per-light overrides (colour attributes are mutually exclusive)
//! - Define **Policies** (`on`, `off`, `on_if_anything_on`)
//! - Define **Presets** and **Groups**, and the read-only **GroupRegistry**
//! - Define host-facing values: **State snapshots**, **Events**, **Service calls**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod attribute;
pub mod event;
pub mod group;
pub mod policy;
pub mod preset;
pub mod registry;
pub mod service;
pub mod state;
