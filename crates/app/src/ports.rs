//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the host.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod event_bus;
pub mod host;

pub use event_bus::EventPublisher;
pub use host::{HostAdapter, ServiceHandler};
