//! Trait definitions for the system's collaborator seams.
//!
//! These traits define what the orchestrator consumes and produces; the
//! concrete implementations live in [`crate::adapter`].

mod notifier;
mod source;
mod store;
mod transport;

pub use notifier::{DeliveryEvent, Event, Notifier, RunEvent};
pub use source::ChangeSource;
pub use store::{RunRecord, RunStore};
pub use transport::DeliveryTransport;
