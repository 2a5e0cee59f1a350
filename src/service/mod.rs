//! Application services: notifier fan-out for operator telemetry.

mod notifier;

pub use notifier::{LogNotifier, NotifierRegistry};
