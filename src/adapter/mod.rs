//! Concrete implementations of the collaborator seams in [`crate::port`].

mod http;
mod poll_source;
mod store;

pub use http::HttpTransport;
pub use poll_source::HttpPollingSource;
pub use store::JsonRunStore;
