//! Cascade - change-feed fan-out delivery.
//!
//! This crate reliably delivers batches of changed records from a storage
//! change feed to every registered consumer endpoint, with bounded retry,
//! partial-failure isolation, and consumer suspension on repeated failure.
//!
//! # Architecture
//!
//! The core is a fan-out orchestrator over two trait seams:
//!
//! - **`port::ChangeSource`** - surfaces ordered batches of change records
//! - **`port::DeliveryTransport`** - one logical "deliver batch" call per
//!   consumer, with failures split into transient and permanent
//!
//! Each batch is delivered to all active consumers concurrently; one
//! consumer's stall or failure never blocks another's delivery. Delivery
//! retries with exponential backoff are internal to the
//! [`delivery::DeliveryWorker`]; the orchestrator applies outcomes to the
//! [`registry::ConsumerRegistry`], which suspends a consumer after
//! repeated consecutive failures until an operator reactivates it.
//!
//! Run state is persisted through [`port::RunStore`] keyed by run id, so a
//! restart resumes an interrupted run instead of restarting the batch.
//! Delivery is at-least-once; consumers own deduplication.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML files
//! - [`domain`] - Change records, consumers, outcomes, run reports
//! - [`error`] - Error types for the crate
//! - [`registry`] - Consumer health registry
//! - [`port`] - Trait seams for collaborators
//! - [`adapter`] - HTTP transport, feed poller, JSON run store
//! - [`delivery`] - Retry policy and delivery worker
//! - [`app`] - Orchestrator and application wiring
//! - [`admin`] - Administrative HTTP API
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use cascade::config::Config;
//! use cascade::app::{shutdown_channel, App};
//!
//! # async fn demo() -> cascade::error::Result<()> {
//! let config = Config::load("cascade.toml")?;
//! let (_trigger, shutdown) = shutdown_channel();
//! App::run(config, shutdown).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod admin;
pub mod app;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod domain;
pub mod error;
pub mod port;
pub mod registry;
pub mod service;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
