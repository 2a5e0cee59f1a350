//! Registered consumer endpoints and their health state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Unique identifier for a consumer: its endpoint URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumerId(String);

impl ConsumerId {
    /// Create a new `ConsumerId` from an endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self(endpoint.into())
    }

    /// Get the underlying endpoint URL.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ConsumerId {
    fn from(endpoint: &str) -> Self {
        Self(endpoint.to_string())
    }
}

impl From<String> for ConsumerId {
    fn from(endpoint: String) -> Self {
        Self(endpoint)
    }
}

/// Consumer health state.
///
/// A `Suspended` consumer receives no new delivery attempts until it is
/// explicitly reactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerState {
    Active,
    Suspended,
}

impl std::fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsumerState::Active => write!(f, "active"),
            ConsumerState::Suspended => write!(f, "suspended"),
        }
    }
}

/// A registered consumer endpoint.
///
/// Health state and the consecutive-failure count are mutated only through
/// the registry; the delivery worker never touches them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    pub id: ConsumerId,
    /// Extra headers attached to every delivery request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub state: ConsumerState,
    pub consecutive_failures: u32,
}

impl Consumer {
    /// Create a new active consumer with a clean failure count.
    pub fn new(id: impl Into<ConsumerId>) -> Self {
        Self {
            id: id.into(),
            headers: BTreeMap::new(),
            state: ConsumerState::Active,
            consecutive_failures: 0,
        }
    }

    /// Attach delivery headers.
    #[must_use]
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == ConsumerState::Active
    }
}
