use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("duplicate consumer endpoint: {endpoint}")]
    DuplicateConsumer { endpoint: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// A single delivery call's failure, split by retryability.
///
/// The retry policy is driven entirely by inspecting the variant: transient
/// failures are retried with backoff, permanent failures are reported
/// immediately with zero retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// Network failure, timeout, or 5xx-class rejection.
    #[error("transient delivery failure: {reason}")]
    Transient { reason: String },

    /// Malformed consumer configuration or 4xx-class rejection.
    #[error("permanent delivery failure: {reason}")]
    Permanent { reason: String },
}

impl DeliveryError {
    pub fn transient(reason: impl Into<String>) -> Self {
        DeliveryError::Transient {
            reason: reason.into(),
        }
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        DeliveryError::Permanent {
            reason: reason.into(),
        }
    }

    /// Whether the failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, DeliveryError::Transient { .. })
    }

    /// The underlying failure description, without the taxonomy prefix.
    pub fn reason(&self) -> &str {
        match self {
            DeliveryError::Transient { reason } | DeliveryError::Permanent { reason } => reason,
        }
    }
}

/// Change-feed read failures.
///
/// Unlike consumer-level failures these are fatal to the run loop: with no
/// batch available there is nothing to distribute.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to poll change feed: {0}")]
    Poll(String),

    #[error("change feed returned malformed records: {0}")]
    Malformed(String),

    #[error("change feed regressed from sequence {last} to {got}")]
    SequenceRegression { last: u64, got: u64 },
}

/// Run-store persistence failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read run file: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write run file: {0}")]
    Write(#[source] std::io::Error),

    #[error("failed to decode run record: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to encode run record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("unknown run id: {0}")]
    UnknownRun(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("admin server error: {0}")]
    Admin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
