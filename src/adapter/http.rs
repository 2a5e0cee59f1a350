//! HTTP webhook delivery transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;

use crate::domain::{ChangeBatch, Consumer};
use crate::error::{DeliveryError, Result};
use crate::port::DeliveryTransport;

/// Delivers batches as JSON POSTs to consumer endpoints.
///
/// Failure classification:
/// - connect errors, timeouts, 408/429 and 5xx responses are transient
/// - any other non-success response is permanent
/// - malformed consumer configuration (bad URL, bad header) is permanent
///   and produces no network call at all
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `request_timeout`.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }

    fn consumer_headers(consumer: &Consumer) -> std::result::Result<HeaderMap, DeliveryError> {
        let mut headers = HeaderMap::with_capacity(consumer.headers.len());
        for (name, value) in &consumer.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                DeliveryError::permanent(format!("invalid header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| DeliveryError::permanent(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }
}

/// Map a consumer's HTTP status into the delivery-error taxonomy.
/// `None` means the batch was accepted.
fn classify_status(status: StatusCode) -> Option<DeliveryError> {
    if status.is_success() {
        return None;
    }
    let retryable = status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS;
    let reason = format!("consumer returned {status}");
    if retryable {
        Some(DeliveryError::transient(reason))
    } else {
        Some(DeliveryError::permanent(reason))
    }
}

#[async_trait]
impl DeliveryTransport for HttpTransport {
    async fn send(
        &self,
        consumer: &Consumer,
        batch: &ChangeBatch,
    ) -> std::result::Result<(), DeliveryError> {
        let headers = Self::consumer_headers(consumer)?;

        let response = self
            .client
            .post(consumer.id.as_str())
            .headers(headers)
            .json(batch)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    DeliveryError::permanent(format!("invalid consumer endpoint: {e}"))
                } else if e.is_timeout() {
                    DeliveryError::transient(format!("request timed out: {e}"))
                } else {
                    DeliveryError::transient(format!("request failed: {e}"))
                }
            })?;

        match classify_status(response.status()) {
            None => Ok(()),
            Some(error) => Err(error),
        }
    }

    fn transport_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success_statuses() {
        assert_eq!(classify_status(StatusCode::OK), None);
        assert_eq!(classify_status(StatusCode::ACCEPTED), None);
    }

    #[test]
    fn test_classify_retryable_statuses() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::TOO_MANY_REQUESTS,
        ] {
            let error = classify_status(status).unwrap();
            assert!(error.is_transient(), "{status} should be transient");
        }
    }

    #[test]
    fn test_classify_rejections_as_permanent() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::NOT_FOUND,
            StatusCode::GONE,
        ] {
            let error = classify_status(status).unwrap();
            assert!(!error.is_transient(), "{status} should be permanent");
        }
    }

    #[test]
    fn test_invalid_header_name_is_permanent() {
        let mut consumer = Consumer::new("https://consumer.example/hook");
        consumer
            .headers
            .insert("bad header".to_string(), "value".to_string());

        let error = HttpTransport::consumer_headers(&consumer).unwrap_err();
        assert!(!error.is_transient());
    }
}
