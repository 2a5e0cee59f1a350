//! Cursor-based HTTP polling change source.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, trace};
use url::Url;

use crate::domain::{ChangeBatch, ChangeRecord, SequenceNumber};
use crate::error::{Result, SourceError};
use crate::port::ChangeSource;

/// One record as returned by the feed endpoint.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    seq: u64,
    payload: serde_json::Value,
}

/// Polls a change-feed HTTP endpoint for batches of changed records.
///
/// Each poll requests records after the current cursor
/// (`GET {feed_url}?after=<seq>&limit=<n>`) and advances the cursor past
/// the newest record returned. The cursor lives in memory; durable
/// checkpointing is the feed platform's concern.
pub struct HttpPollingSource {
    client: reqwest::Client,
    feed_url: Url,
    page_limit: u32,
    poll_interval: Duration,
    cursor: Option<SequenceNumber>,
}

impl HttpPollingSource {
    pub fn new(feed_url: &str, page_limit: u32, poll_interval: Duration) -> Result<Self> {
        let feed_url = Url::parse(feed_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            feed_url,
            page_limit,
            poll_interval,
            cursor: None,
        })
    }

    /// Start polling from after the given sequence position.
    #[must_use]
    pub fn with_cursor(mut self, cursor: SequenceNumber) -> Self {
        self.cursor = Some(cursor);
        self
    }

    async fn poll_once(&self) -> std::result::Result<Vec<FeedRecord>, SourceError> {
        let mut request = self
            .client
            .get(self.feed_url.clone())
            .query(&[("limit", self.page_limit.to_string())]);
        if let Some(cursor) = self.cursor {
            request = request.query(&[("after", cursor.value().to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Poll(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Poll(format!("feed returned {status}")));
        }

        response
            .json::<Vec<FeedRecord>>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))
    }

    /// Validate feed order against the cursor and convert to domain records.
    fn to_batch(&mut self, records: Vec<FeedRecord>) -> std::result::Result<ChangeBatch, SourceError> {
        let mut last = self.cursor.map(|c| c.value());
        let mut converted = Vec::with_capacity(records.len());

        for record in records {
            if let Some(last) = last {
                if record.seq <= last {
                    return Err(SourceError::SequenceRegression {
                        last,
                        got: record.seq,
                    });
                }
            }
            last = Some(record.seq);
            converted.push(ChangeRecord::new(record.seq, record.payload));
        }

        if let Some(last) = last {
            self.cursor = Some(SequenceNumber::new(last));
        }
        Ok(ChangeBatch::new(converted))
    }
}

#[async_trait]
impl ChangeSource for HttpPollingSource {
    async fn next_batch(&mut self) -> std::result::Result<Option<ChangeBatch>, SourceError> {
        loop {
            let records = self.poll_once().await?;
            if records.is_empty() {
                trace!(interval_ms = self.poll_interval.as_millis() as u64, "Feed idle");
                sleep(self.poll_interval).await;
                continue;
            }

            let batch = self.to_batch(records)?;
            debug!(
                records = batch.len(),
                cursor = ?self.cursor,
                "Polled change batch"
            );
            return Ok(Some(batch));
        }
    }

    fn source_name(&self) -> &'static str {
        "http-poll"
    }
}
