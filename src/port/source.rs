//! Change source seam.

use async_trait::async_trait;

use crate::domain::ChangeBatch;
use crate::error::SourceError;

/// A change feed surfacing batches of changed records as they occur.
///
/// Batches arrive in feed order and cannot be re-read once consumed. A
/// read failure is fatal to the fan-out run loop: with no batch available
/// there is nothing to distribute.
#[async_trait]
pub trait ChangeSource: Send {
    /// Next batch of changes, in feed order.
    ///
    /// Returns `Ok(None)` when the feed is closed and no further batches
    /// will arrive.
    async fn next_batch(&mut self) -> Result<Option<ChangeBatch>, SourceError>;

    /// Get the source name for logging/debugging.
    fn source_name(&self) -> &'static str;
}
