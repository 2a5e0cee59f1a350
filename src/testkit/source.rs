//! Scripted [`ChangeSource`] implementation for tests.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::domain::ChangeBatch;
use crate::error::SourceError;
use crate::port::ChangeSource;

/// A change source that yields a pre-loaded script of results.
///
/// Each `next_batch` call pops the next scripted result; when the script
/// is exhausted the source reports itself closed (`Ok(None)`).
pub struct ScriptedSource {
    results: VecDeque<Result<Option<ChangeBatch>, SourceError>>,
}

impl ScriptedSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            results: VecDeque::new(),
        }
    }

    /// Script a sequence of batches, in order.
    #[must_use]
    pub fn with_batches(mut self, batches: Vec<ChangeBatch>) -> Self {
        self.results
            .extend(batches.into_iter().map(|b| Ok(Some(b))));
        self
    }

    /// Script a read failure.
    #[must_use]
    pub fn with_error(mut self, error: SourceError) -> Self {
        self.results.push_back(Err(error));
        self
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeSource for ScriptedSource {
    async fn next_batch(&mut self) -> Result<Option<ChangeBatch>, SourceError> {
        self.results.pop_front().unwrap_or(Ok(None))
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}
