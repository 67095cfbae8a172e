//! In-memory extraction source.

use crate::domain::NodeExtraction;
use crate::error::DisputeResult;
use crate::ports::outbound::ExtractionSource;
use async_trait::async_trait;

/// Serves a fixed set of extractions, for tests and replays.
#[derive(Clone, Debug, Default)]
pub struct InMemoryExtractionSource {
    extractions: Vec<NodeExtraction>,
}

impl InMemoryExtractionSource {
    pub fn new(extractions: Vec<NodeExtraction>) -> Self {
        Self { extractions }
    }
}

#[async_trait]
impl ExtractionSource for InMemoryExtractionSource {
    async fn fetch_all(&self) -> DisputeResult<Vec<NodeExtraction>> {
        Ok(self.extractions.clone())
    }
}
