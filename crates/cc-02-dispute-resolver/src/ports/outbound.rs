//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::NodeExtraction;
use crate::error::DisputeResult;
use async_trait::async_trait;

/// Source of the per-node extractions.
///
/// Returns one extraction per node in any order; the resolver orders and
/// counts them.
#[async_trait]
pub trait ExtractionSource: Send + Sync {
    async fn fetch_all(&self) -> DisputeResult<Vec<NodeExtraction>>;
}
