//! JSON file extraction source.
//!
//! Each node exports its extraction to `node-<id>.json`. Reading, decoding
//! and the node id inside the document are all checked per file, and the
//! error names the node whose export is unusable.

use crate::domain::NodeExtraction;
use crate::error::{DisputeResolverError, DisputeResult};
use crate::ports::outbound::ExtractionSource;
use async_trait::async_trait;
use shared_types::NodeId;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads one JSON export per node from a directory.
#[derive(Clone, Debug)]
pub struct JsonFileExtractionSource {
    directory: PathBuf,
}

impl JsonFileExtractionSource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Path of the export written by `node`.
    pub fn export_path(&self, node: NodeId) -> PathBuf {
        self.directory.join(format!("node-{}.json", node.get()))
    }

    async fn read_export(&self, node: NodeId, path: &Path) -> DisputeResult<NodeExtraction> {
        let failed = |reason: String| DisputeResolverError::ExtractionFailed {
            node_id: node.get(),
            reason,
        };

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| failed(format!("{}: {}", path.display(), e)))?;
        let extraction: NodeExtraction =
            serde_json::from_slice(&bytes).map_err(|e| failed(e.to_string()))?;

        if extraction.node_id != node {
            return Err(failed(format!(
                "export claims node {}",
                extraction.node_id.get()
            )));
        }
        debug!(
            "[cc-02] Loaded extraction of node {} ({} cards)",
            node.get(),
            extraction.verification_cards.len()
        );
        Ok(extraction)
    }
}

#[async_trait]
impl ExtractionSource for JsonFileExtractionSource {
    async fn fetch_all(&self) -> DisputeResult<Vec<NodeExtraction>> {
        let mut extractions = Vec::new();
        for node in NodeId::all() {
            let path = self.export_path(node);
            extractions.push(self.read_export(node, &path).await?);
        }
        Ok(extractions)
    }
}
