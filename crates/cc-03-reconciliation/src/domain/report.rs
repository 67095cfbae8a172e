//! Per-node reconciliation report.

use serde::{Deserialize, Serialize};
use shared_types::NodeId;

/// What reconciliation did with each resolved vote, by card id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub node_id: Option<NodeId>,
    /// Already confirmed locally
    pub already_confirmed: Vec<String>,
    /// Sent locally and now marked confirmed
    pub repaired: Vec<String>,
    /// Never sent on this node; cannot be repaired
    pub not_sent: Vec<String>,
    /// Agreement hash not in the allow list of its card set
    pub unverifiable: Vec<String>,
}

impl ReconciliationReport {
    pub fn for_node(node_id: NodeId) -> Self {
        Self {
            node_id: Some(node_id),
            ..Self::default()
        }
    }

    /// True when every resolved vote ended up confirmed locally.
    pub fn is_consistent(&self) -> bool {
        self.not_sent.is_empty() && self.unverifiable.is_empty()
    }

    pub fn processed(&self) -> usize {
        self.already_confirmed.len()
            + self.repaired.len()
            + self.not_sent.len()
            + self.unverifiable.len()
    }
}
