//! Driven Ports (SPI - Outbound Dependencies)

use crate::error::ReconciliationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Local state of a verification card on this node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalCardStatus {
    NotSent,
    Sent,
    Confirmed,
}

/// This node's confirmation records.
#[async_trait]
pub trait LocalConfirmationStore: Send + Sync {
    async fn card_status(
        &self,
        election_event_id: &str,
        verification_card_id: &str,
    ) -> ReconciliationResult<LocalCardStatus>;

    /// Record the card as confirmed. Only called for sent cards.
    async fn mark_confirmed(
        &self,
        election_event_id: &str,
        verification_card_id: &str,
    ) -> ReconciliationResult<()>;
}
