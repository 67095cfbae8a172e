//! Driving Ports (API - Inbound)

use crate::domain::{ConfirmationKey, ConfirmationOutcome};
use crate::error::ConfirmationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_crypto::PayloadSignature;
use shared_types::ContextIds;

/// A voter's request to confirm a cast vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub context_ids: ContextIds,
    pub confirmation_key: ConfirmationKey,
    pub confirmation_attempt_id: u8,
    /// Relay signature over the confirmation key
    pub signature: PayloadSignature,
}

/// Outcome handed back to the voter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResponse {
    pub outcome: ConfirmationOutcome,
    /// True when a completed execution was returned instead of re-running
    pub replayed: bool,
}

/// Primary vote confirmation API
#[async_trait]
pub trait VoteConfirmationApi: Send + Sync {
    /// Run one confirmation attempt for a ballot.
    ///
    /// Retrying the same `(verification_card_id, attempt_id)` returns the
    /// first execution's outcome without re-running it.
    async fn confirm_vote(
        &self,
        request: ConfirmationRequest,
    ) -> ConfirmationResult<ConfirmationResponse>;
}
